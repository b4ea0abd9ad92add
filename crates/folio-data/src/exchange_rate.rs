//! USD/KRW 환율 조회.
//!
//! 네이버 환율 계산기 API를 사용하고, 실패 시 고정 기본값으로
//! 폴백합니다.

use crate::error::{DataError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

/// 조회 실패 시 사용하는 기본 환율.
pub const DEFAULT_USD_KRW: f64 = 1400.0;

const DEFAULT_BASE_URL: &str = "https://m.search.naver.com";

/// 환율 조회 클라이언트.
pub struct ExchangeRateClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CalculatorResponse {
    country: Vec<CountryEntry>,
}

#[derive(Debug, Deserialize)]
struct CountryEntry {
    value: String,
}

impl ExchangeRateClient {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout_secs)
    }

    /// 테스트용 base URL 오버라이드.
    pub fn with_base_url(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DataError::FetchError(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// USD/KRW 환율을 조회합니다.
    pub async fn fetch_usd_krw(&self) -> Result<f64> {
        let url = format!(
            "{}/p/csearch/content/qapirender.nhn?key=calculator&pkid=141&q=%ED%99%98%EC%9C%A8&where=m&u1=keb&u6=standardUnit&u7=0&u3=USD&u4=KRW&u8=down&u2=1",
            self.base_url
        );
        let response: CalculatorResponse = self.client.get(&url).send().await?.json().await?;

        // country[0]은 기준 통화(1 USD), country[1]이 환산 금액입니다.
        let raw = response
            .country
            .get(1)
            .map(|c| c.value.as_str())
            .ok_or_else(|| DataError::ParseError("missing country entry".to_string()))?;
        raw.replace(',', "")
            .parse::<f64>()
            .map_err(|e| DataError::ParseError(format!("invalid rate '{raw}': {e}")))
    }

    /// 환율을 조회하고, 실패하면 기본값을 반환합니다.
    pub async fn usd_krw_or_default(&self) -> f64 {
        match self.fetch_usd_krw().await {
            Ok(rate) => rate,
            Err(e) => {
                warn!(error = %e, fallback = DEFAULT_USD_KRW, "환율 조회 실패, 기본값 사용");
                DEFAULT_USD_KRW
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_parses_comma_value() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "GET",
                mockito::Matcher::Regex(r"^/p/csearch/content/qapirender\.nhn.*".to_string()),
            )
            .with_status(200)
            .with_body(r#"{"country":[{"value":"1"},{"value":"1,385.50"}]}"#)
            .create_async()
            .await;

        let client = ExchangeRateClient::with_base_url(server.url(), 5).unwrap();
        let rate = client.fetch_usd_krw().await.unwrap();
        assert!((rate - 1385.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_fallback_on_bad_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "GET",
                mockito::Matcher::Regex(r"^/p/csearch/content/qapirender\.nhn.*".to_string()),
            )
            .with_status(500)
            .create_async()
            .await;

        let client = ExchangeRateClient::with_base_url(server.url(), 5).unwrap();
        let rate = client.usd_krw_or_default().await;
        assert_eq!(rate, DEFAULT_USD_KRW);
    }
}
