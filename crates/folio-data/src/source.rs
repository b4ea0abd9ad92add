//! 가격 데이터 소스.
//!
//! `PriceDataSource` trait와 Yahoo Finance chart API 구현,
//! 그리고 테스트/데모용 Mock 구현을 제공합니다.

use crate::error::{DataError, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use folio_core::types::{PricePoint, PriceSeries};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

/// 일봉 가격 데이터 소스.
#[async_trait]
pub trait PriceDataSource: Send + Sync {
    /// 지정 기간의 일봉 시계열을 가져옵니다.
    async fn fetch_daily(
        &self,
        ticker: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries>;
}

/// Yahoo Finance chart API 기반 데이터 소스.
pub struct YahooChartSource {
    client: Client,
    base_url: String,
}

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

impl YahooChartSource {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout_secs)
    }

    /// 테스트용 base URL 오버라이드.
    pub fn with_base_url(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("Mozilla/5.0 (compatible; folio/0.1)")
            .build()
            .map_err(|e| DataError::FetchError(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[async_trait]
impl PriceDataSource for YahooChartSource {
    async fn fetch_daily(
        &self,
        ticker: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
            self.base_url,
            ticker,
            start.timestamp(),
            end.timestamp()
        );
        debug!(ticker, "일봉 데이터 요청");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(DataError::Unavailable {
                ticker: ticker.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let body: ChartResponse = response.json().await?;
        if let Some(err) = body.chart.error {
            return Err(DataError::Unavailable {
                ticker: ticker.to_string(),
                reason: err.to_string(),
            });
        }

        let result = body
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| DataError::Unavailable {
                ticker: ticker.to_string(),
                reason: "empty chart result".to_string(),
            })?;

        let timestamps = result.timestamp.unwrap_or_default();
        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .unwrap_or_default();
        let currency = result.meta.currency.unwrap_or_else(|| "USD".to_string());

        let mut points = Vec::with_capacity(timestamps.len());
        for (i, ts) in timestamps.iter().enumerate() {
            let row = (
                quote.open.get(i).copied().flatten(),
                quote.high.get(i).copied().flatten(),
                quote.low.get(i).copied().flatten(),
                quote.close.get(i).copied().flatten(),
            );
            // 휴장일 등 결측 행은 건너뜁니다.
            let (Some(o), Some(h), Some(l), Some(c)) = row else {
                continue;
            };
            let volume = quote.volume.get(i).copied().flatten().unwrap_or(0.0);
            let date = Utc
                .timestamp_opt(*ts, 0)
                .single()
                .ok_or_else(|| DataError::ParseError(format!("invalid timestamp: {ts}")))?;
            points.push(PricePoint::new(
                date,
                decimal_from_f64(o)?,
                decimal_from_f64(h)?,
                decimal_from_f64(l)?,
                decimal_from_f64(c)?,
                decimal_from_f64(volume)?,
            ));
        }

        if points.is_empty() {
            warn!(ticker, "응답에 유효한 가격 행이 없음");
        }
        Ok(PriceSeries::from_points(ticker, currency, points))
    }
}

fn decimal_from_f64(v: f64) -> Result<Decimal> {
    Decimal::from_f64_retain(v)
        .ok_or_else(|| DataError::ParseError(format!("non-finite price value: {v}")))
}

/// 테스트/데모용 인메모리 데이터 소스.
#[derive(Default)]
pub struct MockPriceDataSource {
    series: Mutex<HashMap<String, PriceSeries>>,
}

impl MockPriceDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, series: PriceSeries) {
        self.series
            .lock()
            .expect("mock lock poisoned")
            .insert(series.ticker.clone(), series);
    }
}

#[async_trait]
impl PriceDataSource for MockPriceDataSource {
    async fn fetch_daily(
        &self,
        ticker: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        let guard = self.series.lock().expect("mock lock poisoned");
        let series = guard.get(ticker).ok_or_else(|| DataError::Unavailable {
            ticker: ticker.to_string(),
            reason: "no mock data".to_string(),
        })?;
        let points = series
            .points()
            .iter()
            .filter(|p| p.date >= start && p.date <= end)
            .cloned()
            .collect();
        Ok(PriceSeries::from_points(
            &series.ticker,
            &series.currency,
            points,
        ))
    }
}
