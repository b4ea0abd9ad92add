//! 뉴스 수집.
//!
//! `NewsCollector` trait와 네이버 뉴스 검색 API 구현을 제공합니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_core::types::NewsArticle;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Result, SentimentError};

/// 뉴스 수집기.
#[async_trait]
pub trait NewsCollector: Send + Sync {
    /// 질의어로 뉴스를 검색합니다. 감성 필드는 비워둡니다.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<NewsArticle>>;
}

/// 네이버 뉴스 검색 API 수집기.
pub struct NaverNewsCollector {
    client: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

const DEFAULT_BASE_URL: &str = "https://openapi.naver.com";

#[derive(Debug, Deserialize)]
struct NewsSearchResponse {
    items: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default, rename = "originallink")]
    original_link: String,
    #[serde(rename = "pubDate")]
    pub_date: String,
}

impl NaverNewsCollector {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, client_id, client_secret, timeout_secs)
    }

    /// 테스트용 base URL 오버라이드.
    pub fn with_base_url(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SentimentError::ExternalError(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        })
    }
}

#[async_trait]
impl NewsCollector for NaverNewsCollector {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<NewsArticle>> {
        let url = format!(
            "{}/v1/search/news.json?query={}&display={}&sort=date",
            self.base_url,
            urlencode(query),
            limit.min(100)
        );
        debug!(query, limit, "뉴스 검색 요청");

        let response = self
            .client
            .get(&url)
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SentimentError::CollectionError(format!(
                "HTTP {}",
                response.status()
            )));
        }
        let body: NewsSearchResponse = response
            .json()
            .await
            .map_err(|e| SentimentError::CollectionError(e.to_string()))?;

        // 같은 기사가 여러 검색 결과로 나타나므로 링크로 중복 제거합니다.
        let mut seen: HashSet<String> = HashSet::new();
        let mut articles = Vec::new();
        for item in body.items {
            let link = if item.original_link.is_empty() {
                item.link.clone()
            } else {
                item.original_link.clone()
            };
            if !seen.insert(link.clone()) {
                continue;
            }
            let published_at = parse_pub_date(&item.pub_date).unwrap_or_else(|| {
                warn!(raw = %item.pub_date, "발행일 파싱 실패, 현재 시각 사용");
                Utc::now()
            });
            articles.push(NewsArticle::new(
                strip_markup(&item.title),
                link,
                "naver",
                published_at,
            ));
            if articles.len() >= limit {
                break;
            }
        }
        Ok(articles)
    }
}

/// 정적 기사 목록을 돌려주는 수집기. 테스트/데모용.
#[derive(Debug, Default)]
pub struct StaticNewsCollector {
    articles: Vec<NewsArticle>,
}

impl StaticNewsCollector {
    pub fn new(articles: Vec<NewsArticle>) -> Self {
        Self { articles }
    }
}

#[async_trait]
impl NewsCollector for StaticNewsCollector {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<NewsArticle>> {
        Ok(self.articles.iter().take(limit).cloned().collect())
    }
}

fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// 검색 결과 제목의 HTML 태그와 일부 엔티티를 제거합니다.
fn strip_markup(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut in_tag = false;
    for c in title.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&quot;", "\"")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

fn urlencode(s: &str) -> String {
    let mut out = String::new();
    for byte in s.as_bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(*byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
