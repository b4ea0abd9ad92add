//! 뉴스/감성 타입.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 기사 감성 라벨.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 수집된 뉴스 기사.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub headline: String,
    pub link: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    /// 분석 결과 감성 (미분석 시 None)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentLabel>,
    /// 분석 신뢰도 (0.0 ~ 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl NewsArticle {
    pub fn new(
        headline: impl Into<String>,
        link: impl Into<String>,
        source: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            headline: headline.into(),
            link: link.into(),
            source: source.into(),
            published_at,
            sentiment: None,
            confidence: None,
        }
    }
}

/// 일별 집계 감성 점수.
///
/// 점수는 (긍정 - 부정) / 전체 기사 수로 [-1.0, 1.0] 범위입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySentimentScore {
    pub ticker: String,
    pub date: NaiveDate,
    pub score: f64,
    pub article_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_serde() {
        let json = serde_json::to_string(&SentimentLabel::Positive).unwrap();
        assert_eq!(json, "\"positive\"");
        let label: SentimentLabel = serde_json::from_str("\"neutral\"").unwrap();
        assert_eq!(label, SentimentLabel::Neutral);
    }
}
