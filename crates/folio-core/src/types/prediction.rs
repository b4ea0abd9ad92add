//! 예측 결과 타입.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 예측 파이프라인 종료 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionStatus {
    /// 가격 기반 예측 성공
    Ok,
    /// 감성 피처 포함 예측 성공
    OkWithSentiment,
    /// 피처 중요도 선택 실패
    FeatureSelectionFailed,
    /// 가격 데이터 로드 실패
    PriceDataUnavailable,
    /// 지표 계산 실패
    IndicatorFailed,
    /// 입력 데이터 기간 부족
    InsufficientData,
    /// 학습 가능한 행 부족
    InsufficientTrainingData,
}

impl PredictionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::OkWithSentiment => "ok (with sentiment)",
            Self::FeatureSelectionFailed => "feature selection failed",
            Self::PriceDataUnavailable => "price data unavailable",
            Self::IndicatorFailed => "indicator computation failed",
            Self::InsufficientData => "insufficient data",
            Self::InsufficientTrainingData => "insufficient training data",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ok | Self::OkWithSentiment)
    }
}

impl fmt::Display for PredictionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for PredictionStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PredictionStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "ok" => Ok(Self::Ok),
            "ok (with sentiment)" => Ok(Self::OkWithSentiment),
            "feature selection failed" => Ok(Self::FeatureSelectionFailed),
            "price data unavailable" => Ok(Self::PriceDataUnavailable),
            "indicator computation failed" => Ok(Self::IndicatorFailed),
            "insufficient data" => Ok(Self::InsufficientData),
            "insufficient training data" => Ok(Self::InsufficientTrainingData),
            other => Err(serde::de::Error::custom(format!(
                "unknown prediction status: {other}"
            ))),
        }
    }
}

/// 예측 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            Self::Up
        } else {
            Self::Down
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 단일 종목의 예측 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub ticker: String,
    /// 다음 거래일 방향 (실패 시 None)
    pub direction: Option<Direction>,
    /// 다음 거래일 예상 종가 (실패 시 0.0)
    pub predicted_price: f64,
    /// 마지막 관측 종가 (실패 시 0.0)
    pub current_price: f64,
    /// 학습에 사용된 피처 이름
    pub features_used: Vec<String>,
    pub status: PredictionStatus,
}

impl PredictionResult {
    /// 실패 상태의 빈 결과를 생성합니다.
    pub fn empty(ticker: impl Into<String>, status: PredictionStatus) -> Self {
        Self {
            ticker: ticker.into(),
            direction: None,
            predicted_price: 0.0,
            current_price: 0.0,
            features_used: Vec::new(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(PredictionStatus::InsufficientData.to_string(), "insufficient data");
        assert!(PredictionStatus::OkWithSentiment.is_success());
        assert!(!PredictionStatus::PriceDataUnavailable.is_success());
    }

    #[test]
    fn test_status_serde_roundtrip() {
        let json = serde_json::to_string(&PredictionStatus::Ok).unwrap();
        assert_eq!(json, "\"ok\"");
        let parsed: PredictionStatus = serde_json::from_str("\"insufficient data\"").unwrap();
        assert_eq!(parsed, PredictionStatus::InsufficientData);
    }

    #[test]
    fn test_empty_result() {
        let result = PredictionResult::empty("005930.KS", PredictionStatus::PriceDataUnavailable);
        assert_eq!(result.predicted_price, 0.0);
        assert!(result.direction.is_none());
    }
}
