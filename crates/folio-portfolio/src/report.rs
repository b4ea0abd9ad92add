//! 최종 분석 페이로드.
//!
//! 표현 계층(리포트, API)이 소비하는 직렬화 가능한 결과 구조입니다.

use folio_core::types::PredictionResult;
use folio_sentiment::SentimentReport;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 종목별 예측 묶음.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPrediction {
    /// 이름 -> 예측 결과 (해당 종목 파이프라인이 실행되지 못하면 None)
    pub individual: HashMap<String, Option<PredictionResult>>,
}

/// 마코위츠 가중치 묶음.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkowitzPortfolio {
    pub weights: HashMap<String, f64>,
}

/// 조정된 최종 포트폴리오.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalPortfolio {
    pub final_weights: HashMap<String, f64>,
    pub reason: String,
}

/// 전체 분석 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// USD/KRW 환율
    pub exchange_rate: f64,
    pub model_prediction: ModelPrediction,
    pub sentiment_analysis: SentimentReport,
    pub markowitz_portfolio: MarkowitzPortfolio,
    pub final_portfolio: FinalPortfolio,
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_sentiment::{SentimentStatus, SentimentSummary};

    #[test]
    fn test_report_serializes_expected_shape() {
        let report = AnalysisReport {
            exchange_rate: 1385.5,
            model_prediction: ModelPrediction {
                individual: HashMap::new(),
            },
            sentiment_analysis: SentimentReport {
                status: SentimentStatus::Neutral,
                sentiment_score: 0.0,
                summary: SentimentSummary::default(),
                analyzed_articles: vec![],
                translation_failed: 0,
                analysis_failed: 0,
                outlook: String::new(),
            },
            markowitz_portfolio: MarkowitzPortfolio {
                weights: HashMap::from([("삼성전자".to_string(), 1.0)]),
            },
            final_portfolio: FinalPortfolio {
                final_weights: HashMap::from([("삼성전자".to_string(), 1.0)]),
                reason: "조정 없음".to_string(),
            },
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["exchange_rate"], 1385.5);
        assert!(json["model_prediction"]["individual"].is_object());
        assert_eq!(json["sentiment_analysis"]["status"], "neutral");
        assert_eq!(json["markowitz_portfolio"]["weights"]["삼성전자"], 1.0);
        assert_eq!(json["final_portfolio"]["final_weights"]["삼성전자"], 1.0);
    }
}
