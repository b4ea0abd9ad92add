//! 분석 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 기술적 지표 계산과 지표 프레임
//! - 랜덤 포레스트 (피처 선택, 방향 분류, 종가 회귀)
//! - 감성 점수 병합
//! - 예측 파이프라인과 시계열 교차 검증

pub mod error;
pub mod evaluation;
pub mod forest;
pub mod frame;
pub mod indicators;
pub mod merger;
pub mod prediction;
pub mod selector;

pub use error::{AnalyticsError, Result};
pub use evaluation::{EvaluationReport, FoldMetrics, TimeSeriesEvaluator};
pub use forest::{Dataset, ForestParams, RandomForest, TaskKind};
pub use frame::{IndicatorEngine, IndicatorFrame, INDICATOR_COLUMNS};
pub use merger::SentimentMerger;
pub use prediction::{PredictionEngine, MIN_PREDICTION_ROWS, PRICE_CLIP_RATIO, SENTIMENT_COLUMN};
pub use selector::FeatureSelector;
