//! 포트폴리오 구성 파이프라인.
//!
//! 이 crate는 다음을 제공합니다:
//! - 마코위츠 최대 샤프 최적화 (경사 상승법 + 동일 가중 폴백)
//! - 전문가 규칙 기반 가중치 조정
//! - 최종 분석 페이로드 타입
//! - 환율/뉴스/예측/최적화를 묶는 오케스트레이터

pub mod adjustment;
pub mod error;
pub mod optimizer;
pub mod orchestrator;
pub mod report;

pub use adjustment::{adjust_weights, AdjustedPortfolio};
pub use error::{PortfolioError, Result};
pub use optimizer::{MarkowitzResult, PortfolioOptimizer};
pub use orchestrator::{Orchestrator, MIN_OPTIMIZATION_ROWS};
pub use report::{AnalysisReport, FinalPortfolio, MarkowitzPortfolio, ModelPrediction};
