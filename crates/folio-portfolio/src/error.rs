//! 포트폴리오 모듈 오류 타입.

use thiserror::Error;

/// 포트폴리오 관련 오류.
#[derive(Debug, Error)]
pub enum PortfolioError {
    /// 최적화 실패 (공분산 특이성 등)
    #[error("최적화 실패: {0}")]
    OptimizationError(String),

    /// 데이터 계층 오류
    #[error("데이터 오류: {0}")]
    DataError(#[from] folio_data::DataError),

    /// 분석 계층 오류
    #[error("분석 오류: {0}")]
    AnalyticsError(#[from] folio_analytics::AnalyticsError),

    /// 감성 계층 오류
    #[error("감성 분석 오류: {0}")]
    SentimentError(#[from] folio_sentiment::SentimentError),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, PortfolioError>;
