//! 분석 모듈 오류 타입.

use thiserror::Error;

/// 분석 관련 오류.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 필요한 컬럼 없음
    #[error("컬럼을 찾을 수 없습니다: {0}")]
    MissingColumn(String),

    /// 계산 오류
    #[error("계산 오류: {0}")]
    CalculationError(String),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
