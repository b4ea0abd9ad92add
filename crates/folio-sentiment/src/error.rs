//! 감성 분석 모듈 오류 타입.

use thiserror::Error;

/// 감성 분석 관련 오류.
#[derive(Debug, Error)]
pub enum SentimentError {
    /// 번역 서비스 오류
    #[error("번역 실패: {0}")]
    TranslationError(String),

    /// 분류 모델 오류
    #[error("감성 분류 실패: {0}")]
    ClassificationError(String),

    /// 뉴스 수집 오류
    #[error("뉴스 수집 실패: {0}")]
    CollectionError(String),

    /// 외부 서비스 오류 (네트워크, 타임아웃)
    #[error("외부 서비스 오류: {0}")]
    ExternalError(String),
}

impl From<reqwest::Error> for SentimentError {
    fn from(err: reqwest::Error) -> Self {
        SentimentError::ExternalError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SentimentError>;
