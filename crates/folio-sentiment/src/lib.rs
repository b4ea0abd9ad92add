//! 다국어 뉴스 수집 및 감성 분석.
//!
//! 이 crate는 다음을 제공합니다:
//! - 뉴스 수집기 (네이버 검색 API + 정적 수집기)
//! - 한글/영문 언어 분리
//! - 번역/분류 서비스 추상화와 기본 구현
//! - 배치 번역 + 단일 배치 분류 + 재조립 파이프라인

pub mod analyzer;
pub mod collector;
pub mod error;
pub mod language;
pub mod services;

pub use analyzer::{
    SentimentAnalyzer, SentimentReport, SentimentStatus, SentimentSummary, STATUS_THRESHOLD,
    TRANSLATION_BATCH_SIZE,
};
pub use collector::{NaverNewsCollector, NewsCollector, StaticNewsCollector};
pub use error::{Result, SentimentError};
pub use language::{contains_hangul, split_by_language, LanguageSplit};
pub use services::{
    Classification, IdentityTranslator, LexiconClassifier, SentimentClassifierModel,
    TextGenerationService,
};
