//! # Folio Core
//!
//! 예측/배분 파이프라인의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 가격 시계열 (OHLCV)
//! - 뉴스 기사 및 감성 레이블
//! - 예측 결과
//! - 전문가 규칙 및 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;
