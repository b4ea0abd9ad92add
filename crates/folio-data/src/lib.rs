//! 시장 데이터 수집 및 감성 점수 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - 일봉 가격 데이터 소스 (Yahoo chart API + Mock)
//! - 티커 정규화(.KS/.KQ 폴백)와 최소 행 검증 Provider
//! - 일별 감성 점수 저장소
//! - USD/KRW 환율 조회

pub mod error;
pub mod exchange_rate;
pub mod provider;
pub mod score_store;
pub mod source;

pub use error::{DataError, Result};
pub use exchange_rate::{ExchangeRateClient, DEFAULT_USD_KRW};
pub use provider::{
    align_closes, is_korean_code, ticker_candidates, AlignedCloses, PriceSeriesProvider,
};
pub use score_store::{InMemoryScoreStore, SentimentScoreStore};
pub use source::{MockPriceDataSource, PriceDataSource, YahooChartSource};
