//! 가격 시계열 조회 Provider.
//!
//! 티커 정규화(.KS/.KQ 폴백)와 최소 행 검증을 담당합니다.

use crate::error::{DataError, Result};
use crate::source::PriceDataSource;
use chrono::{DateTime, Duration, Utc};
use folio_core::types::PriceSeries;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 한국 종목 코드(6자리 숫자) 여부.
pub fn is_korean_code(ticker: &str) -> bool {
    ticker.len() == 6 && ticker.chars().all(|c| c.is_ascii_digit())
}

/// 조회 시도 순서의 티커 후보를 생성합니다.
///
/// 6자리 숫자 코드는 코스피(.KS) 우선, 코스닥(.KQ) 폴백으로 확장하고,
/// 그 외에는 입력 그대로 사용합니다.
pub fn ticker_candidates(ticker: &str) -> Vec<String> {
    if is_korean_code(ticker) {
        vec![format!("{ticker}.KS"), format!("{ticker}.KQ")]
    } else {
        vec![ticker.to_string()]
    }
}

/// 가격 시계열 Provider.
pub struct PriceSeriesProvider {
    source: Arc<dyn PriceDataSource>,
}

impl PriceSeriesProvider {
    pub fn new(source: Arc<dyn PriceDataSource>) -> Self {
        Self { source }
    }

    /// 최근 `years`년 구간의 일봉을 가져옵니다.
    ///
    /// 후보 티커를 순서대로 시도하고, `min_rows` 이상 확보된 첫 시계열을
    /// 반환합니다. 모두 실패하면 `Unavailable`입니다.
    pub async fn fetch_years(
        &self,
        ticker: &str,
        years: u32,
        min_rows: usize,
    ) -> Result<PriceSeries> {
        let end = Utc::now();
        let start = end - Duration::days(i64::from(years) * 365);
        self.fetch_range(ticker, start, end, min_rows).await
    }

    pub async fn fetch_range(
        &self,
        ticker: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        min_rows: usize,
    ) -> Result<PriceSeries> {
        let candidates = ticker_candidates(ticker);
        let korean = is_korean_code(ticker);
        let mut last_reason = "no candidates".to_string();

        for candidate in &candidates {
            match self.source.fetch_daily(candidate, start, end).await {
                Ok(mut series) if series.len() >= min_rows => {
                    // 국내 코드는 소스 메타데이터와 무관하게 KRW로 고정합니다.
                    if korean {
                        series.currency = "KRW".to_string();
                    }
                    info!(ticker, resolved = %candidate, rows = series.len(), "가격 데이터 확보");
                    return Ok(series);
                }
                Ok(series) => {
                    debug!(ticker, resolved = %candidate, rows = series.len(), min_rows, "행 수 부족");
                    last_reason = format!("{} rows (< {min_rows})", series.len());
                }
                Err(e) => {
                    warn!(ticker, resolved = %candidate, error = %e, "가격 데이터 조회 실패");
                    last_reason = e.to_string();
                }
            }
        }

        Err(DataError::Unavailable {
            ticker: ticker.to_string(),
            reason: last_reason,
        })
    }
}

/// 날짜 기준 내부 조인된 종가 행렬.
#[derive(Debug, Clone)]
pub struct AlignedCloses {
    pub tickers: Vec<String>,
    pub dates: Vec<DateTime<Utc>>,
    /// 티커 순서대로의 종가 열 (길이 = dates.len())
    pub columns: Vec<Vec<f64>>,
}

impl AlignedCloses {
    pub fn num_rows(&self) -> usize {
        self.dates.len()
    }
}

/// 여러 시계열을 날짜 기준으로 내부 조인합니다.
///
/// 모든 시계열에 존재하는 날짜만 남깁니다.
pub fn align_closes(series: &[PriceSeries]) -> AlignedCloses {
    let mut maps: Vec<BTreeMap<DateTime<Utc>, f64>> = Vec::with_capacity(series.len());
    for s in series {
        maps.push(s.points().iter().map(|p| (p.date, p.close_f64())).collect());
    }

    let dates: Vec<DateTime<Utc>> = match maps.first() {
        Some(first) => first
            .keys()
            .filter(|d| maps[1..].iter().all(|m| m.contains_key(*d)))
            .copied()
            .collect(),
        None => Vec::new(),
    };

    let columns = maps
        .iter()
        .map(|m| dates.iter().map(|d| m[d]).collect())
        .collect();

    AlignedCloses {
        tickers: series.iter().map(|s| s.ticker.clone()).collect(),
        dates,
        columns,
    }
}
