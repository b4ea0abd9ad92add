//! 감성 점수 병합.
//!
//! 일별 감성 점수를 가격 날짜 인덱스에 좌측 조인합니다.
//! 빈 날짜는 직전 값으로 채우고(forward fill), 앞쪽에 남는 결측은
//! 0으로 채웁니다. 출력 길이는 항상 가격 날짜 수와 같습니다.

use chrono::{DateTime, Utc};
use folio_core::types::DailySentimentScore;
use std::collections::BTreeMap;

/// 감성 점수 병합기.
#[derive(Debug, Default)]
pub struct SentimentMerger;

impl SentimentMerger {
    pub fn new() -> Self {
        Self
    }

    /// 가격 날짜별 감성 점수 컬럼을 생성합니다.
    pub fn merge(&self, dates: &[DateTime<Utc>], scores: &[DailySentimentScore]) -> Vec<f64> {
        let by_date: BTreeMap<chrono::NaiveDate, f64> =
            scores.iter().map(|s| (s.date, s.score)).collect();

        let mut merged = Vec::with_capacity(dates.len());
        let mut last: Option<f64> = None;
        for date in dates {
            if let Some(score) = by_date.get(&date.date_naive()) {
                last = Some(*score);
            }
            merged.push(last.unwrap_or(0.0));
        }
        merged
    }
}
