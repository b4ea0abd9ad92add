//! 감성 점수 저장소.
//!
//! 분석된 기사의 라벨을 일 단위로 누적하고, 일별 점수
//! (긍정 - 부정) / 전체를 계산해 제공합니다.

use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use folio_core::types::{DailySentimentScore, SentimentLabel};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// 감성 점수 저장소.
#[async_trait]
pub trait SentimentScoreStore: Send + Sync {
    /// 분석된 기사 하나의 라벨을 기록합니다.
    async fn record_label(&self, ticker: &str, date: NaiveDate, label: SentimentLabel)
        -> Result<()>;

    /// 종목의 일별 점수를 날짜 오름차순으로 반환합니다.
    async fn daily_scores(&self, ticker: &str) -> Result<Vec<DailySentimentScore>>;
}

#[derive(Debug, Default, Clone, Copy)]
struct LabelCounts {
    positive: usize,
    negative: usize,
    neutral: usize,
}

impl LabelCounts {
    fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    fn score(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.positive as f64 - self.negative as f64) / total as f64
    }
}

/// 인메모리 감성 점수 저장소.
#[derive(Default)]
pub struct InMemoryScoreStore {
    // (ticker, date) -> 라벨 카운트
    counts: RwLock<BTreeMap<(String, NaiveDate), LabelCounts>>,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SentimentScoreStore for InMemoryScoreStore {
    async fn record_label(
        &self,
        ticker: &str,
        date: NaiveDate,
        label: SentimentLabel,
    ) -> Result<()> {
        let mut guard = self.counts.write().await;
        let entry = guard.entry((ticker.to_string(), date)).or_default();
        match label {
            SentimentLabel::Positive => entry.positive += 1,
            SentimentLabel::Negative => entry.negative += 1,
            SentimentLabel::Neutral => entry.neutral += 1,
        }
        Ok(())
    }

    async fn daily_scores(&self, ticker: &str) -> Result<Vec<DailySentimentScore>> {
        let guard = self.counts.read().await;
        Ok(guard
            .iter()
            .filter(|((t, _), _)| t == ticker)
            .map(|((t, date), counts)| DailySentimentScore {
                ticker: t.clone(),
                date: *date,
                score: counts.score(),
                article_count: counts.total(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[tokio::test]
    async fn test_daily_score_formula() {
        let store = InMemoryScoreStore::new();
        // 3 긍정, 1 부정, 1 중립 -> (3-1)/5 = 0.4
        for _ in 0..3 {
            store
                .record_label("005930.KS", date(1), SentimentLabel::Positive)
                .await
                .unwrap();
        }
        store
            .record_label("005930.KS", date(1), SentimentLabel::Negative)
            .await
            .unwrap();
        store
            .record_label("005930.KS", date(1), SentimentLabel::Neutral)
            .await
            .unwrap();

        let scores = store.daily_scores("005930.KS").await.unwrap();
        assert_eq!(scores.len(), 1);
        assert!((scores[0].score - 0.4).abs() < 1e-12);
        assert_eq!(scores[0].article_count, 5);
    }

    #[tokio::test]
    async fn test_scores_sorted_and_scoped_by_ticker() {
        let store = InMemoryScoreStore::new();
        store
            .record_label("A", date(2), SentimentLabel::Positive)
            .await
            .unwrap();
        store
            .record_label("A", date(1), SentimentLabel::Negative)
            .await
            .unwrap();
        store
            .record_label("B", date(1), SentimentLabel::Positive)
            .await
            .unwrap();

        let scores = store.daily_scores("A").await.unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].date, date(1));
        assert_eq!(scores[0].score, -1.0);
        assert_eq!(scores[1].score, 1.0);
    }
}
