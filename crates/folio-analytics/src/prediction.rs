//! 예측 엔진.
//!
//! 피처 선택 → 감성 병합 → 지표 계산 → 분류/회귀 학습 → 예측까지의
//! 파이프라인입니다. 각 단계의 실패는 예외가 아니라 명시적 상태로
//! 결과에 기록됩니다.

use folio_core::types::{
    DailySentimentScore, Direction, PredictionResult, PredictionStatus, PriceSeries,
};
use tracing::{debug, info, warn};

use crate::forest::{Dataset, ForestParams, RandomForest};
use crate::frame::{IndicatorEngine, IndicatorFrame};
use crate::merger::SentimentMerger;
use crate::selector::FeatureSelector;

/// 예측에 필요한 최소 가격 행 수.
pub const MIN_PREDICTION_ROWS: usize = 50;

/// 회귀 예측을 현재가 대비 이 비율 범위로 제한합니다.
pub const PRICE_CLIP_RATIO: f64 = 0.05;

/// 감성 점수 컬럼 이름.
pub const SENTIMENT_COLUMN: &str = "sentiment_score";

/// 예측 엔진.
pub struct PredictionEngine {
    indicator_engine: IndicatorEngine,
    selector: FeatureSelector,
    merger: SentimentMerger,
    min_rows: usize,
}

impl Default for PredictionEngine {
    fn default() -> Self {
        Self {
            indicator_engine: IndicatorEngine::new(),
            selector: FeatureSelector::default(),
            merger: SentimentMerger::new(),
            min_rows: MIN_PREDICTION_ROWS,
        }
    }
}

impl PredictionEngine {
    pub fn new(top_n: usize) -> Self {
        Self {
            selector: FeatureSelector::new(top_n),
            ..Self::default()
        }
    }

    /// 단일 종목 예측.
    ///
    /// `selection_series`는 피처 선택용 장기 시계열이고, `series`는
    /// 예측용 시계열입니다. 어떤 단계가 실패해도 0으로 채워진 결과에
    /// 상태만 기록해 반환합니다.
    pub fn predict(
        &self,
        ticker: &str,
        selection_series: &PriceSeries,
        series: &PriceSeries,
        scores: &[DailySentimentScore],
    ) -> PredictionResult {
        // 1단계: 피처 선택
        let top_features = match self
            .indicator_engine
            .compute(selection_series)
            .map_err(|e| e.to_string())
            .and_then(|frame| self.selector.select(&frame).map_err(|e| e.to_string()))
        {
            Ok(features) => features,
            Err(e) => {
                warn!(ticker, error = %e, "피처 선택 실패");
                return PredictionResult::empty(ticker, PredictionStatus::FeatureSelectionFailed);
            }
        };

        // 2단계: 예측용 시계열 검증
        if series.len() < self.min_rows {
            warn!(ticker, rows = series.len(), min = self.min_rows, "가격 행 수 부족");
            return PredictionResult::empty(ticker, PredictionStatus::InsufficientData);
        }

        // 3단계: 감성 병합
        let sentiment = self.merger.merge(&series.dates(), scores);
        let has_sentiment = sentiment.iter().sum::<f64>() != 0.0;

        // 4단계: 지표 계산
        let mut frame = match self.indicator_engine.compute(series) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(ticker, error = %e, "지표 계산 실패");
                return PredictionResult::empty(ticker, PredictionStatus::IndicatorFailed);
            }
        };
        if frame
            .push_column(SENTIMENT_COLUMN, sentiment.into_iter().map(Some).collect())
            .is_err()
        {
            return PredictionResult::empty(ticker, PredictionStatus::IndicatorFailed);
        }

        // 5단계: 최종 피처 목록. 감성 점수는 실제 데이터가 있을 때만
        // 포함합니다 (없으면 가격 피처만으로 성능 저하 없이 동작).
        let mut features: Vec<String> = top_features
            .into_iter()
            .filter(|name| frame.has_column(name))
            .collect();
        if features.is_empty() {
            return PredictionResult::empty(ticker, PredictionStatus::FeatureSelectionFailed);
        }
        if has_sentiment {
            features.push(SENTIMENT_COLUMN.to_string());
        }
        debug!(ticker, ?features, "최종 피처 목록");

        match self.train_and_predict(ticker, &frame, &features, has_sentiment) {
            Some(result) => result,
            None => PredictionResult::empty(ticker, PredictionStatus::InsufficientTrainingData),
        }
    }

    fn train_and_predict(
        &self,
        ticker: &str,
        frame: &IndicatorFrame,
        features: &[String],
        has_sentiment: bool,
    ) -> Option<PredictionResult> {
        // 6단계: 결측 행 제거
        let (indices, rows) = frame.complete_rows(features).ok()?;
        if rows.len() < 2 {
            return None;
        }

        let close = frame.column("Close")?;
        let kept_closes: Vec<f64> = indices.iter().map(|&i| close[i].unwrap_or(0.0)).collect();
        let current_price = *kept_closes.last()?;

        // 마지막 행은 라벨이 없어 학습에서 제외하고 예측에만 씁니다.
        let n_train = rows.len() - 1;
        let train_rows = rows[..n_train].to_vec();
        let latest = rows.last()?.clone();

        let cls_labels: Vec<f64> = (0..n_train)
            .map(|i| {
                if kept_closes[i + 1] > kept_closes[i] {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();
        let reg_labels: Vec<f64> = (0..n_train).map(|i| kept_closes[i + 1]).collect();

        // 7단계: 방향 분류
        let cls_dataset =
            Dataset::new(train_rows.clone(), cls_labels, features.to_vec()).ok()?;
        let mut classifier = RandomForest::new(ForestParams::classification());
        classifier.fit(&cls_dataset).ok()?;
        let direction = Direction::from_label(classifier.predict_one(&latest) as u8);

        // 8단계: 종가 회귀
        let reg_dataset = Dataset::new(train_rows, reg_labels, features.to_vec()).ok()?;
        let mut regressor = RandomForest::new(ForestParams::regression());
        regressor.fit(&reg_dataset).ok()?;
        let raw_price = regressor.predict_one(&latest);

        // 9단계: 현실적 가격 범위로 클리핑
        let lower = current_price * (1.0 - PRICE_CLIP_RATIO);
        let upper = current_price * (1.0 + PRICE_CLIP_RATIO);
        let predicted_price = raw_price.clamp(lower, upper);

        let status = if has_sentiment {
            PredictionStatus::OkWithSentiment
        } else {
            PredictionStatus::Ok
        };
        info!(ticker, %direction, predicted_price, current_price, %status, "예측 완료");

        Some(PredictionResult {
            ticker: ticker.to_string(),
            direction: Some(direction),
            predicted_price,
            current_price,
            features_used: features.to_vec(),
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use folio_core::types::PricePoint;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn sample_series(n: usize) -> PriceSeries {
        let base = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let points = (0..n)
            .map(|i| {
                let c = 100.0 + (i as f64 * 0.4).sin() * 6.0 + (i as f64 * 0.09).cos() * 4.0;
                let close = Decimal::from_f64_retain(c).unwrap();
                PricePoint::new(
                    base + Duration::days(i as i64),
                    close - dec!(1),
                    close + dec!(2),
                    close - dec!(2),
                    close,
                    dec!(30000),
                )
            })
            .collect();
        PriceSeries::from_points("TEST", "USD", points)
    }

    #[test]
    fn test_insufficient_data_status() {
        let engine = PredictionEngine::default();
        let selection = sample_series(250);
        let short = sample_series(10);
        let result = engine.predict("TEST", &selection, &short, &[]);
        assert_eq!(result.status, PredictionStatus::InsufficientData);
        assert_eq!(result.status.to_string(), "insufficient data");
        assert!(result.direction.is_none());
        assert_eq!(result.predicted_price, 0.0);
        assert_eq!(result.current_price, 0.0);
    }

    #[test]
    fn test_bounded_forecast() {
        let engine = PredictionEngine::default();
        let series = sample_series(250);
        let result = engine.predict("TEST", &series, &series, &[]);
        assert!(result.status.is_success());
        let current = result.current_price;
        assert!(result.predicted_price >= current * 0.95 - 1e-9);
        assert!(result.predicted_price <= current * 1.05 + 1e-9);
    }

    #[test]
    fn test_sentiment_feature_only_when_present() {
        let engine = PredictionEngine::default();
        let series = sample_series(250);

        let without = engine.predict("TEST", &series, &series, &[]);
        assert_eq!(without.status, PredictionStatus::Ok);
        assert!(!without.features_used.iter().any(|f| f == SENTIMENT_COLUMN));

        let scores: Vec<DailySentimentScore> = (1..=20)
            .map(|d| DailySentimentScore {
                ticker: "TEST".to_string(),
                date: NaiveDate::from_ymd_opt(2023, 2, d).unwrap(),
                score: 0.3,
                article_count: 4,
            })
            .collect();
        let with = engine.predict("TEST", &series, &series, &scores);
        assert_eq!(with.status, PredictionStatus::OkWithSentiment);
        assert!(with.features_used.iter().any(|f| f == SENTIMENT_COLUMN));
    }

    #[test]
    fn test_deterministic_prediction() {
        let engine = PredictionEngine::default();
        let series = sample_series(250);
        let a = engine.predict("TEST", &series, &series, &[]);
        let b = engine.predict("TEST", &series, &series, &[]);
        assert_eq!(a.direction, b.direction);
        assert_eq!(a.predicted_price, b.predicted_price);
        assert_eq!(a.features_used, b.features_used);
    }
}
