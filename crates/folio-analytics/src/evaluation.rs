//! 시계열 교차 검증.
//!
//! 시간 순서를 유지하는 확장 윈도우 분할로 방향 분류기의 과거 성능을
//! 진단합니다. 단발 예측 경로와는 독립적인 평가 전용 모듈입니다.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AnalyticsError, Result};
use crate::forest::{Dataset, ForestParams, RandomForest};

/// 폴드별 지표.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FoldMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// 교차 검증 결과.
///
/// 지표는 폴드 평균, 혼동 행렬은 폴드 합산입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// [실제][예측] 순서의 2x2 혼동 행렬 (0 = 하락, 1 = 상승)
    pub confusion_matrix: [[usize; 2]; 2],
    pub folds: Vec<FoldMetrics>,
}

/// 시계열 교차 검증기.
#[derive(Debug, Clone, Copy)]
pub struct TimeSeriesEvaluator {
    n_splits: usize,
    params: ForestParams,
}

impl Default for TimeSeriesEvaluator {
    fn default() -> Self {
        Self {
            n_splits: 5,
            params: ForestParams::classification(),
        }
    }
}

impl TimeSeriesEvaluator {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            ..Self::default()
        }
    }

    /// 확장 윈도우 분할로 분류기를 평가합니다.
    ///
    /// k번째 폴드는 앞쪽 k개 구간으로 학습하고 그다음 구간으로
    /// 검증합니다. 셔플은 하지 않습니다.
    pub fn evaluate(&self, dataset: &Dataset) -> Result<EvaluationReport> {
        let n = dataset.n_samples();
        let fold_size = n / (self.n_splits + 1);
        if fold_size == 0 {
            return Err(AnalyticsError::InsufficientData {
                required: self.n_splits + 1,
                provided: n,
            });
        }

        let mut folds = Vec::with_capacity(self.n_splits);
        let mut confusion = [[0usize; 2]; 2];

        for k in 1..=self.n_splits {
            let train_end = k * fold_size;
            let test_end = if k == self.n_splits {
                n
            } else {
                (k + 1) * fold_size
            };

            let train = dataset.head(train_end);
            let test = dataset.slice(train_end, test_end);
            debug!(fold = k, train = train.n_samples(), test = test.n_samples(), "폴드 평가");

            let mut forest = RandomForest::new(self.params);
            forest.fit(&train)?;
            let predictions = forest.predict(&test.features);

            let mut fold_confusion = [[0usize; 2]; 2];
            for (pred, actual) in predictions.iter().zip(test.labels.iter()) {
                let p = usize::from(*pred > 0.5);
                let a = usize::from(*actual > 0.5);
                fold_confusion[a][p] += 1;
                confusion[a][p] += 1;
            }
            folds.push(metrics_from_confusion(&fold_confusion));
        }

        let count = folds.len() as f64;
        Ok(EvaluationReport {
            accuracy: folds.iter().map(|f| f.accuracy).sum::<f64>() / count,
            precision: folds.iter().map(|f| f.precision).sum::<f64>() / count,
            recall: folds.iter().map(|f| f.recall).sum::<f64>() / count,
            f1: folds.iter().map(|f| f.f1).sum::<f64>() / count,
            confusion_matrix: confusion,
            folds,
        })
    }
}

fn metrics_from_confusion(confusion: &[[usize; 2]; 2]) -> FoldMetrics {
    let tp = confusion[1][1] as f64;
    let tn = confusion[0][0] as f64;
    let fp = confusion[0][1] as f64;
    let fn_ = confusion[1][0] as f64;
    let total = tp + tn + fp + fn_;

    let accuracy = if total > 0.0 { (tp + tn) / total } else { 0.0 };
    let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
    let recall = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    FoldMetrics {
        accuracy,
        precision,
        recall,
        f1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> Dataset {
        // 라벨이 피처와 완전히 일치하는 쉬운 문제
        Dataset::new(
            (0..n).map(|i| vec![(i % 2) as f64 * 10.0]).collect(),
            (0..n).map(|i| (i % 2) as f64).collect(),
            vec!["signal".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_evaluate_easy_problem() {
        let report = TimeSeriesEvaluator::default().evaluate(&dataset(120)).unwrap();
        assert_eq!(report.folds.len(), 5);
        assert!(report.accuracy > 0.9);
        assert!(report.f1 > 0.9);
        let total: usize = report
            .confusion_matrix
            .iter()
            .flat_map(|row| row.iter())
            .sum();
        // 검증에 쓰인 샘플 수 = 전체 - 첫 학습 구간
        assert_eq!(total, 120 - 20);
    }

    #[test]
    fn test_too_few_samples() {
        let err = TimeSeriesEvaluator::default().evaluate(&dataset(4)).unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData { .. }));
    }
}
