//! 피처 선택.
//!
//! 과거 데이터에서 다음날 방향 예측에 유효한 피처를 랜덤 포레스트
//! 불순도 중요도로 선별합니다.

use tracing::info;

use crate::error::{AnalyticsError, Result};
use crate::forest::{Dataset, ForestParams, RandomForest};
use crate::frame::IndicatorFrame;

/// 피처 선택기.
#[derive(Debug, Clone)]
pub struct FeatureSelector {
    params: ForestParams,
    top_n: usize,
}

impl Default for FeatureSelector {
    fn default() -> Self {
        Self {
            params: ForestParams::classification(),
            top_n: 3,
        }
    }
}

impl FeatureSelector {
    pub fn new(top_n: usize) -> Self {
        Self {
            top_n,
            ..Self::default()
        }
    }

    pub fn with_params(top_n: usize, params: ForestParams) -> Self {
        Self { params, top_n }
    }

    /// 프레임의 모든 컬럼을 후보로 상위 피처 이름을 반환합니다.
    ///
    /// 라벨은 "다음날 종가가 올랐는가"이며, 결측 행 제거 후 남은
    /// 연속 행 사이에서만 정의됩니다. 같은 입력과 시드는 항상 같은
    /// 결과를 냅니다.
    pub fn select(&self, frame: &IndicatorFrame) -> Result<Vec<String>> {
        let candidates: Vec<String> = frame
            .column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        if candidates.is_empty() {
            return Err(AnalyticsError::MissingColumn("Close".to_string()));
        }
        let close_idx = candidates
            .iter()
            .position(|n| n == "Close")
            .ok_or_else(|| AnalyticsError::MissingColumn("Close".to_string()))?;

        let (_, rows) = frame.complete_rows(&candidates)?;
        if rows.len() < 2 {
            return Err(AnalyticsError::InsufficientData {
                required: 2,
                provided: rows.len(),
            });
        }

        // 마지막 행은 다음날이 없어 라벨이 정의되지 않습니다.
        let n_labeled = rows.len() - 1;
        let labels: Vec<f64> = (0..n_labeled)
            .map(|i| {
                if rows[i + 1][close_idx] > rows[i][close_idx] {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();
        let features: Vec<Vec<f64>> = rows[..n_labeled].to_vec();

        let dataset = Dataset::new(features, labels, candidates)?;
        let mut forest = RandomForest::new(self.params);
        forest.fit(&dataset)?;

        let ranked = forest.ranked_importances();
        if ranked.iter().all(|(_, imp)| *imp == 0.0) {
            return Err(AnalyticsError::CalculationError(
                "피처 중요도를 계산할 수 없습니다".to_string(),
            ));
        }

        let selected: Vec<String> = ranked
            .into_iter()
            .take(self.top_n)
            .map(|(name, _)| name)
            .collect();
        info!(?selected, "피처 선택 완료");
        Ok(selected)
    }
}
