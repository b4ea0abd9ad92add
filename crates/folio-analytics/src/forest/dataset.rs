//! 학습 데이터셋.

use crate::error::{AnalyticsError, Result};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// 피처 행렬과 라벨 벡터.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// 피처 행렬 (행 = 샘플, 열 = 피처)
    pub features: Vec<Vec<f64>>,
    /// 라벨 (분류: 0/1, 회귀: 실수값)
    pub labels: Vec<f64>,
    /// 피처 이름 (열 순서와 동일)
    pub feature_names: Vec<String>,
}

impl Dataset {
    pub fn new(
        features: Vec<Vec<f64>>,
        labels: Vec<f64>,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(AnalyticsError::InvalidParameter(format!(
                "피처 행 수({})와 라벨 수({})가 다릅니다",
                features.len(),
                labels.len()
            )));
        }
        if let Some(row) = features.iter().find(|r| r.len() != feature_names.len()) {
            return Err(AnalyticsError::InvalidParameter(format!(
                "피처 열 수({})와 이름 수({})가 다릅니다",
                row.len(),
                feature_names.len()
            )));
        }
        Ok(Self {
            features,
            labels,
            feature_names,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// 복원 추출 부트스트랩 샘플.
    ///
    /// 같은 시드는 항상 같은 샘플을 만듭니다.
    pub fn bootstrap_sample(&self, seed: u64) -> Dataset {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let n = self.n_samples();
        let mut features = Vec::with_capacity(n);
        let mut labels = Vec::with_capacity(n);
        for _ in 0..n {
            let idx = rng.gen_range(0..n);
            features.push(self.features[idx].clone());
            labels.push(self.labels[idx]);
        }
        Dataset {
            features,
            labels,
            feature_names: self.feature_names.clone(),
        }
    }

    /// 앞쪽 `n`개 행으로 구성된 부분 데이터셋.
    pub fn head(&self, n: usize) -> Dataset {
        let n = n.min(self.n_samples());
        Dataset {
            features: self.features[..n].to_vec(),
            labels: self.labels[..n].to_vec(),
            feature_names: self.feature_names.clone(),
        }
    }

    /// `start..end` 행으로 구성된 부분 데이터셋.
    pub fn slice(&self, start: usize, end: usize) -> Dataset {
        let end = end.min(self.n_samples());
        let start = start.min(end);
        Dataset {
            features: self.features[start..end].to_vec(),
            labels: self.labels[start..end].to_vec(),
            feature_names: self.feature_names.clone(),
        }
    }
}
