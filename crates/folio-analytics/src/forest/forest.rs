//! 랜덤 포레스트.
//!
//! 부트스트랩 샘플로 학습한 결정 트리 앙상블입니다.
//! 시드가 고정되면 학습과 예측이 모두 결정적입니다.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dataset::Dataset;
use super::tree::{DecisionTree, TaskKind, TreeParams};
use crate::error::{AnalyticsError, Result};

/// 포레스트 하이퍼파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForestParams {
    /// 트리 수 (기본: 100)
    pub n_trees: usize,
    /// 트리 최대 깊이 (기본: 10)
    pub max_depth: usize,
    /// 분할 최소 샘플 수 (기본: 2)
    pub min_samples_split: usize,
    /// 리프 최소 샘플 수 (기본: 5)
    pub min_samples_leaf: usize,
    /// 분할마다 고려할 피처 수 (None = sqrt)
    pub max_features: Option<usize>,
    /// 난수 시드 (기본: 42)
    pub seed: u64,
    pub task: TaskKind,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 5,
            max_features: None,
            seed: 42,
            task: TaskKind::Classification,
        }
    }
}

impl ForestParams {
    pub fn classification() -> Self {
        Self::default()
    }

    pub fn regression() -> Self {
        Self {
            task: TaskKind::Regression,
            ..Self::default()
        }
    }
}

/// 랜덤 포레스트 모델.
#[derive(Debug, Clone)]
pub struct RandomForest {
    params: ForestParams,
    trees: Vec<DecisionTree>,
    feature_names: Vec<String>,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
            feature_names: Vec::new(),
            feature_importances: Vec::new(),
        }
    }

    /// 포레스트를 학습합니다.
    pub fn fit(&mut self, dataset: &Dataset) -> Result<()> {
        if dataset.n_samples() == 0 {
            return Err(AnalyticsError::InsufficientData {
                required: 1,
                provided: 0,
            });
        }
        self.feature_names = dataset.feature_names.clone();
        let n_features = dataset.n_features();
        let max_features = self
            .params
            .max_features
            .unwrap_or_else(|| ((n_features as f64).sqrt().ceil() as usize).max(1));

        debug!(
            n_trees = self.params.n_trees,
            n_samples = dataset.n_samples(),
            n_features,
            "포레스트 학습 시작"
        );

        self.trees = (0..self.params.n_trees)
            .map(|i| {
                let tree_params = TreeParams {
                    max_depth: self.params.max_depth,
                    min_samples_split: self.params.min_samples_split,
                    min_samples_leaf: self.params.min_samples_leaf,
                    max_features: Some(max_features),
                    seed: self.params.seed.wrapping_add(i as u64),
                    task: self.params.task,
                };
                let mut tree = DecisionTree::new(tree_params);
                let sample = dataset.bootstrap_sample(self.params.seed.wrapping_add(i as u64));
                tree.fit(&sample);
                tree
            })
            .collect();

        // 트리별 중요도를 합산하고 정규화합니다.
        self.feature_importances = vec![0.0; n_features];
        for tree in &self.trees {
            for (i, &imp) in tree.feature_importances().iter().enumerate() {
                self.feature_importances[i] += imp;
            }
        }
        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }
        Ok(())
    }

    /// 단일 샘플 예측.
    ///
    /// 분류는 다수결(동률은 1), 회귀는 트리 평균입니다.
    pub fn predict_one(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_one(features)).sum();
        let avg = sum / self.trees.len() as f64;
        match self.params.task {
            TaskKind::Classification => {
                if avg >= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            TaskKind::Regression => avg,
        }
    }

    pub fn predict(&self, features: &[Vec<f64>]) -> Vec<f64> {
        features.iter().map(|f| self.predict_one(f)).collect()
    }

    /// 불순도 기반 피처 중요도 (합 = 1).
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// (피처 이름, 중요도) 쌍을 중요도 내림차순으로 반환합니다.
    pub fn ranked_importances(&self) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .feature_names
            .iter()
            .cloned()
            .zip(self.feature_importances.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}
