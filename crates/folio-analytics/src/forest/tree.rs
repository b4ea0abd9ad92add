//! CART 결정 트리.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::dataset::Dataset;

/// 학습 태스크 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    /// 다음날 방향 (0/1) 분류, 지니 불순도
    Classification,
    /// 다음날 종가 회귀, MSE 불순도
    Regression,
}

/// 트리 하이퍼파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// 분할마다 고려할 피처 수 (None = 전체)
    pub max_features: Option<usize>,
    pub seed: u64,
    pub task: TaskKind,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 5,
            max_features: None,
            seed: 42,
            task: TaskKind::Classification,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Node {
    feature_idx: Option<usize>,
    threshold: Option<f64>,
    /// 리프 예측값. 분류는 다수 클래스, 회귀는 평균.
    value: f64,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

impl Node {
    fn leaf(value: f64) -> Self {
        Self {
            feature_idx: None,
            threshold: None,
            value,
            left: None,
            right: None,
        }
    }

}

struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
    /// gain × 노드 샘플 수. 피처 중요도 누적에 사용.
    importance: f64,
}

/// CART 결정 트리.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    params: TreeParams,
    root: Option<Node>,
    feature_importances: Vec<f64>,
}

impl DecisionTree {
    pub fn new(params: TreeParams) -> Self {
        Self {
            params,
            root: None,
            feature_importances: Vec::new(),
        }
    }

    /// 트리를 학습합니다.
    pub fn fit(&mut self, dataset: &Dataset) {
        self.feature_importances = vec![0.0; dataset.n_features()];
        let indices: Vec<usize> = (0..dataset.n_samples()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.params.seed);
        self.root = Some(self.grow(dataset, &indices, 0, &mut rng));

        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }
    }

    fn grow(
        &mut self,
        dataset: &Dataset,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> Node {
        let labels: Vec<f64> = indices.iter().map(|&i| dataset.labels[i]).collect();
        let impurity = self.impurity(&labels);

        if depth >= self.params.max_depth
            || indices.len() < self.params.min_samples_split
            || impurity < 1e-10
        {
            return Node::leaf(self.leaf_value(&labels));
        }

        let Some(split) = self.best_split(dataset, indices, impurity, rng) else {
            return Node::leaf(self.leaf_value(&labels));
        };

        if split.left.len() < self.params.min_samples_leaf
            || split.right.len() < self.params.min_samples_leaf
        {
            return Node::leaf(self.leaf_value(&labels));
        }

        self.feature_importances[split.feature_idx] += split.importance;

        let left = self.grow(dataset, &split.left, depth + 1, rng);
        let right = self.grow(dataset, &split.right, depth + 1, rng);

        Node {
            feature_idx: Some(split.feature_idx),
            threshold: Some(split.threshold),
            value: self.leaf_value(&labels),
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    fn best_split(
        &self,
        dataset: &Dataset,
        indices: &[usize],
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let n_features = dataset.n_features();
        let max_features = self.params.max_features.unwrap_or(n_features);

        let mut feature_indices: Vec<usize> = (0..n_features).collect();
        feature_indices.shuffle(rng);
        feature_indices.truncate(max_features);

        let mut best_gain = 0.0;
        let mut best: Option<SplitCandidate> = None;

        for &feature_idx in &feature_indices {
            let mut values: Vec<f64> = indices
                .iter()
                .map(|&i| dataset.features[i][feature_idx])
                .collect();
            values.sort_by(|a, b| a.total_cmp(b));
            values.dedup();

            // 인접 고유값의 중점을 임계값 후보로 사용합니다.
            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;
                let (left, right): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| dataset.features[i][feature_idx] <= threshold);
                if left.is_empty() || right.is_empty() {
                    continue;
                }

                let left_labels: Vec<f64> = left.iter().map(|&i| dataset.labels[i]).collect();
                let right_labels: Vec<f64> = right.iter().map(|&i| dataset.labels[i]).collect();
                let n_left = left.len() as f64;
                let n_right = right.len() as f64;
                let weighted = (n_left * self.impurity(&left_labels)
                    + n_right * self.impurity(&right_labels))
                    / (n_left + n_right);
                let gain = parent_impurity - weighted;

                if gain > best_gain {
                    best_gain = gain;
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold,
                        importance: gain * indices.len() as f64,
                        left,
                        right,
                    });
                }
            }
        }

        best
    }

    fn impurity(&self, labels: &[f64]) -> f64 {
        match self.params.task {
            TaskKind::Classification => gini(labels),
            TaskKind::Regression => mse(labels),
        }
    }

    fn leaf_value(&self, labels: &[f64]) -> f64 {
        match self.params.task {
            TaskKind::Classification => {
                let positives = labels.iter().filter(|&&l| l > 0.5).count();
                if positives * 2 >= labels.len() {
                    1.0
                } else {
                    0.0
                }
            }
            TaskKind::Regression => mean(labels),
        }
    }

    /// 단일 샘플 예측.
    pub fn predict_one(&self, features: &[f64]) -> f64 {
        let Some(mut node) = self.root.as_ref() else {
            return 0.0;
        };
        loop {
            // 내부 노드는 분할 정보와 양쪽 자식을 항상 가집니다.
            let (Some(idx), Some(threshold), Some(left), Some(right)) = (
                node.feature_idx,
                node.threshold,
                node.left.as_deref(),
                node.right.as_deref(),
            ) else {
                return node.value;
            };
            node = if features.get(idx).copied().unwrap_or(0.0) <= threshold {
                left
            } else {
                right
            };
        }
    }

    /// 불순도 기반 피처 중요도 (합 = 1, 학습 전이면 빈 슬라이스).
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn mse(labels: &[f64]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let m = mean(labels);
    labels.iter().map(|l| (l - m).powi(2)).sum::<f64>() / labels.len() as f64
}

fn gini(labels: &[f64]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let p = labels.iter().filter(|&&l| l > 0.5).count() as f64 / labels.len() as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    fn separable() -> Result<Dataset> {
        // x < 5 -> 0, x >= 5 -> 1
        Dataset::new(
            (0..20).map(|i| vec![i as f64, 0.0]).collect(),
            (0..20).map(|i| if i < 10 { 0.0 } else { 1.0 }).collect(),
            vec!["x".to_string(), "noise".to_string()],
        )
    }

    #[test]
    fn test_classification_learns_threshold() {
        let dataset = separable().unwrap();
        let mut tree = DecisionTree::new(TreeParams {
            min_samples_leaf: 1,
            ..Default::default()
        });
        tree.fit(&dataset);
        assert_eq!(tree.predict_one(&[2.0, 0.0]), 0.0);
        assert_eq!(tree.predict_one(&[15.0, 0.0]), 1.0);
    }

    #[test]
    fn test_importance_on_informative_feature() {
        let dataset = separable().unwrap();
        let mut tree = DecisionTree::new(TreeParams {
            min_samples_leaf: 1,
            ..Default::default()
        });
        tree.fit(&dataset);
        let imp = tree.feature_importances();
        assert!(imp[0] > imp[1]);
        assert!((imp.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_regression_predicts_mean() {
        let dataset = Dataset::new(
            (0..10).map(|i| vec![i as f64]).collect(),
            (0..10).map(|i| if i < 5 { 10.0 } else { 20.0 }).collect(),
            vec!["x".to_string()],
        )
        .unwrap();
        let mut tree = DecisionTree::new(TreeParams {
            task: TaskKind::Regression,
            min_samples_leaf: 1,
            ..Default::default()
        });
        tree.fit(&dataset);
        assert!((tree.predict_one(&[1.0]) - 10.0).abs() < 1e-9);
        assert!((tree.predict_one(&[9.0]) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic_fit() {
        let dataset = separable().unwrap();
        let mut a = DecisionTree::new(TreeParams::default());
        let mut b = DecisionTree::new(TreeParams::default());
        a.fit(&dataset);
        b.fit(&dataset);
        assert_eq!(a.feature_importances(), b.feature_importances());
        assert_eq!(a.predict_one(&[7.0, 0.0]), b.predict_one(&[7.0, 0.0]));
    }
}
