//! 랜덤 포레스트 모듈.
//!
//! 방향 분류와 종가 회귀에 사용하는 고정 시드 CART 앙상블입니다.

pub mod dataset;
#[allow(clippy::module_inception)]
pub mod forest;
pub mod tree;

pub use dataset::Dataset;
pub use forest::{ForestParams, RandomForest};
pub use tree::{DecisionTree, TaskKind, TreeParams};
