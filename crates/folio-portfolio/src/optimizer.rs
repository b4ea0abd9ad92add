//! 마코위츠 포트폴리오 최적화.
//!
//! 일간 수익률의 평균 벡터와 표본 공분산으로 최대 샤프 비율
//! 가중치를 경사 상승 + 제약 투영으로 구합니다. 계산이 실패하면
//! 동일 가중으로 폴백하고 그 사실을 결과에 남깁니다.

use folio_data::AlignedCloses;
use ndarray::{Array1, Array2};
use std::collections::HashMap;
use tracing::{debug, warn};

/// 이 값보다 작은 가중치는 0으로 정리합니다.
const CLEAN_THRESHOLD: f64 = 1e-4;

/// 최적화 결과.
#[derive(Debug, Clone)]
pub struct MarkowitzResult {
    /// 티커 -> 가중치 (합 = 1, 모든 원소 >= 0)
    pub weights: HashMap<String, f64>,
    /// 동일 가중 폴백 여부
    pub fallback: bool,
}

/// 평균-분산 최적화기.
#[derive(Debug, Clone, Copy)]
pub struct PortfolioOptimizer {
    risk_free_rate: f64,
    max_iterations: usize,
    learning_rate: f64,
}

impl Default for PortfolioOptimizer {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            max_iterations: 1000,
            learning_rate: 0.01,
        }
    }
}

impl PortfolioOptimizer {
    pub fn new(risk_free_rate: f64) -> Self {
        Self {
            risk_free_rate,
            ..Self::default()
        }
    }

    /// 최대 샤프 가중치를 계산합니다.
    ///
    /// 자산 0개는 빈 맵, 1개는 가중치 1.0입니다. 2개 이상에서
    /// 수익률 계산이 불가능하거나 해가 발산하면 동일 가중 폴백입니다.
    pub fn optimize(&self, aligned: &AlignedCloses) -> MarkowitzResult {
        let n = aligned.tickers.len();
        if n == 0 {
            return MarkowitzResult {
                weights: HashMap::new(),
                fallback: false,
            };
        }
        if n == 1 {
            let mut weights = HashMap::new();
            weights.insert(aligned.tickers[0].clone(), 1.0);
            return MarkowitzResult {
                weights,
                fallback: false,
            };
        }

        match self.max_sharpe(aligned) {
            Some(weights) => MarkowitzResult {
                weights: aligned
                    .tickers
                    .iter()
                    .cloned()
                    .zip(weights)
                    .collect(),
                fallback: false,
            },
            None => {
                warn!(assets = n, "최적화 실패, 동일 가중 폴백");
                self.equal_weights(aligned)
            }
        }
    }

    /// 동일 가중 포트폴리오.
    pub fn equal_weights(&self, aligned: &AlignedCloses) -> MarkowitzResult {
        let n = aligned.tickers.len();
        let w = if n > 0 { 1.0 / n as f64 } else { 0.0 };
        MarkowitzResult {
            weights: aligned.tickers.iter().map(|t| (t.clone(), w)).collect(),
            fallback: true,
        }
    }

    fn max_sharpe(&self, aligned: &AlignedCloses) -> Option<Vec<f64>> {
        let n = aligned.tickers.len();
        let rows = aligned.num_rows();
        if rows < 3 {
            return None;
        }

        // 일간 수익률 행렬 (rows-1 x n)
        let mut returns = Array2::<f64>::zeros((rows - 1, n));
        for (j, column) in aligned.columns.iter().enumerate() {
            for i in 1..rows {
                let prev = column[i - 1];
                if prev == 0.0 || !prev.is_finite() {
                    return None;
                }
                returns[[i - 1, j]] = column[i] / prev - 1.0;
            }
        }

        let mean = returns.mean_axis(ndarray::Axis(0))?;
        let covariance = sample_covariance(&returns)?;

        // 동일 가중에서 시작하는 경사 상승
        let mut weights = Array1::from_elem(n, 1.0 / n as f64);
        for _ in 0..self.max_iterations {
            let port_return = weights.dot(&mean);
            let port_variance = weights.dot(&covariance.dot(&weights));
            if !port_variance.is_finite() || port_variance < 1e-18 {
                return None;
            }
            let port_vol = port_variance.sqrt();

            let excess = port_return - self.risk_free_rate;
            let grad_vol = covariance.dot(&weights) / port_vol;
            let grad_sharpe = (&mean * port_vol - &grad_vol * excess) / port_variance;

            weights = &weights + &(grad_sharpe * self.learning_rate);
            weights = project_long_only(&weights)?;
        }

        if weights.iter().any(|w| !w.is_finite()) {
            return None;
        }

        let cleaned = clean_weights(weights.to_vec())?;
        debug!(?cleaned, "최대 샤프 가중치");
        Some(cleaned)
    }
}

/// 표본 공분산 행렬 (ddof = 1).
fn sample_covariance(returns: &Array2<f64>) -> Option<Array2<f64>> {
    let rows = returns.nrows();
    let n = returns.ncols();
    if rows < 2 {
        return None;
    }
    let mean = returns.mean_axis(ndarray::Axis(0))?;
    let mut cov = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in i..n {
            let mut sum = 0.0;
            for r in 0..rows {
                sum += (returns[[r, i]] - mean[i]) * (returns[[r, j]] - mean[j]);
            }
            let value = sum / (rows - 1) as f64;
            if !value.is_finite() {
                return None;
            }
            cov[[i, j]] = value;
            cov[[j, i]] = value;
        }
    }
    Some(cov)
}

/// 음수 절단 후 합 1 정규화.
fn project_long_only(weights: &Array1<f64>) -> Option<Array1<f64>> {
    let mut projected = weights.mapv(|w| w.max(0.0));
    let sum: f64 = projected.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return None;
    }
    projected /= sum;
    Some(projected)
}

/// 미세 가중치를 0으로 정리하고 다시 정규화합니다.
fn clean_weights(weights: Vec<f64>) -> Option<Vec<f64>> {
    let mut cleaned: Vec<f64> = weights
        .into_iter()
        .map(|w| if w < CLEAN_THRESHOLD { 0.0 } else { w })
        .collect();
    let sum: f64 = cleaned.iter().sum();
    if sum <= 0.0 {
        return None;
    }
    for w in &mut cleaned {
        *w /= sum;
    }
    Some(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn aligned(tickers: &[&str], columns: Vec<Vec<f64>>) -> AlignedCloses {
        let rows = columns.first().map(|c| c.len()).unwrap_or(0);
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        AlignedCloses {
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
            dates: (0..rows).map(|i| base + Duration::days(i as i64)).collect(),
            columns,
        }
    }

    fn series(n: usize, drift: f64, wobble: f64) -> Vec<f64> {
        let mut price = 100.0;
        (0..n)
            .map(|i| {
                price *= 1.0 + drift + (i as f64 * 0.9).sin() * wobble;
                price
            })
            .collect()
    }

    #[test]
    fn test_empty_and_single_asset() {
        let empty = PortfolioOptimizer::default().optimize(&aligned(&[], vec![]));
        assert!(empty.weights.is_empty());
        assert!(!empty.fallback);

        let single =
            PortfolioOptimizer::default().optimize(&aligned(&["A"], vec![series(30, 0.001, 0.01)]));
        assert_eq!(single.weights.get("A"), Some(&1.0));
    }

    #[test]
    fn test_weights_sum_to_one_nonnegative() {
        let result = PortfolioOptimizer::default().optimize(&aligned(
            &["A", "B", "C"],
            vec![
                series(60, 0.002, 0.01),
                series(60, 0.0005, 0.02),
                series(60, 0.001, 0.015),
            ],
        ));
        let sum: f64 = result.weights.values().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(result.weights.values().all(|w| *w >= 0.0));
    }

    #[test]
    fn test_fallback_on_degenerate_data() {
        // 0 가격은 수익률 계산이 불가능합니다.
        let result = PortfolioOptimizer::default().optimize(&aligned(
            &["A", "B", "C"],
            vec![vec![0.0; 30], series(30, 0.001, 0.01), series(30, 0.001, 0.02)],
        ));
        assert!(result.fallback);
        for w in result.weights.values() {
            assert!((w - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_higher_return_gets_more_weight() {
        let result = PortfolioOptimizer::default().optimize(&aligned(
            &["GOOD", "BAD"],
            vec![series(120, 0.003, 0.005), series(120, -0.001, 0.005)],
        ));
        assert!(!result.fallback);
        let good = result.weights["GOOD"];
        let bad = result.weights["BAD"];
        assert!(good > bad);
    }
}
