//! 변동성 지표 (Volatility Indicators).
//!
//! - Bollinger %B: 밴드 내 상대 위치

use serde::{Deserialize, Serialize};

use super::sma;
use crate::error::{AnalyticsError, Result};

/// 볼린저 밴드 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerParams {
    /// 이동평균 기간 (기본: 20).
    pub period: usize,
    /// 표준편차 배수 (기본: 2.0).
    pub std_dev: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev: 2.0,
        }
    }
}

/// 변동성 지표 계산기.
#[derive(Debug, Default)]
pub struct VolatilityIndicators;

impl VolatilityIndicators {
    pub fn new() -> Self {
        Self
    }

    /// Bollinger %B 계산.
    ///
    /// %B = (종가 - 하단 밴드) / (상단 밴드 - 하단 밴드)
    ///
    /// 밴드 안에서 0~1, 밴드를 벗어나면 범위 밖 값이 나옵니다.
    pub fn percent_b(&self, prices: &[f64], params: BollingerParams) -> Result<Vec<Option<f64>>> {
        if params.period < 2 {
            return Err(AnalyticsError::InvalidParameter(
                "기간은 2 이상이어야 합니다".to_string(),
            ));
        }
        if prices.len() < params.period {
            return Err(AnalyticsError::InsufficientData {
                required: params.period,
                provided: prices.len(),
            });
        }

        let mid = sma(prices, params.period);
        let mut result = Vec::with_capacity(prices.len());
        for i in 0..prices.len() {
            let Some(mean) = mid[i] else {
                result.push(None);
                continue;
            };
            let start = i + 1 - params.period;
            // 표본 표준편차 (ddof = 1)
            let var = prices[start..=i]
                .iter()
                .map(|v| (v - mean).powi(2))
                .sum::<f64>()
                / (params.period - 1) as f64;
            let band = params.std_dev * var.sqrt();
            if band == 0.0 {
                result.push(Some(0.5));
            } else {
                let lower = mean - band;
                let upper = mean + band;
                result.push(Some((prices[i] - lower) / (upper - lower)));
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_b_flat_is_midpoint() {
        let flat = vec![100.0; 25];
        let pb = VolatilityIndicators::new()
            .percent_b(&flat, BollingerParams::default())
            .unwrap();
        assert_eq!(pb[18], None);
        assert_eq!(pb[19], Some(0.5));
    }

    #[test]
    fn test_percent_b_rising_above_mid() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let pb = VolatilityIndicators::new()
            .percent_b(&prices, BollingerParams::default())
            .unwrap();
        // 추세 상승 시 종가는 밴드 상단 쪽
        assert!(pb.last().copied().flatten().unwrap() > 0.5);
    }
}
