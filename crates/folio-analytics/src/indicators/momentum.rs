//! 모멘텀 지표 (Momentum Indicators).
//!
//! 가격 모멘텀과 과매수/과매도 상태를 측정하는 지표들을 제공합니다.
//! - RSI (Relative Strength Index)
//! - Stochastic Oscillator (smoothed %K/%D)
//! - CCI (Commodity Channel Index)
//! - Williams %R

use serde::{Deserialize, Serialize};

use super::{ewm, sma, sma_opt};
use crate::error::{AnalyticsError, Result};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 스토캐스틱 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StochasticParams {
    /// %K 기간 (기본: 14).
    pub k_period: usize,
    /// %K 스무딩 기간 (기본: 3).
    pub smooth_k: usize,
    /// %D 기간 (기본: 3).
    pub d_period: usize,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            k_period: 14,
            smooth_k: 3,
            d_period: 3,
        }
    }
}

/// 스토캐스틱 결과.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StochasticResult {
    /// 스무딩된 %K.
    pub k: Option<f64>,
    /// %D (%K의 이동평균).
    pub d: Option<f64>,
}

/// CCI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CciParams {
    /// CCI 기간 (기본: 20).
    pub period: usize,
    /// 스케일 상수 (기본: 0.015).
    pub constant: f64,
}

impl Default for CciParams {
    fn default() -> Self {
        Self {
            period: 20,
            constant: 0.015,
        }
    }
}

/// Williams %R 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WilliamsRParams {
    /// 기간 (기본: 14).
    pub period: usize,
}

impl Default for WilliamsRParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// RSI = 100 - (100 / (1 + RS))
    /// RS = 평균 상승폭 / 평균 하락폭
    ///
    /// 평균은 com = (period - 1)의 EWM, 즉 alpha = 1 / period입니다.
    pub fn rsi(&self, prices: &[f64], params: RsiParams) -> Result<Vec<Option<f64>>> {
        let period = params.period;
        if period == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if prices.len() < period + 1 {
            return Err(AnalyticsError::InsufficientData {
                required: period + 1,
                provided: prices.len(),
            });
        }

        let mut gains = Vec::with_capacity(prices.len());
        let mut losses = Vec::with_capacity(prices.len());
        gains.push(0.0);
        losses.push(0.0);
        for i in 1..prices.len() {
            let delta = prices[i] - prices[i - 1];
            gains.push(delta.max(0.0));
            losses.push((-delta).max(0.0));
        }

        let alpha = 1.0 / period as f64;
        let avg_gains = ewm(&gains, alpha, period);
        let avg_losses = ewm(&losses, alpha, period);

        Ok(avg_gains
            .iter()
            .zip(avg_losses.iter())
            .map(|pair| match pair {
                (Some(gain), Some(loss)) => {
                    if *loss == 0.0 {
                        Some(100.0)
                    } else {
                        let rs = gain / loss;
                        Some(100.0 - 100.0 / (1.0 + rs))
                    }
                }
                _ => None,
            })
            .collect())
    }

    /// 스토캐스틱 오실레이터 계산.
    ///
    /// fast %K = (종가 - 최저가) / (최고가 - 최저가) × 100
    /// %K = fast %K의 SMA(smooth_k)
    /// %D = %K의 SMA(d_period)
    pub fn stochastic(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: StochasticParams,
    ) -> Result<Vec<StochasticResult>> {
        let len = high.len().min(low.len()).min(close.len());
        if len < params.k_period {
            return Err(AnalyticsError::InsufficientData {
                required: params.k_period,
                provided: len,
            });
        }

        let mut fast_k: Vec<Option<f64>> = Vec::with_capacity(len);
        for i in 0..len {
            if i + 1 < params.k_period {
                fast_k.push(None);
                continue;
            }
            let start = i + 1 - params.k_period;
            let highest = high[start..=i].iter().copied().fold(f64::MIN, f64::max);
            let lowest = low[start..=i].iter().copied().fold(f64::MAX, f64::min);
            let range = highest - lowest;
            if range == 0.0 {
                // 범위가 0이면 중립값
                fast_k.push(Some(50.0));
            } else {
                fast_k.push(Some((close[i] - lowest) / range * 100.0));
            }
        }

        let k = sma_opt(&fast_k, params.smooth_k);
        let d = sma_opt(&k, params.d_period);

        Ok(k.iter()
            .zip(d.iter())
            .map(|(k, d)| StochasticResult { k: *k, d: *d })
            .collect())
    }

    /// CCI (Commodity Channel Index) 계산.
    ///
    /// TP = (H + L + C) / 3
    /// CCI = (TP - SMA(TP)) / (constant × 평균절대편차)
    pub fn cci(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: CciParams,
    ) -> Result<Vec<Option<f64>>> {
        let len = high.len().min(low.len()).min(close.len());
        if len < params.period {
            return Err(AnalyticsError::InsufficientData {
                required: params.period,
                provided: len,
            });
        }

        let tp: Vec<f64> = (0..len)
            .map(|i| (high[i] + low[i] + close[i]) / 3.0)
            .collect();
        let tp_sma = sma(&tp, params.period);

        let mut result = Vec::with_capacity(len);
        for i in 0..len {
            let Some(mean) = tp_sma[i] else {
                result.push(None);
                continue;
            };
            let start = i + 1 - params.period;
            let mad = tp[start..=i]
                .iter()
                .map(|v| (v - mean).abs())
                .sum::<f64>()
                / params.period as f64;
            if mad == 0.0 {
                result.push(Some(0.0));
            } else {
                result.push(Some((tp[i] - mean) / (params.constant * mad)));
            }
        }
        Ok(result)
    }

    /// Williams %R 계산.
    ///
    /// %R = (최고가 - 종가) / (최고가 - 최저가) × -100, 범위 [-100, 0]
    pub fn williams_r(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: WilliamsRParams,
    ) -> Result<Vec<Option<f64>>> {
        let len = high.len().min(low.len()).min(close.len());
        if len < params.period {
            return Err(AnalyticsError::InsufficientData {
                required: params.period,
                provided: len,
            });
        }

        let mut result = Vec::with_capacity(len);
        for i in 0..len {
            if i + 1 < params.period {
                result.push(None);
                continue;
            }
            let start = i + 1 - params.period;
            let highest = high[start..=i].iter().copied().fold(f64::MIN, f64::max);
            let lowest = low[start..=i].iter().copied().fold(f64::MAX, f64::min);
            let range = highest - lowest;
            if range == 0.0 {
                result.push(Some(-50.0));
            } else {
                result.push(Some((highest - close[i]) / range * -100.0));
            }
        }
        Ok(result)
    }
}
