//! 추세 지표 (Trend Indicators).
//!
//! - EMA (Exponential Moving Average)
//! - MACD (Moving Average Convergence Divergence)
//! - 일간 변화율

use serde::{Deserialize, Serialize};

use super::ewm;
use crate::error::{AnalyticsError, Result};

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// EMA 기간 (기본: 20).
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 EMA 기간 (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// MACD 결과.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdResult {
    /// MACD 라인 (단기 EMA - 장기 EMA).
    pub macd: Option<f64>,
    /// 시그널 라인 (MACD의 EMA).
    pub signal: Option<f64>,
    /// 히스토그램 (MACD - 시그널).
    pub histogram: Option<f64>,
}

/// 추세 지표 계산기.
#[derive(Debug, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    pub fn new() -> Self {
        Self
    }

    /// EMA 계산.
    ///
    /// alpha = 2 / (period + 1) (span 방식)
    pub fn ema(&self, prices: &[f64], params: EmaParams) -> Result<Vec<Option<f64>>> {
        if params.period == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if prices.len() < params.period {
            return Err(AnalyticsError::InsufficientData {
                required: params.period,
                provided: prices.len(),
            });
        }
        let alpha = 2.0 / (params.period as f64 + 1.0);
        Ok(ewm(prices, alpha, params.period))
    }

    /// MACD 계산.
    ///
    /// MACD = EMA(fast) - EMA(slow)
    /// Signal = MACD의 EMA(signal)
    /// Histogram = MACD - Signal
    pub fn macd(&self, prices: &[f64], params: MacdParams) -> Result<Vec<MacdResult>> {
        let required = params.slow_period + params.signal_period;
        if prices.len() < required {
            return Err(AnalyticsError::InsufficientData {
                required,
                provided: prices.len(),
            });
        }

        let fast = self.ema(prices, EmaParams { period: params.fast_period })?;
        let slow = self.ema(prices, EmaParams { period: params.slow_period })?;

        let macd_line: Vec<Option<f64>> = fast
            .iter()
            .zip(slow.iter())
            .map(|(f, s)| match (f, s) {
                (Some(f), Some(s)) => Some(f - s),
                _ => None,
            })
            .collect();

        // 시그널은 MACD가 정의된 구간에서만 계산합니다.
        let first_defined = macd_line.iter().position(|v| v.is_some());
        let mut signal: Vec<Option<f64>> = vec![None; macd_line.len()];
        if let Some(offset) = first_defined {
            let defined: Vec<f64> = macd_line[offset..].iter().filter_map(|v| *v).collect();
            let alpha = 2.0 / (params.signal_period as f64 + 1.0);
            let sig = ewm(&defined, alpha, params.signal_period);
            for (i, v) in sig.into_iter().enumerate() {
                signal[offset + i] = v;
            }
        }

        Ok(macd_line
            .iter()
            .zip(signal.iter())
            .map(|(m, s)| MacdResult {
                macd: *m,
                signal: *s,
                histogram: match (m, s) {
                    (Some(m), Some(s)) => Some(m - s),
                    _ => None,
                },
            })
            .collect())
    }

    /// 일간 변화율 (백분율).
    ///
    /// 첫 행은 비교 대상이 없어 `None`입니다.
    pub fn pct_change(&self, prices: &[f64]) -> Vec<Option<f64>> {
        let mut result = Vec::with_capacity(prices.len());
        for i in 0..prices.len() {
            if i == 0 || prices[i - 1] == 0.0 {
                result.push(None);
            } else {
                result.push(Some((prices[i] - prices[i - 1]) / prices[i - 1] * 100.0));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_warmup_and_value() {
        let prices: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        let ema = TrendIndicators::new()
            .ema(&prices, EmaParams { period: 3 })
            .unwrap();
        assert_eq!(ema[0], None);
        assert_eq!(ema[1], None);
        // 초기값은 앞 3개의 단순 평균
        assert_eq!(ema[2], Some(2.0));
        assert!(ema[9].unwrap() > ema[2].unwrap());
    }

    #[test]
    fn test_macd_insufficient_data() {
        let prices = vec![1.0; 10];
        let err = TrendIndicators::new()
            .macd(&prices, MacdParams::default())
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData { .. }));
    }

    #[test]
    fn test_macd_histogram_consistency() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64).sin() * 5.0 + i as f64).collect();
        let macd = TrendIndicators::new()
            .macd(&prices, MacdParams::default())
            .unwrap();
        let last = macd.last().unwrap();
        let (m, s, h) = (last.macd.unwrap(), last.signal.unwrap(), last.histogram.unwrap());
        assert!((h - (m - s)).abs() < 1e-12);
    }

    #[test]
    fn test_pct_change() {
        let changes = TrendIndicators::new().pct_change(&[100.0, 110.0, 99.0]);
        assert_eq!(changes[0], None);
        assert!((changes[1].unwrap() - 10.0).abs() < 1e-12);
        assert!((changes[2].unwrap() + 10.0).abs() < 1e-12);
    }
}
