//! 기술적 지표 모듈.
//!
//! 예측 피처로 사용되는 기술적 지표를 제공합니다.
//!
//! ## 추세 지표 (Trend Indicators)
//! - **EMA**: 지수 이동평균
//! - **MACD**: 이동평균 수렴/확산
//!
//! ## 모멘텀 지표 (Momentum Indicators)
//! - **RSI**: 상대강도지수
//! - **Stochastic**: 스토캐스틱 오실레이터
//! - **CCI**: 상품 채널 지수
//! - **Williams %R**
//!
//! ## 변동성 지표 (Volatility Indicators)
//! - **Bollinger %B**: 밴드 내 상대 위치
//!
//! 모든 지표는 워밍업 구간을 `None`으로 표현합니다. 값이 정의되지
//! 않은 셀을 0으로 채우지 않습니다.

pub mod momentum;
pub mod trend;
pub mod volatility;

pub use momentum::{
    CciParams, MomentumCalculator, RsiParams, StochasticParams, StochasticResult, WilliamsRParams,
};
pub use trend::{EmaParams, MacdParams, MacdResult, TrendIndicators};
pub use volatility::{BollingerParams, VolatilityIndicators};

/// EWM (지수 가중 이동평균) 계산.
///
/// `min_periods` 이전은 `None`이며, 초기값은 앞쪽 `min_periods`개의
/// 단순 평균으로 시작합니다.
pub(crate) fn ewm(values: &[f64], alpha: f64, min_periods: usize) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(values.len());
    if values.is_empty() {
        return result;
    }

    let mut current = values[0];
    for (i, &v) in values.iter().enumerate() {
        if min_periods > 0 && i < min_periods - 1 {
            result.push(None);
            if i > 0 {
                current = v * alpha + current * (1.0 - alpha);
            }
        } else if min_periods > 0 && i == min_periods - 1 {
            let sum: f64 = values[..=i].iter().sum();
            current = sum / (i + 1) as f64;
            result.push(Some(current));
        } else {
            current = v * alpha + current * (1.0 - alpha);
            result.push(Some(current));
        }
    }
    result
}

/// 단순 이동평균. 워밍업 구간은 `None`.
pub(crate) fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for i in 0..values.len() {
        sum += values[i];
        if i >= period {
            sum -= values[i - period];
        }
        if i + 1 >= period {
            result.push(Some(sum / period as f64));
        } else {
            result.push(None);
        }
    }
    result
}

/// `Option` 시퀀스의 이동평균 (정의된 값만 평균).
pub(crate) fn sma_opt(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if i + 1 < period {
            result.push(None);
            continue;
        }
        let window = &values[i + 1 - period..=i];
        let defined: Vec<f64> = window.iter().filter_map(|v| *v).collect();
        if defined.len() == period {
            result.push(Some(defined.iter().sum::<f64>() / period as f64));
        } else {
            result.push(None);
        }
    }
    result
}
