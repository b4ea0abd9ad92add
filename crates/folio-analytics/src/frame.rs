//! 지표 프레임.
//!
//! 날짜 인덱스와 이름 있는 컬럼(`Option<f64>`)으로 구성된 표 형태
//! 데이터입니다. 가격 컬럼과 기술적 지표 컬럼을 함께 담습니다.

use chrono::{DateTime, Utc};
use folio_core::types::PriceSeries;

use crate::error::{AnalyticsError, Result};
use crate::indicators::{
    BollingerParams, CciParams, EmaParams, MacdParams, MomentumCalculator, RsiParams,
    StochasticParams, TrendIndicators, VolatilityIndicators, WilliamsRParams,
};

/// 날짜 인덱스 기반 컬럼 테이블.
///
/// 워밍업 등으로 정의되지 않은 셀은 `None`이며, 0으로 대체하지
/// 않습니다. 컬럼 순서는 삽입 순서를 유지합니다.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    dates: Vec<DateTime<Utc>>,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl IndicatorFrame {
    pub fn new(dates: Vec<DateTime<Utc>>) -> Self {
        Self {
            dates,
            columns: Vec::new(),
        }
    }

    pub fn num_rows(&self) -> usize {
        self.dates.len()
    }

    pub fn dates(&self) -> &[DateTime<Utc>] {
        &self.dates
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// 컬럼을 추가합니다. 길이가 다르거나 이름이 중복되면 실패합니다.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<()> {
        let name = name.into();
        if values.len() != self.dates.len() {
            return Err(AnalyticsError::InvalidParameter(format!(
                "컬럼 '{}' 길이 불일치: {} != {}",
                name,
                values.len(),
                self.dates.len()
            )));
        }
        if self.has_column(&name) {
            return Err(AnalyticsError::InvalidParameter(format!(
                "중복 컬럼: {name}"
            )));
        }
        self.columns.push((name, values));
        Ok(())
    }

    /// 지정한 컬럼들이 모두 정의된 행만 골라 (행 인덱스, 피처 행렬)로
    /// 반환합니다. 행렬의 열 순서는 `names` 순서를 따릅니다.
    pub fn complete_rows(&self, names: &[String]) -> Result<(Vec<usize>, Vec<Vec<f64>>)> {
        let mut cols = Vec::with_capacity(names.len());
        for name in names {
            cols.push(
                self.column(name)
                    .ok_or_else(|| AnalyticsError::MissingColumn(name.clone()))?,
            );
        }

        let mut indices = Vec::new();
        let mut rows = Vec::new();
        for i in 0..self.num_rows() {
            let row: Option<Vec<f64>> = cols.iter().map(|c| c[i]).collect();
            if let Some(row) = row {
                indices.push(i);
                rows.push(row);
            }
        }
        Ok((indices, rows))
    }
}

/// 기술적 지표 엔진.
///
/// 가격 시계열에서 모든 예측용 컬럼을 한 번에 계산합니다.
#[derive(Debug, Default)]
pub struct IndicatorEngine {
    trend: TrendIndicators,
    momentum: MomentumCalculator,
    volatility: VolatilityIndicators,
}

/// 계산되는 지표 컬럼 이름 (계산 순서).
pub const INDICATOR_COLUMNS: &[&str] = &[
    "RSI",
    "MACD",
    "MACD_Hist",
    "MACD_Signal",
    "CCI",
    "STOCHk",
    "STOCHd",
    "BB_Percent",
    "WilliamsR",
    "EMA20",
    "EMA50",
    "Change",
];

impl IndicatorEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// 가격 컬럼과 모든 지표 컬럼을 담은 프레임을 생성합니다.
    ///
    /// 시계열이 짧아 특정 지표를 전혀 계산할 수 없으면 해당 컬럼은
    /// 전부 `None`이 됩니다. 빈 시계열은 오류입니다.
    pub fn compute(&self, series: &PriceSeries) -> Result<IndicatorFrame> {
        if series.is_empty() {
            return Err(AnalyticsError::InsufficientData {
                required: 1,
                provided: 0,
            });
        }

        let len = series.len();
        let high = series.highs();
        let low = series.lows();
        let close = series.closes();

        let mut frame = IndicatorFrame::new(series.dates());
        frame.push_column("Open", defined(series.opens()))?;
        frame.push_column("High", defined(high.clone()))?;
        frame.push_column("Low", defined(low.clone()))?;
        frame.push_column("Close", defined(close.clone()))?;
        frame.push_column("Volume", defined(series.volumes()))?;

        frame.push_column(
            "RSI",
            or_undefined(self.momentum.rsi(&close, RsiParams::default()), len)?,
        )?;

        let macd = self.trend.macd(&close, MacdParams::default());
        let (macd_line, macd_hist, macd_signal) = match macd {
            Ok(rows) => (
                rows.iter().map(|r| r.macd).collect(),
                rows.iter().map(|r| r.histogram).collect(),
                rows.iter().map(|r| r.signal).collect(),
            ),
            Err(AnalyticsError::InsufficientData { .. }) => {
                (vec![None; len], vec![None; len], vec![None; len])
            }
            Err(e) => return Err(e),
        };
        frame.push_column("MACD", macd_line)?;
        frame.push_column("MACD_Hist", macd_hist)?;
        frame.push_column("MACD_Signal", macd_signal)?;

        frame.push_column(
            "CCI",
            or_undefined(self.momentum.cci(&high, &low, &close, CciParams::default()), len)?,
        )?;

        let stoch = self
            .momentum
            .stochastic(&high, &low, &close, StochasticParams::default());
        let (stoch_k, stoch_d) = match stoch {
            Ok(rows) => (
                rows.iter().map(|r| r.k).collect(),
                rows.iter().map(|r| r.d).collect(),
            ),
            Err(AnalyticsError::InsufficientData { .. }) => (vec![None; len], vec![None; len]),
            Err(e) => return Err(e),
        };
        frame.push_column("STOCHk", stoch_k)?;
        frame.push_column("STOCHd", stoch_d)?;

        frame.push_column(
            "BB_Percent",
            or_undefined(
                self.volatility.percent_b(&close, BollingerParams::default()),
                len,
            )?,
        )?;
        frame.push_column(
            "WilliamsR",
            or_undefined(
                self.momentum
                    .williams_r(&high, &low, &close, WilliamsRParams::default()),
                len,
            )?,
        )?;
        frame.push_column(
            "EMA20",
            or_undefined(self.trend.ema(&close, EmaParams { period: 20 }), len)?,
        )?;
        frame.push_column(
            "EMA50",
            or_undefined(self.trend.ema(&close, EmaParams { period: 50 }), len)?,
        )?;
        frame.push_column("Change", self.trend.pct_change(&close))?;

        Ok(frame)
    }
}

fn defined(values: Vec<f64>) -> Vec<Option<f64>> {
    values.into_iter().map(Some).collect()
}

fn or_undefined(result: Result<Vec<Option<f64>>>, len: usize) -> Result<Vec<Option<f64>>> {
    match result {
        Ok(values) => Ok(values),
        Err(AnalyticsError::InsufficientData { .. }) => Ok(vec![None; len]),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use folio_core::types::PricePoint;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn sample_series(n: usize) -> PriceSeries {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let points = (0..n)
            .map(|i| {
                let c = 100.0 + (i as f64 * 0.3).sin() * 10.0 + i as f64 * 0.1;
                let close = Decimal::from_f64_retain(c).unwrap();
                PricePoint::new(
                    base + Duration::days(i as i64),
                    close - dec!(1),
                    close + dec!(2),
                    close - dec!(2),
                    close,
                    dec!(10000),
                )
            })
            .collect();
        PriceSeries::from_points("TEST", "USD", points)
    }

    #[test]
    fn test_compute_all_columns_present() {
        let frame = IndicatorEngine::new().compute(&sample_series(120)).unwrap();
        for name in INDICATOR_COLUMNS {
            assert!(frame.has_column(name), "missing column {name}");
        }
        assert_eq!(frame.num_rows(), 120);
        // 워밍업이 끝난 마지막 행은 모든 지표가 정의됩니다.
        for name in INDICATOR_COLUMNS {
            assert!(
                frame.column(name).unwrap().last().unwrap().is_some(),
                "undefined last cell in {name}"
            );
        }
    }

    #[test]
    fn test_warmup_cells_are_none() {
        let frame = IndicatorEngine::new().compute(&sample_series(120)).unwrap();
        assert!(frame.column("RSI").unwrap()[0].is_none());
        assert!(frame.column("EMA50").unwrap()[48].is_none());
        assert!(frame.column("Change").unwrap()[0].is_none());
        assert!(frame.column("Change").unwrap()[1].is_some());
    }

    #[test]
    fn test_short_series_yields_undefined_columns() {
        let frame = IndicatorEngine::new().compute(&sample_series(5)).unwrap();
        assert!(frame.column("RSI").unwrap().iter().all(|v| v.is_none()));
        assert!(frame.column("Close").unwrap().iter().all(|v| v.is_some()));
    }

    #[test]
    fn test_complete_rows_drops_warmup() {
        let frame = IndicatorEngine::new().compute(&sample_series(120)).unwrap();
        let names = vec!["RSI".to_string(), "EMA50".to_string(), "Close".to_string()];
        let (indices, rows) = frame.complete_rows(&names).unwrap();
        assert_eq!(indices.len(), rows.len());
        assert!(indices[0] >= 49);
        assert_eq!(rows[0].len(), 3);
    }

    #[test]
    fn test_deterministic_compute() {
        let series = sample_series(120);
        let engine = IndicatorEngine::new();
        let a = engine.compute(&series).unwrap();
        let b = engine.compute(&series).unwrap();
        assert_eq!(a.column("RSI").unwrap(), b.column("RSI").unwrap());
        assert_eq!(a.column("MACD_Hist").unwrap(), b.column("MACD_Hist").unwrap());
    }
}
