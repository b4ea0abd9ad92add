//! 가격 시계열 타입.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 일봉 가격 데이터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// 거래일 (UTC 자정으로 정규화)
    pub date: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl PricePoint {
    pub fn new(
        date: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            date: normalize_to_utc_midnight(date),
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn close_f64(&self) -> f64 {
        self.close.to_f64().unwrap_or(0.0)
    }
}

/// 날짜를 UTC 자정으로 정규화합니다.
///
/// 서로 다른 소스(타임존 포함/미포함)의 데이터를 날짜 기준으로
/// 병합할 수 있도록 시각 정보를 제거합니다.
pub fn normalize_to_utc_midnight(dt: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(
        &dt.date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid"),
    )
}

/// 단일 종목의 가격 시계열.
///
/// 날짜 오름차순 정렬과 중복 제거(나중 값 우선)가 보장됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// 종목 티커 (예: "005930.KS", "AAPL")
    pub ticker: String,
    /// 통화 코드 (예: "KRW", "USD")
    pub currency: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// 정렬/중복 제거를 적용하여 시계열을 생성합니다.
    ///
    /// 동일 날짜가 여러 번 나타나면 마지막 값을 유지합니다.
    pub fn from_points(
        ticker: impl Into<String>,
        currency: impl Into<String>,
        mut points: Vec<PricePoint>,
    ) -> Self {
        for p in points.iter_mut() {
            p.date = normalize_to_utc_midnight(p.date);
        }
        // 안정 정렬이므로 입력 순서가 보존되고, 역방향 dedup으로 마지막 값이 남습니다.
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for p in points.into_iter().rev() {
            if deduped.last().map(|d: &PricePoint| d.date) != Some(p.date) {
                deduped.push(p);
            }
        }
        deduped.reverse();

        Self {
            ticker: ticker.into(),
            currency: currency.into(),
            points: deduped,
        }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<DateTime<Utc>> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.column(|p| p.open)
    }

    pub fn highs(&self) -> Vec<f64> {
        self.column(|p| p.high)
    }

    pub fn lows(&self) -> Vec<f64> {
        self.column(|p| p.low)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.column(|p| p.close)
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.column(|p| p.volume)
    }

    pub fn last_close(&self) -> Option<f64> {
        self.points.last().map(|p| p.close_f64())
    }

    fn column(&self, f: impl Fn(&PricePoint) -> Decimal) -> Vec<f64> {
        self.points
            .iter()
            .map(|p| f(p).to_f64().unwrap_or(0.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn point(date: DateTime<Utc>, close: Decimal) -> PricePoint {
        PricePoint::new(date, close, close, close, close, dec!(1000))
    }

    #[test]
    fn test_normalize_strips_time() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 45).unwrap();
        let normalized = normalize_to_utc_midnight(dt);
        assert_eq!(normalized, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_series_sorted_and_deduped_keep_last() {
        let d1 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let d2 = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        let points = vec![
            point(d2, dec!(110)),
            point(d1, dec!(100)),
            point(d2, dec!(111)),
        ];
        let series = PriceSeries::from_points("TEST", "USD", points);
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].date, d1);
        assert_eq!(series.points()[1].close, dec!(111));
    }

    #[test]
    fn test_closes_as_f64() {
        let d1 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let series = PriceSeries::from_points("TEST", "KRW", vec![point(d1, dec!(72500))]);
        assert_eq!(series.closes(), vec![72500.0]);
        assert_eq!(series.last_close(), Some(72500.0));
    }
}
