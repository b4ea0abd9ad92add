//! 전문가 규칙 기반 가중치 조정.
//!
//! 마코위츠 가중치에 감성 상태(비례)와 예측 방향(절대)을 순서대로
//! 반영한 뒤 절단/정규화합니다. 조정 내역은 사람이 읽는 설명으로
//! 함께 반환합니다.

use folio_core::config::ExpertRules;
use folio_core::types::{Direction, PredictionResult};
use folio_sentiment::SentimentStatus;
use std::collections::HashMap;
use tracing::debug;

/// 조정 결과.
#[derive(Debug, Clone)]
pub struct AdjustedPortfolio {
    /// 이름 -> 최종 가중치 (합 = 1, 모든 원소 >= 0)
    pub final_weights: HashMap<String, f64>,
    /// 적용된 조정 설명
    pub reason: String,
}

fn direction_key(prediction: Option<&PredictionResult>) -> &'static str {
    match prediction.and_then(|p| p.direction) {
        Some(Direction::Up) => "up",
        Some(Direction::Down) => "down",
        None => "neutral",
    }
}

/// 가중치를 조정합니다. 입력 맵은 변경하지 않는 순수 함수입니다.
///
/// 적용 순서:
/// 1. 모든 가중치에 `base_weight` 곱
/// 2. 감성 상태 계수로 `w += w × senti_adj` (비례)
/// 3. 종목별 예측 방향 가산치로 `w += pred_adj` (절대)
/// 4. 음수 절단
/// 5. 합 1 정규화. 전부 0이면 동일 가중 폴백.
pub fn adjust_weights(
    markowitz: &HashMap<String, f64>,
    predictions: &HashMap<String, Option<PredictionResult>>,
    status: SentimentStatus,
    rules: &ExpertRules,
) -> AdjustedPortfolio {
    let mut reason = String::new();
    if markowitz.is_empty() {
        return AdjustedPortfolio {
            final_weights: HashMap::new(),
            reason: "조정할 가중치가 없습니다.".to_string(),
        };
    }

    // 이름 순서를 고정해 설명 문자열을 결정적으로 만듭니다.
    let mut names: Vec<&String> = markowitz.keys().collect();
    names.sort();

    let mut weights: HashMap<String, f64> = markowitz
        .iter()
        .map(|(name, w)| (name.clone(), w * rules.base_weight))
        .collect();
    reason.push_str(&format!(
        "기본 감쇠 계수 {:.2} 적용.",
        rules.base_weight
    ));

    let senti_adj = rules
        .sentiment_map
        .get(status.as_str())
        .copied()
        .unwrap_or(0.0);
    if senti_adj != 0.0 {
        for w in weights.values_mut() {
            *w += *w * senti_adj;
        }
        reason.push_str(&format!(
            " 감성 상태 '{}'로 전 종목 {:+.1}% 비례 조정.",
            status,
            senti_adj * 100.0
        ));
    } else {
        reason.push_str(&format!(" 감성 상태 '{status}'는 조정 없음."));
    }

    for name in &names {
        let key = direction_key(predictions.get(*name).and_then(|p| p.as_ref()));
        let pred_adj = rules.prediction_weights.get(key).copied().unwrap_or(0.0);
        if pred_adj != 0.0 {
            if let Some(w) = weights.get_mut(*name) {
                *w += pred_adj;
            }
            reason.push_str(&format!(" {name}: 예측 '{key}'로 {pred_adj:+.3} 가산."));
        }
    }

    for w in weights.values_mut() {
        *w = w.max(0.0);
    }

    let total: f64 = weights.values().sum();
    if total <= 0.0 {
        let equal = 1.0 / weights.len() as f64;
        for w in weights.values_mut() {
            *w = equal;
        }
        reason.push_str(" 조정 후 총합이 0이 되어 동일 가중으로 폴백했습니다.");
    } else {
        for w in weights.values_mut() {
            *w /= total;
        }
    }

    debug!(?weights, "가중치 조정 완료");
    AdjustedPortfolio {
        final_weights: weights,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::types::PredictionStatus;

    fn prediction(direction: Direction) -> Option<PredictionResult> {
        Some(PredictionResult {
            ticker: "T".to_string(),
            direction: Some(direction),
            predicted_price: 101.0,
            current_price: 100.0,
            features_used: vec![],
            status: PredictionStatus::Ok,
        })
    }

    fn rules() -> ExpertRules {
        ExpertRules::default()
    }

    #[test]
    fn test_symmetric_adjustment_preserved() {
        // 0.5 × 0.9 × 1.05 + 0.05 = 0.5225, 정규화 후 다시 0.5/0.5
        let markowitz: HashMap<String, f64> =
            [("A".to_string(), 0.5), ("B".to_string(), 0.5)].into();
        let predictions: HashMap<String, Option<PredictionResult>> = [
            ("A".to_string(), prediction(Direction::Up)),
            ("B".to_string(), prediction(Direction::Up)),
        ]
        .into();

        let adjusted = adjust_weights(
            &markowitz,
            &predictions,
            SentimentStatus::Aggressive,
            &rules(),
        );
        assert!((adjusted.final_weights["A"] - 0.5).abs() < 1e-9);
        assert!((adjusted.final_weights["B"] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_down_prediction_reduces_weight() {
        let markowitz: HashMap<String, f64> =
            [("A".to_string(), 0.5), ("B".to_string(), 0.5)].into();
        let predictions: HashMap<String, Option<PredictionResult>> = [
            ("A".to_string(), prediction(Direction::Up)),
            ("B".to_string(), prediction(Direction::Down)),
        ]
        .into();

        let adjusted =
            adjust_weights(&markowitz, &predictions, SentimentStatus::Neutral, &rules());
        assert!(adjusted.final_weights["A"] > adjusted.final_weights["B"]);
        let sum: f64 = adjusted.final_weights.values().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_prediction_is_neutral() {
        let markowitz: HashMap<String, f64> =
            [("A".to_string(), 1.0)].into();
        let predictions: HashMap<String, Option<PredictionResult>> =
            [("A".to_string(), None)].into();

        let adjusted =
            adjust_weights(&markowitz, &predictions, SentimentStatus::Neutral, &rules());
        assert!((adjusted.final_weights["A"] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_clipped_falls_back_to_equal() {
        let mut custom = rules();
        custom.prediction_weights.insert("down".to_string(), -10.0);
        let markowitz: HashMap<String, f64> =
            [("A".to_string(), 0.5), ("B".to_string(), 0.5)].into();
        let predictions: HashMap<String, Option<PredictionResult>> = [
            ("A".to_string(), prediction(Direction::Down)),
            ("B".to_string(), prediction(Direction::Down)),
        ]
        .into();

        let adjusted =
            adjust_weights(&markowitz, &predictions, SentimentStatus::Neutral, &custom);
        assert!((adjusted.final_weights["A"] - 0.5).abs() < 1e-9);
        assert!(adjusted.reason.contains("동일 가중"));
    }

    #[test]
    fn test_input_not_mutated() {
        let markowitz: HashMap<String, f64> = [("A".to_string(), 1.0)].into();
        let predictions = HashMap::new();
        let _ = adjust_weights(&markowitz, &predictions, SentimentStatus::Neutral, &rules());
        assert_eq!(markowitz["A"], 1.0);
    }
}
