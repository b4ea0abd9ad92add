//! 번역/분류 서비스 추상화.
//!
//! 외부 텍스트 생성 서비스와 금융 감성 분류 모델을 trait로 추상화해
//! 분석기가 구현체와 독립적으로 동작하게 합니다.

use async_trait::async_trait;
use folio_core::types::SentimentLabel;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// 분류 결과 한 건.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: SentimentLabel,
    /// 선택된 클래스의 확률 (0.0 ~ 1.0)
    pub confidence: f64,
}

impl Classification {
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            confidence: 0.0,
        }
    }
}

/// 배치 번역 서비스.
///
/// 계약: 반환 길이는 입력 길이와 같아야 하며, 실패한 항목은 `None`
/// 입니다. 길이가 다르면 호출자가 배치 전체를 실패로 처리합니다.
#[async_trait]
pub trait TextGenerationService: Send + Sync {
    async fn translate_batch(&self, headlines: &[String]) -> Result<Vec<Option<String>>>;
}

/// 금융 도메인 3클래스 감성 분류 모델.
#[async_trait]
pub trait SentimentClassifierModel: Send + Sync {
    async fn classify_batch(&self, headlines: &[String]) -> Result<Vec<Classification>>;
}

/// 키워드 사전 기반 분류기.
///
/// 외부 모델 없이 동작하는 기본 구현입니다. 영문 금융 헤드라인의
/// 긍정/부정 어휘 출현 수로 라벨을 결정합니다.
#[derive(Debug, Default)]
pub struct LexiconClassifier;

const POSITIVE_WORDS: &[&str] = &[
    "surge", "rally", "gain", "rise", "jump", "beat", "record", "growth", "profit", "upgrade",
    "bullish", "soar", "strong", "outperform", "buy",
];

const NEGATIVE_WORDS: &[&str] = &[
    "fall", "drop", "plunge", "loss", "miss", "decline", "cut", "downgrade", "bearish", "weak",
    "slump", "crash", "sell", "risk", "lawsuit",
];

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    fn classify_one(&self, headline: &str) -> Classification {
        let lower = headline.to_lowercase();
        let positive = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();
        let negative = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();

        let total = positive + negative;
        if total == 0 || positive == negative {
            return Classification {
                label: SentimentLabel::Neutral,
                confidence: 0.5,
            };
        }
        let (label, hits) = if positive > negative {
            (SentimentLabel::Positive, positive)
        } else {
            (SentimentLabel::Negative, negative)
        };
        Classification {
            label,
            confidence: hits as f64 / total as f64,
        }
    }
}

#[async_trait]
impl SentimentClassifierModel for LexiconClassifier {
    async fn classify_batch(&self, headlines: &[String]) -> Result<Vec<Classification>> {
        Ok(headlines.iter().map(|h| self.classify_one(h)).collect())
    }
}

/// 입력을 그대로 돌려주는 번역기.
///
/// 데모 모드나 이미 영문인 데이터셋에서 사용합니다.
#[derive(Debug, Default)]
pub struct IdentityTranslator;

#[async_trait]
impl TextGenerationService for IdentityTranslator {
    async fn translate_batch(&self, headlines: &[String]) -> Result<Vec<Option<String>>> {
        Ok(headlines.iter().cloned().map(Some).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lexicon_labels() {
        let classifier = LexiconClassifier::new();
        let results = classifier
            .classify_batch(&[
                "Shares surge on record profit".to_string(),
                "Stock plunges after earnings miss".to_string(),
                "Company announces annual meeting".to_string(),
            ])
            .await
            .unwrap();
        assert_eq!(results[0].label, SentimentLabel::Positive);
        assert_eq!(results[1].label, SentimentLabel::Negative);
        assert_eq!(results[2].label, SentimentLabel::Neutral);
    }

    #[tokio::test]
    async fn test_identity_translator_same_length() {
        let translator = IdentityTranslator;
        let input = vec!["a".to_string(), "b".to_string()];
        let output = translator.translate_batch(&input).await.unwrap();
        assert_eq!(output.len(), input.len());
        assert_eq!(output[0].as_deref(), Some("a"));
    }
}
