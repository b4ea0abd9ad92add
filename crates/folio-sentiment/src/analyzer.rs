//! 뉴스 감성 분석기.
//!
//! 다국어 헤드라인을 언어별로 나눠 국문은 배치 번역 후, 영문은
//! 그대로 금융 감성 분류기에 넣고 결과를 원래 순서로 재조립합니다.
//! 개별 기사나 배치의 실패는 전체 분석을 중단시키지 않고 중립으로
//! 강등되어 카운터에 기록됩니다.

use folio_core::types::{NewsArticle, SentimentLabel};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::language::split_by_language;
use crate::services::{Classification, SentimentClassifierModel, TextGenerationService};

/// 번역 배치 최대 크기.
pub const TRANSLATION_BATCH_SIZE: usize = 20;

/// 이 값을 넘으면 긍정적 전망, 음수로 넘으면 부정적 전망입니다.
pub const STATUS_THRESHOLD: f64 = 0.1;

/// 포트폴리오 수준 감성 상태.
///
/// `ExpertRules::sentiment_map`의 키로 사용됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentStatus {
    /// 긍정 전망, 적극 투자
    Aggressive,
    /// 부정 전망, 방어적 접근
    Defensive,
    Neutral,
}

impl SentimentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aggressive => "aggressive",
            Self::Defensive => "defensive",
            Self::Neutral => "neutral",
        }
    }

    pub fn from_score(score: f64) -> Self {
        if score > STATUS_THRESHOLD {
            Self::Aggressive
        } else if score < -STATUS_THRESHOLD {
            Self::Defensive
        } else {
            Self::Neutral
        }
    }
}

impl fmt::Display for SentimentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 라벨별 집계.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

/// 분석 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentReport {
    pub status: SentimentStatus,
    /// (긍정 - 부정) / 전체, 범위 [-1, 1]
    pub sentiment_score: f64,
    pub summary: SentimentSummary,
    /// 입력과 같은 순서/길이의 분석된 기사
    pub analyzed_articles: Vec<NewsArticle>,
    /// 번역 실패로 중립 처리된 기사 수
    pub translation_failed: usize,
    /// 분류 실패/누락으로 중립 처리된 기사 수
    pub analysis_failed: usize,
    /// 사람이 읽는 전망 설명
    pub outlook: String,
}

/// 감성 분석기.
pub struct SentimentAnalyzer {
    translator: Arc<dyn TextGenerationService>,
    classifier: Arc<dyn SentimentClassifierModel>,
    batch_size: usize,
}

impl SentimentAnalyzer {
    pub fn new(
        translator: Arc<dyn TextGenerationService>,
        classifier: Arc<dyn SentimentClassifierModel>,
    ) -> Self {
        Self {
            translator,
            classifier,
            batch_size: TRANSLATION_BATCH_SIZE,
        }
    }

    /// 기사 목록을 분석합니다.
    ///
    /// 출력 기사 수는 항상 입력 기사 수와 같습니다.
    pub async fn analyze(&self, articles: &[NewsArticle], entity: &str) -> SentimentReport {
        let headlines: Vec<String> = articles.iter().map(|a| a.headline.clone()).collect();
        let n = headlines.len();
        let mut results: Vec<Option<Classification>> = vec![None; n];
        let mut translation_failed = 0usize;
        let mut analysis_failed = 0usize;

        // 1단계: 언어별 분리
        let split = split_by_language(&headlines);

        // 2단계: 국문 헤드라인 배치 번역 (순차 발행)
        let mut to_classify: Vec<(usize, String)> = split.foreign.clone();
        for batch in split.korean.chunks(self.batch_size) {
            let inputs: Vec<String> = batch.iter().map(|(_, h)| h.clone()).collect();
            let translated = match self.translator.translate_batch(&inputs).await {
                Ok(out) if out.len() == inputs.len() => out,
                Ok(out) => {
                    warn!(
                        expected = inputs.len(),
                        got = out.len(),
                        "번역 응답 길이 불일치, 배치 전체 실패 처리"
                    );
                    vec![None; inputs.len()]
                }
                Err(e) => {
                    warn!(error = %e, batch = inputs.len(), "번역 배치 실패");
                    vec![None; inputs.len()]
                }
            };
            for ((idx, _), translation) in batch.iter().zip(translated) {
                match translation {
                    Some(text) => to_classify.push((*idx, text)),
                    None => {
                        // 번역 실패는 중립으로 강등합니다.
                        results[*idx] = Some(Classification::neutral());
                        translation_failed += 1;
                    }
                }
            }
        }

        // 3단계: 한 번의 배치 분류
        if !to_classify.is_empty() {
            let texts: Vec<String> = to_classify.iter().map(|(_, t)| t.clone()).collect();
            match self.classifier.classify_batch(&texts).await {
                Ok(classified) if classified.len() == texts.len() => {
                    // 4단계: 원래 위치로 재조립
                    for ((idx, _), result) in to_classify.iter().zip(classified) {
                        results[*idx] = Some(result);
                    }
                }
                Ok(classified) => {
                    warn!(
                        expected = texts.len(),
                        got = classified.len(),
                        "분류 응답 길이 불일치"
                    );
                }
                Err(e) => {
                    warn!(error = %e, "감성 분류 실패");
                }
            }
        }

        // 채워지지 않은 위치는 중립으로 강등합니다.
        let final_results: Vec<Classification> = results
            .into_iter()
            .map(|r| {
                r.unwrap_or_else(|| {
                    analysis_failed += 1;
                    Classification::neutral()
                })
            })
            .collect();

        // 5단계: 집계
        let mut summary = SentimentSummary {
            total: n,
            ..Default::default()
        };
        let analyzed_articles: Vec<NewsArticle> = articles
            .iter()
            .zip(final_results.iter())
            .map(|(article, result)| {
                match result.label {
                    SentimentLabel::Positive => summary.positive += 1,
                    SentimentLabel::Negative => summary.negative += 1,
                    SentimentLabel::Neutral => summary.neutral += 1,
                }
                let mut article = article.clone();
                article.sentiment = Some(result.label);
                article.confidence = Some(result.confidence);
                article
            })
            .collect();

        let sentiment_score = if n == 0 {
            0.0
        } else {
            (summary.positive as f64 - summary.negative as f64) / n as f64
        };
        let status = SentimentStatus::from_score(sentiment_score);
        let outlook = build_outlook(
            entity,
            status,
            &summary,
            translation_failed,
            analysis_failed,
        );

        info!(
            entity,
            total = n,
            score = sentiment_score,
            %status,
            translation_failed,
            analysis_failed,
            "감성 분석 완료"
        );

        SentimentReport {
            status,
            sentiment_score,
            summary,
            analyzed_articles,
            translation_failed,
            analysis_failed,
            outlook,
        }
    }
}

fn build_outlook(
    entity: &str,
    status: SentimentStatus,
    summary: &SentimentSummary,
    translation_failed: usize,
    analysis_failed: usize,
) -> String {
    let mut outlook = format!(
        "{entity} 관련 뉴스 {}건 분석: 긍정 {}건, 부정 {}건, 중립 {}건.",
        summary.total, summary.positive, summary.negative, summary.neutral
    );
    let advice = match status {
        SentimentStatus::Aggressive => " 긍정적 전망으로 적극 투자를 고려합니다.",
        SentimentStatus::Defensive => " 부정적 전망으로 방어적 접근을 권장합니다.",
        SentimentStatus::Neutral => " 중립적 전망입니다.",
    };
    outlook.push_str(advice);
    if translation_failed > 0 {
        outlook.push_str(&format!(" 번역 실패 {translation_failed}건은 중립 처리했습니다."));
    }
    if analysis_failed > 0 {
        outlook.push_str(&format!(" 분석 누락 {analysis_failed}건은 중립 처리했습니다."));
    }
    outlook
}
