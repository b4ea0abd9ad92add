//! 설정 관리.
//!
//! 이 모듈은 분석 파이프라인의 설정을 정의하고 관리합니다.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// 분석 대상 종목 (이름 -> 티커)
    #[serde(default)]
    pub tickers: HashMap<String, String>,
    /// 모델 설정
    #[serde(default)]
    pub model: ModelConfig,
    /// 전문가 규칙
    #[serde(default)]
    pub expert_rules: ExpertRules,
    /// 동시성 설정
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 모델 학습/예측 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    /// 피처 선택용 조회 기간 (년)
    pub selection_lookback_years: u32,
    /// 예측용 가격 데이터 조회 기간 (년)
    pub prediction_lookback_years: u32,
    /// 선택할 상위 피처 수
    pub top_n_features: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            selection_lookback_years: 3,
            prediction_lookback_years: 1,
            top_n_features: 3,
        }
    }
}

/// 가중치 조정을 위한 전문가 규칙.
///
/// `sentiment_map`은 포트폴리오 감성 상태("aggressive"/"defensive"/"neutral")를
/// 비례 조정 계수로, `prediction_weights`는 예측 방향("up"/"down"/"neutral")을
/// 절대 가산치로 매핑합니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExpertRules {
    /// 기본 감쇠 계수 (0 < base_weight <= 1)
    pub base_weight: f64,
    /// 감성 상태 -> 비례 조정 계수
    #[serde(default)]
    pub sentiment_map: HashMap<String, f64>,
    /// 예측 방향 -> 절대 가산치
    #[serde(default)]
    pub prediction_weights: HashMap<String, f64>,
}

impl Default for ExpertRules {
    fn default() -> Self {
        let mut sentiment_map = HashMap::new();
        sentiment_map.insert("aggressive".to_string(), 0.05);
        sentiment_map.insert("defensive".to_string(), -0.05);
        sentiment_map.insert("neutral".to_string(), 0.0);

        let mut prediction_weights = HashMap::new();
        prediction_weights.insert("up".to_string(), 0.05);
        prediction_weights.insert("down".to_string(), -0.05);
        prediction_weights.insert("neutral".to_string(), 0.0);

        Self {
            base_weight: 0.9,
            sentiment_map,
            prediction_weights,
        }
    }
}

/// 동시성/타임아웃 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConcurrencyConfig {
    /// 동시에 실행할 종목 단위 작업 수
    pub max_concurrent_tasks: usize,
    /// 외부 호출 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 종목당 뉴스 수집 한도
    pub news_limit: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: 5,
            request_timeout_secs: 30,
            news_limit: 30,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("FOLIO")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expert_rules_default() {
        let rules = ExpertRules::default();
        assert_eq!(rules.base_weight, 0.9);
        assert_eq!(rules.sentiment_map.get("aggressive"), Some(&0.05));
        assert_eq!(rules.prediction_weights.get("down"), Some(&-0.05));
    }

    #[test]
    fn test_model_config_default() {
        let model = ModelConfig::default();
        assert_eq!(model.selection_lookback_years, 3);
        assert_eq!(model.top_n_features, 3);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = AnalysisConfig::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed: AnalysisConfig = toml::from_str(&toml).unwrap();
        assert_eq!(
            parsed.concurrency.max_concurrent_tasks,
            config.concurrency.max_concurrent_tasks
        );
    }
}
