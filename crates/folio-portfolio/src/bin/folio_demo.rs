//! 전체 분석 데모 바이너리.
//!
//! ```bash
//! # 설정 파일과 네이버 API 키를 준비한 뒤 실행
//! FOLIO_CONFIG=config/default.toml \
//! NAVER_CLIENT_ID=... NAVER_CLIENT_SECRET=... \
//! cargo run --bin folio-demo
//! ```
//!
//! 네이버 API 키가 없으면 뉴스 없이(빈 수집기) 실행됩니다.

use anyhow::Context;
use folio_core::config::AnalysisConfig;
use folio_core::logging::init_logging_from_env;
use folio_data::{ExchangeRateClient, PriceSeriesProvider, YahooChartSource};
use folio_data::InMemoryScoreStore;
use folio_portfolio::Orchestrator;
use folio_sentiment::{
    IdentityTranslator, LexiconClassifier, NaverNewsCollector, NewsCollector, SentimentAnalyzer,
    StaticNewsCollector,
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging_from_env().map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {e}"))?;

    let config = match std::env::var("FOLIO_CONFIG") {
        Ok(path) => AnalysisConfig::load(&path)
            .with_context(|| format!("설정 파일 로드 실패: {path}"))?,
        Err(_) => AnalysisConfig::load_default().unwrap_or_else(|e| {
            warn!(error = %e, "설정 로드 실패, 기본값 사용");
            AnalysisConfig::default()
        }),
    };

    let timeout = config.concurrency.request_timeout_secs;
    let source = YahooChartSource::new(timeout).context("가격 데이터 소스 생성 실패")?;
    let provider = Arc::new(PriceSeriesProvider::new(Arc::new(source)));

    let collector: Arc<dyn NewsCollector> = match (
        std::env::var("NAVER_CLIENT_ID"),
        std::env::var("NAVER_CLIENT_SECRET"),
    ) {
        (Ok(id), Ok(secret)) => {
            Arc::new(NaverNewsCollector::new(id, secret, timeout).context("뉴스 수집기 생성 실패")?)
        }
        _ => {
            warn!("NAVER_CLIENT_ID/SECRET 미설정, 뉴스 수집 없이 실행");
            Arc::new(StaticNewsCollector::new(Vec::new()))
        }
    };

    let analyzer = Arc::new(SentimentAnalyzer::new(
        Arc::new(IdentityTranslator),
        Arc::new(LexiconClassifier::new()),
    ));

    let exchange = Arc::new(ExchangeRateClient::new(timeout).context("환율 클라이언트 생성 실패")?);

    let orchestrator = Orchestrator::new(
        config,
        provider,
        collector,
        analyzer,
        Arc::new(InMemoryScoreStore::new()),
    )
    .with_exchange_client(exchange);

    info!("전체 분석 실행");
    let report = orchestrator
        .run_full_analysis()
        .await
        .context("전체 분석 실패")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
