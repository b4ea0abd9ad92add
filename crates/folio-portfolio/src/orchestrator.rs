//! 전체 분석 오케스트레이터.
//!
//! 환율 조회, 뉴스 수집/감성 분석, 종목별 예측, 마코위츠 최적화,
//! 전문가 규칙 조정을 묶어 최종 페이로드를 만듭니다. 종목 단위
//! 작업은 세마포어로 동시성을 제한한 fan-out/fan-in으로 실행하며,
//! 한 종목의 실패가 다른 종목이나 전체 결과를 중단시키지 않습니다.

use chrono_tz::Asia::Seoul;
use folio_analytics::{PredictionEngine, MIN_PREDICTION_ROWS};
use folio_core::config::AnalysisConfig;
use folio_core::types::{NewsArticle, PredictionResult, PredictionStatus};
use folio_data::{
    align_closes, ExchangeRateClient, PriceSeriesProvider, SentimentScoreStore, DEFAULT_USD_KRW,
};
use folio_sentiment::{NewsCollector, SentimentAnalyzer};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::adjustment::adjust_weights;
use crate::error::Result;
use crate::optimizer::PortfolioOptimizer;
use crate::report::{AnalysisReport, FinalPortfolio, MarkowitzPortfolio, ModelPrediction};

/// 최적화에 필요한 최소 가격 행 수.
pub const MIN_OPTIMIZATION_ROWS: usize = 20;

/// 분석 오케스트레이터.
pub struct Orchestrator {
    config: AnalysisConfig,
    provider: Arc<PriceSeriesProvider>,
    collector: Arc<dyn NewsCollector>,
    analyzer: Arc<SentimentAnalyzer>,
    score_store: Arc<dyn SentimentScoreStore>,
    exchange: Option<Arc<ExchangeRateClient>>,
    prediction_engine: Arc<PredictionEngine>,
    optimizer: PortfolioOptimizer,
}

impl Orchestrator {
    pub fn new(
        config: AnalysisConfig,
        provider: Arc<PriceSeriesProvider>,
        collector: Arc<dyn NewsCollector>,
        analyzer: Arc<SentimentAnalyzer>,
        score_store: Arc<dyn SentimentScoreStore>,
    ) -> Self {
        let prediction_engine = Arc::new(PredictionEngine::new(config.model.top_n_features));
        Self {
            config,
            provider,
            collector,
            analyzer,
            score_store,
            exchange: None,
            prediction_engine,
            optimizer: PortfolioOptimizer::default(),
        }
    }

    /// 환율 클라이언트를 연결합니다. 없으면 기본 환율을 사용합니다.
    pub fn with_exchange_client(mut self, client: Arc<ExchangeRateClient>) -> Self {
        self.exchange = Some(client);
        self
    }

    /// 전체 포트폴리오 분석을 실행합니다.
    pub async fn run_full_analysis(&self) -> Result<AnalysisReport> {
        // 이름 순서를 고정해 로그와 결과를 결정적으로 만듭니다.
        let mut targets: Vec<(String, String)> = self
            .config
            .tickers
            .iter()
            .map(|(name, ticker)| (name.clone(), ticker.clone()))
            .collect();
        targets.sort();
        info!(assets = targets.len(), "전체 포트폴리오 분석 시작");

        let exchange_rate = match &self.exchange {
            Some(client) => client.usd_krw_or_default().await,
            None => DEFAULT_USD_KRW,
        };

        let sentiment_analysis = self.collect_and_analyze_news(&targets).await;

        let semaphore = Arc::new(Semaphore::new(
            self.config.concurrency.max_concurrent_tasks.max(1),
        ));

        // 종목별 예측 fan-out
        let prediction_futures = targets.iter().map(|(name, ticker)| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire().await;
                (name.clone(), self.predict_one(ticker).await)
            }
        });
        let individual: HashMap<String, Option<PredictionResult>> =
            join_all(prediction_futures).await.into_iter().collect();

        // 최적화용 가격 fan-out
        let price_futures = targets.iter().map(|(name, ticker)| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire().await;
                let fetched = self
                    .provider
                    .fetch_years(
                        ticker,
                        self.config.model.prediction_lookback_years,
                        MIN_OPTIMIZATION_ROWS,
                    )
                    .await;
                (name.clone(), fetched)
            }
        });
        let mut optimization_series = Vec::new();
        for (name, fetched) in join_all(price_futures).await {
            match fetched {
                Ok(mut series) => {
                    // 가중치 키를 종목 이름으로 통일합니다.
                    series.ticker = name;
                    optimization_series.push(series);
                }
                Err(e) => {
                    warn!(name = %name, error = %e, "최적화용 가격 데이터 제외");
                }
            }
        }

        let aligned = align_closes(&optimization_series);
        let markowitz = self.optimizer.optimize(&aligned);

        let adjusted = adjust_weights(
            &markowitz.weights,
            &individual,
            sentiment_analysis.status,
            &self.config.expert_rules,
        );

        info!(
            assets = aligned.tickers.len(),
            fallback = markowitz.fallback,
            "전체 포트폴리오 분석 완료"
        );

        Ok(AnalysisReport {
            exchange_rate,
            model_prediction: ModelPrediction { individual },
            sentiment_analysis,
            markowitz_portfolio: MarkowitzPortfolio {
                weights: markowitz.weights,
            },
            final_portfolio: FinalPortfolio {
                final_weights: adjusted.final_weights,
                reason: adjusted.reason,
            },
        })
    }

    /// 종목별 뉴스를 모아 포트폴리오 수준으로 한 번에 분석하고,
    /// 기사 라벨을 일별 점수 저장소에 적재합니다.
    async fn collect_and_analyze_news(
        &self,
        targets: &[(String, String)],
    ) -> folio_sentiment::SentimentReport {
        let semaphore = Arc::new(Semaphore::new(
            self.config.concurrency.max_concurrent_tasks.max(1),
        ));
        let limit = self.config.concurrency.news_limit;

        let news_futures = targets.iter().map(|(name, ticker)| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire().await;
                match self.collector.search(name, limit).await {
                    Ok(articles) => (ticker.clone(), articles),
                    Err(e) => {
                        warn!(name = %name, error = %e, "뉴스 수집 실패, 빈 목록 사용");
                        (ticker.clone(), Vec::new())
                    }
                }
            }
        });
        let per_ticker: Vec<(String, Vec<NewsArticle>)> = join_all(news_futures).await;

        // 링크 기준 전역 중복 제거. 같은 기사가 여러 종목 검색에 걸려도
        // 분석과 집계는 한 번만 하고, 적재는 걸린 종목마다 수행합니다.
        let mut combined: Vec<NewsArticle> = Vec::new();
        let mut index_by_link: HashMap<String, usize> = HashMap::new();
        let mut spans: Vec<(String, Vec<usize>)> = Vec::new();
        for (ticker, articles) in per_ticker {
            let mut indices = Vec::with_capacity(articles.len());
            for article in articles {
                let idx = *index_by_link
                    .entry(article.link.clone())
                    .or_insert_with(|| {
                        combined.push(article);
                        combined.len() - 1
                    });
                indices.push(idx);
            }
            spans.push((ticker, indices));
        }

        let report = self.analyzer.analyze(&combined, "포트폴리오").await;

        // 일별 점수 저장소 적재 (KST 기준 날짜)
        for (ticker, indices) in spans {
            for idx in indices {
                let article = &report.analyzed_articles[idx];
                let Some(label) = article.sentiment else {
                    continue;
                };
                let date = article.published_at.with_timezone(&Seoul).date_naive();
                if let Err(e) = self.score_store.record_label(&ticker, date, label).await {
                    warn!(ticker = %ticker, error = %e, "감성 점수 기록 실패");
                }
            }
        }

        report
    }

    /// 단일 종목 예측. 실패는 상태가 기록된 빈 결과로 강등됩니다.
    async fn predict_one(&self, ticker: &str) -> Option<PredictionResult> {
        let selection = self
            .provider
            .fetch_years(
                ticker,
                self.config.model.selection_lookback_years,
                MIN_PREDICTION_ROWS,
            )
            .await;
        let series = self
            .provider
            .fetch_years(
                ticker,
                self.config.model.prediction_lookback_years,
                MIN_PREDICTION_ROWS,
            )
            .await;

        let (selection, series) = match (selection, series) {
            (Ok(selection), Ok(series)) => (selection, series),
            (selection, series) => {
                let error = selection.err().or(series.err());
                warn!(ticker, error = ?error, "가격 데이터 없음");
                return Some(PredictionResult::empty(
                    ticker,
                    PredictionStatus::PriceDataUnavailable,
                ));
            }
        };

        let scores = match self.score_store.daily_scores(ticker).await {
            Ok(scores) => scores,
            Err(e) => {
                warn!(ticker, error = %e, "일별 점수 조회 실패, 감성 없이 진행");
                Vec::new()
            }
        };

        Some(
            self.prediction_engine
                .predict(ticker, &selection, &series, &scores),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use folio_core::types::{PricePoint, PriceSeries};
    use folio_data::{InMemoryScoreStore, MockPriceDataSource};
    use folio_sentiment::{IdentityTranslator, LexiconClassifier, StaticNewsCollector};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn sample_series(ticker: &str, n: usize, drift: f64) -> PriceSeries {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut price = 100.0;
        let points = (0..n)
            .map(|i| {
                price *= 1.0 + drift + (i as f64 * 0.5).sin() * 0.01;
                let close = Decimal::from_f64_retain(price).unwrap();
                PricePoint::new(
                    base + Duration::days(i as i64),
                    close - dec!(1),
                    close + dec!(1),
                    close - dec!(1),
                    close,
                    dec!(10000),
                )
            })
            .collect();
        PriceSeries::from_points(ticker, "USD", points)
    }

    fn orchestrator() -> Orchestrator {
        let mut config = AnalysisConfig::default();
        config.tickers.insert("알파".to_string(), "AAA".to_string());
        config.tickers.insert("베타".to_string(), "BBB".to_string());

        let source = MockPriceDataSource::new();
        source.insert(sample_series("AAA", 300, 0.001));
        source.insert(sample_series("BBB", 300, -0.0005));
        let provider = Arc::new(PriceSeriesProvider::new(Arc::new(source)));

        let articles = vec![
            NewsArticle::new(
                "Shares surge on record profit",
                "https://example.com/1",
                "test",
                Utc::now(),
            ),
            NewsArticle::new(
                "Quarterly filing published",
                "https://example.com/2",
                "test",
                Utc::now(),
            ),
        ];

        let analyzer = Arc::new(SentimentAnalyzer::new(
            Arc::new(IdentityTranslator),
            Arc::new(LexiconClassifier::new()),
        ));

        Orchestrator::new(
            config,
            provider,
            Arc::new(StaticNewsCollector::new(articles)),
            analyzer,
            Arc::new(InMemoryScoreStore::new()),
        )
    }

    #[tokio::test]
    async fn test_full_analysis_weight_invariants() {
        let report = orchestrator().run_full_analysis().await.unwrap();

        assert_eq!(report.exchange_rate, DEFAULT_USD_KRW);
        assert_eq!(report.model_prediction.individual.len(), 2);
        for prediction in report.model_prediction.individual.values() {
            assert!(prediction.is_some());
        }

        let sum: f64 = report.final_portfolio.final_weights.values().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(report.final_portfolio.final_weights.values().all(|w| *w >= 0.0));
        assert!(report.markowitz_portfolio.weights.contains_key("알파"));
    }

    #[tokio::test]
    async fn test_shared_article_analyzed_once() {
        let mut config = AnalysisConfig::default();
        config.tickers.insert("알파".to_string(), "AAA".to_string());
        config.tickers.insert("베타".to_string(), "BBB".to_string());

        let source = MockPriceDataSource::new();
        source.insert(sample_series("AAA", 300, 0.001));
        source.insert(sample_series("BBB", 300, -0.0005));
        let provider = Arc::new(PriceSeriesProvider::new(Arc::new(source)));

        // 두 종목 검색에 같은 링크의 기사가 모두 걸리는 상황
        let shared = NewsArticle::new(
            "Shares surge on record profit",
            "https://example.com/shared",
            "test",
            Utc::now(),
        );
        let analyzer = Arc::new(SentimentAnalyzer::new(
            Arc::new(IdentityTranslator),
            Arc::new(LexiconClassifier::new()),
        ));
        let orchestrator = Orchestrator::new(
            config,
            provider,
            Arc::new(StaticNewsCollector::new(vec![shared])),
            analyzer,
            Arc::new(InMemoryScoreStore::new()),
        );

        let report = orchestrator.run_full_analysis().await.unwrap();

        // 링크 중복 제거로 기사는 한 번만 분석/집계됩니다.
        let summary = &report.sentiment_analysis.summary;
        assert_eq!(summary.total, 1);
        assert_eq!(summary.positive, 1);
        assert_eq!(report.sentiment_analysis.sentiment_score, 1.0);
    }

    #[tokio::test]
    async fn test_missing_price_data_degrades_single_asset() {
        let mut config = AnalysisConfig::default();
        config.tickers.insert("알파".to_string(), "AAA".to_string());
        config.tickers.insert("유령".to_string(), "ZZZ".to_string());

        let source = MockPriceDataSource::new();
        source.insert(sample_series("AAA", 300, 0.001));
        let provider = Arc::new(PriceSeriesProvider::new(Arc::new(source)));

        let analyzer = Arc::new(SentimentAnalyzer::new(
            Arc::new(IdentityTranslator),
            Arc::new(LexiconClassifier::new()),
        ));
        let orchestrator = Orchestrator::new(
            config,
            provider,
            Arc::new(StaticNewsCollector::new(vec![])),
            analyzer,
            Arc::new(InMemoryScoreStore::new()),
        );

        let report = orchestrator.run_full_analysis().await.unwrap();
        let ghost = report.model_prediction.individual["유령"]
            .as_ref()
            .unwrap();
        assert_eq!(ghost.status, PredictionStatus::PriceDataUnavailable);

        // 가격이 있는 종목만 가중치에 남습니다.
        assert_eq!(report.markowitz_portfolio.weights.len(), 1);
        let sum: f64 = report.final_portfolio.final_weights.values().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }
}
