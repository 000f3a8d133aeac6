// Market context aggregator
// Collects everything the oracle sees into one cycle-scoped bundle. Individual
// fetch failures degrade to "no data" with a warning; nothing here aborts the
// cycle.

use crate::api::{AlpacaClient, FearGreedClient, NewsClient};
use crate::indicators::{enrich, EnrichedCandle};
use crate::models::{FearGreed, Headline, OrderBook};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Opaque producer of a base64-encoded chart screenshot
///
/// Browser-based capture is an external collaborator; plug one in when
/// available, run without it otherwise.
#[async_trait]
pub trait ChartSource: Send + Sync {
    async fn capture(&self) -> Result<String>;
}

/// Read-only context bundle assembled fresh each cycle; never persisted
#[derive(Debug, Clone)]
pub struct MarketContext {
    pub daily: Vec<EnrichedCandle>,
    pub hourly: Vec<EnrichedCandle>,
    pub order_book: Option<OrderBook>,
    pub sentiment: Option<FearGreed>,
    pub headlines: Vec<Headline>,
    pub chart_image: Option<String>,
    /// Advisory text from the performance reflector, filled after assembly
    pub reflection: String,
}

impl MarketContext {
    pub fn empty() -> Self {
        Self {
            daily: Vec::new(),
            hourly: Vec::new(),
            order_book: None,
            sentiment: None,
            headlines: Vec::new(),
            chart_image: None,
            reflection: String::new(),
        }
    }
}

pub struct ContextAggregator {
    broker: AlpacaClient,
    feargreed: FearGreedClient,
    news: NewsClient,
    chart: Option<Arc<dyn ChartSource>>,
}

impl ContextAggregator {
    pub fn new(broker: AlpacaClient, feargreed: FearGreedClient, news: NewsClient) -> Self {
        Self {
            broker,
            feargreed,
            news,
            chart: None,
        }
    }

    pub fn with_chart_source(mut self, chart: Arc<dyn ChartSource>) -> Self {
        self.chart = Some(chart);
        self
    }

    /// Assemble a fresh context bundle
    pub async fn assemble(&self) -> MarketContext {
        let daily = match self.broker.daily_bars().await {
            Ok(candles) => enrich(&candles),
            Err(e) => {
                tracing::warn!("Failed to fetch daily bars: {}", e);
                Vec::new()
            }
        };

        let hourly = match self.broker.hourly_bars().await {
            Ok(candles) => enrich(&candles),
            Err(e) => {
                tracing::warn!("Failed to fetch hourly bars: {}", e);
                Vec::new()
            }
        };

        let order_book = match self.broker.order_book().await {
            Ok(book) => Some(book),
            Err(e) => {
                tracing::warn!("Failed to fetch order book: {}", e);
                None
            }
        };

        let sentiment = match self.feargreed.fetch().await {
            Ok(index) => Some(index),
            Err(e) => {
                tracing::warn!("Failed to fetch Fear & Greed index: {}", e);
                None
            }
        };

        let headlines = match self.news.headlines().await {
            Ok(headlines) => headlines,
            Err(e) => {
                tracing::warn!("Failed to fetch headlines: {}", e);
                Vec::new()
            }
        };

        let chart_image = match &self.chart {
            Some(source) => match source.capture().await {
                Ok(image) => Some(image),
                Err(e) => {
                    tracing::warn!("Failed to capture chart image: {}", e);
                    None
                }
            },
            None => None,
        };

        MarketContext {
            daily,
            hourly,
            order_book,
            sentiment,
            headlines,
            chart_image,
            reflection: String::new(),
        }
    }
}
