use crate::config::AlpacaConfig;
use crate::execution::{OrderRequest, OrderSizing};
use crate::models::{AccountSnapshot, BookLevel, Candle, OrderBook, Position};
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

/// Client for the Alpaca-style brokerage REST API
///
/// Every request carries the fixed API-key header pair from process
/// configuration. The brokerage is an opaque balance/position/order service;
/// nothing here retries.
#[derive(Clone)]
pub struct AlpacaClient {
    client: Client,
    config: AlpacaConfig,
    symbol: String,
}

// ============== Response Types ==============

#[derive(Debug, Deserialize)]
struct RawAccount {
    cash: String,
    portfolio_value: String,
}

#[derive(Debug, Deserialize)]
struct RawPosition {
    symbol: String,
    qty: String,
    avg_entry_price: String,
    current_price: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawBar {
    t: DateTime<Utc>,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: f64,
}

#[derive(Debug, Deserialize)]
struct BarsResponse {
    #[serde(default)]
    bars: HashMap<String, Vec<RawBar>>,
}

#[derive(Debug, Deserialize)]
struct RawBookLevel {
    p: f64,
    s: f64,
}

#[derive(Debug, Deserialize)]
struct RawOrderBook {
    #[serde(default)]
    b: Vec<RawBookLevel>,
    #[serde(default)]
    a: Vec<RawBookLevel>,
}

#[derive(Debug, Deserialize)]
struct OrderBookResponse {
    #[serde(default)]
    orderbooks: HashMap<String, RawOrderBook>,
}

// ============== Implementation ==============

impl AlpacaClient {
    pub fn new(config: AlpacaConfig, symbol: String) -> Self {
        Self {
            client: Client::new(),
            config,
            symbol,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("accept", "application/json")
            .header("APCA-API-KEY-ID", &self.config.api_key_id)
            .header("APCA-API-SECRET-KEY", &self.config.api_secret_key)
    }

    /// Fetch cash, portfolio value and the tracked position in one snapshot
    ///
    /// An account holding no crypto gets a flat position; the positions
    /// endpoint reports symbols without the slash ("BTCUSD").
    pub async fn account_snapshot(&self) -> Result<AccountSnapshot> {
        let response = self.get(&self.config.account_url).send().await?;
        if !response.status().is_success() {
            return Err(format!("Alpaca account error: {}", response.status()).into());
        }
        let account: RawAccount = response.json().await?;

        let response = self.get(&self.config.positions_url).send().await?;
        if !response.status().is_success() {
            return Err(format!("Alpaca positions error: {}", response.status()).into());
        }
        let positions: Vec<RawPosition> = response.json().await?;

        let bare_symbol = self.symbol.replace('/', "");
        let position = match positions.iter().find(|p| p.symbol == bare_symbol) {
            Some(raw) => Position {
                symbol: self.symbol.clone(),
                quantity: raw.qty.parse()?,
                avg_entry_price: raw.avg_entry_price.parse()?,
                current_price: raw.current_price.parse()?,
            },
            None => Position::flat(&self.symbol),
        };

        Ok(AccountSnapshot {
            cash: account.cash.parse()?,
            portfolio_value: account.portfolio_value.parse()?,
            position,
        })
    }

    /// Fetch the current order book snapshot for the tracked symbol
    pub async fn order_book(&self) -> Result<OrderBook> {
        let response = self.get(&self.config.orderbook_url).send().await?;
        if !response.status().is_success() {
            return Err(format!("Alpaca orderbook error: {}", response.status()).into());
        }

        let data: OrderBookResponse = response.json().await?;
        let raw = data
            .orderbooks
            .get(&self.symbol)
            .ok_or_else(|| format!("no order book returned for {}", self.symbol))?;

        Ok(OrderBook {
            bids: raw.b.iter().map(|l| BookLevel { price: l.p, size: l.s }).collect(),
            asks: raw.a.iter().map(|l| BookLevel { price: l.p, size: l.s }).collect(),
        })
    }

    /// 30-day window of daily candles
    pub async fn daily_bars(&self) -> Result<Vec<Candle>> {
        let end = Utc::now();
        let start = end - Duration::days(30);
        self.bars("1D", start, end).await
    }

    /// 24-hour window of hourly candles
    pub async fn hourly_bars(&self) -> Result<Vec<Candle>> {
        let end = Utc::now();
        let start = end - Duration::hours(24);
        self.bars("1H", start, end).await
    }

    async fn bars(
        &self,
        timeframe: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>> {
        let response = self
            .get(&self.config.data_url)
            .query(&[
                ("symbols", self.symbol.as_str()),
                ("timeframe", timeframe),
                ("start", &start.to_rfc3339()),
                ("end", &end.to_rfc3339()),
                ("limit", "1000"),
                ("sort", "asc"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(format!("Alpaca bars error: {}", response.status()).into());
        }

        let data: BarsResponse = response.json().await?;
        let bars = data.bars.get(&self.symbol).cloned().unwrap_or_default();

        Ok(bars
            .into_iter()
            .map(|b| Candle {
                timestamp: b.t,
                open: b.o,
                high: b.h,
                low: b.l,
                close: b.c,
                volume: b.v,
            })
            .collect())
    }

    /// Submit a market order; returns the brokerage acknowledgment text
    pub async fn submit_order(&self, order: &OrderRequest) -> Result<String> {
        let mut payload = serde_json::json!({
            "side": order.side.as_str(),
            "type": "market",
            "time_in_force": "ioc",
            "symbol": order.symbol,
        });

        match order.sizing {
            OrderSizing::Notional(amount) => {
                payload["notional"] = serde_json::Value::String(amount.to_string());
            }
            OrderSizing::Quantity(qty) => {
                payload["qty"] = serde_json::Value::String(qty.to_string());
            }
        }

        let response = self
            .client
            .post(&self.config.order_url)
            .header("accept", "application/json")
            .header("APCA-API-KEY-ID", &self.config.api_key_id)
            .header("APCA-API-SECRET-KEY", &self.config.api_secret_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Alpaca order error {}: {}", status, body).into());
        }

        Ok(response.text().await?)
    }
}
