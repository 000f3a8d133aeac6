use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Buy/sell/hold action returned by the decision oracle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::Buy => "buy",
            TradeAction::Sell => "sell",
            TradeAction::Hold => "hold",
        }
    }
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TradeAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "buy" => Ok(TradeAction::Buy),
            "sell" => Ok(TradeAction::Sell),
            "hold" => Ok(TradeAction::Hold),
            other => Err(format!("unknown trade action: {}", other)),
        }
    }
}

/// Validated decision from the oracle
///
/// Invariant: hold carries conviction 0, buy/sell carry conviction 1-100.
/// Enforced at the oracle adapter boundary; code past that point may rely on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    pub action: TradeAction,
    pub conviction: u8,
    pub rationale: String,
}

/// The sole tracked holding; quantity 0 means "no position"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub quantity: f64,
    pub avg_entry_price: f64,
    pub current_price: f64,
}

impl Position {
    /// An empty position for accounts holding no crypto
    pub fn flat(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            quantity: 0.0,
            avg_entry_price: 0.0,
            current_price: 0.0,
        }
    }
}

/// Account state at a point in time; immutable once fetched
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountSnapshot {
    pub cash: f64,
    pub portfolio_value: f64,
    pub position: Position,
}

/// OHLCV candlestick data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// One price level in the order book
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: f64,
    pub size: f64,
}

/// Order book snapshot with best-bid/best-ask accessors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBook {
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

impl OrderBook {
    pub fn best_bid(&self) -> Option<f64> {
        self.bids.first().map(|l| l.price)
    }

    pub fn best_ask(&self) -> Option<f64> {
        self.asks.first().map(|l| l.price)
    }
}

/// News headline used as oracle context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub date: String,
}

/// Fear & Greed sentiment index reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FearGreed {
    pub value: String,
    #[serde(rename = "value_classification")]
    pub classification: String,
}

/// One journal row per completed decision cycle
///
/// `percentage` is the journaled conviction: the decision's conviction when the
/// order genuinely executed (a hold always counts as executed), 0 otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeRecord {
    pub id: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub decision: TradeAction,
    pub percentage: i64,
    pub reason: String,
    pub btc_balance: f64,
    pub usd_balance: f64,
    pub btc_avg_buy_price: f64,
    pub btc_usd_price: f64,
    pub reflection: String,
}

impl TradeRecord {
    /// Total account value at the time of this record
    pub fn total_value(&self) -> f64 {
        self.usd_balance + self.btc_balance * self.btc_usd_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_action_round_trip() {
        for (action, s) in [
            (TradeAction::Buy, "buy"),
            (TradeAction::Sell, "sell"),
            (TradeAction::Hold, "hold"),
        ] {
            assert_eq!(action.as_str(), s);
            assert_eq!(s.parse::<TradeAction>().unwrap(), action);
        }
        assert!("HOLD".parse::<TradeAction>().is_err());
    }

    #[test]
    fn test_flat_position() {
        let position = Position::flat("BTC/USD");
        assert_eq!(position.quantity, 0.0);
        assert_eq!(position.symbol, "BTC/USD");
    }

    #[test]
    fn test_order_book_best_levels() {
        let book = OrderBook {
            bids: vec![
                BookLevel { price: 49995.0, size: 0.5 },
                BookLevel { price: 49990.0, size: 1.2 },
            ],
            asks: vec![
                BookLevel { price: 50005.0, size: 0.3 },
                BookLevel { price: 50010.0, size: 0.8 },
            ],
        };

        assert_eq!(book.best_bid(), Some(49995.0));
        assert_eq!(book.best_ask(), Some(50005.0));

        let empty = OrderBook { bids: vec![], asks: vec![] };
        assert!(empty.best_bid().is_none());
        assert!(empty.best_ask().is_none());
    }

    #[test]
    fn test_trade_record_total_value() {
        let record = TradeRecord {
            id: None,
            timestamp: Utc::now(),
            decision: TradeAction::Buy,
            percentage: 50,
            reason: "test".to_string(),
            btc_balance: 0.5,
            usd_balance: 1000.0,
            btc_avg_buy_price: 48000.0,
            btc_usd_price: 50000.0,
            reflection: String::new(),
        };

        assert_eq!(record.total_value(), 26000.0);
    }
}
