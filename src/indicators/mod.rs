// Indicator engine
// Enriches OHLCV series with the columns the decision oracle sees:
// Bollinger Bands, RSI, MACD, SMA and EMA

pub mod bollinger;
pub mod macd;
pub mod moving_average;
pub mod rsi;

pub use bollinger::calculate_bollinger;
pub use macd::calculate_macd;
pub use moving_average::{calculate_ema, calculate_sma};
pub use rsi::calculate_rsi;

use crate::models::Candle;
use serde::Serialize;

/// A candle plus derived indicator columns
///
/// Columns are None until their lookback window has filled, mirroring the NaN
/// head rows a dataframe-based pipeline would produce.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedCandle {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub bb_mid: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_diff: Option<f64>,
    pub sma_20: Option<f64>,
    pub ema_12: Option<f64>,
}

/// Add indicator columns to an OHLCV series
pub fn enrich(candles: &[Candle]) -> Vec<EnrichedCandle> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let window = &closes[..=i];
            let bands = calculate_bollinger(window, 20, 2.0);
            let macd = calculate_macd(window, 12, 26, 9);

            EnrichedCandle {
                timestamp: c.timestamp,
                open: c.open,
                high: c.high,
                low: c.low,
                close: c.close,
                volume: c.volume,
                bb_mid: bands.map(|b| b.middle),
                bb_upper: bands.map(|b| b.upper),
                bb_lower: bands.map(|b| b.lower),
                rsi: calculate_rsi(window, 14),
                macd: macd.map(|m| m.macd),
                macd_signal: macd.map(|m| m.signal),
                macd_diff: macd.map(|m| m.histogram),
                sma_20: calculate_sma(window, 20),
                ema_12: calculate_ema(window, 12),
            }
        })
        .collect()
}
