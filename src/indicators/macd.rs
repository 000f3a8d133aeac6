use crate::indicators::calculate_sma;

/// MACD values at a single point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macd {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Calculate MACD (fast EMA minus slow EMA, with an EMA signal line)
///
/// Standard parameters are 12/26/9. Needs `slow + signal` prices before the
/// signal line is defined.
pub fn calculate_macd(
    prices: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Option<Macd> {
    if prices.len() < slow + signal_period {
        return None;
    }

    let fast_series = ema_series(prices, fast)?;
    let slow_series = ema_series(prices, slow)?;

    // MACD line exists once both EMAs do; align the tails
    let len = fast_series.len().min(slow_series.len());
    let macd_series: Vec<f64> = fast_series[fast_series.len() - len..]
        .iter()
        .zip(&slow_series[slow_series.len() - len..])
        .map(|(f, s)| f - s)
        .collect();

    let signal_series = ema_series(&macd_series, signal_period)?;

    let macd = *macd_series.last()?;
    let signal = *signal_series.last()?;

    Some(Macd {
        macd,
        signal,
        histogram: macd - signal,
    })
}

/// EMA value at every index where the window has filled
fn ema_series(prices: &[f64], period: usize) -> Option<Vec<f64>> {
    if prices.len() < period {
        return None;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut ema = calculate_sma(&prices[..period], period)?;
    let mut series = vec![ema];

    for price in &prices[period..] {
        ema = (price - ema) * multiplier + ema;
        series.push(ema);
    }

    Some(series)
}
