use crate::indicators::calculate_sma;

/// Bollinger Band values at a single point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
}

/// Calculate Bollinger Bands (middle SMA +/- `num_std` standard deviations)
pub fn calculate_bollinger(
    prices: &[f64],
    period: usize,
    num_std: f64,
) -> Option<BollingerBands> {
    if prices.len() < period {
        return None;
    }

    let window = &prices[prices.len() - period..];
    let middle = calculate_sma(prices, period)?;

    let variance =
        window.iter().map(|p| (p - middle).powi(2)).sum::<f64>() / period as f64;
    let std_dev = variance.sqrt();

    Some(BollingerBands {
        middle,
        upper: middle + num_std * std_dev,
        lower: middle - num_std * std_dev,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bollinger_constant_prices_collapse() {
        let prices = vec![100.0; 25];
        let bands = calculate_bollinger(&prices, 20, 2.0).unwrap();
        assert_eq!(bands.middle, 100.0);
        assert_eq!(bands.upper, 100.0);
        assert_eq!(bands.lower, 100.0);
    }

    #[test]
    fn test_bollinger_bands_symmetric_around_middle() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + (i % 5) as f64).collect();
        let bands = calculate_bollinger(&prices, 20, 2.0).unwrap();

        assert!(bands.upper > bands.middle);
        assert!(bands.lower < bands.middle);
        let upper_gap = bands.upper - bands.middle;
        let lower_gap = bands.middle - bands.lower;
        assert!((upper_gap - lower_gap).abs() < 1e-9);
    }

    #[test]
    fn test_bollinger_insufficient_data() {
        let prices = vec![100.0; 10];
        assert!(calculate_bollinger(&prices, 20, 2.0).is_none());
    }
}
