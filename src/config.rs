use crate::Result;

const DEFAULT_DATA_URL: &str = "https://data.alpaca.markets/v1beta3/crypto/us/bars";
const DEFAULT_DATABASE_PATH: &str = "bitcoin_trades.db";

/// Brokerage endpoints and credentials
#[derive(Debug, Clone)]
pub struct AlpacaConfig {
    pub account_url: String,
    pub positions_url: String,
    pub orderbook_url: String,
    pub order_url: String,
    pub data_url: String,
    pub api_key_id: String,
    pub api_secret_key: String,
}

/// Process configuration, read from the environment once at startup
///
/// Every required variable is validated here so a misconfigured process fails
/// before the first network call.
#[derive(Debug, Clone)]
pub struct Config {
    pub alpaca: AlpacaConfig,
    pub openai_api_key: String,
    pub serpapi_api_key: String,
    pub database_path: String,
    pub symbol: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            alpaca: AlpacaConfig {
                account_url: require("BASE_URL")?,
                positions_url: require("POS_URL")?,
                orderbook_url: require("ORDERBOOK_URL")?,
                order_url: require("ORDER_URL")?,
                data_url: std::env::var("DATA_URL")
                    .unwrap_or_else(|_| DEFAULT_DATA_URL.to_string()),
                api_key_id: require("APCA_API_KEY_ID")?,
                api_secret_key: require("APCA_API_SECRET_KEY")?,
            },
            openai_api_key: require("OPENAI_API_KEY")?,
            serpapi_api_key: require("SERPAPI_API_KEY")?,
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string()),
            symbol: std::env::var("SYMBOL").unwrap_or_else(|_| "BTC/USD".to_string()),
        })
    }
}

fn require(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| format!("{} not found in environment", name).into())
}
