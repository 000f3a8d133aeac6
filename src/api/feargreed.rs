use crate::models::FearGreed;
use crate::Result;
use reqwest::Client;
use serde::Deserialize;

const FNG_API_URL: &str = "https://api.alternative.me/fng/";

/// Client for the alternative.me Fear & Greed index
#[derive(Clone)]
pub struct FearGreedClient {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct FngResponse {
    data: Vec<FearGreed>,
}

impl FearGreedClient {
    pub fn new() -> Self {
        Self::with_url(FNG_API_URL.to_string())
    }

    pub fn with_url(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }

    /// Fetch the latest index reading
    pub async fn fetch(&self) -> Result<FearGreed> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(format!("Fear & Greed API error: {}", response.status()).into());
        }

        let data: FngResponse = response.json().await?;
        data.data
            .into_iter()
            .next()
            .ok_or_else(|| "Fear & Greed API returned no data".into())
    }
}

impl Default for FearGreedClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_parses_latest_reading() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("GET", "/")
            .with_body(
                r#"{"data": [{"value": "72", "value_classification": "Greed", "timestamp": "1735689600"}]}"#,
            )
            .create_async()
            .await;

        let client = FearGreedClient::with_url(format!("{}/", server.url()));
        let index = client.fetch().await.unwrap();

        assert_eq!(index.value, "72");
        assert_eq!(index.classification, "Greed");
    }

    #[tokio::test]
    async fn test_fetch_empty_data_is_error() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("GET", "/")
            .with_body(r#"{"data": []}"#)
            .create_async()
            .await;

        let client = FearGreedClient::with_url(format!("{}/", server.url()));
        assert!(client.fetch().await.is_err());
    }
}
