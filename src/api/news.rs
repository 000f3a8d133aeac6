use crate::models::Headline;
use crate::Result;
use reqwest::Client;
use serde::Deserialize;

const SERPAPI_URL: &str = "https://serpapi.com/search.json";
const MAX_HEADLINES: usize = 5;

/// Client for Bitcoin headlines via the SerpAPI Google News engine
#[derive(Clone)]
pub struct NewsClient {
    client: Client,
    url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    news_results: Vec<NewsResult>,
}

#[derive(Debug, Deserialize)]
struct NewsResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    date: String,
}

impl NewsClient {
    pub fn new(api_key: String) -> Self {
        Self::with_url(SERPAPI_URL.to_string(), api_key)
    }

    pub fn with_url(url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            url,
            api_key,
        }
    }

    /// Fetch the most recent Bitcoin headlines (capped at 5)
    pub async fn headlines(&self) -> Result<Vec<Headline>> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("engine", "google_news"),
                ("q", "Bitcoin cryptocurrency"),
                ("api_key", &self.api_key),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(format!("News API error: {}", response.status()).into());
        }

        let data: NewsResponse = response.json().await?;

        Ok(data
            .news_results
            .into_iter()
            .take(MAX_HEADLINES)
            .map(|r| Headline {
                title: r.title,
                date: r.date,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_headlines_capped_at_five() {
        let mut server = mockito::Server::new_async().await;

        let items: Vec<String> = (0..8)
            .map(|i| format!(r#"{{"title": "Headline {}", "date": "01/0{}/2026"}}"#, i, i + 1))
            .collect();
        let body = format!(r#"{{"news_results": [{}]}}"#, items.join(","));

        let _mock = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .with_body(body)
            .create_async()
            .await;

        let client = NewsClient::with_url(format!("{}/", server.url()), "test-key".to_string());
        let headlines = client.headlines().await.unwrap();

        assert_eq!(headlines.len(), 5);
        assert_eq!(headlines[0].title, "Headline 0");
    }

    #[tokio::test]
    async fn test_headlines_missing_field_defaults_empty() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .with_body(r#"{"search_metadata": {"status": "Success"}}"#)
            .create_async()
            .await;

        let client = NewsClient::with_url(format!("{}/", server.url()), "test-key".to_string());
        let headlines = client.headlines().await.unwrap();
        assert!(headlines.is_empty());
    }
}
