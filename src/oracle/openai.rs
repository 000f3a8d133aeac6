use crate::context::MarketContext;
use crate::models::{AccountSnapshot, Decision};
use crate::oracle::{
    validate_decision, DecisionOracle, OracleError, RawDecision, ReflectionRequest,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o";
const MAX_TOKENS: u32 = 4095;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    // String for plain messages, an array of parts when an image is embedded
    content: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: String,
}

/// OpenAI-backed decision oracle
///
/// One chat-completions call per decision, with a strict JSON schema on the
/// response. No internal retry; a failed call surfaces to the caller's
/// failure policy.
pub struct OpenAiOracle {
    api_key: String,
    url: String,
    client: reqwest::Client,
}

impl OpenAiOracle {
    pub fn new(api_key: String) -> Self {
        Self::with_url(OPENAI_API_URL.to_string(), api_key)
    }

    pub fn with_url(url: String, api_key: String) -> Self {
        Self {
            api_key,
            url,
            client: reqwest::Client::new(),
        }
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, OracleError> {
        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", &self.api_key))
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| OracleError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Api { status, body });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Network(format!("JSON decode error: {}", e)))?;

        let choice = chat
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| OracleError::Network("response contained no choices".to_string()))?;

        Ok(choice.message.content)
    }

    fn decision_system_prompt(reflection: &str) -> String {
        format!(
            r#"You are an expert in Bitcoin investing. Analyze the provided data and determine whether to buy, sell, or hold Bitcoin. Use the following to guide your decision:

- Technical indicators and market data, focusing on both short-term and long-term trends.
- Recent news headlines and their potential impact on Bitcoin price.
- The Fear and Greed Index: a high "greed" score may indicate overbought conditions, a high "fear" score may suggest oversold conditions.
- Overall market sentiment as a reflection of trading volume, volatility, and order book data.
- Patterns and trends visible in the chart image, when provided.
- Recent trading performance and reflection.

Recent trading reflection:
{}

Response format:
1. A decision ("buy", "sell", or "hold").
2. If the decision is "buy", a percentage (1-100) of available USD to use for buying.
   If the decision is "sell", a percentage (1-100) of held BTC to sell.
   If the decision is "hold", set the percentage to 0.
3. A reason for your decision, integrating the data and analysis above.

Important: the "percentage" must be an integer between 1 and 100 for buy/sell decisions, and exactly 0 for hold decisions. The percentage should reflect the strength of your conviction in the decision."#,
            reflection
        )
    }

    fn decision_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "json_schema",
            "json_schema": {
                "name": "trading_decision",
                "strict": true,
                "schema": {
                    "type": "object",
                    "properties": {
                        "decision": {"type": "string", "enum": ["buy", "sell", "hold"]},
                        "percentage": {"type": "integer"},
                        "reason": {"type": "string"}
                    },
                    "required": ["decision", "percentage", "reason"],
                    "additionalProperties": false
                }
            }
        })
    }
}

#[async_trait]
impl DecisionOracle for OpenAiOracle {
    async fn decide(
        &self,
        account: &AccountSnapshot,
        context: &MarketContext,
    ) -> Result<Decision, OracleError> {
        let market_data = serde_json::json!({
            "investment_status": account,
            "orderbook": context.order_book,
            "daily_ohlcv_with_indicators": context.daily,
            "hourly_ohlcv_with_indicators": context.hourly,
            "news_headlines": context.headlines,
            "fear_greed_index": context.sentiment,
        });

        let mut messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: Self::decision_system_prompt(&context.reflection).into(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: market_data.to_string().into(),
            },
        ];

        if let Some(image) = &context.chart_image {
            messages.push(ChatMessage {
                role: "user".to_string(),
                content: serde_json::json!([
                    {"type": "text", "text": "Chart image included below:"},
                    {
                        "type": "image_url",
                        "image_url": {"url": format!("data:image/png;base64,{}", image)}
                    }
                ]),
            });
        }

        let request = ChatRequest {
            model: MODEL.to_string(),
            max_tokens: MAX_TOKENS,
            messages,
            response_format: Some(Self::decision_schema()),
        };

        let mut text = self.chat(&request).await?;

        // Some models wrap JSON in markdown fences despite the schema
        if text.starts_with("```") {
            text = text
                .trim_start_matches("```json")
                .trim_start_matches("```")
                .trim_end_matches("```")
                .trim()
                .to_string();
        }

        let raw: RawDecision = serde_json::from_str(&text).map_err(|e| {
            OracleError::InvalidDecisionFormat(format!("{} (text: {})", e, text))
        })?;

        validate_decision(raw)
    }

    async fn summarize(&self, request: &ReflectionRequest<'_>) -> Result<String, OracleError> {
        let trades_json = serde_json::to_string(request.records)
            .map_err(|e| OracleError::Network(e.to_string()))?;

        let market_data = serde_json::json!({
            "orderbook": request.context.order_book,
            "daily_ohlcv_with_indicators": request.context.daily,
            "hourly_ohlcv_with_indicators": request.context.hourly,
            "news_headlines": request.context.headlines,
            "fear_greed_index": request.context.sentiment,
        });

        let user_prompt = format!(
            r#"Recent trading data:
{}

Current market data:
{}

Overall performance in the last 7 days: {:.2}%

Please analyze this data and provide:
1. A brief reflection on the recent trading decisions
2. Insights on what worked well and what didn't
3. Suggestions for improvement in future trading decisions
4. Any patterns or trends you notice in the market data

Limit your response to 250 words or less."#,
            trades_json,
            market_data,
            request.performance * 100.0
        );

        let chat_request = ChatRequest {
            model: MODEL.to_string(),
            max_tokens: MAX_TOKENS,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You are an AI trading assistant tasked with analyzing recent trading performance and current market conditions to generate insights and improvements for future trading decisions.".into(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.into(),
                },
            ],
            response_format: None,
        };

        self.chat(&chat_request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MarketContext;
    use crate::models::{Position, TradeAction};

    fn test_account() -> AccountSnapshot {
        AccountSnapshot {
            cash: 10000.0,
            portfolio_value: 10000.0,
            position: Position::flat("BTC/USD"),
        }
    }

    fn chat_body(content: &str) -> String {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_decide_parses_valid_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_body(chat_body(
                r#"{"decision": "buy", "percentage": 35, "reason": "oversold"}"#,
            ))
            .create_async()
            .await;

        let oracle = OpenAiOracle::with_url(format!("{}/", server.url()), "key".to_string());
        let decision = oracle
            .decide(&test_account(), &MarketContext::empty())
            .await
            .unwrap();

        assert_eq!(decision.action, TradeAction::Buy);
        assert_eq!(decision.conviction, 35);
        assert_eq!(decision.rationale, "oversold");
    }

    #[tokio::test]
    async fn test_decide_strips_markdown_fences() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_body(chat_body(
                "```json\n{\"decision\": \"hold\", \"percentage\": 0, \"reason\": \"flat\"}\n```",
            ))
            .create_async()
            .await;

        let oracle = OpenAiOracle::with_url(format!("{}/", server.url()), "key".to_string());
        let decision = oracle
            .decide(&test_account(), &MarketContext::empty())
            .await
            .unwrap();

        assert_eq!(decision.action, TradeAction::Hold);
    }

    #[tokio::test]
    async fn test_decide_rejects_out_of_range_percentage() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_body(chat_body(
                r#"{"decision": "buy", "percentage": 150, "reason": "moon"}"#,
            ))
            .create_async()
            .await;

        let oracle = OpenAiOracle::with_url(format!("{}/", server.url()), "key".to_string());
        let err = oracle
            .decide(&test_account(), &MarketContext::empty())
            .await
            .unwrap_err();

        assert!(matches!(err, OracleError::InvalidDecisionFormat(_)));
    }

    #[tokio::test]
    async fn test_decide_rejects_non_json_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_body(chat_body("I think you should buy some Bitcoin today."))
            .create_async()
            .await;

        let oracle = OpenAiOracle::with_url(format!("{}/", server.url()), "key".to_string());
        let err = oracle
            .decide(&test_account(), &MarketContext::empty())
            .await
            .unwrap_err();

        assert!(matches!(err, OracleError::InvalidDecisionFormat(_)));
    }

    #[tokio::test]
    async fn test_api_error_is_not_invalid_format() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let oracle = OpenAiOracle::with_url(format!("{}/", server.url()), "key".to_string());
        let err = oracle
            .decide(&test_account(), &MarketContext::empty())
            .await
            .unwrap_err();

        assert!(matches!(err, OracleError::Api { status: 429, .. }));
    }
}
