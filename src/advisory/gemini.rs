//! Gemini generateContent client implementing `MarketAdvisor`.

use super::{AdvisoryError, MarketAdvisor};
use crate::domain::{Decimal, MarketInsight};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Advisor backed by the Gemini JSON-mode text generation API.
#[derive(Debug, Clone)]
pub struct GeminiAdvisor {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_elapsed: Duration,
}

impl GeminiAdvisor {
    pub fn new(base_url: String, api_key: String, model: String, max_elapsed: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            model,
            max_elapsed,
        }
    }

    async fn generate(&self, payload: serde_json::Value) -> Result<serde_json::Value, AdvisoryError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.max_elapsed),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&payload)
                .send()
                .await
                .map_err(|e| {
                    backoff::Error::transient(AdvisoryError::NetworkError(e.to_string()))
                })?;

            let status = response.status();
            if status == 429 || status.is_server_error() {
                return Err(backoff::Error::transient(AdvisoryError::HttpError {
                    status: status.as_u16(),
                    message: "Advisor temporarily unavailable".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(AdvisoryError::HttpError {
                    status: status.as_u16(),
                    message: "Advisor rejected request".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(AdvisoryError::ParseError(e.to_string())))
        })
        .await
    }
}

#[async_trait]
impl MarketAdvisor for GeminiAdvisor {
    async fn request_advice(
        &self,
        item_name: &str,
        average_buy_price: Decimal,
    ) -> Result<MarketInsight, AdvisoryError> {
        debug!(
            "Requesting market advice for item={}, avg_buy_price={}",
            item_name, average_buy_price
        );

        let response = self
            .generate(build_request(item_name, average_buy_price))
            .await?;
        parse_insight(&response)
    }
}

fn build_prompt(item_name: &str, average_buy_price: Decimal) -> String {
    format!(
        "Provide market pricing advice for a trader who bought {} at ${}. \
         Suggest a competitive selling price and explain why.",
        item_name, average_buy_price
    )
}

fn build_request(item_name: &str, average_buy_price: Decimal) -> serde_json::Value {
    serde_json::json!({
        "contents": [{
            "parts": [{ "text": build_prompt(item_name, average_buy_price) }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "suggestedSellingPrice": { "type": "NUMBER" },
                    "reasoning": { "type": "STRING" },
                    "marketTrend": {
                        "type": "STRING",
                        "enum": ["UP", "DOWN", "STABLE"]
                    }
                },
                "required": ["suggestedSellingPrice", "reasoning", "marketTrend"]
            }
        }
    })
}

fn parse_insight(response: &serde_json::Value) -> Result<MarketInsight, AdvisoryError> {
    let text = response
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AdvisoryError::ParseError("Missing candidate text".to_string()))?;

    serde_json::from_str::<MarketInsight>(text)
        .map_err(|e| AdvisoryError::SchemaError(format!("Invalid insight JSON: {}", e)))
}
