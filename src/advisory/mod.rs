//! Advisory gateway: asks an external service for a suggested resale price.
//!
//! The gateway never fails. Any advisor error (missing configuration, timeout,
//! network, malformed body) resolves to the deterministic 20% markup fallback,
//! reported through the `Advice::Fallback` branch so callers can tell the two apart.

use crate::domain::{Decimal, MarketInsight};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub mod gemini;
pub mod mock;

pub use gemini::GeminiAdvisor;
pub use mock::MockAdvisor;

/// External pricing-advice collaborator.
#[async_trait]
pub trait MarketAdvisor: Send + Sync + fmt::Debug {
    /// Ask for a suggested selling price for `item_name` bought at `average_buy_price`.
    async fn request_advice(
        &self,
        item_name: &str,
        average_buy_price: Decimal,
    ) -> Result<MarketInsight, AdvisoryError>;
}

/// Why advice could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisoryError {
    /// No advisor is configured.
    Unavailable,
    /// The advisor did not answer within the configured deadline.
    Timeout,
    /// Network error (e.g., connection refused, DNS failure)
    NetworkError(String),
    /// Non-success HTTP status
    HttpError { status: u16, message: String },
    /// Body was not the expected JSON
    ParseError(String),
    /// Body parsed but violates the insight contract
    SchemaError(String),
}

impl fmt::Display for AdvisoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvisoryError::Unavailable => write!(f, "Advisor not configured"),
            AdvisoryError::Timeout => write!(f, "Advisor timed out"),
            AdvisoryError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            AdvisoryError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            AdvisoryError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AdvisoryError::SchemaError(msg) => write!(f, "Schema error: {}", msg),
        }
    }
}

impl std::error::Error for AdvisoryError {}

/// Outcome of an advice request: either the advisor's answer or the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advice {
    Advised(MarketInsight),
    Fallback {
        insight: MarketInsight,
        reason: AdvisoryError,
    },
}

impl Advice {
    pub fn insight(&self) -> &MarketInsight {
        match self {
            Advice::Advised(insight) => insight,
            Advice::Fallback { insight, .. } => insight,
        }
    }

    pub fn into_insight(self) -> MarketInsight {
        match self {
            Advice::Advised(insight) => insight,
            Advice::Fallback { insight, .. } => insight,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Advice::Fallback { .. })
    }

    /// "advisor" or "fallback", for API responses.
    pub fn source(&self) -> &'static str {
        match self {
            Advice::Advised(_) => "advisor",
            Advice::Fallback { .. } => "fallback",
        }
    }
}

/// Wraps an optional advisor with a deadline and the fallback policy.
#[derive(Debug, Clone)]
pub struct AdvisoryGateway {
    advisor: Option<Arc<dyn MarketAdvisor>>,
    timeout: Duration,
}

impl AdvisoryGateway {
    pub fn new(advisor: Arc<dyn MarketAdvisor>, timeout: Duration) -> Self {
        Self {
            advisor: Some(advisor),
            timeout,
        }
    }

    /// A gateway with no advisor; every request yields the fallback.
    pub fn disabled() -> Self {
        Self {
            advisor: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.advisor.is_some()
    }

    pub async fn fetch_advice(&self, item_name: &str, average_buy_price: Decimal) -> Advice {
        match self.try_fetch(item_name, average_buy_price).await {
            Ok(insight) => {
                debug!(item = item_name, trend = ?insight.market_trend, "Advisor returned insight");
                Advice::Advised(insight)
            }
            Err(reason) => {
                warn!(item = item_name, error = %reason, "Market advice unavailable, using fallback");
                Advice::Fallback {
                    insight: MarketInsight::fallback(average_buy_price),
                    reason,
                }
            }
        }
    }

    async fn try_fetch(
        &self,
        item_name: &str,
        average_buy_price: Decimal,
    ) -> Result<MarketInsight, AdvisoryError> {
        let advisor = self.advisor.as_ref().ok_or(AdvisoryError::Unavailable)?;
        let insight = tokio::time::timeout(
            self.timeout,
            advisor.request_advice(item_name, average_buy_price),
        )
        .await
        .map_err(|_| AdvisoryError::Timeout)??;

        validate_insight(&insight)?;
        Ok(insight)
    }
}

fn validate_insight(insight: &MarketInsight) -> Result<(), AdvisoryError> {
    if insight.suggested_selling_price.is_negative() {
        return Err(AdvisoryError::SchemaError(format!(
            "negative suggested price {}",
            insight.suggested_selling_price
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MarketTrend;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn gateway(mock: MockAdvisor) -> AdvisoryGateway {
        AdvisoryGateway::new(Arc::new(mock), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_disabled_gateway_falls_back() {
        let advice = AdvisoryGateway::disabled()
            .fetch_advice("Widget", d("10"))
            .await;

        assert_eq!(
            advice,
            Advice::Fallback {
                insight: MarketInsight::fallback(d("10")),
                reason: AdvisoryError::Unavailable,
            }
        );
        assert_eq!(advice.insight().suggested_selling_price, d("12"));
        assert_eq!(advice.insight().market_trend, MarketTrend::Stable);
        assert_eq!(advice.source(), "fallback");
    }

    #[tokio::test]
    async fn test_advisor_answer_passes_through() {
        let insight = MarketInsight {
            suggested_selling_price: d("14.5"),
            reasoning: "Holiday demand".to_string(),
            market_trend: MarketTrend::Up,
        };
        let advice = gateway(MockAdvisor::with_insight(insight.clone()))
            .fetch_advice("Widget", d("10"))
            .await;

        assert!(!advice.is_fallback());
        assert_eq!(advice.source(), "advisor");
        assert_eq!(advice.into_insight(), insight);
    }

    #[tokio::test]
    async fn test_advisor_error_is_absorbed() {
        let advice = gateway(MockAdvisor::with_error(AdvisoryError::NetworkError(
            "connection refused".to_string(),
        )))
        .fetch_advice("Widget", d("10"))
        .await;

        assert!(advice.is_fallback());
        assert_eq!(advice.insight().suggested_selling_price, d("12"));
    }

    #[tokio::test]
    async fn test_negative_suggestion_is_rejected() {
        let insight = MarketInsight {
            suggested_selling_price: d("-1"),
            reasoning: "nonsense".to_string(),
            market_trend: MarketTrend::Down,
        };
        let advice = gateway(MockAdvisor::with_insight(insight))
            .fetch_advice("Widget", d("5"))
            .await;

        match advice {
            Advice::Fallback { insight, reason } => {
                assert!(matches!(reason, AdvisoryError::SchemaError(_)));
                assert_eq!(insight.suggested_selling_price, d("6"));
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_advisor_times_out() {
        let mock = MockAdvisor::with_insight(MarketInsight::fallback(d("1")))
            .with_delay(Duration::from_millis(200));
        let gateway = AdvisoryGateway::new(Arc::new(mock), Duration::from_millis(10));

        match gateway.fetch_advice("Widget", d("10")).await {
            Advice::Fallback { reason, .. } => assert_eq!(reason, AdvisoryError::Timeout),
            other => panic!("expected timeout fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_advisory_error_display() {
        let err = AdvisoryError::HttpError {
            status: 429,
            message: "Too many requests".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 429: Too many requests");
        assert_eq!(AdvisoryError::Timeout.to_string(), "Advisor timed out");
    }
}
