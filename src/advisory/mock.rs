//! Mock advisor for testing without network calls.

use super::{AdvisoryError, MarketAdvisor};
use crate::domain::{Decimal, MarketInsight};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Mock advisor that returns a canned result.
#[derive(Debug, Clone)]
pub struct MockAdvisor {
    result: Result<MarketInsight, AdvisoryError>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MockAdvisor {
    pub fn with_insight(insight: MarketInsight) -> Self {
        Self {
            result: Ok(insight),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_error(error: AdvisoryError) -> Self {
        Self {
            result: Err(error),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sleep before answering, to exercise deadlines.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketAdvisor for MockAdvisor {
    async fn request_advice(
        &self,
        _item_name: &str,
        _average_buy_price: Decimal,
    ) -> Result<MarketInsight, AdvisoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone()
    }
}
