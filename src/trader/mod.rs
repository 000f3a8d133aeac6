// Cycle orchestrator
// Sequences one full decision cycle: snapshot, context, reflection, decision,
// execution, settle delay, post-trade snapshot, journal append. No business
// logic beyond sequencing lives here.

use crate::api::AlpacaClient;
use crate::context::ContextAggregator;
use crate::execution::OrderEngine;
use crate::journal::TradeJournal;
use crate::models::TradeRecord;
use crate::oracle::DecisionOracle;
use crate::reflection::generate_reflection;
use crate::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Lookback window for the performance reflector
const REFLECTION_LOOKBACK_DAYS: i64 = 7;

/// Pause between order submission and the post-trade snapshot, so the
/// brokerage can settle the fill before balances are re-read
const SETTLE_DELAY: Duration = Duration::from_secs(1);

pub struct Trader {
    broker: AlpacaClient,
    aggregator: ContextAggregator,
    oracle: Arc<dyn DecisionOracle>,
    journal: TradeJournal,
    settle_delay: Duration,
}

impl Trader {
    pub fn new(
        broker: AlpacaClient,
        aggregator: ContextAggregator,
        oracle: Arc<dyn DecisionOracle>,
        journal: TradeJournal,
    ) -> Self {
        Self {
            broker,
            aggregator,
            oracle,
            journal,
            settle_delay: SETTLE_DELAY,
        }
    }

    /// Override the settle delay (tests)
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Run one complete decision cycle
    ///
    /// Returns Err only for the failures that invalidate the whole cycle: a
    /// missing pre-trade snapshot or a malformed oracle decision. Everything
    /// else degrades per its owning component and the cycle still journals.
    pub async fn run_cycle(&self) -> Result<()> {
        let account = self.broker.account_snapshot().await?;

        let mut context = self.aggregator.assemble().await;

        let records = match self.journal.recent(REFLECTION_LOOKBACK_DAYS).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Failed to read journal for reflection: {}", e);
                Vec::new()
            }
        };

        context.reflection =
            generate_reflection(self.oracle.as_ref(), &records, &context).await;

        let decision = self.oracle.decide(&account, &context).await?;

        tracing::info!("### AI Decision: {} ###", decision.action.as_str().to_uppercase());
        tracing::info!("## Reason: {} ##", decision.rationale);

        let engine = OrderEngine::new(&self.broker);
        let outcome = engine
            .execute(&decision, &account, context.order_book.as_ref())
            .await;
        tracing::info!("Execution outcome: {:?}", outcome);

        tokio::time::sleep(self.settle_delay).await;

        let post_trade = match self.broker.account_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(
                    "Post-trade snapshot failed, journaling pre-trade balances: {}",
                    e
                );
                account
            }
        };

        let percentage = if outcome.completed() {
            decision.conviction as i64
        } else {
            0
        };

        let record = TradeRecord {
            id: None,
            timestamp: Utc::now(),
            decision: decision.action,
            percentage,
            reason: decision.rationale,
            btc_balance: post_trade.position.quantity,
            usd_balance: post_trade.cash,
            btc_avg_buy_price: post_trade.position.avg_entry_price,
            btc_usd_price: post_trade.position.current_price,
            reflection: context.reflection,
        };

        // The order already happened; losing this row only loses observability
        if let Err(e) = self.journal.append(&record).await {
            tracing::warn!("Failed to journal cycle: {}", e);
        }

        Ok(())
    }
}
