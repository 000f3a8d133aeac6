// Order sizing & execution engine
// Turns an oracle decision into a bounded, balance-aware market order and
// submits it. At most one order submission per cycle.

use crate::api::AlpacaClient;
use crate::models::{AccountSnapshot, Decision, OrderBook, TradeAction};
use serde::{Deserialize, Serialize};

/// Hard per-order notional ceiling, in quote currency
pub const MAX_ORDER_NOTIONAL: f64 = 200_000.0;

/// Minimum notional floor; positions or balances at or below this are dust
pub const MIN_NOTIONAL: f64 = 1.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

/// Order size, either quote-currency notional or asset quantity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderSizing {
    Notional(f64),
    Quantity(f64),
}

/// A concrete market order, always immediate-or-cancel
///
/// Constructed only by `plan_order`; never built directly from a `Decision`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub side: OrderSide,
    pub symbol: String,
    pub sizing: OrderSizing,
}

/// Result of one execution attempt
///
/// A hold is always `Executed` (it counts as a completed action in the
/// journal); a skipped or failed buy/sell journals as conviction 0.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Executed,
    Skipped { reason: String },
    Failed { reason: String },
}

impl ExecutionOutcome {
    /// Whether the decision genuinely completed, for journaling conviction
    pub fn completed(&self) -> bool {
        matches!(self, ExecutionOutcome::Executed)
    }

    pub fn skipped(reason: &str) -> Self {
        ExecutionOutcome::Skipped {
            reason: reason.to_string(),
        }
    }
}

/// What the sizing rules decided to do before any I/O happens
#[derive(Debug, Clone, PartialEq)]
pub enum OrderPlan {
    Submit(OrderRequest),
    Skip { reason: String },
    Noop,
}

/// Apply the sizing rules to a decision against current account state
///
/// Pure function so the caps and floors are testable without a brokerage.
pub fn plan_order(
    decision: &Decision,
    account: &AccountSnapshot,
    best_bid: f64,
) -> OrderPlan {
    let fraction = decision.conviction as f64 / 100.0;

    match decision.action {
        TradeAction::Hold => OrderPlan::Noop,

        TradeAction::Buy => {
            if account.cash <= MIN_NOTIONAL {
                return OrderPlan::Skip {
                    reason: "insufficient balance".to_string(),
                };
            }

            let notional = (account.cash * fraction).min(MAX_ORDER_NOTIONAL);
            OrderPlan::Submit(OrderRequest {
                side: OrderSide::Buy,
                symbol: account.position.symbol.clone(),
                sizing: OrderSizing::Notional(notional),
            })
        }

        TradeAction::Sell => {
            let position = &account.position;
            if position.quantity <= 0.0 || position.quantity * best_bid <= MIN_NOTIONAL {
                return OrderPlan::Skip {
                    reason: "position below minimum notional".to_string(),
                };
            }

            let mut quantity = position.quantity * fraction;
            if quantity * best_bid > MAX_ORDER_NOTIONAL {
                quantity = MAX_ORDER_NOTIONAL / best_bid;
            }

            OrderPlan::Submit(OrderRequest {
                side: OrderSide::Sell,
                symbol: position.symbol.clone(),
                sizing: OrderSizing::Quantity(quantity),
            })
        }
    }
}

/// Executes planned orders against the brokerage
pub struct OrderEngine<'a> {
    broker: &'a AlpacaClient,
}

impl<'a> OrderEngine<'a> {
    pub fn new(broker: &'a AlpacaClient) -> Self {
        Self { broker }
    }

    /// Size the decision and submit the resulting order, if any
    ///
    /// Submission failures degrade to `Failed`; nothing raises past this
    /// boundary so the orchestrator can always journal the cycle.
    pub async fn execute(
        &self,
        decision: &Decision,
        account: &AccountSnapshot,
        book: Option<&OrderBook>,
    ) -> ExecutionOutcome {
        let best_bid = book.and_then(|b| b.best_bid());

        if decision.action == TradeAction::Sell && best_bid.is_none() {
            return ExecutionOutcome::Failed {
                reason: "order book unavailable".to_string(),
            };
        }

        match plan_order(decision, account, best_bid.unwrap_or(0.0)) {
            OrderPlan::Noop => ExecutionOutcome::Executed,
            OrderPlan::Skip { reason } => {
                tracing::info!("Order skipped: {}", reason);
                ExecutionOutcome::Skipped { reason }
            }
            OrderPlan::Submit(order) => match self.broker.submit_order(&order).await {
                Ok(ack) => {
                    tracing::info!("Order acknowledged: {}", ack);
                    ExecutionOutcome::Executed
                }
                Err(e) => {
                    tracing::error!("Order submission failed: {}", e);
                    ExecutionOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            },
        }
    }
}
