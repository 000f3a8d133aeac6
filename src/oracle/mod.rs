// Decision oracle adapter
// The oracle is an opaque function from a context bundle to a structured
// decision; everything provider-specific lives behind the trait.

pub mod openai;

pub use openai::OpenAiOracle;

use crate::context::MarketContext;
use crate::models::{AccountSnapshot, Decision, TradeAction, TradeRecord};
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    /// The response did not satisfy the decision schema. Fatal for the cycle:
    /// no order is attempted and no journal row is written.
    #[error("invalid decision format: {0}")]
    InvalidDecisionFormat(String),

    #[error("oracle request failed: {0}")]
    Network(String),

    #[error("oracle API error {status}: {body}")]
    Api { status: u16, body: String },
}

/// Inputs for a performance-summary request
pub struct ReflectionRequest<'a> {
    pub records: &'a [TradeRecord],
    pub context: &'a MarketContext,
    /// Period return as a fraction (0.05 = +5%)
    pub performance: f64,
}

/// External decision-making service
///
/// `decide` turns a context bundle into a validated decision; `summarize`
/// turns recent trade outcomes into advisory text for the next cycle.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    async fn decide(
        &self,
        account: &AccountSnapshot,
        context: &MarketContext,
    ) -> Result<Decision, OracleError>;

    async fn summarize(&self, request: &ReflectionRequest<'_>) -> Result<String, OracleError>;
}

/// Raw wire shape of a decision response, before validation
#[derive(Debug, Deserialize)]
pub struct RawDecision {
    pub decision: String,
    pub percentage: i64,
    pub reason: String,
}

/// Strictly validate a raw decision against the schema
///
/// hold must carry percentage 0; buy/sell must carry 1-100. Anything else is
/// a contract violation.
pub fn validate_decision(raw: RawDecision) -> Result<Decision, OracleError> {
    let action: TradeAction = raw
        .decision
        .parse()
        .map_err(OracleError::InvalidDecisionFormat)?;

    if !(0..=100).contains(&raw.percentage) {
        return Err(OracleError::InvalidDecisionFormat(format!(
            "percentage {} out of range [0,100]",
            raw.percentage
        )));
    }

    match action {
        TradeAction::Hold if raw.percentage != 0 => {
            return Err(OracleError::InvalidDecisionFormat(format!(
                "hold decision with nonzero percentage {}",
                raw.percentage
            )));
        }
        TradeAction::Buy | TradeAction::Sell if raw.percentage == 0 => {
            return Err(OracleError::InvalidDecisionFormat(
                "buy/sell decision with zero percentage".to_string(),
            ));
        }
        _ => {}
    }

    Ok(Decision {
        action,
        conviction: raw.percentage as u8,
        rationale: raw.reason,
    })
}

/// Fixed oracle for tests; records nothing, always answers the same way
pub struct StubOracle {
    pub decision: Decision,
    pub summary: String,
}

impl StubOracle {
    pub fn new(decision: Decision) -> Self {
        Self {
            decision,
            summary: "stub reflection".to_string(),
        }
    }
}

#[async_trait]
impl DecisionOracle for StubOracle {
    async fn decide(
        &self,
        _account: &AccountSnapshot,
        _context: &MarketContext,
    ) -> Result<Decision, OracleError> {
        Ok(self.decision.clone())
    }

    async fn summarize(&self, _request: &ReflectionRequest<'_>) -> Result<String, OracleError> {
        Ok(self.summary.clone())
    }
}
