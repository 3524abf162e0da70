pub mod interval;
pub mod money;
pub mod notify;
pub mod rates;
pub mod settings;

pub use interval::BillingInterval;
pub use rates::RatePair;
pub use settings::{DepositMethod, PricingSettings, PricingStrategy, RefundPolicy};

/// Field-scoped failure reported back to the caller of a mutation API.
///
/// Mutations never coerce bad input; they name the offending field so the
/// caller can surface a correctable error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}
