use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY: &str = "AUD";

/// Billing strategy applied to hires of 24 hours or more.
///
/// Wire names match the historical configuration vocabulary; an unrecognized
/// name is rejected when the configuration is parsed, so the calculator never
/// sees an unmapped strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricingStrategy {
    /// Any partial day rounds up to a full day.
    #[serde(rename = "flat_24_hour")]
    Flat24Hour,
    /// Excess hours within the margin are free, beyond it a full extra day.
    #[serde(rename = "24_hour_plus_margin")]
    TwentyFourHourPlusMargin,
    /// Excess hours billed hourly, capped at one daily rate.
    #[serde(rename = "24_hour_customer_friendly")]
    TwentyFourHourCustomerFriendly,
    /// Every excess hour billed at the hourly rate.
    #[serde(rename = "daily_plus_excess_hourly")]
    DailyPlusExcessHourly,
    /// Excess hours billed as their fraction of the daily rate.
    #[serde(rename = "daily_plus_proportional_excess")]
    DailyPlusProportionalExcess,
    /// Excess hours beyond the margin billed proportionally.
    #[serde(rename = "24_hour_plus_margin_proportional")]
    TwentyFourHourPlusMarginProportional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositMethod {
    Percentage,
    FlatFee,
}

/// Pricing configuration, loaded once per operation and passed by value into
/// every pricing, aggregation and conversion call. The engine never mutates
/// it; any individual field may be absent, meaning "feature disabled" or
/// "use the global default".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSettings {
    pub strategy: PricingStrategy,
    /// Grace hours before a partial extra day incurs a charge under the
    /// margin-based strategies.
    pub excess_hours_margin: u32,
    pub default_daily_rate: Option<Decimal>,
    pub default_hourly_rate: Option<Decimal>,
    pub deposit_enabled: bool,
    pub deposit_method: DepositMethod,
    pub deposit_percentage: Option<Decimal>,
    pub deposit_flat_fee: Option<Decimal>,
    pub currency_code: Option<String>,
}

impl PricingSettings {
    pub fn currency(&self) -> &str {
        self.currency_code.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }
}

/// Cancellation refund thresholds, snapshotted onto a payment record at
/// conversion time so later policy changes cannot alter the terms a booking
/// was taken under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundPolicy {
    /// Full deposit refund when cancelled at least this many days before pickup.
    pub deposit_full_refund_days: u32,
    pub deposit_partial_refund_days: u32,
    pub deposit_partial_refund_percentage: Decimal,
    pub deposit_minimal_refund_days: u32,
    pub deposit_minimal_refund_percentage: Decimal,
}

impl RefundPolicy {
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }
}
