use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::settings::PricingSettings;

/// Daily/hourly rate pair attached to a rentable item.
///
/// Either side may be absent; absent sides fall back to the global defaults,
/// and an item whose pair is still incomplete after defaulting prices to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatePair {
    pub daily: Option<Decimal>,
    pub hourly: Option<Decimal>,
}

impl RatePair {
    pub fn new(daily: Option<Decimal>, hourly: Option<Decimal>) -> Self {
        Self { daily, hourly }
    }

    /// Fill absent sides from the global default rates.
    pub fn with_defaults(self, settings: &PricingSettings) -> RatePair {
        RatePair {
            daily: self.daily.or(settings.default_daily_rate),
            hourly: self.hourly.or(settings.default_hourly_rate),
        }
    }

    /// Both rates, or `None` when either side is still missing.
    pub fn resolve(self) -> Option<(Decimal, Decimal)> {
        match (self.daily, self.hourly) {
            (Some(daily), Some(hourly)) => Some((daily, hourly)),
            _ => None,
        }
    }
}
