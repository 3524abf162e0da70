use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hirelane_core::RatePair;

/// A hireable vehicle. Rates may be absent, in which case the global default
/// rates apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub name: String,
    pub daily_rate: Option<Decimal>,
    pub hourly_rate: Option<Decimal>,
    pub is_available: bool,
}

impl Vehicle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            daily_rate: None,
            hourly_rate: None,
            is_available: true,
        }
    }

    pub fn rates(&self) -> RatePair {
        RatePair::new(self.daily_rate, self.hourly_rate)
    }
}
