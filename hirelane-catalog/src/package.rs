use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hirelane_core::RatePair;

use crate::addon::AddOn;

/// A bundle of add-ons hired at its own daily/hourly rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: Uuid,
    pub name: String,
    pub hourly_cost: Option<Decimal>,
    pub daily_cost: Option<Decimal>,
    pub add_on_ids: Vec<Uuid>,
    pub is_available: bool,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            hourly_cost: None,
            daily_cost: None,
            add_on_ids: Vec::new(),
            is_available: true,
        }
    }

    pub fn rates(&self) -> RatePair {
        RatePair::new(self.daily_cost, self.hourly_cost)
    }

    pub fn includes(&self, addon: &AddOn) -> bool {
        self.add_on_ids.contains(&addon.id)
    }
}
