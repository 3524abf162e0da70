use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hirelane_core::{RatePair, ValidationError};

/// Optional extra hired alongside a vehicle (helmet, luggage box, GPS, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOn {
    pub id: Uuid,
    pub name: String,
    pub hourly_cost: Option<Decimal>,
    pub daily_cost: Option<Decimal>,
    pub min_quantity: u32,
    pub max_quantity: u32,
    pub is_available: bool,
}

impl AddOn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            hourly_cost: None,
            daily_cost: None,
            min_quantity: 1,
            max_quantity: 1,
            is_available: true,
        }
    }

    pub fn rates(&self) -> RatePair {
        RatePair::new(self.daily_cost, self.hourly_cost)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(cost) = self.hourly_cost {
            if cost < Decimal::ZERO {
                return Err(ValidationError::new(
                    "hourly_cost",
                    "Add-on hourly cost cannot be negative.",
                ));
            }
        }
        if let Some(cost) = self.daily_cost {
            if cost < Decimal::ZERO {
                return Err(ValidationError::new(
                    "daily_cost",
                    "Add-on daily cost cannot be negative.",
                ));
            }
        }
        if self.min_quantity < 1 {
            return Err(ValidationError::new(
                "min_quantity",
                "Minimum quantity must be at least 1.",
            ));
        }
        if self.max_quantity < self.min_quantity {
            return Err(ValidationError::new(
                "max_quantity",
                "Maximum quantity cannot be less than minimum quantity.",
            ));
        }
        Ok(())
    }

    /// Selectable quantity cap, given whether the chosen package already
    /// bundles this add-on.
    ///
    /// A bundled add-on capped at one unit cannot be selected separately at
    /// all; a bundled add-on with a higher cap loses one selectable unit to
    /// the package.
    pub fn effective_max_quantity(&self, bundled_in_package: bool) -> Option<u32> {
        if !bundled_in_package {
            return Some(self.max_quantity);
        }
        if self.max_quantity <= 1 {
            return None;
        }
        let adjusted = self.max_quantity - 1;
        if adjusted >= self.min_quantity {
            Some(adjusted)
        } else {
            None
        }
    }
}
