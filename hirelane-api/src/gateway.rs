use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use hirelane_booking::{ChargeLookup, GatewayError};

/// Charge lookup backed by a fixed table. Stands in for the provider API in
/// local wiring and tests; lookups for unknown charges fail, which the
/// reconciliation handler treats as "fall back to the refund's own amount".
#[derive(Default)]
pub struct StaticChargeLookup {
    amounts: Mutex<HashMap<String, i64>>,
}

impl StaticChargeLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_amount_refunded(&self, charge_id: &str, amount_minor: i64) {
        if let Ok(mut amounts) = self.amounts.lock() {
            amounts.insert(charge_id.to_string(), amount_minor);
        }
    }
}

#[async_trait]
impl ChargeLookup for StaticChargeLookup {
    async fn amount_refunded(&self, charge_id: &str) -> Result<i64, GatewayError> {
        let amounts = self
            .amounts
            .lock()
            .map_err(|_| GatewayError::Lookup("charge table poisoned".to_string()))?;
        amounts
            .get(charge_id)
            .copied()
            .ok_or_else(|| GatewayError::Lookup(format!("charge {charge_id} not found")))
    }
}
