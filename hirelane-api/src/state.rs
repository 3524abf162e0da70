use std::sync::Arc;

use hirelane_booking::{ChargeLookup, PaymentReconciliationHandler};
use hirelane_core::notify::NotificationSender;
use hirelane_core::{PricingSettings, RefundPolicy};
use hirelane_store::MemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<dyn NotificationSender>,
    pub charges: Arc<dyn ChargeLookup>,
    pub pricing: PricingSettings,
    pub refund_policy: RefundPolicy,
    pub admin_email: Option<String>,
}

impl AppState {
    pub fn reconciliation(&self) -> PaymentReconciliationHandler<MemoryStore> {
        PaymentReconciliationHandler::new(
            self.store.clone(),
            self.notifier.clone(),
            self.charges.clone(),
            self.admin_email.clone(),
        )
    }
}
