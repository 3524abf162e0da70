use uuid::Uuid;

use crate::models::{
    BookingAddOn, ConfirmedBooking, DraftBooking, PaymentRecord, RefundRequest,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(String),

    #[error("{entity} {id} is not present")]
    Missing { entity: &'static str, id: Uuid },

    #[error("store lock poisoned")]
    Poisoned,
}

/// One open unit of work against the persistence store. Everything done
/// through a session becomes visible atomically when the surrounding
/// transaction commits, or not at all.
pub trait StoreSession {
    fn find_draft(&self, id: Uuid) -> Result<Option<DraftBooking>, StoreError>;
    fn insert_draft(&mut self, draft: &DraftBooking) -> Result<(), StoreError>;
    fn update_draft(&mut self, draft: &DraftBooking) -> Result<(), StoreError>;
    fn delete_draft(&mut self, id: Uuid) -> Result<(), StoreError>;

    fn find_booking(&self, id: Uuid) -> Result<Option<ConfirmedBooking>, StoreError>;
    fn insert_booking(&mut self, booking: &ConfirmedBooking) -> Result<(), StoreError>;
    fn update_booking(&mut self, booking: &ConfirmedBooking) -> Result<(), StoreError>;

    fn insert_booking_add_on(&mut self, add_on: &BookingAddOn) -> Result<(), StoreError>;
    fn booking_add_ons(&self, booking_id: Uuid) -> Result<Vec<BookingAddOn>, StoreError>;

    fn find_payment(&self, id: Uuid) -> Result<Option<PaymentRecord>, StoreError>;
    fn find_payment_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<PaymentRecord>, StoreError>;
    fn insert_payment(&mut self, payment: &PaymentRecord) -> Result<(), StoreError>;
    fn update_payment(&mut self, payment: &PaymentRecord) -> Result<(), StoreError>;

    fn insert_refund_request(&mut self, request: &RefundRequest) -> Result<(), StoreError>;
    fn update_refund_request(&mut self, request: &RefundRequest) -> Result<(), StoreError>;
    /// Most recent refund request for the payment still awaiting an outcome.
    fn find_open_refund_request(
        &self,
        payment_id: Uuid,
    ) -> Result<Option<RefundRequest>, StoreError>;
}

/// Transactional boundary over the store.
///
/// The closure runs with exclusive access; when it returns `Ok` every session
/// write commits together, when it returns `Err` none of them are observable.
/// The caller's error type absorbs store failures via `From<StoreError>`.
pub trait BookingStore: Send + Sync {
    fn with_transaction<T, E>(
        &self,
        work: &mut dyn FnMut(&mut dyn StoreSession) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>;
}
