use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use hirelane_booking::repository::{BookingStore, StoreError, StoreSession};
use hirelane_booking::{
    BookingAddOn, ConfirmedBooking, DraftBooking, PaymentRecord, RefundRequest,
};

/// Everything the store holds, keyed by entity id. Cloneable so a
/// transaction can stage changes on a copy.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub drafts: HashMap<Uuid, DraftBooking>,
    pub bookings: HashMap<Uuid, ConfirmedBooking>,
    pub booking_add_ons: HashMap<Uuid, BookingAddOn>,
    pub payments: HashMap<Uuid, PaymentRecord>,
    pub refund_requests: HashMap<Uuid, RefundRequest>,
}

/// In-memory transactional store.
///
/// A transaction clones the state, runs against the clone, and swaps it in
/// only on success; an error discards the clone, leaving the committed state
/// untouched. The mutex serializes transactions, which is what guarantees
/// at-most-one successful conversion per draft.
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Apply direct, non-transactional writes. For wiring and test setup.
    pub fn seed(&self, apply: impl FnOnce(&mut StoreState)) -> Result<(), StoreError> {
        let mut guard = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        apply(&mut guard);
        Ok(())
    }

    /// Copy of the committed state.
    pub fn snapshot(&self) -> Result<StoreState, StoreError> {
        Ok(self
            .state
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .clone())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingStore for MemoryStore {
    fn with_transaction<T, E>(
        &self,
        work: &mut dyn FnMut(&mut dyn StoreSession) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| E::from(StoreError::Poisoned))?;
        let mut staged = guard.clone();
        let outcome = {
            let mut session = MemorySession::new(&mut staged);
            work(&mut session)
        };
        match outcome {
            Ok(value) => {
                *guard = staged;
                Ok(value)
            }
            Err(err) => {
                tracing::debug!("transaction rolled back; staged writes discarded");
                Err(err)
            }
        }
    }
}

/// Session over a staged copy of the state. Public so tests can wrap it with
/// fault-injecting sessions.
pub struct MemorySession<'a> {
    state: &'a mut StoreState,
}

impl<'a> MemorySession<'a> {
    pub fn new(state: &'a mut StoreState) -> Self {
        Self { state }
    }
}

impl StoreSession for MemorySession<'_> {
    fn find_draft(&self, id: Uuid) -> Result<Option<DraftBooking>, StoreError> {
        Ok(self.state.drafts.get(&id).cloned())
    }

    fn insert_draft(&mut self, draft: &DraftBooking) -> Result<(), StoreError> {
        self.state.drafts.insert(draft.id, draft.clone());
        Ok(())
    }

    fn update_draft(&mut self, draft: &DraftBooking) -> Result<(), StoreError> {
        if !self.state.drafts.contains_key(&draft.id) {
            return Err(StoreError::Missing {
                entity: "draft booking",
                id: draft.id,
            });
        }
        self.state.drafts.insert(draft.id, draft.clone());
        Ok(())
    }

    fn delete_draft(&mut self, id: Uuid) -> Result<(), StoreError> {
        self.state
            .drafts
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::Missing {
                entity: "draft booking",
                id,
            })
    }

    fn find_booking(&self, id: Uuid) -> Result<Option<ConfirmedBooking>, StoreError> {
        Ok(self.state.bookings.get(&id).cloned())
    }

    fn insert_booking(&mut self, booking: &ConfirmedBooking) -> Result<(), StoreError> {
        self.state.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    fn update_booking(&mut self, booking: &ConfirmedBooking) -> Result<(), StoreError> {
        if !self.state.bookings.contains_key(&booking.id) {
            return Err(StoreError::Missing {
                entity: "confirmed booking",
                id: booking.id,
            });
        }
        self.state.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    fn insert_booking_add_on(&mut self, add_on: &BookingAddOn) -> Result<(), StoreError> {
        self.state.booking_add_ons.insert(add_on.id, add_on.clone());
        Ok(())
    }

    fn booking_add_ons(&self, booking_id: Uuid) -> Result<Vec<BookingAddOn>, StoreError> {
        Ok(self
            .state
            .booking_add_ons
            .values()
            .filter(|add_on| add_on.booking_id == booking_id)
            .cloned()
            .collect())
    }

    fn find_payment(&self, id: Uuid) -> Result<Option<PaymentRecord>, StoreError> {
        Ok(self.state.payments.get(&id).cloned())
    }

    fn find_payment_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        Ok(self
            .state
            .payments
            .values()
            .find(|payment| payment.external_payment_id.as_deref() == Some(external_id))
            .cloned())
    }

    fn insert_payment(&mut self, payment: &PaymentRecord) -> Result<(), StoreError> {
        self.state.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    fn update_payment(&mut self, payment: &PaymentRecord) -> Result<(), StoreError> {
        if !self.state.payments.contains_key(&payment.id) {
            return Err(StoreError::Missing {
                entity: "payment record",
                id: payment.id,
            });
        }
        self.state.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    fn insert_refund_request(&mut self, request: &RefundRequest) -> Result<(), StoreError> {
        self.state.refund_requests.insert(request.id, request.clone());
        Ok(())
    }

    fn update_refund_request(&mut self, request: &RefundRequest) -> Result<(), StoreError> {
        if !self.state.refund_requests.contains_key(&request.id) {
            return Err(StoreError::Missing {
                entity: "refund request",
                id: request.id,
            });
        }
        self.state.refund_requests.insert(request.id, request.clone());
        Ok(())
    }

    fn find_open_refund_request(
        &self,
        payment_id: Uuid,
    ) -> Result<Option<RefundRequest>, StoreError> {
        Ok(self
            .state
            .refund_requests
            .values()
            .filter(|request| request.payment_id == payment_id && request.status.is_open())
            .max_by_key(|request| request.requested_at)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hirelane_booking::RefundRequestStatus;

    #[test]
    fn committed_transactions_are_visible() {
        let store = MemoryStore::new();
        let draft = DraftBooking::new();
        let draft_id = draft.id;

        let mut work = |session: &mut dyn StoreSession| -> Result<(), StoreError> {
            session.insert_draft(&draft)
        };
        store.with_transaction(&mut work).unwrap();

        let state = store.snapshot().unwrap();
        assert!(state.drafts.contains_key(&draft_id));
    }

    #[test]
    fn failed_transactions_leave_no_trace() {
        let store = MemoryStore::new();
        let draft = DraftBooking::new();

        let mut work = |session: &mut dyn StoreSession| -> Result<(), StoreError> {
            session.insert_draft(&draft)?;
            Err(StoreError::Backend("boom".to_string()))
        };
        let result = store.with_transaction(&mut work);
        assert!(result.is_err());

        let state = store.snapshot().unwrap();
        assert!(state.drafts.is_empty());
    }

    #[test]
    fn updating_a_missing_row_is_an_error() {
        let store = MemoryStore::new();
        let draft = DraftBooking::new();
        let mut work = |session: &mut dyn StoreSession| -> Result<(), StoreError> {
            session.update_draft(&draft)
        };
        let err = store.with_transaction(&mut work).unwrap_err();
        assert!(matches!(err, StoreError::Missing { .. }));
    }

    #[test]
    fn open_refund_request_lookup_skips_settled_ones() {
        let store = MemoryStore::new();
        let payment_id = Uuid::new_v4();

        let mut settled = RefundRequest::new(payment_id, None, None);
        settled.status = RefundRequestStatus::Rejected;
        let mut open = RefundRequest::new(payment_id, None, None);
        open.status = RefundRequestStatus::Pending;
        let open_id = open.id;

        store
            .seed(|state| {
                state.refund_requests.insert(settled.id, settled.clone());
                state.refund_requests.insert(open.id, open.clone());
            })
            .unwrap();

        let mut work = |session: &mut dyn StoreSession| -> Result<Option<RefundRequest>, StoreError> {
            session.find_open_refund_request(payment_id)
        };
        let found = store.with_transaction(&mut work).unwrap().unwrap();
        assert_eq!(found.id, open_id);
    }
}
