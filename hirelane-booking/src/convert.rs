use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use hirelane_core::RefundPolicy;

use crate::models::{
    generate_reference, BookingAddOn, BookingStatus, ConfirmedBooking, PaymentLink, PaymentOption,
    PaymentStatus,
};
use crate::repository::{BookingStore, StoreError, StoreSession};

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// Also raised when conversion is attempted twice: the first success
    /// deleted the draft.
    #[error("draft booking {0} not found")]
    DraftNotFound(Uuid),

    #[error("draft booking {draft_id} is missing its {field}")]
    DraftIncomplete { draft_id: Uuid, field: &'static str },

    #[error("payment record {0} not found")]
    PaymentRecordNotFound(Uuid),

    #[error("payment record {payment_id} is already linked to booking {booking_id}")]
    PaymentAlreadyLinked { payment_id: Uuid, booking_id: Uuid },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Inputs for one conversion, established by whoever observed the payment.
#[derive(Debug, Clone)]
pub struct ConversionArgs {
    pub payment_method: PaymentOption,
    pub payment_status: PaymentStatus,
    /// The amount actually received, not the amount requested.
    pub amount_paid: Decimal,
    pub external_payment_id: Option<String>,
    pub payment_id: Option<Uuid>,
}

/// Materialize a draft into a confirmed booking within an already-open
/// session: create the booking, copy each add-on selection into an
/// independent record, re-point the payment record from the draft to the
/// booking (freezing the refund policy onto it), and delete the draft.
///
/// Any error leaves the transaction to roll the whole sequence back.
pub fn convert_draft(
    session: &mut dyn StoreSession,
    draft_id: Uuid,
    args: &ConversionArgs,
    refund_policy: &RefundPolicy,
) -> Result<ConfirmedBooking, ConversionError> {
    let draft = session
        .find_draft(draft_id)?
        .ok_or(ConversionError::DraftNotFound(draft_id))?;

    let interval = draft.interval.ok_or(ConversionError::DraftIncomplete {
        draft_id,
        field: "interval",
    })?;
    let vehicle = draft
        .vehicle
        .clone()
        .ok_or(ConversionError::DraftIncomplete {
            draft_id,
            field: "vehicle",
        })?;

    let now = Utc::now();
    let booking = ConfirmedBooking {
        id: Uuid::new_v4(),
        reference: generate_reference(),
        interval,
        vehicle,
        package: draft.package.clone(),
        breakdown: draft.breakdown.clone(),
        amount_paid: args.amount_paid,
        payment_method: args.payment_method,
        payment_status: args.payment_status,
        status: BookingStatus::Confirmed,
        currency: draft.breakdown.currency.clone(),
        payment_id: args.payment_id,
        external_payment_id: args.external_payment_id.clone(),
        customer_name: draft.customer_name.clone(),
        customer_email: draft.customer_email.clone(),
        created_at: now,
        updated_at: now,
    };
    session.insert_booking(&booking)?;
    tracing::info!(
        reference = %booking.reference,
        draft = %draft_id,
        "created confirmed booking from draft"
    );

    for selection in &draft.add_ons {
        session.insert_booking_add_on(&BookingAddOn {
            id: Uuid::new_v4(),
            booking_id: booking.id,
            addon: selection.addon.clone(),
            quantity: selection.quantity,
            booked_unit_price: selection.booked_unit_price,
        })?;
    }

    if let Some(payment_id) = args.payment_id {
        let mut payment = session
            .find_payment(payment_id)?
            .ok_or(ConversionError::PaymentRecordNotFound(payment_id))?;
        if let PaymentLink::Booking(booking_id) = payment.link {
            return Err(ConversionError::PaymentAlreadyLinked {
                payment_id,
                booking_id,
            });
        }
        payment.link = PaymentLink::Booking(booking.id);
        if payment.external_payment_id.is_none() {
            payment.external_payment_id = args.external_payment_id.clone();
        }
        payment.refund_policy_snapshot = refund_policy.snapshot();
        payment.updated_at = Utc::now();
        session.update_payment(&payment)?;
    }

    session.delete_draft(draft_id)?;
    tracing::info!(draft = %draft_id, "draft booking deleted after conversion");

    Ok(booking)
}

/// Runs [`convert_draft`] inside a single store transaction: either the
/// booking and its add-on copies exist, the payment is re-linked and the
/// draft is gone, or none of it happened.
pub struct BookingConversionService<S> {
    store: Arc<S>,
}

impl<S: BookingStore> BookingConversionService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn convert(
        &self,
        draft_id: Uuid,
        args: &ConversionArgs,
        refund_policy: &RefundPolicy,
    ) -> Result<ConfirmedBooking, ConversionError> {
        let mut work = |session: &mut dyn StoreSession| -> Result<ConfirmedBooking, ConversionError> {
            convert_draft(session, draft_id, args, refund_policy)
        };
        self.store.with_transaction(&mut work)
    }
}
