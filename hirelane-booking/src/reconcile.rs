use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hirelane_core::money;
use hirelane_core::notify::{Notification, NotificationSender};
use hirelane_core::RefundPolicy;

use crate::convert::{convert_draft, ConversionArgs, ConversionError};
use crate::models::{
    BookingStatus, ConfirmedBooking, PaymentLink, PaymentOption, PaymentRecord, PaymentStatus,
    RefundRequest, RefundRequestStatus,
};
use crate::repository::{BookingStore, StoreError, StoreSession};

/// Parsed `payment_intent.succeeded` payload. Signature verification and
/// event-type routing happen upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSucceeded {
    pub external_payment_id: String,
    /// Provider status string, mirrored onto the payment record verbatim.
    pub status: String,
    /// The amount actually received, in minor units.
    pub amount_received_minor: i64,
    pub currency: String,
}

/// One refund object as the provider reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRefund {
    pub id: String,
    pub amount_minor: i64,
    pub status: String,
    pub created: i64,
}

/// Parsed refund payload, in either of the provider's two shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum RefundEvent {
    /// `charge.refunded`: the charge carries the authoritative cumulative
    /// `amount_refunded`.
    Charge {
        charge_id: String,
        payment_intent_id: Option<String>,
        amount_refunded_minor: i64,
        currency: String,
        refunds: Vec<ProviderRefund>,
    },
    /// `charge.refund.updated`: the charge must be re-queried for the
    /// cumulative figure; the refund's own amount is only a fallback.
    Refund {
        charge_id: String,
        payment_intent_id: Option<String>,
        currency: String,
        refund: ProviderRefund,
    },
}

impl RefundEvent {
    pub fn charge_id(&self) -> &str {
        match self {
            RefundEvent::Charge { charge_id, .. } | RefundEvent::Refund { charge_id, .. } => {
                charge_id
            }
        }
    }

    pub fn payment_intent_id(&self) -> Option<&str> {
        match self {
            RefundEvent::Charge {
                payment_intent_id, ..
            }
            | RefundEvent::Refund {
                payment_intent_id, ..
            } => payment_intent_id.as_deref(),
        }
    }

    /// Provider id of the most recent refund carried by the event.
    pub fn latest_refund_id(&self) -> Option<String> {
        match self {
            RefundEvent::Charge { refunds, .. } => refunds
                .iter()
                .max_by_key(|refund| refund.created)
                .map(|refund| refund.id.clone()),
            RefundEvent::Refund { refund, .. } => Some(refund.id.clone()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("no payment record for provider payment {0}")]
    PaymentNotFound(String),

    /// The payment no longer references a draft: the success event was
    /// already processed. Callers decide whether to ignore the duplicate.
    #[error("payment record {payment_id} no longer references a draft")]
    DraftAlreadyConverted { payment_id: uuid::Uuid },

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("provider charge lookup failed: {0}")]
    Lookup(String),
}

/// Re-query seam for the provider's charge objects.
#[async_trait]
pub trait ChargeLookup: Send + Sync {
    /// Cumulative amount refunded on the charge, in minor units.
    async fn amount_refunded(&self, charge_id: &str) -> Result<i64, GatewayError>;
}

/// What a refund event ended up doing.
#[derive(Debug)]
pub enum RefundOutcome {
    /// Nothing refundable: zero or negative deduced amount.
    NoChange,
    Applied {
        payment: PaymentRecord,
        booking: Option<ConfirmedBooking>,
        request: Option<RefundRequest>,
    },
}

/// Consumes payment-provider events and drives payment, booking and
/// refund-request state, converting drafts on success and reconciling
/// cumulative refund totals. All state changes happen inside one store
/// transaction per event; notifications go out only after commit.
pub struct PaymentReconciliationHandler<S> {
    store: Arc<S>,
    notifier: Arc<dyn NotificationSender>,
    charges: Arc<dyn ChargeLookup>,
    admin_email: Option<String>,
}

pub(crate) fn payment_status_for(option: Option<PaymentOption>) -> PaymentStatus {
    match option {
        Some(PaymentOption::OnlineFull) => PaymentStatus::Paid,
        Some(PaymentOption::OnlineDeposit) => PaymentStatus::DepositPaid,
        Some(PaymentOption::InStoreFull) => PaymentStatus::Unpaid,
        None => PaymentStatus::Unpaid,
    }
}

impl<S: BookingStore> PaymentReconciliationHandler<S> {
    pub fn new(
        store: Arc<S>,
        notifier: Arc<dyn NotificationSender>,
        charges: Arc<dyn ChargeLookup>,
        admin_email: Option<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            charges,
            admin_email,
        }
    }

    /// Handle a successful payment: convert the linked draft, mirror the
    /// provider status, notify. A payment whose draft link is already gone
    /// raises [`ReconcileError::DraftAlreadyConverted`] so the dispatcher can
    /// acknowledge the duplicate instead of double-converting.
    pub async fn handle_payment_succeeded(
        &self,
        event: &PaymentSucceeded,
        refund_policy: &RefundPolicy,
    ) -> Result<ConfirmedBooking, ReconcileError> {
        let mut work = |session: &mut dyn StoreSession| -> Result<ConfirmedBooking, ReconcileError> {
            let payment = session
                .find_payment_by_external_id(&event.external_payment_id)?
                .ok_or_else(|| {
                    ReconcileError::PaymentNotFound(event.external_payment_id.clone())
                })?;

            let draft_id = match payment.link {
                PaymentLink::Draft(id) => id,
                _ => {
                    return Err(ReconcileError::DraftAlreadyConverted {
                        payment_id: payment.id,
                    })
                }
            };
            let draft = session
                .find_draft(draft_id)?
                .ok_or(ConversionError::DraftNotFound(draft_id))
                .map_err(ReconcileError::from)?;

            if draft.payment_option.is_none() {
                tracing::warn!(
                    draft = %draft_id,
                    "draft has no payment option; treating the booking as unpaid"
                );
            }
            let args = ConversionArgs {
                payment_method: draft.payment_option.unwrap_or(PaymentOption::InStoreFull),
                payment_status: payment_status_for(draft.payment_option),
                amount_paid: money::from_minor_units(event.amount_received_minor),
                external_payment_id: Some(event.external_payment_id.clone()),
                payment_id: Some(payment.id),
            };
            let booking = convert_draft(session, draft_id, &args, refund_policy)?;

            // Mirror the provider's own status onto the payment record.
            let mut payment = session
                .find_payment(payment.id)?
                .ok_or(ConversionError::PaymentRecordNotFound(payment.id))
                .map_err(ReconcileError::from)?;
            if payment.status != event.status {
                payment.status = event.status.clone();
                payment.updated_at = Utc::now();
                session.update_payment(&payment)?;
            }

            Ok(booking)
        };
        let booking = self.store.with_transaction(&mut work)?;

        tracing::info!(
            reference = %booking.reference,
            payment = %event.external_payment_id,
            "payment succeeded; booking confirmed"
        );
        self.send_booking_notifications(&booking).await;
        Ok(booking)
    }

    /// Reconcile a full or partial refund against payment, booking and any
    /// outstanding refund request. A deduced amount of zero (including a
    /// failed refund with nothing netted on the charge) is a benign no-op.
    pub async fn handle_refund(&self, event: &RefundEvent) -> Result<RefundOutcome, ReconcileError> {
        let refunded_amount = self.deduce_refunded_amount(event).await;
        if refunded_amount <= Decimal::ZERO {
            tracing::info!(
                charge = %event.charge_id(),
                "refund event with nothing refunded; no action taken"
            );
            return Ok(RefundOutcome::NoChange);
        }

        let external_id = event
            .payment_intent_id()
            .ok_or_else(|| ReconcileError::PaymentNotFound(event.charge_id().to_string()))?
            .to_string();
        let latest_refund_id = event.latest_refund_id();

        let mut work = |session: &mut dyn StoreSession| -> Result<
            (PaymentRecord, Option<ConfirmedBooking>, Option<RefundRequest>),
            ReconcileError,
        > {
            let mut payment = session
                .find_payment_by_external_id(&external_id)?
                .ok_or_else(|| ReconcileError::PaymentNotFound(external_id.clone()))?;

            let fully_refunded = refunded_amount >= payment.amount;
            payment.refunded_amount = refunded_amount;
            payment.status = if fully_refunded {
                "refunded".to_string()
            } else {
                "partially_refunded".to_string()
            };
            payment.updated_at = Utc::now();
            session.update_payment(&payment)?;

            let mut booking = None;
            if let PaymentLink::Booking(booking_id) = payment.link {
                if let Some(mut confirmed) = session.find_booking(booking_id)? {
                    confirmed.payment_status = if fully_refunded {
                        PaymentStatus::Refunded
                    } else {
                        PaymentStatus::PartiallyRefunded
                    };
                    // Partial refunds never cancel the booking.
                    if fully_refunded {
                        confirmed.status = BookingStatus::Cancelled;
                    }
                    confirmed.updated_at = Utc::now();
                    session.update_booking(&confirmed)?;
                    booking = Some(confirmed);
                }
            }

            let mut request = None;
            if let Some(mut open) = session.find_open_refund_request(payment.id)? {
                let requested = open.amount_to_refund.unwrap_or(payment.amount);
                open.amount_to_refund = Some(refunded_amount);
                open.status = if refunded_amount >= requested {
                    RefundRequestStatus::Refunded
                } else {
                    RefundRequestStatus::PartiallyRefunded
                };
                // Keep the id recorded when the refund was initiated.
                if open.external_refund_id.is_none() {
                    open.external_refund_id = latest_refund_id.clone();
                }
                open.processed_at = Some(Utc::now());
                session.update_refund_request(&open)?;
                request = Some(open);
            }

            Ok((payment, booking, request))
        };
        let (payment, booking, request) = self.store.with_transaction(&mut work)?;

        tracing::info!(
            payment = %external_id,
            refunded = %refunded_amount,
            status = %payment.status,
            "refund reconciled"
        );
        self.send_refund_notifications(&payment, booking.as_ref(), refunded_amount)
            .await;

        Ok(RefundOutcome::Applied {
            payment,
            booking,
            request,
        })
    }

    /// The cumulative refunded amount this event stands for. Charge payloads
    /// carry it directly; refund payloads trigger a charge re-query, falling
    /// back to the refund's own amount when the lookup fails.
    async fn deduce_refunded_amount(&self, event: &RefundEvent) -> Decimal {
        match event {
            RefundEvent::Charge {
                amount_refunded_minor,
                ..
            } => money::from_minor_units(*amount_refunded_minor),
            RefundEvent::Refund {
                charge_id, refund, ..
            } => match self.charges.amount_refunded(charge_id).await {
                Ok(total_minor) => money::from_minor_units(total_minor),
                Err(err) => {
                    tracing::warn!(
                        charge = %charge_id,
                        error = %err,
                        "charge lookup failed; falling back to the refund's own amount"
                    );
                    money::from_minor_units(refund.amount_minor)
                }
            },
        }
    }

    async fn send_booking_notifications(&self, booking: &ConfirmedBooking) {
        let context = serde_json::json!({
            "booking_reference": booking.reference,
            "customer_name": booking.customer_name,
            "pickup_date": booking.interval.pickup_date,
            "return_date": booking.interval.return_date,
            "grand_total": booking.breakdown.grand_total,
            "amount_paid": booking.amount_paid,
            "currency": booking.currency,
        });

        if let Some(email) = &booking.customer_email {
            self.dispatch(Notification {
                recipients: vec![email.clone()],
                subject: format!(
                    "Your Vehicle Hire Booking Confirmation - {}",
                    booking.reference
                ),
                template_key: "booking_confirmation_user".to_string(),
                context: context.clone(),
            })
            .await;
        }
        if let Some(admin) = &self.admin_email {
            self.dispatch(Notification {
                recipients: vec![admin.clone()],
                subject: format!("New Vehicle Hire Booking (Online) - {}", booking.reference),
                template_key: "booking_confirmation_admin".to_string(),
                context,
            })
            .await;
        }
    }

    async fn send_refund_notifications(
        &self,
        payment: &PaymentRecord,
        booking: Option<&ConfirmedBooking>,
        refunded_amount: Decimal,
    ) {
        let booking_reference = booking.map(|b| b.reference.as_str()).unwrap_or("N/A");
        let context = serde_json::json!({
            "booking_reference": booking_reference,
            "customer_name": booking.and_then(|b| b.customer_name.clone()),
            "refunded_amount": refunded_amount,
            "payment_status": payment.status,
            "currency": payment.currency,
        });

        if let Some(email) = booking.and_then(|b| b.customer_email.clone()) {
            self.dispatch(Notification {
                recipients: vec![email],
                subject: format!(
                    "Your Refund for Booking {booking_reference} Has Been Processed"
                ),
                template_key: "refund_processed_user".to_string(),
                context: context.clone(),
            })
            .await;
        }
        if let Some(admin) = &self.admin_email {
            self.dispatch(Notification {
                recipients: vec![admin.clone()],
                subject: format!("Refund Processed for Booking {booking_reference}"),
                template_key: "refund_processed_admin".to_string(),
                context,
            })
            .await;
        }
    }

    /// Delivery is best-effort: state is already committed, and a provider
    /// retry for a send failure would surface as a duplicate event.
    async fn dispatch(&self, notification: Notification) {
        if let Err(err) = self.notifier.send(notification).await {
            tracing::error!(error = %err, "notification delivery failed");
        }
    }
}
