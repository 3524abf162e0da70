use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hirelane_catalog::{AddOn, Package, Vehicle};
use hirelane_core::BillingInterval;

use crate::quote::PriceBreakdown;

const REFERENCE_PREFIX: &str = "HIRE-";
const REFERENCE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const REFERENCE_LEN: usize = 8;

/// How the customer chose to pay at the end of the booking flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOption {
    OnlineFull,
    OnlineDeposit,
    InStoreFull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    DepositPaid,
    Paid,
    PartiallyRefunded,
    Refunded,
}

/// Lifecycle of a confirmed booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundRequestStatus {
    Unverified,
    Pending,
    Approved,
    PartiallyRefunded,
    Refunded,
    Rejected,
}

impl RefundRequestStatus {
    /// Statuses still awaiting a terminal outcome from reconciliation.
    pub fn is_open(self) -> bool {
        matches!(
            self,
            RefundRequestStatus::Unverified
                | RefundRequestStatus::Pending
                | RefundRequestStatus::Approved
                | RefundRequestStatus::PartiallyRefunded
        )
    }
}

/// What a payment record currently belongs to. Exactly one side is populated
/// while the payment is in flight; conversion moves the link from the draft
/// to the confirmed booking in the same transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PaymentLink {
    Draft(Uuid),
    Booking(Uuid),
    Unlinked,
}

impl PaymentLink {
    pub fn draft_id(self) -> Option<Uuid> {
        match self {
            PaymentLink::Draft(id) => Some(id),
            _ => None,
        }
    }

    pub fn booking_id(self) -> Option<Uuid> {
        match self {
            PaymentLink::Booking(id) => Some(id),
            _ => None,
        }
    }
}

/// An add-on selected on a draft, with the unit price snapshotted at
/// selection time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftAddOn {
    pub addon: AddOn,
    pub quantity: u32,
    pub booked_unit_price: Decimal,
}

/// Booking-in-progress, keyed by an opaque session token. Mutated at every
/// wizard step and destroyed exactly once, by conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftBooking {
    pub id: Uuid,
    pub session_token: Uuid,
    pub interval: Option<BillingInterval>,
    pub vehicle: Option<Vehicle>,
    pub package: Option<Package>,
    pub add_ons: Vec<DraftAddOn>,
    pub payment_option: Option<PaymentOption>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    /// Last-computed price breakdown, refreshed after every mutation.
    pub breakdown: PriceBreakdown,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DraftBooking {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            session_token: Uuid::new_v4(),
            interval: None,
            vehicle: None,
            package: None,
            add_ons: Vec::new(),
            payment_option: None,
            customer_name: None,
            customer_email: None,
            breakdown: PriceBreakdown::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for DraftBooking {
    fn default() -> Self {
        Self::new()
    }
}

/// Independent copy of a draft selection, owned by a confirmed booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingAddOn {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub addon: AddOn,
    pub quantity: u32,
    pub booked_unit_price: Decimal,
}

/// The permanent booking record. Immutable once created, except for the
/// payment and lifecycle status fields driven by reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedBooking {
    pub id: Uuid,
    pub reference: String,
    pub interval: BillingInterval,
    pub vehicle: Vehicle,
    pub package: Option<Package>,
    pub breakdown: PriceBreakdown,
    pub amount_paid: Decimal,
    pub payment_method: PaymentOption,
    pub payment_status: PaymentStatus,
    pub status: BookingStatus,
    pub currency: String,
    pub payment_id: Option<Uuid>,
    pub external_payment_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Generate a booking reference: fixed prefix plus 8 random uppercase
/// alphanumerics. Collisions are treated as practically impossible.
pub fn generate_reference() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..REFERENCE_LEN)
        .map(|_| REFERENCE_CHARSET[rng.gen_range(0..REFERENCE_CHARSET.len())] as char)
        .collect();
    format!("{REFERENCE_PREFIX}{suffix}")
}

/// Mirror of the provider's payment object. The status field carries the
/// provider's own vocabulary verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub link: PaymentLink,
    pub external_payment_id: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub refunded_amount: Decimal,
    /// Refund policy in force when the booking was taken, frozen at
    /// conversion time.
    pub refund_policy_snapshot: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn for_draft(draft_id: Uuid, amount: Decimal, currency: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            link: PaymentLink::Draft(draft_id),
            external_payment_id: None,
            amount,
            currency: currency.into(),
            status: "requires_payment_method".to_string(),
            refunded_amount: Decimal::ZERO,
            refund_policy_snapshot: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A customer's or operator's request to refund a payment. Created outside
/// the engine; its terminal state and final amount are set only by
/// reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundRequest {
    pub id: Uuid,
    pub booking_id: Option<Uuid>,
    pub payment_id: Uuid,
    /// Requested amount on creation; overwritten with the actual refunded
    /// amount once the provider settles.
    pub amount_to_refund: Option<Decimal>,
    pub status: RefundRequestStatus,
    pub reason: Option<String>,
    pub external_refund_id: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl RefundRequest {
    pub fn new(payment_id: Uuid, booking_id: Option<Uuid>, amount: Option<Decimal>) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id,
            payment_id,
            amount_to_refund: amount,
            status: RefundRequestStatus::Unverified,
            reason: None,
            external_refund_id: None,
            requested_at: Utc::now(),
            processed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_has_prefix_and_uppercase_suffix() {
        let reference = generate_reference();
        assert!(reference.starts_with("HIRE-"));
        let suffix = &reference["HIRE-".len()..];
        assert_eq!(suffix.len(), 8);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn payment_option_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentOption::OnlineDeposit).unwrap(),
            "\"online_deposit\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentOption::InStoreFull).unwrap(),
            "\"in_store_full\""
        );
    }

    #[test]
    fn payment_link_is_one_sided() {
        let link = PaymentLink::Draft(Uuid::new_v4());
        assert!(link.draft_id().is_some());
        assert!(link.booking_id().is_none());
    }
}
