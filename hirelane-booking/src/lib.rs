pub mod convert;
pub mod draft;
pub mod models;
pub mod quote;
pub mod reconcile;
pub mod repository;

pub use convert::{BookingConversionService, ConversionArgs, ConversionError};
pub use models::{
    BookingAddOn, BookingStatus, ConfirmedBooking, DraftAddOn, DraftBooking, PaymentLink,
    PaymentOption, PaymentRecord, PaymentStatus, RefundRequest, RefundRequestStatus,
};
pub use quote::PriceBreakdown;
pub use reconcile::{
    ChargeLookup, GatewayError, PaymentReconciliationHandler, PaymentSucceeded, ProviderRefund,
    ReconcileError, RefundEvent, RefundOutcome,
};
pub use repository::{BookingStore, StoreError, StoreSession};
