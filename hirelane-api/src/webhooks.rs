use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use hirelane_booking::{PaymentSucceeded, ProviderRefund, ReconcileError, RefundEvent};

use crate::error::AppError;
use crate::state::AppState;

/// Provider event envelope. Signature verification happens before the
/// request reaches this handler; only the parsed payload arrives here.
#[derive(Debug, Deserialize)]
pub struct ProviderEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct PaymentIntentObject {
    id: String,
    status: String,
    #[serde(default)]
    amount_received: i64,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct ChargeObject {
    id: String,
    payment_intent: Option<String>,
    #[serde(default)]
    amount_refunded: i64,
    currency: String,
    refunds: Option<RefundList>,
}

#[derive(Debug, Deserialize)]
struct RefundList {
    #[serde(default)]
    data: Vec<RefundObjectPayload>,
}

#[derive(Debug, Deserialize)]
struct RefundObjectPayload {
    id: String,
    #[serde(default)]
    amount: i64,
    status: String,
    #[serde(default)]
    created: i64,
    charge: Option<String>,
    payment_intent: Option<String>,
    #[serde(default)]
    currency: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/webhooks/payments", post(handle_payment_webhook))
}

/// POST /v1/webhooks/payments
///
/// Delivery is at-least-once and possibly out of order. Duplicate or
/// unmatchable events are acknowledged with 200 so the provider stops
/// retrying; transactional failures return 500 so it redelivers.
pub async fn handle_payment_webhook(
    State(state): State<AppState>,
    Json(event): Json<ProviderEvent>,
) -> Result<StatusCode, AppError> {
    tracing::info!(event_type = %event.type_, event_id = %event.id, "provider webhook received");

    match event.type_.as_str() {
        "payment_intent.succeeded" => {
            let object: PaymentIntentObject = serde_json::from_value(event.data.object)
                .map_err(|err| {
                    AppError::ValidationError(format!("malformed payment intent payload: {err}"))
                })?;
            let parsed = PaymentSucceeded {
                external_payment_id: object.id,
                status: object.status,
                amount_received_minor: object.amount_received,
                currency: object.currency,
            };
            match state
                .reconciliation()
                .handle_payment_succeeded(&parsed, &state.refund_policy)
                .await
            {
                Ok(_) => Ok(StatusCode::OK),
                Err(ReconcileError::DraftAlreadyConverted { payment_id }) => {
                    tracing::warn!(payment = %payment_id, "duplicate success event acknowledged");
                    Ok(StatusCode::OK)
                }
                Err(ReconcileError::PaymentNotFound(external_id)) => {
                    tracing::warn!(payment = %external_id, "success event for unknown payment acknowledged");
                    Ok(StatusCode::OK)
                }
                Err(err) => Err(AppError::InternalServerError(err.to_string())),
            }
        }
        "charge.refunded" => {
            let charge: ChargeObject = serde_json::from_value(event.data.object)
                .map_err(|err| AppError::ValidationError(format!("malformed charge payload: {err}")))?;
            let refunds = charge
                .refunds
                .map(|list| list.data)
                .unwrap_or_default()
                .into_iter()
                .map(|refund| ProviderRefund {
                    id: refund.id,
                    amount_minor: refund.amount,
                    status: refund.status,
                    created: refund.created,
                })
                .collect();
            let parsed = RefundEvent::Charge {
                charge_id: charge.id,
                payment_intent_id: charge.payment_intent,
                amount_refunded_minor: charge.amount_refunded,
                currency: charge.currency,
                refunds,
            };
            dispatch_refund(&state, parsed).await
        }
        "charge.refund.updated" => {
            let refund: RefundObjectPayload = serde_json::from_value(event.data.object)
                .map_err(|err| AppError::ValidationError(format!("malformed refund payload: {err}")))?;
            let charge_id = refund.charge.clone().ok_or_else(|| {
                AppError::ValidationError("refund payload has no charge id".to_string())
            })?;
            let parsed = RefundEvent::Refund {
                charge_id,
                payment_intent_id: refund.payment_intent.clone(),
                currency: refund.currency.clone().unwrap_or_default(),
                refund: ProviderRefund {
                    id: refund.id,
                    amount_minor: refund.amount,
                    status: refund.status,
                    created: refund.created,
                },
            };
            dispatch_refund(&state, parsed).await
        }
        other => {
            tracing::info!(event_type = %other, "unhandled event type acknowledged");
            Ok(StatusCode::OK)
        }
    }
}

async fn dispatch_refund(state: &AppState, event: RefundEvent) -> Result<StatusCode, AppError> {
    match state.reconciliation().handle_refund(&event).await {
        Ok(_) => Ok(StatusCode::OK),
        Err(ReconcileError::PaymentNotFound(external_id)) => {
            tracing::warn!(payment = %external_id, "refund event for unknown payment acknowledged");
            Ok(StatusCode::OK)
        }
        Err(err) => Err(AppError::InternalServerError(err.to_string())),
    }
}
