use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use hirelane_booking::{DraftBooking, PriceBreakdown};
use hirelane_catalog::{AddOn, Package, Vehicle};
use hirelane_core::BillingInterval;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub interval: BillingInterval,
    pub vehicle: Vehicle,
    pub package: Option<Package>,
    #[serde(default)]
    pub add_ons: Vec<QuoteAddOn>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteAddOn {
    pub addon: AddOn,
    pub quantity: u32,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/quotes", post(quote))
}

/// POST /v1/quotes
///
/// Price a prospective booking without persisting anything. Runs the same
/// mutation validation the booking flow uses, so bad input comes back as a
/// field-scoped 400 instead of a silently wrong price.
pub async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<PriceBreakdown>, AppError> {
    let mut draft = DraftBooking::new();
    draft
        .set_interval(request.interval)
        .map_err(|err| AppError::ValidationError(err.to_string()))?;
    draft
        .set_vehicle(request.vehicle)
        .map_err(|err| AppError::ValidationError(err.to_string()))?;
    draft
        .set_package(request.package)
        .map_err(|err| AppError::ValidationError(err.to_string()))?;
    for selection in request.add_ons {
        draft
            .select_add_on(selection.addon, selection.quantity, &state.pricing)
            .map_err(|err| AppError::ValidationError(err.to_string()))?;
    }
    draft.refresh_totals(&state.pricing);
    Ok(Json(draft.breakdown))
}
