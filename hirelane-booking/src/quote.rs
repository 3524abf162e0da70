use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hirelane_catalog::{price_for_duration, AddOn};
use hirelane_core::money::quantize;
use hirelane_core::settings::DEFAULT_CURRENCY;
use hirelane_core::{BillingInterval, DepositMethod, PricingSettings};

use crate::models::DraftBooking;

/// Itemized totals for a booking. `grand_total` is always the sum of the
/// three component prices; the deposit is carried alongside, not subtracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub vehicle_price: Decimal,
    pub package_price: Decimal,
    pub add_ons_total: Decimal,
    pub grand_total: Decimal,
    pub deposit_amount: Decimal,
    pub currency: String,
}

impl PriceBreakdown {
    pub fn zero(currency: impl Into<String>) -> Self {
        Self {
            vehicle_price: Decimal::ZERO,
            package_price: Decimal::ZERO,
            add_ons_total: Decimal::ZERO,
            grand_total: Decimal::ZERO,
            deposit_amount: Decimal::ZERO,
            currency: currency.into(),
        }
    }
}

impl Default for PriceBreakdown {
    fn default() -> Self {
        Self::zero(DEFAULT_CURRENCY)
    }
}

/// Per-unit price of an add-on over the interval. Quantity multiplies this
/// afterwards; it never changes the duration logic.
pub fn addon_unit_price(
    interval: Option<&BillingInterval>,
    addon: &AddOn,
    settings: &PricingSettings,
) -> Decimal {
    match interval {
        Some(interval) => price_for_duration(interval, addon.rates(), settings.strategy, settings),
        None => Decimal::ZERO,
    }
}

/// Combine vehicle, package and add-on prices into the booking totals.
///
/// With any interval field missing every component is zero; the currency
/// still resolves so the breakdown remains displayable.
pub fn aggregate(draft: &DraftBooking, settings: &PricingSettings) -> PriceBreakdown {
    let currency = settings.currency();

    let Some(interval) = draft.interval else {
        return PriceBreakdown::zero(currency);
    };

    let vehicle_price = draft
        .vehicle
        .as_ref()
        .map(|vehicle| price_for_duration(&interval, vehicle.rates(), settings.strategy, settings))
        .unwrap_or(Decimal::ZERO);

    let package_price = draft
        .package
        .as_ref()
        .map(|package| price_for_duration(&interval, package.rates(), settings.strategy, settings))
        .unwrap_or(Decimal::ZERO);

    let add_ons_total: Decimal = draft
        .add_ons
        .iter()
        .filter(|selection| selection.quantity > 0)
        .map(|selection| {
            addon_unit_price(Some(&interval), &selection.addon, settings)
                * Decimal::from(selection.quantity)
        })
        .sum();

    let grand_total = vehicle_price + package_price + add_ons_total;

    let deposit_amount = if settings.deposit_enabled {
        match settings.deposit_method {
            DepositMethod::Percentage => settings
                .deposit_percentage
                .map(|pct| quantize(grand_total * pct / Decimal::from(100)))
                .unwrap_or(Decimal::ZERO),
            DepositMethod::FlatFee => settings
                .deposit_flat_fee
                .map(quantize)
                .unwrap_or(Decimal::ZERO),
        }
    } else {
        Decimal::ZERO
    };

    PriceBreakdown {
        vehicle_price,
        package_price,
        add_ons_total,
        grand_total,
        deposit_amount,
        currency: currency.to_string(),
    }
}
