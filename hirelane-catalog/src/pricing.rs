use rust_decimal::Decimal;

use hirelane_core::money::quantize;
use hirelane_core::{BillingInterval, PricingSettings, PricingStrategy, RatePair};

const HOURS_PER_DAY: u32 = 24;

/// Price a rate pair over a billing interval.
///
/// Pure and total. Missing rates (after defaulting) and non-positive
/// durations price to zero by policy, never by error. Precedence:
///
/// 1. overnight hires under 24 hours bill exactly one daily rate, whatever
///    the strategy;
/// 2. same-day hires bill hourly, hours rounded up, one hour minimum;
/// 3. everything else decomposes into full days plus excess hours under the
///    configured strategy.
pub fn price_for_duration(
    interval: &BillingInterval,
    rates: RatePair,
    strategy: PricingStrategy,
    settings: &PricingSettings,
) -> Decimal {
    let Some((daily_rate, hourly_rate)) = rates.with_defaults(settings).resolve() else {
        return Decimal::ZERO;
    };

    let duration_hours = interval.duration_hours();
    if duration_hours <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    // Overnight but under a day: one daily rate, flat.
    if !interval.is_same_day() && duration_hours < Decimal::from(HOURS_PER_DAY) {
        return quantize(daily_rate);
    }

    if interval.is_same_day() {
        let billed_hours = duration_hours.ceil().max(Decimal::ONE);
        return quantize(billed_hours * hourly_rate);
    }

    let margin = Decimal::from(settings.excess_hours_margin);
    let price = match strategy {
        PricingStrategy::Flat24Hour => flat_24_hour(duration_hours, daily_rate),
        PricingStrategy::TwentyFourHourPlusMargin => {
            margin_billing(duration_hours, daily_rate, margin)
        }
        PricingStrategy::TwentyFourHourCustomerFriendly => {
            customer_friendly_billing(duration_hours, daily_rate, hourly_rate)
        }
        PricingStrategy::DailyPlusExcessHourly => {
            excess_hourly_billing(duration_hours, daily_rate, hourly_rate)
        }
        PricingStrategy::DailyPlusProportionalExcess => {
            proportional_excess_billing(duration_hours, daily_rate)
        }
        PricingStrategy::TwentyFourHourPlusMarginProportional => {
            margin_proportional_billing(duration_hours, daily_rate, margin)
        }
    };
    quantize(price)
}

fn days(duration_hours: Decimal) -> Decimal {
    duration_hours / Decimal::from(HOURS_PER_DAY)
}

fn full_days(duration_hours: Decimal) -> Decimal {
    days(duration_hours).floor()
}

fn excess_hours(duration_hours: Decimal) -> Decimal {
    duration_hours % Decimal::from(HOURS_PER_DAY)
}

/// Any partial day, however small, rounds up to a full billed day.
fn flat_24_hour(duration_hours: Decimal, daily_rate: Decimal) -> Decimal {
    days(duration_hours).ceil() * daily_rate
}

/// Excess hours within the margin are free; beyond it, a full extra day.
fn margin_billing(duration_hours: Decimal, daily_rate: Decimal, margin: Decimal) -> Decimal {
    let excess = excess_hours(duration_hours);
    let extra = if excess > Decimal::ZERO && excess > margin {
        daily_rate
    } else {
        Decimal::ZERO
    };
    full_days(duration_hours) * daily_rate + extra
}

/// Excess hours billed hourly (rounded up), but never more than a daily rate.
fn customer_friendly_billing(
    duration_hours: Decimal,
    daily_rate: Decimal,
    hourly_rate: Decimal,
) -> Decimal {
    let excess = excess_hours(duration_hours);
    let extra = if excess > Decimal::ZERO {
        (excess.ceil() * hourly_rate).min(daily_rate)
    } else {
        Decimal::ZERO
    };
    full_days(duration_hours) * daily_rate + extra
}

fn excess_hourly_billing(
    duration_hours: Decimal,
    daily_rate: Decimal,
    hourly_rate: Decimal,
) -> Decimal {
    let excess = excess_hours(duration_hours);
    let extra = if excess > Decimal::ZERO {
        excess.ceil() * hourly_rate
    } else {
        Decimal::ZERO
    };
    full_days(duration_hours) * daily_rate + extra
}

/// Excess billed as its fraction of a day, quantized before summation.
fn proportional_excess_billing(duration_hours: Decimal, daily_rate: Decimal) -> Decimal {
    let excess = excess_hours(duration_hours);
    let extra = if excess > Decimal::ZERO {
        quantize(days(excess) * daily_rate)
    } else {
        Decimal::ZERO
    };
    full_days(duration_hours) * daily_rate + extra
}

/// Excess beyond the margin billed proportionally; within it, free.
fn margin_proportional_billing(
    duration_hours: Decimal,
    daily_rate: Decimal,
    margin: Decimal,
) -> Decimal {
    let excess = excess_hours(duration_hours);
    let extra = if excess > Decimal::ZERO && excess > margin {
        quantize(days(excess - margin) * daily_rate)
    } else {
        Decimal::ZERO
    };
    full_days(duration_hours) * daily_rate + extra
}
