use rust_decimal::{Decimal, RoundingStrategy};

/// Provider amounts arrive in minor units (cents).
const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Round a monetary amount to 2 decimal places, half-up.
pub fn quantize(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a provider minor-unit amount into a major-unit decimal.
pub fn from_minor_units(minor: i64) -> Decimal {
    quantize(Decimal::from(minor) / Decimal::from(MINOR_UNITS_PER_MAJOR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_rounds_half_up() {
        let amount: Decimal = "10.005".parse().unwrap();
        assert_eq!(quantize(amount), "10.01".parse::<Decimal>().unwrap());

        let amount: Decimal = "10.004".parse().unwrap();
        assert_eq!(quantize(amount), "10.00".parse::<Decimal>().unwrap());
    }

    #[test]
    fn minor_units_convert_to_major() {
        assert_eq!(from_minor_units(30000), Decimal::from(300));
        assert_eq!(from_minor_units(2550), "25.50".parse::<Decimal>().unwrap());
        assert_eq!(from_minor_units(1), "0.01".parse::<Decimal>().unwrap());
    }
}
