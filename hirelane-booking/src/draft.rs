use uuid::Uuid;

use hirelane_catalog::{AddOn, Package, Vehicle};
use hirelane_core::{BillingInterval, PricingSettings, ValidationError};

use crate::models::{DraftAddOn, DraftBooking, PaymentOption};
use crate::quote;

/// Mutation API used by the booking flow. Every mutation either applies
/// cleanly or reports a field-scoped failure; nothing is coerced.
impl DraftBooking {
    pub fn set_interval(&mut self, interval: BillingInterval) -> Result<(), ValidationError> {
        if interval.return_at() <= interval.pickup_at() {
            return Err(ValidationError::new(
                "return_time",
                "Return must be after pickup.",
            ));
        }
        self.interval = Some(interval);
        self.touch();
        Ok(())
    }

    pub fn set_vehicle(&mut self, vehicle: Vehicle) -> Result<(), ValidationError> {
        if !vehicle.is_available {
            return Err(ValidationError::new(
                "vehicle",
                format!("{} is no longer available.", vehicle.name),
            ));
        }
        self.vehicle = Some(vehicle);
        self.touch();
        Ok(())
    }

    /// Select or clear the package. Existing add-on selections are
    /// re-validated against the new package's bundling rules; a conflicting
    /// selection is reported, not dropped.
    pub fn set_package(&mut self, package: Option<Package>) -> Result<(), ValidationError> {
        if let Some(package) = &package {
            if !package.is_available {
                return Err(ValidationError::new(
                    "package",
                    format!("{} is no longer available.", package.name),
                ));
            }
        }

        for selection in &self.add_ons {
            let bundled = package
                .as_ref()
                .is_some_and(|package| package.includes(&selection.addon));
            let still_valid = selection
                .addon
                .effective_max_quantity(bundled)
                .is_some_and(|max| {
                    selection.quantity >= selection.addon.min_quantity && selection.quantity <= max
                });
            if !still_valid {
                return Err(ValidationError::new(
                    "add_ons",
                    format!(
                        "{} conflicts with the selected package; adjust it first.",
                        selection.addon.name
                    ),
                ));
            }
        }

        self.package = package;
        self.touch();
        Ok(())
    }

    /// Add an add-on, or adjust the quantity of an existing selection. The
    /// unit price is snapshotted from the current interval and settings.
    pub fn select_add_on(
        &mut self,
        addon: AddOn,
        quantity: u32,
        settings: &PricingSettings,
    ) -> Result<(), ValidationError> {
        if !addon.is_available {
            return Err(ValidationError::new(
                "add_ons",
                format!("{} is no longer available.", addon.name),
            ));
        }
        addon.validate()?;

        let bundled = self
            .package
            .as_ref()
            .is_some_and(|package| package.includes(&addon));
        let Some(max_quantity) = addon.effective_max_quantity(bundled) else {
            return Err(ValidationError::new(
                "add_ons",
                format!("{} cannot be selected as an additional item.", addon.name),
            ));
        };
        if quantity < addon.min_quantity || quantity > max_quantity {
            return Err(ValidationError::new(
                "add_ons",
                format!(
                    "Quantity for {} must be between {}-{}.",
                    addon.name, addon.min_quantity, max_quantity
                ),
            ));
        }

        let booked_unit_price = quote::addon_unit_price(self.interval.as_ref(), &addon, settings);
        match self
            .add_ons
            .iter_mut()
            .find(|selection| selection.addon.id == addon.id)
        {
            Some(selection) => {
                selection.quantity = quantity;
                selection.booked_unit_price = booked_unit_price;
            }
            None => self.add_ons.push(DraftAddOn {
                addon,
                quantity,
                booked_unit_price,
            }),
        }
        self.touch();
        Ok(())
    }

    pub fn remove_add_on(&mut self, addon_id: Uuid) {
        self.add_ons.retain(|selection| selection.addon.id != addon_id);
        self.touch();
    }

    pub fn set_payment_option(&mut self, option: PaymentOption) {
        self.payment_option = Some(option);
        self.touch();
    }

    pub fn set_customer_contact(&mut self, name: Option<String>, email: Option<String>) {
        self.customer_name = name;
        self.customer_email = email;
        self.touch();
    }

    /// Re-run the aggregator and persist the breakdown (and refreshed unit
    /// price snapshots) onto the draft. Called after every mutation by the
    /// booking flow.
    pub fn refresh_totals(&mut self, settings: &PricingSettings) {
        if let Some(interval) = self.interval {
            for selection in &mut self.add_ons {
                selection.booked_unit_price =
                    quote::addon_unit_price(Some(&interval), &selection.addon, settings);
            }
        }
        self.breakdown = quote::aggregate(self, settings);
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use hirelane_core::{DepositMethod, PricingStrategy};
    use rust_decimal::Decimal;

    fn settings() -> PricingSettings {
        PricingSettings {
            strategy: PricingStrategy::DailyPlusExcessHourly,
            excess_hours_margin: 0,
            default_daily_rate: None,
            default_hourly_rate: None,
            deposit_enabled: false,
            deposit_method: DepositMethod::Percentage,
            deposit_percentage: None,
            deposit_flat_fee: None,
            currency_code: None,
        }
    }

    fn interval() -> BillingInterval {
        BillingInterval::new(
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        )
    }

    fn addon(min: u32, max: u32) -> AddOn {
        AddOn {
            daily_cost: Some(Decimal::from(10)),
            hourly_cost: Some(Decimal::from(2)),
            min_quantity: min,
            max_quantity: max,
            ..AddOn::new("Helmet")
        }
    }

    #[test]
    fn return_before_pickup_is_rejected() {
        let mut draft = DraftBooking::new();
        let backwards = BillingInterval::new(
            NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        );
        let err = draft.set_interval(backwards).unwrap_err();
        assert_eq!(err.field, "return_time");
        assert!(draft.interval.is_none());
    }

    #[test]
    fn unavailable_vehicle_is_rejected() {
        let mut draft = DraftBooking::new();
        let mut vehicle = Vehicle::new("DSR/X");
        vehicle.is_available = false;
        assert_eq!(draft.set_vehicle(vehicle).unwrap_err().field, "vehicle");
    }

    #[test]
    fn quantity_outside_bounds_is_rejected() {
        let mut draft = DraftBooking::new();
        draft.set_interval(interval()).unwrap();
        let err = draft.select_add_on(addon(1, 3), 4, &settings()).unwrap_err();
        assert_eq!(err.field, "add_ons");
        assert!(draft.add_ons.is_empty());
    }

    #[test]
    fn bundled_single_unit_addon_cannot_be_added() {
        let mut draft = DraftBooking::new();
        let helmet = addon(1, 1);
        let mut package = Package::new("Touring");
        package.add_on_ids.push(helmet.id);
        draft.set_package(Some(package)).unwrap();
        let err = draft.select_add_on(helmet, 1, &settings()).unwrap_err();
        assert_eq!(err.field, "add_ons");
    }

    #[test]
    fn bundled_addon_quantity_cap_drops_by_one() {
        let mut draft = DraftBooking::new();
        draft.set_interval(interval()).unwrap();
        let helmet = addon(1, 3);
        let mut package = Package::new("Touring");
        package.add_on_ids.push(helmet.id);
        draft.set_package(Some(package)).unwrap();

        assert!(draft
            .select_add_on(helmet.clone(), 3, &settings())
            .is_err());
        draft.select_add_on(helmet, 2, &settings()).unwrap();
        assert_eq!(draft.add_ons[0].quantity, 2);
    }

    #[test]
    fn selecting_a_package_revalidates_existing_selections() {
        let mut draft = DraftBooking::new();
        draft.set_interval(interval()).unwrap();
        let helmet = addon(1, 1);
        draft.select_add_on(helmet.clone(), 1, &settings()).unwrap();

        let mut package = Package::new("Touring");
        package.add_on_ids.push(helmet.id);
        let err = draft.set_package(Some(package)).unwrap_err();
        assert_eq!(err.field, "add_ons");
        // The selection is reported, not silently dropped.
        assert_eq!(draft.add_ons.len(), 1);
        assert!(draft.package.is_none());
    }

    #[test]
    fn unit_price_is_snapshotted_at_selection_time() {
        let mut draft = DraftBooking::new();
        draft.set_interval(interval()).unwrap();
        draft.select_add_on(addon(1, 3), 2, &settings()).unwrap();
        assert_eq!(draft.add_ons[0].booked_unit_price, Decimal::from(20));
    }

    #[test]
    fn refresh_totals_persists_the_breakdown() {
        let mut draft = DraftBooking::new();
        draft.set_interval(interval()).unwrap();
        let mut vehicle = Vehicle::new("SR/F");
        vehicle.daily_rate = Some(Decimal::from(100));
        vehicle.hourly_rate = Some(Decimal::from(20));
        draft.set_vehicle(vehicle).unwrap();
        draft.refresh_totals(&settings());
        assert_eq!(draft.breakdown.grand_total, Decimal::from(200));
    }
}
