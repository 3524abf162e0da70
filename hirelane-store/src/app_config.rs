use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

use hirelane_core::{DepositMethod, PricingSettings, PricingStrategy, RefundPolicy};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub notifications: NotificationConfig,
    pub pricing: PricingConfig,
    pub refund_policy: RefundPolicyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    /// Admin copies of booking/refund notifications go here; absent means
    /// customer-only notifications.
    pub admin_email: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    pub strategy: PricingStrategy,
    #[serde(default)]
    pub excess_hours_margin: u32,
    pub default_daily_rate: Option<Decimal>,
    pub default_hourly_rate: Option<Decimal>,
    #[serde(default)]
    pub deposit_enabled: bool,
    #[serde(default = "default_deposit_method")]
    pub deposit_method: DepositMethod,
    pub deposit_percentage: Option<Decimal>,
    pub deposit_flat_fee: Option<Decimal>,
    pub currency_code: Option<String>,
}

fn default_deposit_method() -> DepositMethod {
    DepositMethod::Percentage
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefundPolicyConfig {
    #[serde(default = "default_full_refund_days")]
    pub deposit_full_refund_days: u32,
    #[serde(default = "default_partial_refund_days")]
    pub deposit_partial_refund_days: u32,
    #[serde(default = "default_partial_refund_percentage")]
    pub deposit_partial_refund_percentage: Decimal,
    #[serde(default = "default_minimal_refund_days")]
    pub deposit_minimal_refund_days: u32,
    #[serde(default)]
    pub deposit_minimal_refund_percentage: Decimal,
}

fn default_full_refund_days() -> u32 {
    7
}

fn default_partial_refund_days() -> u32 {
    3
}

fn default_partial_refund_percentage() -> Decimal {
    Decimal::from(50)
}

fn default_minimal_refund_days() -> u32 {
    1
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of HIRELANE)
            .add_source(config::Environment::with_prefix("HIRELANE").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// The pricing settings value handed into each engine call.
    pub fn pricing_settings(&self) -> PricingSettings {
        PricingSettings {
            strategy: self.pricing.strategy,
            excess_hours_margin: self.pricing.excess_hours_margin,
            default_daily_rate: self.pricing.default_daily_rate,
            default_hourly_rate: self.pricing.default_hourly_rate,
            deposit_enabled: self.pricing.deposit_enabled,
            deposit_method: self.pricing.deposit_method,
            deposit_percentage: self.pricing.deposit_percentage,
            deposit_flat_fee: self.pricing.deposit_flat_fee,
            currency_code: self.pricing.currency_code.clone(),
        }
    }

    pub fn refund_policy(&self) -> RefundPolicy {
        RefundPolicy {
            deposit_full_refund_days: self.refund_policy.deposit_full_refund_days,
            deposit_partial_refund_days: self.refund_policy.deposit_partial_refund_days,
            deposit_partial_refund_percentage: self.refund_policy.deposit_partial_refund_percentage,
            deposit_minimal_refund_days: self.refund_policy.deposit_minimal_refund_days,
            deposit_minimal_refund_percentage: self.refund_policy.deposit_minimal_refund_percentage,
        }
    }
}
