//! CLI configuration.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_commerce::auth::AuthState;
use shopfront_commerce::checkout::{CheckoutConfig, ValidationRules, DEFAULT_PHONE_MIN_LENGTH};
use shopfront_commerce::exchange::ExchangeRates;
use shopfront_commerce::Currency;
use shopfront_observability::LoggingConfig;

/// Names searched for when no `--config` is given, in order.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["shop.toml", ".shop.toml", "shop.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Local storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Base currency, display currency and rates.
    #[serde(default)]
    pub currency: CurrencyConfig,

    /// Checkout rules.
    #[serde(default)]
    pub checkout: CheckoutSettings,

    /// Product source.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Who the CLI acts as.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ShopConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Check the configuration for problems.
    pub fn validate(&self) -> ConfigReport {
        let mut report = ConfigReport::default();

        let base = Currency::from_code(&self.currency.base);
        if base.is_none() {
            report
                .errors
                .push(format!("currency.base '{}' is not a known currency", self.currency.base));
        }

        for (code, rate) in &self.currency.rates {
            match Currency::from_code(code) {
                None => report
                    .errors
                    .push(format!("currency.rates.{code} is not a known currency")),
                Some(c) if Some(c) == base => report
                    .warnings
                    .push(format!("currency.rates.{code} is the base currency and is ignored")),
                Some(_) => {}
            }
            if *rate <= Decimal::ZERO {
                report
                    .errors
                    .push(format!("currency.rates.{code} must be greater than zero"));
            }
        }

        if let Some(ref display) = self.currency.display {
            match (Currency::from_code(display), self.currency.exchange_rates()) {
                (None, _) => report.warnings.push(format!(
                    "currency.display '{display}' is unknown, prices will show in the base currency"
                )),
                (Some(c), Ok(rates)) if !rates.supports(c) => report.warnings.push(format!(
                    "currency.display '{display}' has no rate, prices will show in the base currency"
                )),
                _ => {}
            }
        }

        if self.checkout.phone_min_length == 0 {
            report
                .warnings
                .push("checkout.phone_min_length is 0, any phone number will pass".to_string());
        }
        if self.checkout.submit_timeout_secs == 0 {
            report
                .errors
                .push("checkout.submit_timeout_secs must be at least 1".to_string());
        }

        if self.storage.dir.trim().is_empty() {
            report.errors.push("storage.dir must not be empty".to_string());
        }

        if let Some(ref user) = self.auth.user_id {
            if user.trim().is_empty() {
                report
                    .warnings
                    .push("auth.user_id is blank, the CLI will act as a guest".to_string());
            }
        }

        report
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

/// Outcome of [`ShopConfig::validate`].
#[derive(Debug, Default)]
pub struct ConfigReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ConfigReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Where the cart, wishlist and orders are stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory, relative to the config file (or the working directory).
    #[serde(default = "default_storage_dir")]
    pub dir: String,
}

fn default_storage_dir() -> String {
    ".shop".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

/// Currency settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Currency the catalog prices are in.
    #[serde(default = "default_base_currency")]
    pub base: String,

    /// Display currency used until the shopper picks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// Units of each currency per one unit of the base currency.
    /// Empty means the built-in table (VND base only).
    #[serde(default)]
    pub rates: BTreeMap<String, Decimal>,
}

fn default_base_currency() -> String {
    Currency::default().code().to_string()
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            base: default_base_currency(),
            display: None,
            rates: BTreeMap::new(),
        }
    }
}

impl CurrencyConfig {
    pub fn base_currency(&self) -> Result<Currency> {
        Currency::from_code(&self.base)
            .ok_or_else(|| anyhow!("Unknown base currency: {}", self.base))
    }

    /// Build the rate table.
    pub fn exchange_rates(&self) -> Result<ExchangeRates> {
        let base = self.base_currency()?;

        if self.rates.is_empty() {
            let builtin = ExchangeRates::default_rates();
            return Ok(if builtin.base() == base {
                builtin
            } else {
                ExchangeRates::new(base)
            });
        }

        let mut rates = ExchangeRates::new(base);
        for (code, rate) in &self.rates {
            let currency = Currency::from_code(code)
                .ok_or_else(|| anyhow!("Unknown currency in currency.rates: {}", code))?;
            rates.set_rate(currency, *rate);
        }
        Ok(rates)
    }
}

/// Checkout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Minimum number of digits in a phone number.
    #[serde(default = "default_phone_min_length")]
    pub phone_min_length: usize,

    /// Seconds to wait for the order API.
    #[serde(default = "default_submit_timeout")]
    pub submit_timeout_secs: u64,

    /// Refuse guest checkout.
    #[serde(default)]
    pub require_sign_in: bool,

    /// Delay added by the simulated order API, in milliseconds.
    #[serde(default)]
    pub simulated_latency_ms: u64,
}

fn default_phone_min_length() -> usize {
    DEFAULT_PHONE_MIN_LENGTH
}

fn default_submit_timeout() -> u64 {
    15
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            phone_min_length: default_phone_min_length(),
            submit_timeout_secs: default_submit_timeout(),
            require_sign_in: false,
            simulated_latency_ms: 0,
        }
    }
}

impl CheckoutSettings {
    pub fn to_checkout_config(&self) -> CheckoutConfig {
        CheckoutConfig {
            rules: ValidationRules {
                phone_min_length: self.phone_min_length,
            },
            submit_timeout: Duration::from_secs(self.submit_timeout_secs.max(1)),
            require_sign_in: self.require_sign_in,
        }
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

/// Product source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON file of product records. The bundled sample catalog is used
    /// when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Identity settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl AuthConfig {
    pub fn auth_state(&self) -> AuthState {
        match self.user_id.as_deref().map(str::trim) {
            Some(user) if !user.is_empty() => AuthState::signed_in(user),
            _ => AuthState::anonymous(),
        }
    }
}

/// Generate a default shop.toml config file.
pub fn generate_default_config() -> String {
    format!(
        r#"# Shopfront CLI configuration

[storage]
dir = "{storage}"

[currency]
base = "{base}"
# display = "USD"

# Units of each currency per one {base}. Leave empty for the built-in table.
[currency.rates]
# USD = "0.000039"
# EUR = "0.000036"

[checkout]
phone_min_length = {phone}
submit_timeout_secs = {timeout}
require_sign_in = false
simulated_latency_ms = 0

[catalog]
# path = "catalog.json"

[auth]
# user_id = "shopper-1"

[logging]
level = "warn"
format = "human"
"#,
        storage = default_storage_dir(),
        base = default_base_currency(),
        phone = DEFAULT_PHONE_MIN_LENGTH,
        timeout = default_submit_timeout(),
    )
}
