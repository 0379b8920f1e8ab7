//! Currency conversion service.
//!
//! Prices are stored and summed in the base currency. Conversion into
//! the shopper's display currency happens once, at presentation time,
//! through [`CurrencyService`]. Consumers never do their own rate
//! arithmetic.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{Currency, Money};

/// Conversion rates relative to a base currency.
///
/// A rate `r` for currency `C` means one major unit of the base currency
/// is worth `r` major units of `C`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates {
    base: Currency,
    #[serde(default)]
    rates: BTreeMap<Currency, Decimal>,
}

impl ExchangeRates {
    /// Create a rate table with only the base currency.
    pub fn new(base: Currency) -> Self {
        Self {
            base,
            rates: BTreeMap::new(),
        }
    }

    /// Builder-style rate insertion.
    pub fn with_rate(mut self, currency: Currency, rate: Decimal) -> Self {
        self.set_rate(currency, rate);
        self
    }

    /// Insert or replace a rate. Rates for the base currency and
    /// non-positive rates are ignored.
    pub fn set_rate(&mut self, currency: Currency, rate: Decimal) {
        if currency == self.base || rate <= Decimal::ZERO {
            tracing::warn!(currency = %currency, rate = %rate, "ignoring exchange rate");
            return;
        }
        self.rates.insert(currency, rate);
    }

    /// The base currency.
    pub fn base(&self) -> Currency {
        self.base
    }

    /// Rate for `currency`, `1` for the base currency.
    pub fn rate_for(&self, currency: Currency) -> Option<Decimal> {
        if currency == self.base {
            Some(Decimal::ONE)
        } else {
            self.rates.get(&currency).copied()
        }
    }

    /// Check if amounts can be converted into `currency`.
    pub fn supports(&self, currency: Currency) -> bool {
        self.rate_for(currency).is_some()
    }

    /// Currencies with a known rate, base first.
    pub fn currencies(&self) -> Vec<Currency> {
        std::iter::once(self.base)
            .chain(self.rates.keys().copied())
            .collect()
    }

    /// Convert `money` into `target`.
    ///
    /// The arithmetic is done in decimal and rounded once, to the
    /// target's minor unit. Returns `None` if either currency has no
    /// rate or the result overflows.
    pub fn convert(&self, money: &Money, target: Currency) -> Option<Money> {
        if money.currency == target {
            return Some(*money);
        }
        let from = self.rate_for(money.currency)?;
        let to = self.rate_for(target)?;
        let major = money.to_decimal().checked_div(from)?.checked_mul(to)?;
        Money::from_major(major, target)
    }

    /// Rates shipped with the storefront, VND base.
    pub fn default_rates() -> Self {
        Self::new(Currency::VND)
            .with_rate(Currency::USD, Decimal::new(39, 6))
            .with_rate(Currency::EUR, Decimal::new(36, 6))
            .with_rate(Currency::GBP, Decimal::new(31, 6))
            .with_rate(Currency::JPY, Decimal::new(59, 4))
            .with_rate(Currency::KRW, Decimal::new(54, 3))
            .with_rate(Currency::SGD, Decimal::new(52, 6))
            .with_rate(Currency::THB, Decimal::new(14, 4))
    }
}

impl Default for ExchangeRates {
    fn default() -> Self {
        Self::default_rates()
    }
}

#[derive(Debug)]
struct ServiceState {
    rates: ExchangeRates,
    active: Currency,
}

/// Process-wide price conversion and formatting.
///
/// Holds the rate table and the active display currency. Share it behind
/// an `Arc`; every price-displaying consumer reads through it. Changing
/// the display currency never touches cart contents.
#[derive(Debug)]
pub struct CurrencyService {
    state: RwLock<ServiceState>,
}

impl CurrencyService {
    /// Create a service displaying prices in the base currency.
    pub fn new(rates: ExchangeRates) -> Self {
        let active = rates.base();
        Self {
            state: RwLock::new(ServiceState { rates, active }),
        }
    }

    /// Create a service with an initial display currency code.
    pub fn with_display(rates: ExchangeRates, code: &str) -> Self {
        let service = Self::new(rates);
        service.set_currency(code);
        service
    }

    fn read<R>(&self, f: impl FnOnce(&ServiceState) -> R) -> R {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write<R>(&self, f: impl FnOnce(&mut ServiceState) -> R) -> R {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// The currency prices are stored in.
    pub fn base_currency(&self) -> Currency {
        self.read(|s| s.rates.base())
    }

    /// The currency prices are displayed in.
    pub fn active_currency(&self) -> Currency {
        self.read(|s| s.active)
    }

    /// A copy of the current rate table.
    pub fn rates(&self) -> ExchangeRates {
        self.read(|s| s.rates.clone())
    }

    /// Switch the display currency.
    ///
    /// Unknown codes, and currencies without a rate, fall back to the
    /// base currency. Returns the currency now active.
    pub fn set_currency(&self, code: &str) -> Currency {
        self.write(|s| {
            let next = match Currency::from_code(code) {
                Some(c) if s.rates.supports(c) => c,
                _ => {
                    tracing::warn!(code, fallback = %s.rates.base(), "unsupported display currency");
                    s.rates.base()
                }
            };
            if next != s.active {
                tracing::debug!(from = %s.active, to = %next, "display currency changed");
            }
            s.active = next;
            next
        })
    }

    /// Replace the rate table (periodic refresh).
    ///
    /// If the active currency is not covered by the new table the
    /// service falls back to the base currency.
    pub fn update_rates(&self, rates: ExchangeRates) {
        self.write(|s| {
            if !rates.supports(s.active) {
                tracing::warn!(active = %s.active, "display currency dropped from rate table");
                s.active = rates.base();
            }
            s.rates = rates;
        });
    }

    /// Convert an amount into the active display currency.
    ///
    /// Falls back to the original amount if it cannot be converted.
    pub fn convert_price(&self, amount: &Money) -> Money {
        self.read(|s| {
            s.rates.convert(amount, s.active).unwrap_or_else(|| {
                tracing::warn!(from = %amount.currency, to = %s.active, "price conversion failed");
                *amount
            })
        })
    }

    /// Convert into the active currency and format for display.
    pub fn format_price(&self, amount: &Money) -> String {
        self.format_money(&self.convert_price(amount))
    }

    /// Format an amount that is already in its display currency.
    pub fn format_money(&self, money: &Money) -> String {
        money.display()
    }
}

impl Default for CurrencyService {
    fn default() -> Self {
        Self::new(ExchangeRates::default_rates())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vnd(amount: i64) -> Money {
        Money::new(amount, Currency::VND)
    }

    #[test]
    fn test_convert_base_is_identity() {
        let rates = ExchangeRates::default_rates();
        assert_eq!(rates.convert(&vnd(100_000), Currency::VND), Some(vnd(100_000)));
    }

    #[test]
    fn test_convert_to_usd() {
        let rates = ExchangeRates::new(Currency::VND).with_rate(Currency::USD, Decimal::new(4, 5));
        // 250,000 VND * 0.00004 = 10.00 USD
        let usd = rates.convert(&vnd(250_000), Currency::USD).unwrap();
        assert_eq!(usd, Money::new(1000, Currency::USD));
    }

    #[test]
    fn test_convert_between_non_base_currencies() {
        let rates = ExchangeRates::new(Currency::VND)
            .with_rate(Currency::USD, Decimal::new(4, 5))
            .with_rate(Currency::EUR, Decimal::new(2, 5));
        let eur = rates
            .convert(&Money::new(1000, Currency::USD), Currency::EUR)
            .unwrap();
        assert_eq!(eur, Money::new(500, Currency::EUR));
    }

    #[test]
    fn test_convert_unknown_currency() {
        let rates = ExchangeRates::new(Currency::VND);
        assert!(rates.convert(&vnd(1), Currency::USD).is_none());
    }

    #[test]
    fn test_sum_then_convert_rounds_once() {
        let rates = ExchangeRates::new(Currency::VND).with_rate(Currency::USD, Decimal::new(4, 5));
        let prices = [vnd(12_625), vnd(12_625), vnd(12_625)];

        // 37,875 * 0.00004 = 1.515 -> $1.52
        let total = Money::try_sum(prices.iter(), Currency::VND).unwrap();
        let converted_total = rates.convert(&total, Currency::USD).unwrap();
        assert_eq!(converted_total.amount_minor, 152);

        // Each line alone is 0.505 -> $0.51, so converting per line drifts.
        let per_item: i64 = prices
            .iter()
            .map(|p| rates.convert(p, Currency::USD).unwrap().amount_minor)
            .sum();
        assert_eq!(per_item, 153);
    }

    #[test]
    fn test_invalid_rates_are_ignored() {
        let rates = ExchangeRates::new(Currency::VND)
            .with_rate(Currency::USD, Decimal::ZERO)
            .with_rate(Currency::VND, Decimal::TWO);
        assert!(!rates.supports(Currency::USD));
        assert_eq!(rates.rate_for(Currency::VND), Some(Decimal::ONE));
    }

    #[test]
    fn test_service_formats_in_active_currency() {
        let service = CurrencyService::new(
            ExchangeRates::new(Currency::VND).with_rate(Currency::USD, Decimal::new(4, 5)),
        );
        assert_eq!(service.format_price(&vnd(250_000)), "250.000 \u{20ab}");

        assert_eq!(service.set_currency("usd"), Currency::USD);
        assert_eq!(service.format_price(&vnd(250_000)), "$10.00");
    }

    #[test]
    fn test_service_unknown_code_falls_back_to_base() {
        let service = CurrencyService::default();
        service.set_currency("USD");
        assert_eq!(service.set_currency("XYZ"), Currency::VND);
        assert_eq!(service.active_currency(), Currency::VND);

        // Known currency without a rate also falls back.
        assert_eq!(service.set_currency("INR"), Currency::VND);
    }

    #[test]
    fn test_zero_formats_without_error() {
        let service = CurrencyService::with_display(ExchangeRates::default_rates(), "USD");
        let zero = service.convert_price(&vnd(0));
        assert_eq!(service.format_money(&zero), "$0.00");

        service.set_currency("VND");
        assert_eq!(service.format_price(&vnd(0)), "0 \u{20ab}");
    }

    #[test]
    fn test_update_rates_drops_unsupported_active_currency() {
        let service = CurrencyService::with_display(ExchangeRates::default_rates(), "EUR");
        assert_eq!(service.active_currency(), Currency::EUR);

        service.update_rates(
            ExchangeRates::new(Currency::VND).with_rate(Currency::USD, Decimal::new(4, 5)),
        );
        assert_eq!(service.active_currency(), Currency::VND);
    }

    #[test]
    fn test_rates_deserialize_from_config_numbers() {
        let rates: ExchangeRates =
            serde_json::from_str(r#"{"base":"VND","rates":{"USD":"0.00004"}}"#).unwrap();
        assert_eq!(rates.rate_for(Currency::USD), Some(Decimal::new(4, 5)));
    }
}
