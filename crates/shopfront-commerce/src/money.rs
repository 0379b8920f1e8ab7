//! Money type for representing monetary values.
//!
//! Amounts are integers in the smallest unit of their currency, so cart
//! totals are exact. Decimal arithmetic (`rust_decimal`) is only used at
//! the conversion boundary, see [`crate::exchange`].

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the currency symbol sits relative to the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolPosition {
    /// `$1,234.50`
    Prefix,
    /// `1.234.500 ₫`
    Suffix,
}

/// Supported currencies.
///
/// The default is the Vietnamese dong, the storefront's base currency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum Currency {
    #[default]
    VND,
    USD,
    EUR,
    GBP,
    JPY,
    AUD,
    CAD,
    CNY,
    INR,
    KRW,
    SGD,
    THB,
}

impl Currency {
    /// Every supported currency, in declaration order.
    pub const ALL: [Currency; 12] = [
        Currency::VND,
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::JPY,
        Currency::AUD,
        Currency::CAD,
        Currency::CNY,
        Currency::INR,
        Currency::KRW,
        Currency::SGD,
        Currency::THB,
    ];

    /// Get the currency code (e.g., "USD").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::VND => "VND",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::AUD => "AUD",
            Currency::CAD => "CAD",
            Currency::CNY => "CNY",
            Currency::INR => "INR",
            Currency::KRW => "KRW",
            Currency::SGD => "SGD",
            Currency::THB => "THB",
        }
    }

    /// Get the currency symbol (e.g., "$").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::VND => "\u{20ab}",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::JPY => "\u{00a5}",
            Currency::AUD => "A$",
            Currency::CAD => "CA$",
            Currency::CNY => "CN\u{00a5}",
            Currency::INR => "\u{20b9}",
            Currency::KRW => "\u{20a9}",
            Currency::SGD => "S$",
            Currency::THB => "\u{0e3f}",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::VND | Currency::JPY | Currency::KRW => 0,
            _ => 2,
        }
    }

    /// Digit group separator used by the currency's home locale.
    pub fn thousands_separator(&self) -> char {
        match self {
            Currency::VND | Currency::EUR => '.',
            _ => ',',
        }
    }

    /// Fraction separator used by the currency's home locale.
    pub fn decimal_separator(&self) -> char {
        match self {
            Currency::VND | Currency::EUR => ',',
            _ => '.',
        }
    }

    pub fn symbol_position(&self) -> SymbolPosition {
        match self {
            Currency::VND | Currency::EUR => SymbolPosition::Suffix,
            _ => SymbolPosition::Prefix,
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_uppercase();
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Parse a currency code, falling back to the default currency.
    pub fn from_code_or_default(code: &str) -> Self {
        Self::from_code(code).unwrap_or_default()
    }

    /// Number of minor units in one major unit (100 for USD, 1 for VND).
    pub fn minor_units(&self) -> i64 {
        10_i64.pow(self.decimal_places())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// Amounts are stored in the smallest unit of the currency (e.g., cents for USD).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit.
    pub amount_minor: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Create a Money value from a decimal amount in major units,
    /// rounding half away from zero to the currency's minor unit.
    ///
    /// Returns `None` if the result does not fit in an `i64`.
    ///
    /// ```
    /// use rust_decimal::Decimal;
    /// use shopfront_commerce::money::{Currency, Money};
    ///
    /// let price = Money::from_major(Decimal::new(49995, 3), Currency::USD).unwrap();
    /// assert_eq!(price.amount_minor, 5000);
    /// ```
    pub fn from_major(amount: Decimal, currency: Currency) -> Option<Self> {
        let minor = amount
            .checked_mul(Decimal::from(currency.minor_units()))?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()?;
        Some(Self::new(minor, currency))
    }

    /// Convert to a decimal value in major units.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.amount_minor, self.currency.decimal_places())
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_minor == 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_minor < 0
    }

    /// Try to add another Money value, returning None on currency
    /// mismatch or overflow.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount_minor
            .checked_add(other.amount_minor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Multiply by a quantity, returning None on overflow.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        self.amount_minor
            .checked_mul(factor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Sum an iterator of Money values.
    ///
    /// Returns None if any value is in another currency or on overflow.
    pub fn try_sum<'a>(mut iter: impl Iterator<Item = &'a Money>, currency: Currency) -> Option<Money> {
        iter.try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }

    /// Format for display in the currency's home locale.
    ///
    /// ```
    /// use shopfront_commerce::money::{Currency, Money};
    ///
    /// assert_eq!(Money::new(123_456, Currency::USD).display(), "$1,234.56");
    /// assert_eq!(Money::new(250_000, Currency::VND).display(), "250.000 \u{20ab}");
    /// ```
    pub fn display(&self) -> String {
        let number = self.display_amount();
        let sign = if self.amount_minor < 0 { "-" } else { "" };
        match self.currency.symbol_position() {
            SymbolPosition::Prefix => format!("{}{}{}", sign, self.currency.symbol(), number),
            SymbolPosition::Suffix => format!("{}{} {}", sign, number, self.currency.symbol()),
        }
    }

    /// Format the absolute amount with locale separators but without a
    /// sign or symbol.
    pub fn display_amount(&self) -> String {
        let places = self.currency.decimal_places();
        let unit = self.currency.minor_units().unsigned_abs();
        let abs = self.amount_minor.unsigned_abs();

        let mut number = group_digits(abs / unit, self.currency.thousands_separator());
        if places > 0 {
            number.push(self.currency.decimal_separator());
            number.push_str(&format!("{:0width$}", abs % unit, width = places as usize));
        }
        number
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

fn group_digits(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_minor() {
        let m = Money::new(4999, Currency::USD);
        assert_eq!(m.amount_minor, 4999);
        assert_eq!(m.currency, Currency::USD);
    }

    #[test]
    fn test_money_from_major_rounds_half_away_from_zero() {
        let m = Money::from_major(Decimal::new(4999, 2), Currency::USD).unwrap();
        assert_eq!(m.amount_minor, 4999);

        let m = Money::from_major(Decimal::new(1005, 3), Currency::USD).unwrap();
        assert_eq!(m.amount_minor, 101);

        let m = Money::from_major(Decimal::new(1005, 1), Currency::JPY).unwrap();
        assert_eq!(m.amount_minor, 101); // JPY has no decimals
    }

    #[test]
    fn test_money_to_decimal() {
        let m = Money::new(4999, Currency::USD);
        assert_eq!(m.to_decimal(), Decimal::new(4999, 2));

        let m = Money::new(100_000, Currency::VND);
        assert_eq!(m.to_decimal(), Decimal::from(100_000));
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(4999, Currency::USD).display(), "$49.99");
        assert_eq!(Money::new(100, Currency::JPY).display(), "\u{00a5}100");
        assert_eq!(
            Money::new(1_234_567_89, Currency::EUR).display(),
            "1.234.567,89 \u{20ac}"
        );
        assert_eq!(Money::new(-1050, Currency::USD).display(), "-$10.50");
    }

    #[test]
    fn test_money_display_zero() {
        assert_eq!(Money::zero(Currency::VND).display(), "0 \u{20ab}");
        assert_eq!(Money::zero(Currency::USD).display(), "$0.00");
    }

    #[test]
    fn test_display_amount_has_no_symbol() {
        assert_eq!(Money::new(250_000, Currency::VND).display_amount(), "250.000");
        assert_eq!(Money::new(123_456, Currency::USD).display_amount(), "1,234.56");
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits(0, ','), "0");
        assert_eq!(group_digits(999, ','), "999");
        assert_eq!(group_digits(1000, ','), "1,000");
        assert_eq!(group_digits(1_000_000, '.'), "1.000.000");
    }

    #[test]
    fn test_money_addition() {
        let a = Money::new(1000, Currency::USD);
        let b = Money::new(500, Currency::USD);
        assert_eq!(a.try_add(&b).unwrap().amount_minor, 1500);
        assert!(a.try_add(&Money::new(1, Currency::EUR)).is_none());
    }

    #[test]
    fn test_money_multiply_overflow() {
        let m = Money::new(i64::MAX, Currency::VND);
        assert!(m.try_multiply(2).is_none());
        assert_eq!(Money::new(1000, Currency::VND).try_multiply(3).unwrap().amount_minor, 3000);
    }

    #[test]
    fn test_try_sum() {
        let values = [Money::new(100, Currency::VND), Money::new(250, Currency::VND)];
        assert_eq!(
            Money::try_sum(values.iter(), Currency::VND).unwrap().amount_minor,
            350
        );
        assert!(Money::try_sum(values.iter(), Currency::USD).is_none());
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("USD"), Some(Currency::USD));
        assert_eq!(Currency::from_code(" eur "), Some(Currency::EUR));
        assert_eq!(Currency::from_code("INVALID"), None);
        assert_eq!(Currency::from_code_or_default("XYZ"), Currency::VND);
    }
}
