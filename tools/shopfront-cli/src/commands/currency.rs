//! Display currency commands.

use std::str::FromStr;

use anyhow::{anyhow, Context as _, Result};
use rust_decimal::Decimal;
use serde_json::json;
use shopfront_commerce::{Currency, Money};

use super::{CurrencyArgs, CurrencyCommand};
use crate::context::{Context, Shop};

/// Run the currency command.
pub async fn run(args: CurrencyArgs, ctx: &Context) -> Result<()> {
    let shop = ctx.open_shop()?;

    match args.command.unwrap_or(CurrencyCommand::Show) {
        CurrencyCommand::Show => show(&shop, ctx),
        CurrencyCommand::Set { code } => set(&code, &shop, ctx),
        CurrencyCommand::Convert { amount } => convert(&amount, &shop, ctx),
    }
}

fn show(shop: &Shop, ctx: &Context) -> Result<()> {
    let rates = shop.currency.rates();
    let active = shop.currency.active_currency();

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "base": rates.base().code(),
            "display": active.code(),
            "rates": rates,
        }));
        return Ok(());
    }

    ctx.output.header("Currency");
    ctx.output.kv("Base", rates.base().code());
    ctx.output.kv("Display", active.code());

    ctx.output.info("");
    ctx.output.info("Available:");
    for currency in rates.currencies() {
        let rate = rates.rate_for(currency).unwrap_or(Decimal::ONE);
        let marker = if currency == active { " (active)" } else { "" };
        ctx.output.list_item(&format!(
            "{} {}  1 {} = {} {}{}",
            currency.code(),
            currency.symbol(),
            rates.base().code(),
            rate.normalize(),
            currency.code(),
            marker
        ));
    }
    Ok(())
}

fn set(code: &str, shop: &Shop, ctx: &Context) -> Result<()> {
    let requested = Currency::from_code(code);
    let active = shop.currency.set_currency(code);
    shop.save_display_currency()?;

    if requested == Some(active) {
        ctx.output
            .success(&format!("Prices now shown in {}", active.code()));
    } else {
        ctx.output.warn(&format!(
            "{} is not available, prices shown in {}",
            code.trim(),
            active.code()
        ));
    }

    if ctx.output.is_json() {
        ctx.output.json(&json!({ "display": active.code() }));
    }
    Ok(())
}

fn convert(amount: &str, shop: &Shop, ctx: &Context) -> Result<()> {
    let base = parse_amount(amount, shop.base)?;
    let converted = shop.currency.convert_price(&base);

    if ctx.output.is_json() {
        ctx.output.json(&json!({ "from": base, "to": converted }));
        return Ok(());
    }

    println!("{} = {}", base.display(), shop.currency.format_money(&converted));
    Ok(())
}

/// Parse a base-currency amount given in major units, e.g. `12.50`.
fn parse_amount(amount: &str, currency: Currency) -> Result<Money> {
    let cleaned: String = amount
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' '))
        .collect();
    let value = Decimal::from_str(&cleaned)
        .with_context(|| format!("'{}' is not a number", amount))?;
    Money::from_major(value, currency)
        .ok_or_else(|| anyhow!("'{}' is too large to convert", amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(
            parse_amount("250,000", Currency::VND).unwrap(),
            Money::new(250_000, Currency::VND)
        );
        assert_eq!(
            parse_amount("12.5", Currency::USD).unwrap(),
            Money::new(1250, Currency::USD)
        );
        assert!(parse_amount("lots", Currency::VND).is_err());
    }
}
