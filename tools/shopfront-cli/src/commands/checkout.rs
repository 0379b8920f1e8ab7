//! Checkout command.

use anyhow::{bail, Result};
use dialoguer::{Confirm, Input};
use serde_json::json;
use shopfront_commerce::checkout::{CheckoutError, CheckoutFlow, CheckoutState, OrderForm};

use super::CheckoutArgs;
use crate::commands::cart;
use crate::context::Context;

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let shop = ctx.open_shop()?;
    let auth = ctx.auth();
    let mut flow = CheckoutFlow::new(
        shop.cart.clone(),
        shop.gateway.clone(),
        ctx.config.checkout.to_checkout_config(),
    );

    if flow.enter() == &CheckoutState::EmptyCartBlocked {
        bail!("{}", CheckoutError::EmptyCart.user_message());
    }
    if flow.config().require_sign_in && !auth.is_authenticated() {
        bail!(
            "{} Set auth.user_id in your config.",
            CheckoutError::SignInRequired.user_message()
        );
    }

    if !ctx.output.is_json() {
        cart::show(&shop, ctx);
    }

    let CheckoutArgs {
        name,
        phone,
        address,
        city,
        district,
        notes,
        yes,
    } = args;
    let fields = FormFields {
        name,
        phone,
        address,
        city,
        district,
        notes,
    };

    let interactive = ctx.output.is_interactive();
    let form = collect_form(fields, interactive)?;

    if interactive && !yes {
        let total = shop.currency.format_price(&shop.cart.get_total_price());
        let confirmed = Confirm::new()
            .with_prompt(format!("Place order for {}?", total))
            .default(true)
            .interact()?;
        if !confirmed {
            ctx.output.info("Checkout cancelled, cart kept");
            return Ok(());
        }
    }

    let pb = ctx.output.spinner("Placing order...");
    let result = flow.submit(&form, &auth).await;
    pb.finish_and_clear();

    match result {
        Ok(confirmation) => {
            if ctx.output.is_json() {
                ctx.output.json(&json!({
                    "orderId": confirmation.order_id,
                    "orderNumber": confirmation.order_number,
                }));
            } else {
                ctx.output.success(&format!(
                    "Order {} placed",
                    confirmation.order_number
                ));
                ctx.output.kv("Order ID", confirmation.order_id.as_str());
                ctx.output.info(&format!(
                    "Track it with `shop orders show {}`",
                    confirmation.order_id
                ));
            }
            Ok(())
        }
        Err(e) => {
            ctx.output.debug(&format!("checkout failed: {}", e));
            if let CheckoutError::Validation(ref v) = e {
                bail!("{} ({})", e.user_message(), v.field().as_str());
            }
            if e.is_retryable() {
                bail!("{} Run `shop checkout` again.", e.user_message());
            }
            bail!("{}", e.user_message())
        }
    }
}

struct FormFields {
    name: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    city: Option<String>,
    district: Option<String>,
    notes: Option<String>,
}

/// Fill the form from flags, prompting for whatever is missing when a
/// terminal is attached.
fn collect_form(fields: FormFields, interactive: bool) -> Result<OrderForm> {
    Ok(OrderForm {
        full_name: field(fields.name, "Full name", true, interactive)?,
        phone: field(fields.phone, "Phone", true, interactive)?,
        address: field(fields.address, "Address", true, interactive)?,
        city: field(fields.city, "City", false, interactive)?,
        district: field(fields.district, "District", true, interactive)?,
        notes: field(fields.notes, "Notes", false, interactive)?,
    })
}

fn field(value: Option<String>, prompt: &str, required: bool, interactive: bool) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None if !interactive => Ok(String::new()),
        None => Ok(Input::<String>::new()
            .with_prompt(if required {
                prompt.to_string()
            } else {
                format!("{prompt} (optional)")
            })
            .allow_empty(!required)
            .interact_text()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_from_flags() {
        let fields = FormFields {
            name: Some("Tran G".to_string()),
            phone: Some("0909000111".to_string()),
            address: Some("3 Le Loi".to_string()),
            city: None,
            district: Some("Quan 1".to_string()),
            notes: None,
        };
        let form = collect_form(fields, false).unwrap();
        assert_eq!(form.full_name, "Tran G");
        assert!(form.city.is_empty());
        assert!(form.notes.is_empty());
    }
}
