//! Order inspection and status updates.

use anyhow::{anyhow, Result};
use shopfront_commerce::checkout::{Order, OrderGateway, OrderStatus, OrderUpdate};
use shopfront_commerce::OrderId;

use super::{OrdersArgs, OrdersCommand};
use crate::context::{Context, Shop};
use crate::output::{format_timestamp, order_status_badge, truncate};

/// Run the orders command.
pub async fn run(args: OrdersArgs, ctx: &Context) -> Result<()> {
    let shop = ctx.open_shop()?;

    match args
        .command
        .unwrap_or(OrdersCommand::List { limit: None })
    {
        OrdersCommand::List { limit } => list(limit, &shop, ctx),
        OrdersCommand::Show { id } => {
            let order = shop.gateway.get_order(&OrderId::new(id.trim()))?;
            show(&order, &shop, ctx);
            Ok(())
        }
        OrdersCommand::Update {
            id,
            status,
            estimate,
        } => {
            let status = OrderStatus::from_str(&status).ok_or_else(|| {
                anyhow!(
                    "Unknown status '{}', expected pending, confirmed or delivered",
                    status
                )
            })?;
            let update = OrderUpdate {
                status,
                delivery_estimate: estimate,
            };

            let pb = ctx.output.spinner("Updating order...");
            let result = shop
                .gateway
                .update_order(&OrderId::new(id.trim()), &update)
                .await;
            pb.finish_and_clear();

            let order = result?;
            ctx.output.success(&format!(
                "Order {} is now {}",
                order.order_number,
                order.status.display_name()
            ));
            show(&order, &shop, ctx);
            Ok(())
        }
    }
}

fn list(limit: Option<usize>, shop: &Shop, ctx: &Context) -> Result<()> {
    let mut orders = shop.gateway.list_orders()?;
    if let Some(limit) = limit {
        orders.truncate(limit);
    }

    if ctx.output.is_json() {
        ctx.output.json(&orders);
        return Ok(());
    }

    ctx.output.header("Orders");
    if orders.is_empty() {
        ctx.output.info("No orders yet");
        return Ok(());
    }

    let widths = [22, 18, 16, 5, 16, 10];
    ctx.output.table_header(
        &["ORDER", "ID", "PLACED", "QTY", "TOTAL", "STATUS"],
        &widths,
    );
    for order in &orders {
        let id = truncate(order.id.as_str(), 18);
        let placed = format_timestamp(order.created_at);
        let quantity = order.request.item_count().to_string();
        let total = shop.currency.format_price(&order.total());
        let status = order_status_badge(order.status);
        ctx.output.table_row(
            &[
                order.order_number.as_str(),
                id.as_str(),
                placed.as_str(),
                quantity.as_str(),
                total.as_str(),
                status.as_str(),
            ],
            &widths,
        );
    }
    Ok(())
}

fn show(order: &Order, shop: &Shop, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(order);
        return;
    }

    ctx.output.header(&format!("Order {}", order.order_number));
    ctx.output.kv("ID", order.id.as_str());
    ctx.output.kv("Status", &order_status_badge(order.status));
    ctx.output.kv("Placed", &format_timestamp(order.created_at));
    if order.updated_at != order.created_at {
        ctx.output.kv("Updated", &format_timestamp(order.updated_at));
    }
    if let Some(ref estimate) = order.delivery_estimate {
        ctx.output.kv("Delivery", estimate);
    }
    if let Some(ref user) = order.request.user_id {
        ctx.output.kv("Customer", user.as_str());
    }

    let delivery = &order.request.delivery;
    ctx.output.info("");
    ctx.output.info("Deliver to:");
    ctx.output.kv("Name", &delivery.full_name);
    ctx.output.kv("Phone", &delivery.phone);
    ctx.output.kv("Address", &delivery.one_line());
    if let Some(ref notes) = delivery.notes {
        ctx.output.kv("Notes", notes);
    }

    ctx.output.info("");
    ctx.output.info("Items:");
    for line in &order.request.items {
        ctx.output.list_item(&format!(
            "{} x {} @ {} = {}",
            line.quantity,
            line.name,
            shop.currency.format_price(&line.unit_price),
            shop.currency.format_price(&line.line_total)
        ));
    }
    ctx.output
        .kv("Total", &shop.currency.format_price(&order.total()));
}
