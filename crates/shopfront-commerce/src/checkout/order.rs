//! Order contracts exchanged with the order API.

use crate::auth::AuthState;
use crate::cart::CartSnapshot;
use crate::checkout::DeliveryInfo;
use crate::ids::{OrderId, ProductId, UserId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, awaiting confirmation.
    #[default]
    Pending,
    /// Order confirmed by the shop.
    Confirmed,
    /// Order handed to the customer.
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Delivered => "delivered",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Delivered => "Delivered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }
}

/// One ordered product, frozen at submission time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub line_total: Money,
}

/// What gets sent to the order API when the shopper submits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub delivery: DeliveryInfo,
    pub items: Vec<OrderLineItem>,
    /// Grand total in the base currency.
    pub total: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl OrderRequest {
    /// Build a request from validated delivery details and a cart snapshot.
    pub fn from_snapshot(delivery: DeliveryInfo, snapshot: &CartSnapshot, auth: &AuthState) -> Self {
        let items = snapshot
            .items()
            .iter()
            .map(|line| OrderLineItem {
                product_id: line.id.clone(),
                name: line.name.clone(),
                unit_price: line.price,
                quantity: line.quantity,
                line_total: line.line_total(),
            })
            .collect();

        Self {
            delivery,
            items,
            total: snapshot.total_price(),
            user_id: auth.user_id.clone(),
        }
    }

    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

/// Returned by the order API once an order is accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub order_number: String,
}

/// Status change for an existing order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_estimate: Option<String>,
}

/// An order as stored by the order API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub request: OrderRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_estimate: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Order {
    /// Record a new pending order for `request`.
    pub fn place(request: OrderRequest) -> Self {
        let now = current_timestamp();
        Self {
            id: OrderId::generate(),
            order_number: Self::generate_order_number(),
            status: OrderStatus::Pending,
            request,
            delivery_estimate: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Generate a new order number.
    pub fn generate_order_number() -> String {
        use std::sync::atomic::{AtomicU32, Ordering};

        static SEQUENCE: AtomicU32 = AtomicU32::new(0);
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed) % 1000;
        format!("ORD-{}{:03}", current_timestamp(), seq)
    }

    pub fn confirmation(&self) -> OrderConfirmation {
        OrderConfirmation {
            order_id: self.id.clone(),
            order_number: self.order_number.clone(),
        }
    }

    /// Apply a status change. A missing estimate keeps the previous one.
    pub fn apply(&mut self, update: &OrderUpdate) {
        self.status = update.status;
        if let Some(ref estimate) = update.delivery_estimate {
            self.delivery_estimate = Some(estimate.clone());
        }
        self.updated_at = current_timestamp();
    }

    pub fn total(&self) -> Money {
        self.request.total
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
