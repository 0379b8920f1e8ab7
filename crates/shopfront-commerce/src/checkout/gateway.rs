//! Order API boundary.

use crate::checkout::{Order, OrderConfirmation, OrderRequest, OrderUpdate};
use crate::ids::OrderId;
use async_trait::async_trait;
use shopfront_cache::{cache_key, Cache};
use std::time::Duration;
use thiserror::Error;

/// Errors reported by an order API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The API could not be reached or did not answer properly.
    #[error("Network error: {0}")]
    Network(String),

    /// The API refused the request.
    #[error("Order rejected: {0}")]
    Rejected(String),

    /// No order with this id.
    #[error("Order not found: {0}")]
    NotFound(OrderId),
}

/// Creates and updates orders.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderConfirmation, GatewayError>;

    async fn update_order(&self, id: &OrderId, update: &OrderUpdate) -> Result<Order, GatewayError>;
}

const ORDER_KEY_PREFIX: &str = "order";

/// Order API backed by the local cache, with optional simulated latency.
///
/// Orders live under `order:<id>` keys.
#[derive(Debug, Clone)]
pub struct LocalOrderGateway {
    cache: Cache,
    latency: Duration,
}

impl LocalOrderGateway {
    pub fn new(cache: Cache) -> Self {
        Self {
            cache,
            latency: Duration::ZERO,
        }
    }

    /// Wait this long before answering each call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn get_order(&self, id: &OrderId) -> Result<Order, GatewayError> {
        self.cache
            .get::<Order>(&cache_key!(ORDER_KEY_PREFIX, id))
            .map_err(storage_error)?
            .ok_or_else(|| GatewayError::NotFound(id.clone()))
    }

    /// All stored orders, newest first.
    pub fn list_orders(&self) -> Result<Vec<Order>, GatewayError> {
        let prefix = format!("{ORDER_KEY_PREFIX}:");
        let keys = self
            .cache
            .keys_with_prefix(&prefix)
            .map_err(storage_error)?;

        let mut orders = Vec::with_capacity(keys.len());
        for key in keys {
            match self.cache.get::<Order>(&key) {
                Ok(Some(order)) => orders.push(order),
                Ok(None) => {}
                Err(e) => tracing::warn!(key = %key, error = %e, "skipping unreadable order"),
            }
        }
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.order_number.cmp(&a.order_number))
        });
        Ok(orders)
    }

    fn save(&self, order: &Order) -> Result<(), GatewayError> {
        self.cache
            .set(&cache_key!(ORDER_KEY_PREFIX, order.id), order)
            .map_err(storage_error)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl OrderGateway for LocalOrderGateway {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderConfirmation, GatewayError> {
        self.simulate_latency().await;

        if request.items.is_empty() {
            return Err(GatewayError::Rejected("order has no items".to_string()));
        }

        let order = Order::place(request.clone());
        self.save(&order)?;
        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.total(),
            "order created"
        );
        Ok(order.confirmation())
    }

    async fn update_order(&self, id: &OrderId, update: &OrderUpdate) -> Result<Order, GatewayError> {
        self.simulate_latency().await;

        let mut order = self.get_order(id)?;
        if order.status.is_terminal() && order.status != update.status {
            return Err(GatewayError::Rejected(format!(
                "order {} is already {}",
                order.order_number,
                order.status.as_str()
            )));
        }

        order.apply(update);
        self.save(&order)?;
        tracing::info!(order_id = %id, status = order.status.as_str(), "order updated");
        Ok(order)
    }
}

fn storage_error(e: shopfront_cache::CacheError) -> GatewayError {
    GatewayError::Network(format!("order storage unavailable: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthState;
    use crate::cart::{CartLineItem, CartSnapshot};
    use crate::checkout::{DeliveryInfo, OrderStatus};
    use crate::ids::ProductId;
    use crate::money::{Currency, Money};

    fn request() -> OrderRequest {
        let snapshot = CartSnapshot::new(
            vec![CartLineItem {
                id: ProductId::new("a"),
                name: "A".to_string(),
                price: Money::new(100_000, Currency::VND),
                image: None,
                quantity: 2,
                stock_status: None,
                category: None,
                rating: None,
            }],
            Currency::VND,
        );
        let delivery = DeliveryInfo {
            full_name: "Pham D".to_string(),
            phone: "0987654321".to_string(),
            address: "5 Trang Tien".to_string(),
            city: None,
            district: "Hoan Kiem".to_string(),
            notes: None,
        };
        OrderRequest::from_snapshot(delivery, &snapshot, &AuthState::signed_in("u-1"))
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let gateway = LocalOrderGateway::new(Cache::in_memory());
        let confirmation = gateway.create_order(&request()).await.unwrap();

        let order = gateway.get_order(&confirmation.order_id).unwrap();
        assert_eq!(order.order_number, confirmation.order_number);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total().amount_minor, 200_000);
        assert_eq!(gateway.list_orders().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_request_rejected() {
        let gateway = LocalOrderGateway::new(Cache::in_memory());
        let mut empty = request();
        empty.items.clear();

        let err = gateway.create_order(&empty).await.unwrap_err();
        assert!(matches!(err, GatewayError::Rejected(_)));
        assert!(gateway.list_orders().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_order() {
        let gateway = LocalOrderGateway::new(Cache::in_memory());
        let confirmation = gateway.create_order(&request()).await.unwrap();

        let order = gateway
            .update_order(
                &confirmation.order_id,
                &OrderUpdate {
                    status: OrderStatus::Confirmed,
                    delivery_estimate: Some("tomorrow".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(
            gateway.get_order(&confirmation.order_id).unwrap().delivery_estimate.as_deref(),
            Some("tomorrow")
        );
    }

    #[tokio::test]
    async fn test_delivered_order_is_final() {
        let gateway = LocalOrderGateway::new(Cache::in_memory());
        let id = gateway.create_order(&request()).await.unwrap().order_id;
        let delivered = OrderUpdate {
            status: OrderStatus::Delivered,
            delivery_estimate: None,
        };
        gateway.update_order(&id, &delivered).await.unwrap();

        let err = gateway
            .update_order(
                &id,
                &OrderUpdate {
                    status: OrderStatus::Pending,
                    delivery_estimate: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_update_unknown_order() {
        let gateway = LocalOrderGateway::new(Cache::in_memory());
        let missing = OrderId::new("nope");
        let err = gateway
            .update_order(
                &missing,
                &OrderUpdate {
                    status: OrderStatus::Confirmed,
                    delivery_estimate: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::NotFound(missing));
    }
}
