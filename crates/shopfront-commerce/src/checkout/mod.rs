//! Checkout module.
//!
//! Contains the delivery form, the order contracts, the order API
//! trait and the submission state machine.

mod flow;
mod form;
mod gateway;
mod order;

pub use flow::{CheckoutConfig, CheckoutError, CheckoutFlow, CheckoutState};
pub use form::{
    DeliveryInfo, FieldCategory, OrderForm, ValidationError, ValidationRules,
    DEFAULT_PHONE_MIN_LENGTH,
};
pub use gateway::{GatewayError, LocalOrderGateway, OrderGateway};
pub use order::{Order, OrderConfirmation, OrderLineItem, OrderRequest, OrderStatus, OrderUpdate};
