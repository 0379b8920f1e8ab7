//! Checkout submission state machine.

use crate::auth::AuthState;
use crate::cart::CartStore;
use crate::checkout::{
    GatewayError, OrderConfirmation, OrderForm, OrderGateway, OrderRequest, ValidationError,
    ValidationRules,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Where the checkout currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    Idle,
    /// Checkout was entered or submitted with nothing in the cart.
    EmptyCartBlocked,
    Validating,
    Submitting,
    Submitted(OrderConfirmation),
}

impl CheckoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::EmptyCartBlocked => "empty_cart_blocked",
            CheckoutState::Validating => "validating",
            CheckoutState::Submitting => "submitting",
            CheckoutState::Submitted(_) => "submitted",
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, CheckoutState::Validating | CheckoutState::Submitting)
    }
}

/// Checkout settings.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub rules: ValidationRules,
    /// How long to wait for the order API before giving up.
    pub submit_timeout: Duration,
    /// Refuse to submit for anonymous shoppers.
    pub require_sign_in: bool,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            rules: ValidationRules::default(),
            submit_timeout: Duration::from_secs(15),
            require_sign_in: true,
        }
    }
}

/// Why a submission did not produce an order.
#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Sign in required to place an order")]
    SignInRequired,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid delivery details: {0}")]
    Validation(#[from] ValidationError),

    #[error("Order submission failed: {0}")]
    Submission(#[from] GatewayError),

    #[error("Order submission timed out after {0:?}")]
    Timeout(Duration),
}

impl CheckoutError {
    /// Whether trying again with the same cart and form may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            CheckoutError::Submission(GatewayError::Network(_)) | CheckoutError::Timeout(_) => true,
            CheckoutError::Submission(_)
            | CheckoutError::SignInRequired
            | CheckoutError::EmptyCart
            | CheckoutError::Validation(_) => false,
        }
    }

    /// Text suitable for showing to the shopper.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::SignInRequired => "Please sign in to place your order.".to_string(),
            CheckoutError::EmptyCart => {
                "Your cart is empty. Add some products before checking out.".to_string()
            }
            CheckoutError::Validation(e) => e.to_string(),
            CheckoutError::Submission(GatewayError::Rejected(reason)) => {
                format!("We could not accept your order: {reason}. Your cart has been kept.")
            }
            CheckoutError::Submission(_) | CheckoutError::Timeout(_) => {
                "We could not place your order right now. Your cart has been kept, please try again."
                    .to_string()
            }
        }
    }
}

/// Drives one checkout from form to confirmed order.
///
/// The ordered lines leave the cart only after the order API confirms
/// the order. Any failure leaves it exactly as it was.
pub struct CheckoutFlow {
    cart: CartStore,
    gateway: Arc<dyn OrderGateway>,
    config: CheckoutConfig,
    state: CheckoutState,
}

impl CheckoutFlow {
    pub fn new(cart: CartStore, gateway: Arc<dyn OrderGateway>, config: CheckoutConfig) -> Self {
        Self {
            cart,
            gateway,
            config,
            state: CheckoutState::Idle,
        }
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Open the checkout. Blocks straight away when the cart is empty.
    pub fn enter(&mut self) -> &CheckoutState {
        self.state = if self.cart.is_empty() {
            CheckoutState::EmptyCartBlocked
        } else {
            CheckoutState::Idle
        };
        &self.state
    }

    /// Back to idle, e.g. after showing a confirmation.
    pub fn reset(&mut self) {
        self.state = CheckoutState::Idle;
    }

    /// Validate `form` and submit the current cart as an order.
    ///
    /// Taking `&mut self` keeps a second submission from starting while
    /// one is in flight.
    pub async fn submit(
        &mut self,
        form: &OrderForm,
        auth: &AuthState,
    ) -> Result<OrderConfirmation, CheckoutError> {
        if self.config.require_sign_in && !auth.is_authenticated() {
            self.state = CheckoutState::Idle;
            return Err(CheckoutError::SignInRequired);
        }
        if self.cart.is_empty() {
            self.state = CheckoutState::EmptyCartBlocked;
            return Err(CheckoutError::EmptyCart);
        }

        self.state = CheckoutState::Validating;
        let delivery = match form.validate(&self.config.rules) {
            Ok(delivery) => delivery,
            Err(e) => {
                debug!(field = e.field().as_str(), "delivery form rejected");
                self.state = CheckoutState::Idle;
                return Err(e.into());
            }
        };

        // Freeze the cart before any await point.
        let snapshot = self.cart.snapshot();
        if snapshot.is_empty() {
            self.state = CheckoutState::EmptyCartBlocked;
            return Err(CheckoutError::EmptyCart);
        }
        let request = OrderRequest::from_snapshot(delivery, &snapshot, auth);

        self.state = CheckoutState::Submitting;
        info!(
            lines = request.items.len(),
            total = %request.total,
            "submitting order"
        );

        let outcome =
            tokio::time::timeout(self.config.submit_timeout, self.gateway.create_order(&request))
                .await;

        match outcome {
            Ok(Ok(confirmation)) => {
                self.cart.remove_ordered(&snapshot);
                info!(
                    order_id = %confirmation.order_id,
                    order_number = %confirmation.order_number,
                    "order placed"
                );
                self.state = CheckoutState::Submitted(confirmation.clone());
                Ok(confirmation)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "order submission failed, cart kept");
                self.state = CheckoutState::Idle;
                Err(e.into())
            }
            Err(_) => {
                warn!(timeout = ?self.config.submit_timeout, "order submission timed out, cart kept");
                self.state = CheckoutState::Idle;
                Err(CheckoutError::Timeout(self.config.submit_timeout))
            }
        }
    }
}

impl std::fmt::Debug for CheckoutFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutFlow")
            .field("state", &self.state)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
