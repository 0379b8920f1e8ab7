//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in cart, catalog and pricing operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A product reference failed boundary validation.
    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let mismatch = CommerceError::CurrencyMismatch {
            expected: "VND".to_string(),
            got: "USD".to_string(),
        };
        assert_eq!(mismatch.to_string(), "Currency mismatch: expected VND, got USD");
        assert_eq!(
            CommerceError::ProductNotFound("p-9".to_string()).to_string(),
            "Product not found: p-9"
        );
    }

    #[test]
    fn test_from_json_error() {
        let err: CommerceError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, CommerceError::SerializationError(_)));
    }
}
