//! Fulfillment error types.

use common::{OrderId, ProductId};
use domain::DomainError;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur while adding an item to an order.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// The request itself is malformed (zero quantity, missing id).
    #[error("invalid payload: {0}")]
    Validation(DomainError),

    /// The product does not exist.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// The order does not exist.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// The product has fewer units on hand than requested.
    #[error("product {product_name} is not available in quantity requested")]
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
        available: i32,
        requested: u32,
    },

    /// The store failed; the transaction was rolled back.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl FulfillmentError {
    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            FulfillmentError::Validation(_) => "validation",
            FulfillmentError::ProductNotFound(_) | FulfillmentError::OrderNotFound(_) => {
                "not_found"
            }
            FulfillmentError::InsufficientStock { .. } => "insufficient_stock",
            FulfillmentError::Store(_) => "store",
        }
    }
}

impl From<DomainError> for FulfillmentError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InsufficientStock {
                product_id,
                product_name,
                available,
                requested,
            } => FulfillmentError::InsufficientStock {
                product_id,
                product_name,
                available,
                requested,
            },
            other => FulfillmentError::Validation(other),
        }
    }
}

impl From<StoreError> for FulfillmentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingReference { entity: "order", id } => {
                FulfillmentError::OrderNotFound(OrderId::new(id))
            }
            StoreError::MissingReference {
                entity: "product",
                id,
            } => FulfillmentError::ProductNotFound(ProductId::new(id)),
            other => FulfillmentError::Store(other),
        }
    }
}

/// Convenience type alias for fulfillment results.
pub type Result<T> = std::result::Result<T, FulfillmentError>;
