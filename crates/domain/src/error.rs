//! Domain error types.

use common::{OrderId, ProductId};
use thiserror::Error;

/// Errors raised by the product and order rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The product does not hold enough units for the request.
    #[error("product {product_name} is not available in quantity requested")]
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
        available: i32,
        requested: u32,
    },

    /// Requested quantity must be a positive whole number that fits a stock count.
    #[error("quantity must be between 1 and {max}, got {quantity}", max = i32::MAX)]
    InvalidQuantity { quantity: i64 },

    /// Adding a line would take the order total out of the money range.
    #[error("total of order {order_id} would exceed the supported amount")]
    TotalOutOfRange { order_id: OrderId },

    /// A referenced row id is missing or not positive.
    #[error("{field} is required")]
    MissingId { field: &'static str },

    /// A status string did not name a known order status.
    #[error("unknown order status: {0}")]
    UnknownStatus(String),
}

/// Convenience type alias for domain results.
pub type Result<T> = std::result::Result<T, DomainError>;
