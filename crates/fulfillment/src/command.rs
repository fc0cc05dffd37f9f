//! The add-item command.

use common::{OrderId, ProductId};
use domain::DomainError;

/// Request to add `quantity` units of a product to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
}

impl AddOrderItem {
    /// Largest quantity a single line can carry; stock counts are `INTEGER`.
    pub const MAX_QUANTITY: u32 = i32::MAX as u32;

    /// Creates a new add-item command.
    pub fn new(order_id: OrderId, product_id: ProductId, quantity: u32) -> Self {
        Self {
            order_id,
            product_id,
            quantity,
        }
    }

    /// Builds a command from unchecked request values.
    ///
    /// Zero or negative quantities and ids are rejected, as is any quantity
    /// that does not fit a stock count.
    pub fn parse(order_id: i32, product_id: i32, quantity: i64) -> Result<Self, DomainError> {
        let quantity =
            u32::try_from(quantity).map_err(|_| DomainError::InvalidQuantity { quantity })?;

        let cmd = Self::new(OrderId::new(order_id), ProductId::new(product_id), quantity);
        cmd.validate()?;
        Ok(cmd)
    }

    /// Checks the preconditions that do not need the store.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.order_id.is_valid() {
            return Err(DomainError::MissingId { field: "order_id" });
        }
        if !self.product_id.is_valid() {
            return Err(DomainError::MissingId { field: "product_id" });
        }
        if self.quantity == 0 || self.quantity > Self::MAX_QUANTITY {
            return Err(DomainError::InvalidQuantity {
                quantity: i64::from(self.quantity),
            });
        }
        Ok(())
    }
}
