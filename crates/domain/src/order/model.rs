//! Order and line item rows.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, OrderItemId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use super::OrderStatus;
use crate::error::{DomainError, Result};

/// An order as stored in `orders`.
///
/// `total` is maintained incrementally: each recorded line item adds
/// `quantity * price` to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total: Money,
    pub status: OrderStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns a copy of this order with a line item's value added to the total.
    ///
    /// `user_id` and `status` are carried over unchanged. Fails with
    /// `TotalOutOfRange` instead of overflowing.
    pub fn with_line(&self, quantity: u32, unit_price: Money) -> Result<Order> {
        let total = unit_price
            .checked_mul(quantity)
            .and_then(|line| self.total.checked_add(line))
            .ok_or(DomainError::TotalOutOfRange { order_id: self.id })?;

        Ok(Order {
            total,
            ..self.clone()
        })
    }

    /// Returns a copy with the fields present in `update` replaced.
    pub fn apply(&self, update: &OrderUpdate) -> Order {
        Order {
            user_id: update.user_id.unwrap_or(self.user_id),
            total: update.total.unwrap_or(self.total),
            status: update.status.unwrap_or(self.status),
            ..self.clone()
        }
    }
}

/// A line item as stored in `order_items`.
///
/// `price` is the product's unit price when the item was recorded, not a
/// live reference to the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Money,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the value this item contributes to its order total, or None
    /// if it does not fit the money range.
    pub fn line_total(&self) -> Option<Money> {
        self.price.checked_mul(self.quantity)
    }
}

/// Fields for inserting an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: UserId,
    #[serde(default)]
    pub total: Money,
    #[serde(default)]
    pub status: OrderStatus,
}

impl NewOrder {
    /// An empty order for a user: zero total, status `new`.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            total: Money::zero(),
            status: OrderStatus::New,
        }
    }
}

/// Fields for appending a line item; id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Money,
}

/// Partial order edit. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderUpdate {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub total: Option<Money>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Order {
        Order {
            id: OrderId::new(7),
            user_id: UserId::new(3),
            total: Money::zero(),
            status: OrderStatus::InProcess,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn with_line_adds_to_total_and_keeps_owner_and_status() {
        let updated = order().with_line(3, Money::from_f64(10.0)).unwrap();

        assert_eq!(updated.total, Money::from_f64(30.0));
        assert_eq!(updated.user_id, UserId::new(3));
        assert_eq!(updated.status, OrderStatus::InProcess);
    }

    #[test]
    fn with_line_accumulates() {
        let updated = order()
            .with_line(2, Money::from_f64(0.1))
            .unwrap()
            .with_line(1, Money::from_f64(0.2))
            .unwrap();
        assert_eq!(updated.total.cents(), 40);
    }

    #[test]
    fn apply_replaces_only_present_fields() {
        let update = OrderUpdate {
            status: Some(OrderStatus::Done),
            ..Default::default()
        };
        let updated = order().apply(&update);

        assert_eq!(updated.status, OrderStatus::Done);
        assert_eq!(updated.user_id, UserId::new(3));
        assert_eq!(updated.total, Money::zero());
    }

    #[test]
    fn new_order_defaults_from_json() {
        let new: NewOrder = serde_json::from_str(r#"{"user_id": 4}"#).unwrap();
        assert_eq!(new, NewOrder::for_user(UserId::new(4)));
    }

    #[test]
    fn line_total_uses_snapshot_price() {
        let item = OrderItem {
            id: OrderItemId::new(1),
            order_id: OrderId::new(7),
            product_id: ProductId::new(1),
            quantity: 3,
            price: Money::from_f64(10.0),
            created_at: Utc::now(),
        };
        assert_eq!(item.line_total(), Some(Money::from_f64(30.0)));
    }

    #[test]
    fn with_line_rejects_total_overflow() {
        let huge = Order {
            total: Money::from_cents(Money::MAX_CENTS),
            ..order()
        };

        assert_eq!(
            huge.with_line(1, Money::from_f64(1.0)),
            Err(DomainError::TotalOutOfRange {
                order_id: OrderId::new(7)
            })
        );
        assert!(order().with_line(u32::MAX, Money::from_cents(Money::MAX_CENTS)).is_err());
    }

    #[test]
    fn order_update_rejects_out_of_range_total() {
        assert!(serde_json::from_str::<OrderUpdate>(r#"{"total": 1e300}"#).is_err());
        let update: OrderUpdate = serde_json::from_str(r#"{"total": 12.5}"#).unwrap();
        assert_eq!(update.total, Some(Money::from_f64(12.5)));
    }
}
