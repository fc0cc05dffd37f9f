//! Domain layer for the order services.
//!
//! This crate holds the row types shared by the stores and the workflow:
//! - Product with the stock reservation rule
//! - Order with its status and incrementally maintained total
//! - OrderItem with its snapshot price

pub mod error;
pub mod order;
pub mod product;

pub use common::{Money, OrderId, OrderItemId, ProductId, UserId};
pub use error::DomainError;
pub use order::{NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, OrderUpdate};
pub use product::{NewProduct, Product};
