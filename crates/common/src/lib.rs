//! Shared types used across the order service crates.

pub mod money;
pub mod types;

pub use money::{Money, MoneyOutOfRange};
pub use types::{OrderId, OrderItemId, ProductId, UserId};
