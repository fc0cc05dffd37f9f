//! Orders and their line items.

mod model;
mod state;

pub use model::{NewOrder, NewOrderItem, Order, OrderItem, OrderUpdate};
pub use state::OrderStatus;
