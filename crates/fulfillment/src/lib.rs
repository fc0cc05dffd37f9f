//! Order fulfillment workflow.
//!
//! Adding an item to an order runs these steps in one store transaction:
//! 1. Lock the product row
//! 2. Check that enough units are on hand
//! 3. Write back the product with the reduced quantity
//! 4. Record the line item at the product's current price
//! 5. Lock the order row
//! 6. Write back the order with the increased total
//!
//! If any step fails the transaction is rolled back, so inventory, items and
//! totals are never left half-updated.
//!
//! Order edits lock the same order row, so they serialize with item adds.

pub mod command;
pub mod error;
pub mod workflow;

pub use command::AddOrderItem;
pub use error::FulfillmentError;
pub use workflow::{OrderFulfillment, OrderItemAdded};

/// Registers descriptions for the metrics emitted by the workflow.
///
/// Call once after installing a metrics recorder.
pub fn describe_metrics() {
    metrics::describe_counter!("order_items_added_total", "Order items added successfully");
    metrics::describe_counter!(
        "order_items_rejected_total",
        "Add-item requests rejected, labelled by reason"
    );
    metrics::describe_histogram!(
        "add_order_item_duration_seconds",
        metrics::Unit::Seconds,
        "Time spent in the add-item transaction"
    );
}
