//! The add-item workflow.

use common::OrderId;
use domain::{DomainError, NewOrderItem, Order, OrderItem, OrderUpdate, Product};
use store::{StoreTransaction, UnitOfWork};

use crate::command::AddOrderItem;
use crate::error::{FulfillmentError, Result};

/// Outcome of a successful add-item call.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemAdded {
    /// The recorded line item, priced at the product's price before the call.
    pub item: OrderItem,
    /// The order with its updated total.
    pub order: Order,
    /// The product with its reduced quantity.
    pub product: Product,
}

/// Adds items to orders against a transactional store.
///
/// Each call runs in its own transaction. The product row is locked before
/// the stock check and the order row before the total is read, always in
/// that order, so concurrent calls on the same product or order queue up
/// instead of overselling stock or losing a total update. Order edits take
/// the same order lock.
pub struct OrderFulfillment<S: UnitOfWork> {
    store: S,
}

impl<S: UnitOfWork> OrderFulfillment<S> {
    /// Creates a new workflow over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reserves stock, records the line item and updates the order total.
    ///
    /// Either every write lands or none does. Errors are returned as-is,
    /// without retrying.
    #[tracing::instrument(
        skip(self),
        fields(order_id = %cmd.order_id, product_id = %cmd.product_id, quantity = cmd.quantity)
    )]
    pub async fn add_order_item(&self, cmd: AddOrderItem) -> Result<OrderItemAdded> {
        let start = std::time::Instant::now();
        let result = self.execute(cmd).await;
        metrics::histogram!("add_order_item_duration_seconds")
            .record(start.elapsed().as_secs_f64());

        match &result {
            Ok(added) => {
                metrics::counter!("order_items_added_total").increment(1);
                tracing::info!(
                    item_id = %added.item.id,
                    remaining = added.product.quantity,
                    total = %added.order.total,
                    "order item added"
                );
            }
            Err(e) => {
                metrics::counter!("order_items_rejected_total", "reason" => e.reason())
                    .increment(1);
                tracing::warn!(error = %e, "order item rejected");
            }
        }

        result
    }

    /// Applies a partial edit to an order while holding its row lock.
    ///
    /// Fields absent from `update` keep their stored value, read under the
    /// lock, so an edit never writes back a total older than the last
    /// committed add-item.
    #[tracing::instrument(skip(self, update), fields(%order_id))]
    pub async fn edit_order(&self, order_id: OrderId, update: &OrderUpdate) -> Result<Order> {
        if update.user_id.is_some_and(|user_id| !user_id.is_valid()) {
            return Err(DomainError::MissingId { field: "user_id" }.into());
        }

        let mut tx = self.store.begin().await?;
        let result = Self::apply_edit(&mut tx, order_id, update).await;
        let edited = Self::finish(tx, result).await?;

        tracing::info!(status = %edited.status, total = %edited.total, "order updated");
        Ok(edited)
    }

    async fn execute(&self, cmd: AddOrderItem) -> Result<OrderItemAdded> {
        cmd.validate()?;

        let mut tx = self.store.begin().await?;
        let result = Self::apply(&mut tx, cmd).await;
        Self::finish(tx, result).await
    }

    async fn finish<T>(tx: S::Transaction, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn apply_edit(
        tx: &mut S::Transaction,
        order_id: OrderId,
        update: &OrderUpdate,
    ) -> Result<Order> {
        let order = tx
            .lock_order(order_id)
            .await?
            .ok_or(FulfillmentError::OrderNotFound(order_id))?;

        let edited = order.apply(update);
        tx.update_order(order_id, &edited).await?;
        Ok(edited)
    }

    async fn apply(tx: &mut S::Transaction, cmd: AddOrderItem) -> Result<OrderItemAdded> {
        let product = tx
            .lock_product(cmd.product_id)
            .await?
            .ok_or(FulfillmentError::ProductNotFound(cmd.product_id))?;

        let reserved = product.reserve(cmd.quantity)?;
        tx.update_product(product.id, &reserved).await?;

        let item = tx
            .insert_item(NewOrderItem {
                order_id: cmd.order_id,
                product_id: product.id,
                quantity: cmd.quantity,
                price: product.price,
            })
            .await?;

        let order = tx
            .lock_order(cmd.order_id)
            .await?
            .ok_or(FulfillmentError::OrderNotFound(cmd.order_id))?;

        let updated = order.with_line(cmd.quantity, product.price)?;
        tx.update_order(order.id, &updated).await?;

        Ok(OrderItemAdded {
            item,
            order: updated,
            product: reserved,
        })
    }
}
