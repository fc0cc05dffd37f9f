use async_trait::async_trait;
use common::{OrderId, ProductId};
use domain::{NewOrder, NewOrderItem, NewProduct, Order, OrderItem, Product};

use crate::{OrderQuery, ProductQuery, Result};

/// Access to the `products` table.
///
/// Updates are full-row replaces keyed by id; `id` and `created_at` of the
/// stored row are kept. Updating a missing row is not an error, matching a
/// plain SQL `UPDATE`.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Inserts a product and returns it with its assigned id and timestamp.
    async fn create_product(&self, product: NewProduct) -> Result<Product>;

    /// Fetches a product by id. Returns None if it does not exist.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Replaces the mutable columns of a product.
    async fn update_product(&self, id: ProductId, product: &Product) -> Result<()>;

    /// Retrieves products matching a query, ordered by id.
    async fn query_products(&self, query: ProductQuery) -> Result<Vec<Product>>;
}

/// Access to the `orders` and `order_items` tables.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts an order and returns it with its assigned id and timestamp.
    async fn create_order(&self, order: NewOrder) -> Result<Order>;

    /// Fetches an order by id. Returns None if it does not exist.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Replaces `user_id`, `total` and `status` of an order.
    async fn update_order(&self, id: OrderId, order: &Order) -> Result<()>;

    /// Deletes an order together with its line items.
    ///
    /// Returns false if the order did not exist.
    async fn delete_order(&self, id: OrderId) -> Result<bool>;

    /// Retrieves orders matching a query, ordered by id.
    async fn query_orders(&self, query: OrderQuery) -> Result<Vec<Order>>;

    /// Appends a line item.
    ///
    /// Fails with `MissingReference` if the order or product does not exist.
    async fn insert_item(&self, item: NewOrderItem) -> Result<OrderItem>;

    /// Retrieves the line items of an order, oldest first.
    async fn get_items_for_order(&self, id: OrderId) -> Result<Vec<OrderItem>>;
}

/// A store that can run several reads and writes as one atomic unit.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    type Transaction: StoreTransaction;

    /// Starts a transaction.
    async fn begin(&self) -> Result<Self::Transaction>;
}

/// An open transaction.
///
/// Rows read through `lock_*` stay locked against other transactions until
/// commit or rollback. Dropping a transaction without committing rolls it
/// back, so an early `?` return leaves no partial writes behind.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Fetches a product and locks it for update.
    async fn lock_product(&mut self, id: ProductId) -> Result<Option<Product>>;

    /// Replaces the mutable columns of a product.
    async fn update_product(&mut self, id: ProductId, product: &Product) -> Result<()>;

    /// Appends a line item.
    async fn insert_item(&mut self, item: NewOrderItem) -> Result<OrderItem>;

    /// Fetches an order and locks it for update.
    async fn lock_order(&mut self, id: OrderId) -> Result<Option<Order>>;

    /// Replaces `user_id`, `total` and `status` of an order.
    async fn update_order(&mut self, id: OrderId, order: &Order) -> Result<()>;

    /// Makes every write of this transaction visible.
    async fn commit(self) -> Result<()>;

    /// Discards every write of this transaction.
    async fn rollback(self) -> Result<()>;
}
