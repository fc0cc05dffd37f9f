use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{OrderId, OrderItemId, ProductId};
use domain::{NewOrder, NewOrderItem, NewProduct, Order, OrderItem, Product};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    OrderQuery, ProductQuery, Result, StoreError,
    query::paginate,
    store::{OrderStore, ProductStore, StoreTransaction, UnitOfWork},
};

/// A write that can be armed to fail on the in-memory store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    UpdateProduct,
    InsertItem,
    UpdateOrder,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    items: Vec<OrderItem>,
    last_product_id: i32,
    last_order_id: i32,
    last_item_id: i32,
}

impl Tables {
    fn insert_product(&mut self, new: NewProduct) -> Product {
        self.last_product_id += 1;
        let product = Product {
            id: ProductId::new(self.last_product_id),
            name: new.name,
            description: new.description,
            price: new.price,
            quantity: new.quantity,
            category: new.category,
            created_at: Utc::now(),
        };
        self.products.insert(product.id, product.clone());
        product
    }

    fn replace_product(&mut self, id: ProductId, product: &Product) {
        if let Some(stored) = self.products.get_mut(&id) {
            *stored = Product {
                id,
                created_at: stored.created_at,
                ..product.clone()
            };
        }
    }

    fn insert_order(&mut self, new: NewOrder) -> Order {
        self.last_order_id += 1;
        let order = Order {
            id: OrderId::new(self.last_order_id),
            user_id: new.user_id,
            total: new.total,
            status: new.status,
            created_at: Utc::now(),
        };
        self.orders.insert(order.id, order.clone());
        order
    }

    fn replace_order(&mut self, id: OrderId, order: &Order) {
        if let Some(stored) = self.orders.get_mut(&id) {
            stored.user_id = order.user_id;
            stored.total = order.total;
            stored.status = order.status;
        }
    }

    fn insert_item(&mut self, new: NewOrderItem) -> Result<OrderItem> {
        if !self.orders.contains_key(&new.order_id) {
            return Err(StoreError::MissingReference {
                entity: "order",
                id: new.order_id.as_i32(),
            });
        }
        if !self.products.contains_key(&new.product_id) {
            return Err(StoreError::MissingReference {
                entity: "product",
                id: new.product_id.as_i32(),
            });
        }

        self.last_item_id += 1;
        let item = OrderItem {
            id: OrderItemId::new(self.last_item_id),
            order_id: new.order_id,
            product_id: new.product_id,
            quantity: new.quantity,
            price: new.price,
            created_at: Utc::now(),
        };
        self.items.push(item.clone());
        Ok(item)
    }
}

#[derive(Debug, Default)]
struct Shared {
    tables: Tables,
    fail_on: Option<FailPoint>,
}

impl Shared {
    fn check(&self, point: FailPoint) -> Result<()> {
        if self.fail_on == Some(point) {
            return Err(StoreError::Injected(point));
        }
        Ok(())
    }
}

/// In-memory store implementation for testing.
///
/// Implements the same traits as the PostgreSQL store. A transaction holds
/// the store-wide lock from `begin` until it is committed or dropped, so
/// transactions are fully serialized and plain reads wait for them.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<Shared>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write at `point` fail until cleared.
    pub async fn fail_on(&self, point: FailPoint) {
        self.state.lock().await.fail_on = Some(point);
    }

    /// Disarms any failure set with [`InMemoryStore::fail_on`].
    pub async fn clear_failures(&self) {
        self.state.lock().await.fail_on = None;
    }

    /// Returns the total number of line items across all orders.
    pub async fn item_count(&self) -> usize {
        self.state.lock().await.tables.items.len()
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        Ok(self.state.lock().await.tables.insert_product(product))
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.state.lock().await.tables.products.get(&id).cloned())
    }

    async fn update_product(&self, id: ProductId, product: &Product) -> Result<()> {
        let mut state = self.state.lock().await;
        state.check(FailPoint::UpdateProduct)?;
        state.tables.replace_product(id, product);
        Ok(())
    }

    async fn query_products(&self, query: ProductQuery) -> Result<Vec<Product>> {
        let state = self.state.lock().await;
        let matching = state
            .tables
            .products
            .values()
            .filter(|p| query.matches(p))
            .cloned();
        Ok(paginate(matching, query.offset, query.limit))
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn create_order(&self, order: NewOrder) -> Result<Order> {
        Ok(self.state.lock().await.tables.insert_order(order))
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.lock().await.tables.orders.get(&id).cloned())
    }

    async fn update_order(&self, id: OrderId, order: &Order) -> Result<()> {
        let mut state = self.state.lock().await;
        state.check(FailPoint::UpdateOrder)?;
        state.tables.replace_order(id, order);
        Ok(())
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool> {
        let mut state = self.state.lock().await;
        let existed = state.tables.orders.remove(&id).is_some();
        // ON DELETE CASCADE
        state.tables.items.retain(|item| item.order_id != id);
        Ok(existed)
    }

    async fn query_orders(&self, query: OrderQuery) -> Result<Vec<Order>> {
        let state = self.state.lock().await;
        let matching = state
            .tables
            .orders
            .values()
            .filter(|o| query.matches(o))
            .cloned();
        Ok(paginate(matching, query.offset, query.limit))
    }

    async fn insert_item(&self, item: NewOrderItem) -> Result<OrderItem> {
        let mut state = self.state.lock().await;
        state.check(FailPoint::InsertItem)?;
        state.tables.insert_item(item)
    }

    async fn get_items_for_order(&self, id: OrderId) -> Result<Vec<OrderItem>> {
        let state = self.state.lock().await;
        Ok(state
            .tables
            .items
            .iter()
            .filter(|item| item.order_id == id)
            .cloned()
            .collect())
    }
}

/// Transaction over an [`InMemoryStore`].
///
/// Writes go to a private copy of the tables that replaces the shared
/// tables on commit.
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<Shared>,
    staged: Tables,
}

#[async_trait]
impl UnitOfWork for InMemoryStore {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> Result<InMemoryTransaction> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.tables.clone();
        Ok(InMemoryTransaction { guard, staged })
    }
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn lock_product(&mut self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.staged.products.get(&id).cloned())
    }

    async fn update_product(&mut self, id: ProductId, product: &Product) -> Result<()> {
        self.guard.check(FailPoint::UpdateProduct)?;
        self.staged.replace_product(id, product);
        Ok(())
    }

    async fn insert_item(&mut self, item: NewOrderItem) -> Result<OrderItem> {
        self.guard.check(FailPoint::InsertItem)?;
        self.staged.insert_item(item)
    }

    async fn lock_order(&mut self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.staged.orders.get(&id).cloned())
    }

    async fn update_order(&mut self, id: OrderId, order: &Order) -> Result<()> {
        self.guard.check(FailPoint::UpdateOrder)?;
        self.staged.replace_order(id, order);
        Ok(())
    }

    async fn commit(self) -> Result<()> {
        let InMemoryTransaction { mut guard, staged } = self;
        guard.tables = staged;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        Ok(())
    }
}
