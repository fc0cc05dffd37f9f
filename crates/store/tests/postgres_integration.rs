//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use common::{Money, OrderId, UserId};
use domain::{NewOrder, NewOrderItem, NewProduct, OrderStatus, Product};
use sqlx::PgPool;
use store::{
    OrderQuery, OrderStore, PostgresStore, ProductQuery, ProductStore, StoreError,
    StoreTransaction, UnitOfWork,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            PostgresStore::new(temp_pool.clone())
                .run_migrations()
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE order_items, orders, products RESTART IDENTITY")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

async fn seed_product(store: &PostgresStore, quantity: i32) -> Product {
    store
        .create_product(
            NewProduct::new("Widget", Money::from_f64(10.0), quantity, "tools")
                .description("A widget"),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn create_and_fetch_product() {
    let store = get_test_store().await;
    let product = seed_product(&store, 5).await;

    let fetched = store.get_product(product.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Widget");
    assert_eq!(fetched.description, "A widget");
    assert_eq!(fetched.price, Money::from_f64(10.0));
    assert_eq!(fetched.quantity, 5);
    assert_eq!(fetched.category, "tools");
}

#[tokio::test]
async fn update_product_replaces_row() {
    let store = get_test_store().await;
    let product = seed_product(&store, 5).await;

    let edited = Product {
        quantity: 2,
        price: Money::from_f64(12.5),
        ..product.clone()
    };
    store.update_product(product.id, &edited).await.unwrap();

    let fetched = store.get_product(product.id).await.unwrap().unwrap();
    assert_eq!(fetched.quantity, 2);
    assert_eq!(fetched.price, Money::from_f64(12.5));
}

#[tokio::test]
async fn query_products_by_name_and_category() {
    let store = get_test_store().await;
    seed_product(&store, 1).await;
    store
        .create_product(NewProduct::new("Gadget", Money::from_f64(3.0), 1, "toys"))
        .await
        .unwrap();

    let widgets = store
        .query_products(ProductQuery::new().name_contains("WIDG"))
        .await
        .unwrap();
    assert_eq!(widgets.len(), 1);

    let toys = store
        .query_products(ProductQuery::new().category("toys"))
        .await
        .unwrap();
    assert_eq!(toys.len(), 1);
    assert_eq!(toys[0].name, "Gadget");
}

#[tokio::test]
async fn order_crud_and_search() {
    let store = get_test_store().await;
    let order = store
        .create_order(NewOrder::for_user(UserId::new(3)))
        .await
        .unwrap();
    assert_eq!(order.total, Money::zero());
    assert_eq!(order.status, OrderStatus::New);

    let done = domain::Order {
        status: OrderStatus::Done,
        ..order.clone()
    };
    store.update_order(order.id, &done).await.unwrap();

    let by_status = store
        .query_orders(OrderQuery::for_status(OrderStatus::Done))
        .await
        .unwrap();
    assert_eq!(by_status.len(), 1);

    let by_user = store
        .query_orders(OrderQuery::for_user(UserId::new(3)))
        .await
        .unwrap();
    assert_eq!(by_user.len(), 1);

    assert!(store.delete_order(order.id).await.unwrap());
    assert!(store.get_order(order.id).await.unwrap().is_none());
}

#[tokio::test]
async fn insert_item_with_missing_order_is_typed() {
    let store = get_test_store().await;
    let product = seed_product(&store, 5).await;

    let result = store
        .insert_item(NewOrderItem {
            order_id: OrderId::new(999),
            product_id: product.id,
            quantity: 1,
            price: product.price,
        })
        .await;

    assert!(matches!(
        result,
        Err(StoreError::MissingReference { entity: "order", id: 999 })
    ));
}

#[tokio::test]
async fn delete_order_cascades_items() {
    let store = get_test_store().await;
    let product = seed_product(&store, 5).await;
    let order = store
        .create_order(NewOrder::for_user(UserId::new(1)))
        .await
        .unwrap();
    store
        .insert_item(NewOrderItem {
            order_id: order.id,
            product_id: product.id,
            quantity: 2,
            price: product.price,
        })
        .await
        .unwrap();

    store.delete_order(order.id).await.unwrap();

    let items = store.get_items_for_order(order.id).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn dropped_transaction_rolls_back() {
    let store = get_test_store().await;
    let product = seed_product(&store, 5).await;

    {
        let mut tx = store.begin().await.unwrap();
        let locked = tx.lock_product(product.id).await.unwrap().unwrap();
        tx.update_product(product.id, &locked.reserve(5).unwrap())
            .await
            .unwrap();
    }

    let fetched = store.get_product(product.id).await.unwrap().unwrap();
    assert_eq!(fetched.quantity, 5);
}

#[tokio::test]
async fn committed_transaction_is_visible() {
    let store = get_test_store().await;
    let product = seed_product(&store, 5).await;
    let order = store
        .create_order(NewOrder::for_user(UserId::new(1)))
        .await
        .unwrap();

    let mut tx = store.begin().await.unwrap();
    let locked = tx.lock_product(product.id).await.unwrap().unwrap();
    tx.update_product(product.id, &locked.reserve(3).unwrap())
        .await
        .unwrap();
    tx.insert_item(NewOrderItem {
        order_id: order.id,
        product_id: product.id,
        quantity: 3,
        price: locked.price,
    })
    .await
    .unwrap();
    let locked_order = tx.lock_order(order.id).await.unwrap().unwrap();
    tx.update_order(order.id, &locked_order.with_line(3, locked.price).unwrap())
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let fetched = store.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(fetched.total, Money::from_f64(30.0));
    let items = store.get_items_for_order(order.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].price, Money::from_f64(10.0));
}
