use async_trait::async_trait;
use common::{Money, OrderId, OrderItemId, ProductId, UserId};
use domain::{
    DomainError, NewOrder, NewOrderItem, NewProduct, Order, OrderItem, OrderStatus, Product,
};
use sqlx::{PgExecutor, PgPool, Postgres, Row, postgres::PgRow};

use crate::{
    OrderQuery, ProductQuery, Result, StoreError,
    store::{OrderStore, ProductStore, StoreTransaction, UnitOfWork},
};

const ORDER_FK: &str = "order_items_orderid_fkey";
const PRODUCT_FK: &str = "order_items_productid_fkey";

/// PostgreSQL-backed store for products, orders and order items.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::info!("database migrations applied");
        Ok(())
    }
}

fn row_to_product(row: PgRow) -> Result<Product> {
    Ok(Product {
        id: ProductId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: Money::from_f64(row.try_get("price")?),
        quantity: row.try_get("quantity")?,
        category: row.try_get("category")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_order(row: PgRow) -> Result<Order> {
    let status: String = row.try_get("status")?;
    let status: OrderStatus = status.parse().map_err(|e: DomainError| StoreError::Corrupt {
        table: "orders",
        reason: e.to_string(),
    })?;

    Ok(Order {
        id: OrderId::new(row.try_get("id")?),
        user_id: UserId::new(row.try_get("userid")?),
        total: Money::from_f64(row.try_get("total")?),
        status,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_item(row: PgRow) -> Result<OrderItem> {
    let quantity: i32 = row.try_get("quantity")?;
    let quantity = u32::try_from(quantity).map_err(|_| StoreError::Corrupt {
        table: "order_items",
        reason: format!("negative quantity {quantity}"),
    })?;

    Ok(OrderItem {
        id: OrderItemId::new(row.try_get("id")?),
        order_id: OrderId::new(row.try_get("orderid")?),
        product_id: ProductId::new(row.try_get("productid")?),
        quantity,
        price: Money::from_f64(row.try_get("price")?),
        created_at: row.try_get("created_at")?,
    })
}

// Statements shared by the pool and by open transactions.

async fn select_product<'e, E: PgExecutor<'e>>(
    executor: E,
    id: ProductId,
    lock: bool,
) -> Result<Option<Product>> {
    // NO KEY UPDATE still admits the KEY SHARE taken by foreign key checks,
    // so concurrent item inserts do not deadlock against this lock.
    let sql = if lock {
        r#"
        SELECT id, name, description, price, quantity, category, created_at
        FROM products
        WHERE id = $1
        FOR NO KEY UPDATE
        "#
    } else {
        r#"
        SELECT id, name, description, price, quantity, category, created_at
        FROM products
        WHERE id = $1
        "#
    };

    let row = sqlx::query(sql)
        .bind(id.as_i32())
        .fetch_optional(executor)
        .await?;
    row.map(row_to_product).transpose()
}

async fn update_product_row<'e, E: PgExecutor<'e>>(
    executor: E,
    id: ProductId,
    product: &Product,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE products
        SET name = $1, description = $2, price = $3, quantity = $4, category = $5
        WHERE id = $6
        "#,
    )
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price.as_f64())
    .bind(product.quantity)
    .bind(&product.category)
    .bind(id.as_i32())
    .execute(executor)
    .await?;

    Ok(())
}

async fn select_order<'e, E: PgExecutor<'e>>(
    executor: E,
    id: OrderId,
    lock: bool,
) -> Result<Option<Order>> {
    let sql = if lock {
        r#"
        SELECT id, userid, total, status, created_at
        FROM orders
        WHERE id = $1
        FOR NO KEY UPDATE
        "#
    } else {
        r#"
        SELECT id, userid, total, status, created_at
        FROM orders
        WHERE id = $1
        "#
    };

    let row = sqlx::query(sql)
        .bind(id.as_i32())
        .fetch_optional(executor)
        .await?;
    row.map(row_to_order).transpose()
}

async fn update_order_row<'e, E: PgExecutor<'e>>(
    executor: E,
    id: OrderId,
    order: &Order,
) -> Result<()> {
    sqlx::query("UPDATE orders SET userid = $1, total = $2, status = $3 WHERE id = $4")
        .bind(order.user_id.as_i32())
        .bind(order.total.as_f64())
        .bind(order.status.as_str())
        .bind(id.as_i32())
        .execute(executor)
        .await?;

    Ok(())
}

async fn insert_item_row<'e, E: PgExecutor<'e>>(
    executor: E,
    item: NewOrderItem,
) -> Result<OrderItem> {
    let row = sqlx::query(
        r#"
        INSERT INTO order_items (orderid, productid, quantity, price)
        VALUES ($1, $2, $3, $4)
        RETURNING id, orderid, productid, quantity, price, created_at
        "#,
    )
    .bind(item.order_id.as_i32())
    .bind(item.product_id.as_i32())
    .bind(i64::from(item.quantity))
    .bind(item.price.as_f64())
    .fetch_one(executor)
    .await
    .map_err(|e| {
        // A foreign key violation means the parent row is gone
        if let sqlx::Error::Database(ref db_err) = e {
            match db_err.constraint() {
                Some(ORDER_FK) => {
                    return StoreError::MissingReference {
                        entity: "order",
                        id: item.order_id.as_i32(),
                    };
                }
                Some(PRODUCT_FK) => {
                    return StoreError::MissingReference {
                        entity: "product",
                        id: item.product_id.as_i32(),
                    };
                }
                _ => {}
            }
        }
        StoreError::Database(e)
    })?;

    row_to_item(row)
}

#[async_trait]
impl ProductStore for PostgresStore {
    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let row = sqlx::query(
            r#"
            INSERT INTO products (name, description, price, quantity, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, price, quantity, category, created_at
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.as_f64())
        .bind(product.quantity)
        .bind(&product.category)
        .fetch_one(&self.pool)
        .await?;

        row_to_product(row)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        select_product(&self.pool, id, false).await
    }

    async fn update_product(&self, id: ProductId, product: &Product) -> Result<()> {
        update_product_row(&self.pool, id, product).await
    }

    async fn query_products(&self, query: ProductQuery) -> Result<Vec<Product>> {
        let mut sql = String::from(
            "SELECT id, name, description, price, quantity, category, created_at FROM products WHERE 1=1",
        );
        let mut param_count = 0;

        if query.name_contains.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND name ILIKE ${param_count}"));
        }
        if query.category.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND category = ${param_count}"));
        }

        sql.push_str(" ORDER BY id ASC");

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        let mut sqlx_query = sqlx::query(&sql);

        if let Some(fragment) = query.name_contains {
            sqlx_query = sqlx_query.bind(format!("%{fragment}%"));
        }
        if let Some(category) = query.category {
            sqlx_query = sqlx_query.bind(category);
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            sqlx_query = sqlx_query.bind(offset as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(row_to_product).collect()
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn create_order(&self, order: NewOrder) -> Result<Order> {
        let row = sqlx::query(
            r#"
            INSERT INTO orders (userid, total, status)
            VALUES ($1, $2, $3)
            RETURNING id, userid, total, status, created_at
            "#,
        )
        .bind(order.user_id.as_i32())
        .bind(order.total.as_f64())
        .bind(order.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        row_to_order(row)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        select_order(&self.pool, id, false).await
    }

    async fn update_order(&self, id: OrderId, order: &Order) -> Result<()> {
        update_order_row(&self.pool, id, order).await
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_i32())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn query_orders(&self, query: OrderQuery) -> Result<Vec<Order>> {
        let mut sql =
            String::from("SELECT id, userid, total, status, created_at FROM orders WHERE 1=1");
        let mut param_count = 0;

        if query.status.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND status = ${param_count}"));
        }
        if query.user_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND userid = ${param_count}"));
        }

        sql.push_str(" ORDER BY id ASC");

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        let mut sqlx_query = sqlx::query(&sql);

        if let Some(status) = query.status {
            sqlx_query = sqlx_query.bind(status.as_str());
        }
        if let Some(user_id) = query.user_id {
            sqlx_query = sqlx_query.bind(user_id.as_i32());
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            sqlx_query = sqlx_query.bind(offset as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(row_to_order).collect()
    }

    async fn insert_item(&self, item: NewOrderItem) -> Result<OrderItem> {
        insert_item_row(&self.pool, item).await
    }

    async fn get_items_for_order(&self, id: OrderId) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, orderid, productid, quantity, price, created_at
            FROM order_items
            WHERE orderid = $1
            ORDER BY id ASC
            "#,
        )
        .bind(id.as_i32())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_item).collect()
    }
}

/// An open PostgreSQL transaction.
///
/// `lock_*` reads take row locks held until commit. Dropping the value
/// without committing rolls the transaction back.
pub struct PostgresTransaction {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PostgresStore {
    type Transaction = PostgresTransaction;

    async fn begin(&self) -> Result<PostgresTransaction> {
        Ok(PostgresTransaction {
            tx: self.pool.begin().await?,
        })
    }
}

#[async_trait]
impl StoreTransaction for PostgresTransaction {
    async fn lock_product(&mut self, id: ProductId) -> Result<Option<Product>> {
        select_product(&mut *self.tx, id, true).await
    }

    async fn update_product(&mut self, id: ProductId, product: &Product) -> Result<()> {
        update_product_row(&mut *self.tx, id, product).await
    }

    async fn insert_item(&mut self, item: NewOrderItem) -> Result<OrderItem> {
        insert_item_row(&mut *self.tx, item).await
    }

    async fn lock_order(&mut self, id: OrderId) -> Result<Option<Order>> {
        select_order(&mut *self.tx, id, true).await
    }

    async fn update_order(&mut self, id: OrderId, order: &Order) -> Result<()> {
        update_order_row(&mut *self.tx, id, order).await
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
