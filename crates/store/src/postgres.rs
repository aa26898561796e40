//! PostgreSQL-backed storage implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId};
use domain::{
    Cart, Money, Order, OrderLineItem, Payment, Product, ProductId, TransactionId,
};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::{CartStore, InventoryStore, OrderStore};

/// PostgreSQL backend implementing all three storage ports.
///
/// The multi-record order write runs inside a native transaction, so
/// the orchestrator's atomicity requirement holds without saga-style
/// cleanup of partial writes. Stock reservation is a single conditional
/// `UPDATE`, serialized by the database row lock.
#[derive(Clone)]
pub struct PostgresShopStore {
    pool: PgPool,
}

impl PostgresShopStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get::<String, _>("id")?),
            name: row.try_get("name")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            stock: row.try_get::<i32, _>("stock")? as u32,
            category: row.try_get("category")?,
        })
    }

    fn row_to_line_item(row: PgRow) -> Result<OrderLineItem> {
        let unit_price = Money::from_cents(row.try_get("price_cents")?);
        let quantity = row.try_get::<i32, _>("quantity")? as u32;
        Ok(OrderLineItem::new(
            row.try_get::<String, _>("product_id")?,
            row.try_get::<String, _>("name")?,
            unit_price,
            quantity,
        ))
    }

    async fn load_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        let Some(order_row) = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(order_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let item_rows = sqlx::query("SELECT * FROM order_line_items WHERE order_id = $1")
            .bind(order_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;
        let line_items = item_rows
            .into_iter()
            .map(Self::row_to_line_item)
            .collect::<Result<Vec<_>>>()?;

        let payment_row = sqlx::query("SELECT * FROM payments WHERE order_id = $1")
            .bind(order_id.as_uuid())
            .fetch_one(&self.pool)
            .await?;

        let payment = Payment {
            order_id,
            amount: Money::from_cents(payment_row.try_get("amount_cents")?),
            method: parse_field(payment_row.try_get::<String, _>("method")?)?,
            status: parse_field(payment_row.try_get::<String, _>("status")?)?,
            transaction_id: TransactionId::from_string(
                payment_row.try_get::<String, _>("transaction_id")?,
            ),
            paid_at: payment_row.try_get::<DateTime<Utc>, _>("paid_at")?,
        };

        Ok(Some(Order::from_parts(
            order_id,
            CustomerId::from_uuid(order_row.try_get::<Uuid, _>("customer_id")?),
            Money::from_cents(order_row.try_get("amount_cents")?),
            parse_field(order_row.try_get::<String, _>("status")?)?,
            parse_field(order_row.try_get::<String, _>("payment_method")?)?,
            order_row.try_get::<DateTime<Utc>, _>("created_at")?,
            line_items,
            payment,
        )))
    }
}

/// Decodes a lowercase enum column through its serde representation.
fn parse_field<T: serde::de::DeserializeOwned>(raw: String) -> Result<T> {
    Ok(serde_json::from_value(serde_json::Value::String(raw))?)
}

#[async_trait]
impl CartStore for PostgresShopStore {
    async fn load(&self, customer_id: CustomerId) -> Result<Cart> {
        let payload: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT payload FROM carts WHERE customer_id = $1")
                .bind(customer_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        let Some(payload) = payload else {
            return Ok(Cart::new());
        };
        match serde_json::from_value(payload) {
            Ok(cart) => Ok(cart),
            Err(error) => {
                tracing::warn!(%customer_id, %error, "stored cart is corrupt, degrading to empty");
                Ok(Cart::new())
            }
        }
    }

    async fn save(&self, customer_id: CustomerId, cart: &Cart) -> Result<()> {
        let payload = serde_json::to_value(cart)?;
        sqlx::query(
            r#"
            INSERT INTO carts (customer_id, payload, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (customer_id) DO UPDATE SET payload = $2, updated_at = now()
            "#,
        )
        .bind(customer_id.as_uuid())
        .bind(payload)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear(&self, customer_id: CustomerId) -> Result<()> {
        sqlx::query("DELETE FROM carts WHERE customer_id = $1")
            .bind(customer_id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for PostgresShopStore {
    async fn insert_product(&self, product: Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, price_cents, stock, category)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
                SET name = $2, price_cents = $3, stock = $4, category = $5
            "#,
        )
        .bind(product.id.as_str())
        .bind(&product.name)
        .bind(product.price.cents())
        .bind(product.stock as i32)
        .bind(&product.category)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(product_id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_product).transpose()
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query("SELECT * FROM products ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn reserve(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        // Single conditional update: the check and the decrement are one
        // statement, so concurrent reservations serialize on the row.
        let result = sqlx::query(
            "UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock >= $2",
        )
        .bind(product_id.as_str())
        .bind(quantity as i32)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let stock: Option<i32> =
                sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
                    .bind(product_id.as_str())
                    .fetch_optional(&self.pool)
                    .await?;
            return match stock {
                None => Err(StoreError::ProductNotFound(product_id.clone())),
                Some(available) => Err(StoreError::InsufficientStock {
                    product_id: product_id.clone(),
                    requested: quantity,
                    available: available as u32,
                }),
            };
        }
        Ok(())
    }

    async fn release(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        let result = sqlx::query("UPDATE products SET stock = stock + $2 WHERE id = $1")
            .bind(product_id.as_str())
            .bind(quantity as i32)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            tracing::warn!(%product_id, quantity, "release for unknown product, skipping");
        }
        Ok(())
    }

    async fn restock(&self, product_id: &ProductId, quantity: u32) -> Result<u32> {
        if quantity == 0 {
            return Err(StoreError::InvalidQuantity(quantity));
        }
        let stock: Option<i32> = sqlx::query_scalar(
            "UPDATE products SET stock = stock + $2 WHERE id = $1 RETURNING stock",
        )
        .bind(product_id.as_str())
        .bind(quantity as i32)
        .fetch_optional(&self.pool)
        .await?;
        match stock {
            Some(stock) => Ok(stock as u32),
            None => Err(StoreError::ProductNotFound(product_id.clone())),
        }
    }
}

#[async_trait]
impl OrderStore for PostgresShopStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let insert_result = sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, amount_cents, status, payment_method, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(order.customer_id().as_uuid())
        .bind(order.amount().cents())
        .bind(order.status().as_str())
        .bind(order.payment_method().as_str())
        .bind(order.created_at())
        .execute(&mut *tx)
        .await;

        if let Err(sqlx::Error::Database(db_err)) = &insert_result
            && db_err.is_unique_violation()
        {
            return Err(StoreError::DuplicateOrder(order.id()));
        }
        insert_result?;

        for item in order.line_items() {
            sqlx::query(
                r#"
                INSERT INTO order_line_items (order_id, product_id, name, price_cents, quantity, subtotal_cents)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order.id().as_uuid())
            .bind(item.product_id.as_str())
            .bind(&item.name)
            .bind(item.unit_price.cents())
            .bind(item.quantity as i32)
            .bind(item.subtotal.cents())
            .execute(&mut *tx)
            .await?;
        }

        let payment = order.payment();
        sqlx::query(
            r#"
            INSERT INTO payments (order_id, amount_cents, method, status, transaction_id, paid_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(payment.amount.cents())
        .bind(payment.method.as_str())
        .bind(payment.status.as_str())
        .bind(payment.transaction_id.as_str())
        .bind(payment.paid_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>> {
        self.load_order(order_id).await
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM orders ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        let mut orders = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(order) = self.load_order(OrderId::from_uuid(id)).await? {
                orders.push(order);
            }
        }
        Ok(orders)
    }

    async fn update(&self, order: &Order) -> Result<()> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(order.id().as_uuid())
            .bind(order.status().as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::OrderNotFound(order.id()));
        }
        Ok(())
    }

    async fn delete(&self, order_id: OrderId) -> Result<()> {
        // Line items and payment go with the order via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id.as_uuid())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::OrderNotFound(order_id));
        }
        Ok(())
    }
}
