//! Orders repository for database operations

use rust_decimal::Decimal;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{OrderStatus, PaymentMethod},
        order::{price_items, Order, OrderDetails, OrderItemDetails},
    },
};

use super::{books::fetch_books_by_ids, playlists::grant_books};

/// What a state transition requires from storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderUpdate {
    None,
    Save,
    /// Save and add the order's books to the owner's library
    SaveAndGrant,
}

#[derive(Clone)]
pub struct OrdersRepository {
    pool: Pool<Postgres>,
}

impl OrdersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create an order for the given distinct book ids.
    /// Free orders complete immediately and grant their books.
    pub async fn checkout(&self, user_id: &str, book_ids: &[i64]) -> AppResult<OrderDetails> {
        let mut tx = self.pool.begin().await?;

        let books = fetch_books_by_ids(&mut *tx, book_ids).await?;
        if books.len() != book_ids.len() {
            return Err(AppError::NotFound("Some books not found".to_string()));
        }

        let (items, total) = price_items(&books);
        let status = if total.is_zero() {
            OrderStatus::Completed
        } else {
            OrderStatus::PendingPayment
        };

        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (user_id, total_price, status, payment_method)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(total)
        .bind(status)
        .bind(PaymentMethod::None)
        .fetch_one(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                "INSERT INTO order_items (order_id, book_id, book_type, price) VALUES ($1, $2, $3, $4)",
            )
            .bind(order.id)
            .bind(item.book_id)
            .bind(item.book_type)
            .bind(item.price)
            .execute(&mut *tx)
            .await?;
        }

        if status == OrderStatus::Completed {
            grant_books(&mut *tx, user_id, book_ids).await?;
        }

        let items = fetch_items(&mut *tx, &[order.id]).await?;
        tx.commit().await?;

        Ok(OrderDetails::new(order, items))
    }

    /// Lock an order, let `apply` change it, then persist what it asks for.
    /// The status change and any library grant commit together.
    pub async fn transition<F>(&self, id: i64, apply: F) -> AppResult<Order>
    where
        F: FnOnce(&mut Order) -> AppResult<OrderUpdate> + Send,
    {
        let mut tx = self.pool.begin().await?;

        let mut order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        let update = apply(&mut order)?;
        if update == OrderUpdate::None {
            return Ok(order);
        }

        order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET status = $2, payment_method = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(order.id)
        .bind(order.status)
        .bind(order.payment_method)
        .fetch_one(&mut *tx)
        .await?;

        if update == OrderUpdate::SaveAndGrant {
            let book_ids: Vec<i64> =
                sqlx::query_scalar("SELECT book_id FROM order_items WHERE order_id = $1 ORDER BY id")
                    .bind(order.id)
                    .fetch_all(&mut *tx)
                    .await?;
            grant_books(&mut *tx, &order.user_id, &book_ids).await?;
        }

        tx.commit().await?;

        Ok(order)
    }

    /// Orders of a user, newest first
    pub async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<OrderDetails>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.with_items(orders).await
    }

    /// Orders in a given status, newest first
    pub async fn list_by_status(&self, status: OrderStatus) -> AppResult<Vec<OrderDetails>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE status = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        self.with_items(orders).await
    }

    pub async fn details(&self, order: Order) -> AppResult<OrderDetails> {
        let mut details = self.with_items(vec![order]).await?;
        details
            .pop()
            .ok_or_else(|| AppError::Internal("Order vanished while loading items".to_string()))
    }

    /// Sum of completed order totals
    pub async fn revenue(&self) -> AppResult<Decimal> {
        let revenue: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_price), 0) FROM orders WHERE status = 'COMPLETED'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(revenue)
    }

    async fn with_items(&self, orders: Vec<Order>) -> AppResult<Vec<OrderDetails>> {
        let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let mut conn = self.pool.acquire().await?;
        let items = fetch_items(&mut *conn, &ids).await?;

        let mut details: Vec<OrderDetails> = orders
            .into_iter()
            .map(|order| OrderDetails::new(order, Vec::new()))
            .collect();
        for item in items {
            if let Some(order) = details.iter_mut().find(|d| d.id == item.order_id) {
                order.items.push(item);
            }
        }

        Ok(details)
    }
}

async fn fetch_items(conn: &mut PgConnection, order_ids: &[i64]) -> AppResult<Vec<OrderItemDetails>> {
    let items = sqlx::query_as::<_, OrderItemDetails>(
        r#"
        SELECT oi.id, oi.order_id, oi.book_id, oi.book_type, oi.price,
               b.title, b.author, b.thumbnail_url
        FROM order_items oi
        LEFT JOIN books b ON b.id = oi.book_id
        WHERE oi.order_id = ANY($1)
        ORDER BY oi.order_id, oi.id
        "#,
    )
    .bind(order_ids)
    .fetch_all(conn)
    .await?;

    Ok(items)
}
