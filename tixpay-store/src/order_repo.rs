use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, warn};

use tixpay_core::repository::{InsertOutcome, OrderRepository, StatusWrite};
use tixpay_shared::models::order::{NewOrder, Order, OrderFilter, OrderLine, OrderStatus};

const ORDER_COLUMNS: &str = "id, user_id, order_code, email, full_name, mobile_number, payment_method, \
     continent, total_amount, discount, total_ticket, status, transaction_date, created_at, updated_at";

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    order_code: String,
    email: String,
    full_name: String,
    mobile_number: String,
    payment_method: String,
    continent: String,
    total_amount: i64,
    discount: i32,
    total_ticket: i32,
    status: String,
    transaction_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = Box<dyn std::error::Error + Send + Sync>;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id,
            user_id: row.user_id,
            order_code: row.order_code,
            email: row.email,
            full_name: row.full_name,
            mobile_number: row.mobile_number,
            payment_method: row.payment_method,
            continent: row.continent,
            total_amount: row.total_amount,
            discount: row.discount,
            total_ticket: row.total_ticket,
            status: row.status.parse::<OrderStatus>()?,
            transaction_date: row.transaction_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    id: i64,
    order_id: i64,
    ticket_id: i64,
    ticket_type: String,
    country_name: String,
    city: String,
    quantity: i32,
    created_at: DateTime<Utc>,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        OrderLine {
            id: row.id,
            order_id: row.order_id,
            ticket_id: row.ticket_id,
            ticket_type: row.ticket_type,
            country_name: row.country_name,
            city: row.city,
            quantity: row.quantity,
            created_at: row.created_at,
        }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn insert_order(
        &self,
        order: &NewOrder,
    ) -> Result<InsertOutcome, Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO orders (user_id, order_code, email, full_name, mobile_number, payment_method,
                                continent, total_amount, discount, total_ticket, status, transaction_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(order.user_id)
        .bind(&order.order_code)
        .bind(&order.email)
        .bind(&order.full_name)
        .bind(&order.mobile_number)
        .bind(&order.payment_method)
        .bind(&order.continent)
        .bind(order.total_amount)
        .bind(order.discount)
        .bind(order.total_ticket)
        .bind(order.status.as_str())
        .bind(order.transaction_date)
        .fetch_one(&mut *tx)
        .await;

        let order_id = match inserted {
            Ok(id) => id,
            Err(e) if is_unique_violation(&e) => {
                warn!("Order code {} collided", order.order_code);
                return Ok(InsertOutcome::DuplicateOrderCode);
            }
            Err(e) => return Err(e.into()),
        };

        for line in &order.lines {
            sqlx::query(
                r#"
                INSERT INTO order_lines (order_id, ticket_id, ticket_type, country_name, city, quantity)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order_id)
            .bind(line.ticket_id)
            .bind(&line.ticket_type)
            .bind(&line.country_name)
            .bind(&line.city)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!("Order {} stored with {} lines", order.order_code, order.lines.len());

        Ok(InsertOutcome::Created(order_id))
    }

    async fn find_by_id_for_owner(
        &self,
        id: i64,
        email: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE id = $1 AND email = $2",
            ORDER_COLUMNS
        ))
        .bind(id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    async fn find_by_order_code(
        &self,
        order_code: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE order_code = $1",
            ORDER_COLUMNS
        ))
        .bind(order_code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    async fn lines_for_order(
        &self,
        order_id: i64,
    ) -> Result<Vec<OrderLine>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, OrderLineRow>(
            "SELECT id, order_id, ticket_id, ticket_type, country_name, city, quantity, created_at \
             FROM order_lines WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderLine::from).collect())
    }

    async fn list_orders(
        &self,
        filter: &OrderFilter,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE email = $1 AND ($2::TEXT IS NULL OR status = $2)",
            ORDER_COLUMNS
        ))
        .bind(&filter.email)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn update_status(
        &self,
        order_code: &str,
        status: OrderStatus,
    ) -> Result<StatusWrite, Box<dyn std::error::Error + Send + Sync>> {
        // The status guard lives in the WHERE clause so concurrent
        // notifications cannot both move a terminal order.
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $1, updated_at = NOW()
            WHERE order_code = $2 AND status NOT IN ('completed', 'cancelled')
            "#,
        )
        .bind(status.as_str())
        .bind(order_code)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(StatusWrite::Applied);
        }

        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM orders WHERE order_code = $1)")
            .bind(order_code)
            .fetch_one(&self.pool)
            .await?;

        Ok(if exists { StatusWrite::Rejected } else { StatusWrite::Missing })
    }

    async fn distinct_continents(
        &self,
        email: &str,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        let continents = sqlx::query_scalar::<_, String>("SELECT DISTINCT continent FROM orders WHERE email = $1")
            .bind(email)
            .fetch_all(&self.pool)
            .await?;
        Ok(continents)
    }
}
