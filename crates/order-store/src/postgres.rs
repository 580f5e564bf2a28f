use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Money, Order, OrderId, Page, PageRequest, Product, Result, StoreError, UserId,
    store::{OrderStore, validate_order_fields},
};

const ORDER_COLUMNS: &str = "id, user_id, product, quantity, price_cents, created_at, updated_at";

/// PostgreSQL-backed order store implementation.
///
/// Each mutation runs in its own transaction which is committed before the
/// method returns.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
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
        Ok(())
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let quantity: i64 = row.try_get("quantity")?;
        let quantity = u32::try_from(quantity)
            .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?;

        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            product: Product::new(row.try_get::<String, _>("product")?),
            quantity,
            price: Money::from_cents(row.try_get("price_cents")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn map_write_error(e: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return StoreError::Validation("Order already exists".to_string());
            }
            if db_err.is_check_violation() {
                return StoreError::Validation(db_err.message().to_string());
            }
        }
        StoreError::Database(e)
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[tracing::instrument(skip(self, product))]
    async fn create(
        &self,
        id: OrderId,
        user_id: UserId,
        product: Product,
        quantity: u32,
        price: Money,
    ) -> Result<Order> {
        validate_order_fields(&product, quantity, price)?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders (id, user_id, product, quantity, price_cents, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, now(), now())
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(product.as_str())
        .bind(i64::from(quantity))
        .bind(price.cents())
        .fetch_one(&mut *tx)
        .await
        .map_err(Self::map_write_error)?;

        let order = Self::row_to_order(row)?;
        tx.commit().await?;
        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Order> {
        let row: Option<PgRow> =
            sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => Self::row_to_order(row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn find_page_by_owner(
        &self,
        user_id: UserId,
        request: PageRequest,
    ) -> Result<Page<Order>> {
        request.validate()?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_one(&self.pool)
            .await?;

        let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id.as_uuid())
        .bind(i64::from(request.size))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(Self::row_to_order)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(items, request, total.max(0) as u64))
    }

    #[tracing::instrument(skip(self, product))]
    async fn update(
        &self,
        id: OrderId,
        product: Product,
        price: Money,
        quantity: u32,
    ) -> Result<Order> {
        validate_order_fields(&product, quantity, price)?;

        let mut tx = self.pool.begin().await?;

        let row: Option<PgRow> = sqlx::query(&format!(
            r#"
            UPDATE orders
            SET product = $2, price_cents = $3, quantity = $4, updated_at = now()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(product.as_str())
        .bind(price.cents())
        .bind(i64::from(quantity))
        .fetch_optional(&mut *tx)
        .await
        .map_err(Self::map_write_error)?;

        // Dropping the transaction without commit rolls it back.
        let Some(row) = row else {
            return Err(StoreError::NotFound(id));
        };

        let order = Self::row_to_order(row)?;
        tx.commit().await?;
        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: OrderId) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        tx.commit().await?;
        Ok(())
    }
}
