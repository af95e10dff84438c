//! PostgreSQL store backend
//!
//! Holds the connection pool and at most one open batch transaction. All
//! lookups and inserts run on that transaction, so entities created earlier
//! in the pending batch are visible to later rows before any commit (the
//! observation FK constraint is checked against them at insert time).

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, Postgres};
use sqlx::Transaction;

use super::{NewObservation, ProductId, ResellerAttrs, ResellerId, Store};
use crate::normalize::Cnpj;

/// Store backed by a PostgreSQL pool with an explicit batch transaction
pub struct PgStore {
    pool: PgPool,
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, tx: None }
    }

    /// Get the open batch transaction, beginning one if needed
    async fn tx(&mut self) -> Result<&mut Transaction<'static, Postgres>> {
        if self.tx.is_none() {
            let tx = self
                .pool
                .begin()
                .await
                .context("Failed to begin batch transaction")?;
            self.tx = Some(tx);
        }

        self.tx
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("Batch transaction missing after begin"))
    }
}

impl Store for PgStore {
    async fn find_product_by_name(&mut self, name: &str) -> Result<Option<ProductId>> {
        let tx = self.tx().await?;

        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM products WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut **tx)
            .await
            .with_context(|| format!("Failed to look up product '{}'", name))?;

        Ok(id.map(ProductId))
    }

    async fn insert_product(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<ProductId> {
        let tx = self.tx().await?;

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO products (name, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(name)
        .bind(description)
        .fetch_one(&mut **tx)
        .await
        .with_context(|| format!("Failed to insert product '{}'", name))?;

        Ok(ProductId(id))
    }

    async fn find_reseller_by_cnpj(&mut self, cnpj: &Cnpj) -> Result<Option<ResellerId>> {
        let tx = self.tx().await?;

        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM resellers WHERE cnpj = $1")
            .bind(cnpj.as_str())
            .fetch_optional(&mut **tx)
            .await
            .with_context(|| format!("Failed to look up reseller '{}'", cnpj))?;

        Ok(id.map(ResellerId))
    }

    async fn insert_reseller(&mut self, cnpj: &Cnpj, attrs: &ResellerAttrs) -> Result<ResellerId> {
        let tx = self.tx().await?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO resellers (cnpj, name, municipality, state, region, brand)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(cnpj.as_str())
        .bind(&attrs.name)
        .bind(&attrs.municipality)
        .bind(&attrs.state)
        .bind(&attrs.region)
        .bind(attrs.brand.as_deref())
        .fetch_one(&mut **tx)
        .await
        .with_context(|| format!("Failed to insert reseller '{}'", cnpj))?;

        Ok(ResellerId(id))
    }

    async fn insert_observation(&mut self, observation: &NewObservation) -> Result<()> {
        let tx = self.tx().await?;

        sqlx::query(
            r#"
            INSERT INTO price_observations
                (observation_date, sell_price, buy_price, unit, product_id, reseller_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(observation.date)
        .bind(observation.sell_price)
        .bind(observation.buy_price)
        .bind(&observation.unit)
        .bind(observation.product_id.0)
        .bind(observation.reseller_id.0)
        .execute(&mut **tx)
        .await
        .context("Failed to insert price observation")?;

        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        match self.tx.take() {
            Some(tx) => tx.commit().await.context("Failed to commit batch"),
            None => Ok(()),
        }
    }

    async fn rollback(&mut self) -> Result<()> {
        match self.tx.take() {
            Some(tx) => tx.rollback().await.context("Failed to roll back batch"),
            None => Ok(()),
        }
    }
}
