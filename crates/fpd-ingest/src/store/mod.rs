//! Durable store contract
//!
//! The ingestion core talks to the store through the [`Store`] trait:
//! natural-key lookups, inserts that return the assigned surrogate id, and
//! explicit batch commit/rollback. A batch transaction is opened implicitly
//! by the first operation after a commit and released only by `commit` or
//! `rollback`, so every lookup and insert of a batch sees the batch's own
//! uncommitted entities.

use anyhow::Result;
use chrono::NaiveDate;

use crate::normalize::Cnpj;

pub mod pg;

#[cfg(test)]
pub mod mem;

/// Store-assigned surrogate id of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProductId(pub i64);

/// Store-assigned surrogate id of a reseller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResellerId(pub i64);

/// Reseller attributes captured at creation time.
///
/// Only the first row seen for a CNPJ contributes these; later rows with
/// the same tax id never update them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResellerAttrs {
    pub name: String,
    pub municipality: String,
    pub state: String,
    pub region: String,
    pub brand: Option<String>,
}

/// One price observation staged for insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewObservation {
    pub date: NaiveDate,
    pub sell_price: f64,
    pub buy_price: Option<f64>,
    pub unit: String,
    pub product_id: ProductId,
    pub reseller_id: ResellerId,
}

/// Contract the ingestion pipeline requires from a durable store
#[allow(async_fn_in_trait)]
pub trait Store {
    /// Look up a product by its natural key (uppercased name)
    async fn find_product_by_name(&mut self, name: &str) -> Result<Option<ProductId>>;

    /// Insert a product and return its assigned id without finalizing the
    /// enclosing batch transaction
    async fn insert_product(&mut self, name: &str, description: Option<&str>)
        -> Result<ProductId>;

    /// Look up a reseller by its canonical CNPJ
    async fn find_reseller_by_cnpj(&mut self, cnpj: &Cnpj) -> Result<Option<ResellerId>>;

    /// Insert a reseller and return its assigned id
    async fn insert_reseller(&mut self, cnpj: &Cnpj, attrs: &ResellerAttrs) -> Result<ResellerId>;

    /// Stage a price observation in the open batch
    async fn insert_observation(&mut self, observation: &NewObservation) -> Result<()>;

    /// Durably commit all staged work. A no-op when the batch holds nothing.
    async fn commit(&mut self) -> Result<()>;

    /// Discard the in-flight batch
    async fn rollback(&mut self) -> Result<()>;
}
