//! In-memory store test double
//!
//! Mirrors the PostgreSQL backend's transaction discipline: work staged
//! after the last commit stays in pending buffers and only becomes visible
//! in the committed tables on `commit`. Commit calls are counted and can be
//! made to fail on a chosen call, so tests can observe batch boundaries and
//! fatal-abort behavior.

use anyhow::Result;

use super::{NewObservation, ProductId, ResellerAttrs, ResellerId, Store};
use crate::normalize::Cnpj;

#[derive(Debug, Clone, PartialEq)]
pub struct MemProduct {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemReseller {
    pub id: i64,
    pub cnpj: String,
    pub attrs: ResellerAttrs,
}

#[derive(Debug, Default)]
pub struct MemStore {
    pub products: Vec<MemProduct>,
    pub resellers: Vec<MemReseller>,
    pub observations: Vec<NewObservation>,

    pending_products: Vec<MemProduct>,
    pending_resellers: Vec<MemReseller>,
    pending_observations: Vec<NewObservation>,

    next_id: i64,

    pub commit_calls: usize,
    pub rollback_calls: usize,

    /// Commit call number (1-based) that fails with an injected error
    pub fail_on_commit: Option<usize>,

    /// Count of lookup/insert round-trips, per entity kind
    pub find_product_calls: usize,
    pub insert_product_calls: usize,
    pub find_reseller_calls: usize,
    pub insert_reseller_calls: usize,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn in_batch(&self) -> bool {
        !self.pending_products.is_empty()
            || !self.pending_resellers.is_empty()
            || !self.pending_observations.is_empty()
    }
}

impl Store for MemStore {
    async fn find_product_by_name(&mut self, name: &str) -> Result<Option<ProductId>> {
        self.find_product_calls += 1;

        let found = self
            .products
            .iter()
            .chain(self.pending_products.iter())
            .find(|p| p.name == name)
            .map(|p| ProductId(p.id));

        Ok(found)
    }

    async fn insert_product(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<ProductId> {
        self.insert_product_calls += 1;

        let id = self.next_id();
        self.pending_products.push(MemProduct {
            id,
            name: name.to_string(),
            description: description.map(str::to_string),
        });

        Ok(ProductId(id))
    }

    async fn find_reseller_by_cnpj(&mut self, cnpj: &Cnpj) -> Result<Option<ResellerId>> {
        self.find_reseller_calls += 1;

        let found = self
            .resellers
            .iter()
            .chain(self.pending_resellers.iter())
            .find(|r| r.cnpj == cnpj.as_str())
            .map(|r| ResellerId(r.id));

        Ok(found)
    }

    async fn insert_reseller(&mut self, cnpj: &Cnpj, attrs: &ResellerAttrs) -> Result<ResellerId> {
        self.insert_reseller_calls += 1;

        let id = self.next_id();
        self.pending_resellers.push(MemReseller {
            id,
            cnpj: cnpj.as_str().to_string(),
            attrs: attrs.clone(),
        });

        Ok(ResellerId(id))
    }

    async fn insert_observation(&mut self, observation: &NewObservation) -> Result<()> {
        self.pending_observations.push(observation.clone());
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        if !self.in_batch() {
            return Ok(());
        }

        self.commit_calls += 1;

        if self.fail_on_commit == Some(self.commit_calls) {
            anyhow::bail!("injected commit failure on commit #{}", self.commit_calls);
        }

        self.products.append(&mut self.pending_products);
        self.resellers.append(&mut self.pending_resellers);
        self.observations.append(&mut self.pending_observations);

        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.rollback_calls += 1;
        self.pending_products.clear();
        self.pending_resellers.clear();
        self.pending_observations.clear();
        Ok(())
    }
}
