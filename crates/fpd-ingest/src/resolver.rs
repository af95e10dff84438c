//! Entity resolution
//!
//! Maps natural keys to surrogate ids with at most one store round-trip per
//! distinct key per run. The caches live for one run only; a fresh run
//! re-verifies every key against the store, which is what keeps repeated
//! runs consistent with the natural-key uniqueness constraints.
//!
//! Memory note: the caches are unbounded for the duration of a run, so peak
//! memory is proportional to the number of distinct products plus distinct
//! resellers in the input, not to the number of observation rows.

use anyhow::Result;
use std::collections::HashMap;

use crate::normalize::{truncate, Cnpj};
use crate::store::{ProductId, ResellerAttrs, ResellerId, Store};

/// Maximum length of a product's natural key (name)
const PRODUCT_NAME_LEN: usize = 50;

/// Run-scoped natural-key -> surrogate-id caches with get-or-create
#[derive(Debug, Default)]
pub struct EntityResolver {
    products: HashMap<String, ProductId>,
    resellers: HashMap<String, ResellerId>,
}

impl EntityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a product by name, creating it on first miss.
    ///
    /// The natural key is the trimmed, uppercased name clipped to the
    /// product name width. An empty name is a valid (if unusual) key; the
    /// source data does not reject it and neither do we.
    pub async fn resolve_product<S: Store>(
        &mut self,
        store: &mut S,
        raw_name: &str,
    ) -> Result<ProductId> {
        let key = truncate(raw_name.trim(), PRODUCT_NAME_LEN).to_uppercase();

        if let Some(id) = self.products.get(&key) {
            return Ok(*id);
        }

        let id = match store.find_product_by_name(&key).await? {
            Some(id) => id,
            None => store.insert_product(&key, None).await?,
        };

        self.products.insert(key, id);
        Ok(id)
    }

    /// Resolve a reseller by canonical CNPJ, creating it on first miss.
    ///
    /// Attributes are used only at creation time; the first row seen for a
    /// CNPJ wins and later rows never update the stored attributes.
    pub async fn resolve_reseller<S: Store>(
        &mut self,
        store: &mut S,
        cnpj: &Cnpj,
        attrs: &ResellerAttrs,
    ) -> Result<ResellerId> {
        if let Some(id) = self.resellers.get(cnpj.as_str()) {
            return Ok(*id);
        }

        let id = match store.find_reseller_by_cnpj(cnpj).await? {
            Some(id) => id,
            None => store.insert_reseller(cnpj, attrs).await?,
        };

        self.resellers.insert(cnpj.as_str().to_string(), id);
        Ok(id)
    }

    /// Distinct products resolved during this run
    pub fn distinct_products(&self) -> usize {
        self.products.len()
    }

    /// Distinct resellers resolved during this run
    pub fn distinct_resellers(&self) -> usize {
        self.resellers.len()
    }
}
