//! Row pipeline
//!
//! Drives the whole ingestion run: reads the semicolon-delimited CSV,
//! normalizes each row, resolves product and reseller surrogate ids,
//! validates the observation fields, stages the observation and commits in
//! bounded batches. A rejected field abandons only its row; store failures
//! abort the run after rolling back the in-flight batch.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::committer::BatchCommitter;
use crate::config::IngestConfig;
use crate::normalize::{
    normalize_cnpj, normalize_date, normalize_optional_price, normalize_price, truncate,
    RejectReason,
};
use crate::report::RunReport;
use crate::resolver::EntityResolver;
use crate::store::{NewObservation, ResellerAttrs, Store};

// ============================================================================
// Input Columns
// ============================================================================

/// Column headers recognized in the dataset, matched by name not position
pub mod columns {
    pub const DATE: &str = "Data da Coleta";
    pub const PRODUCT: &str = "Produto";
    pub const CNPJ: &str = "CNPJ da Revenda";
    pub const RESELLER_NAME: &str = "Nome da Revenda";
    pub const MUNICIPALITY: &str = "Município";
    pub const STATE: &str = "Estado";
    pub const REGION: &str = "Região Sigla";
    pub const BRAND: &str = "Bandeira";
    pub const SELL_PRICE: &str = "Valor de Venda";
    pub const BUY_PRICE: &str = "Valor de Compra";
    pub const UNIT: &str = "Unidade de Medida";
}

/// Columns that must be present in the header row; the rest fall back to
/// absent values
const REQUIRED_COLUMNS: &[&str] = &[
    columns::DATE,
    columns::PRODUCT,
    columns::CNPJ,
    columns::SELL_PRICE,
];

/// Placeholder for absent descriptive attributes, as the source loader used
const MISSING_ATTR: &str = "N/A";

// Field widths from the relational schema
const RESELLER_NAME_LEN: usize = 200;
const MUNICIPALITY_LEN: usize = 100;
const STATE_LEN: usize = 2;
const REGION_LEN: usize = 2;
const BRAND_LEN: usize = 100;
const UNIT_LEN: usize = 10;

/// One raw CSV record; every field is optional at this stage and validation
/// happens per field in the row flow
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Data da Coleta", default)]
    date: Option<String>,
    #[serde(rename = "Produto", default)]
    product: Option<String>,
    #[serde(rename = "CNPJ da Revenda", default)]
    cnpj: Option<String>,
    #[serde(rename = "Nome da Revenda", default)]
    reseller_name: Option<String>,
    #[serde(rename = "Município", default)]
    municipality: Option<String>,
    #[serde(rename = "Estado", default)]
    state: Option<String>,
    #[serde(rename = "Região Sigla", default)]
    region: Option<String>,
    #[serde(rename = "Bandeira", default)]
    brand: Option<String>,
    #[serde(rename = "Valor de Venda", default)]
    sell_price: Option<String>,
    #[serde(rename = "Valor de Compra", default)]
    buy_price: Option<String>,
    #[serde(rename = "Unidade de Medida", default)]
    unit: Option<String>,
}

/// Per-row outcome: staged, or skipped with the rejecting field's reason
type RowOutcome = std::result::Result<(), RejectReason>;

/// Orchestrates one ingestion run over a borrowed store handle
pub struct Pipeline<'a, S: Store> {
    store: &'a mut S,
    config: IngestConfig,
    resolver: EntityResolver,
    committer: BatchCommitter,
    report: RunReport,
}

impl<'a, S: Store> Pipeline<'a, S> {
    pub fn new(store: &'a mut S, config: IngestConfig) -> Self {
        let committer = BatchCommitter::new(config.batch_size);
        Self {
            store,
            config,
            resolver: EntityResolver::new(),
            committer,
            report: RunReport::default(),
        }
    }

    /// Run the pipeline over a CSV file on disk
    pub async fn run_file(&mut self, path: &Path) -> Result<RunReport> {
        info!(file = %path.display(), "Loading CSV");

        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open input file {}", path.display()))?;

        self.run(file).await
    }

    /// Run the pipeline over any CSV input
    pub async fn run<R: Read>(&mut self, input: R) -> Result<RunReport> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .from_reader(input);

        self.check_headers(&mut reader)?;

        if let Err(e) = self.drive(&mut reader).await {
            // Fatal: the in-flight batch cannot be trusted. Prior commits stand.
            if let Err(rollback_err) = self.store.rollback().await {
                warn!(error = %rollback_err, "Rollback after fatal error failed");
            }
            return Err(e);
        }

        self.report.distinct_products = self.resolver.distinct_products() as u64;
        self.report.distinct_resellers = self.resolver.distinct_resellers() as u64;
        self.report.commits = self.committer.commits();

        info!(
            rows_read = self.report.rows_read,
            observations = self.report.observations_staged,
            products = self.report.distinct_products,
            resellers = self.report.distinct_resellers,
            errors = self.report.errors,
            "Run completed"
        );

        Ok(self.report.clone())
    }

    /// Verify that every required column is present in the header row
    fn check_headers<R: Read>(&self, reader: &mut csv::Reader<R>) -> Result<()> {
        let headers = reader.headers().context("Failed to read CSV header row")?;
        let names: Vec<&str> = headers.iter().map(str::trim).collect();

        for required in REQUIRED_COLUMNS {
            if !names.contains(required) {
                anyhow::bail!("Input file is missing required column '{}'", required);
            }
        }

        debug!(columns = ?names, "Header row validated");
        Ok(())
    }

    /// Main row loop; only store failures escape as errors
    async fn drive<R: Read>(&mut self, reader: &mut csv::Reader<R>) -> Result<()> {
        for (row, result) in reader.deserialize::<RawRecord>().enumerate() {
            if let Some(limit) = self.config.row_limit {
                if self.report.rows_read >= limit as u64 {
                    info!(limit, "Row limit reached, stopping early");
                    break;
                }
            }
            self.report.rows_read += 1;

            let outcome = match result {
                Ok(record) => self.process_row(&record).await?,
                Err(e) => Err(RejectReason::Malformed(e.to_string())),
            };

            if let Err(reason) = outcome {
                self.record_rejection(row, &reason);
            }
        }

        self.committer.finish(&mut *self.store).await
    }

    /// State machine for one row: normalize, resolve, validate, stage.
    ///
    /// Entity resolution happens before date/price validation, matching the
    /// source loader: a row rejected late may still have created its
    /// product or reseller, which stays in the batch and commits with it.
    async fn process_row(&mut self, record: &RawRecord) -> Result<RowOutcome> {
        // Reseller tax id: without it the observation cannot be attributed
        let cnpj = match normalize_cnpj(record.cnpj.as_deref().unwrap_or("")) {
            Ok(cnpj) => cnpj,
            Err(reason) => return Ok(Err(reason)),
        };

        let product_name = record.product.as_deref().unwrap_or("");
        let product_id = self
            .resolver
            .resolve_product(&mut *self.store, product_name)
            .await?;

        let attrs = reseller_attrs(record);
        let reseller_id = self
            .resolver
            .resolve_reseller(&mut *self.store, &cnpj, &attrs)
            .await?;

        let date = match normalize_date(record.date.as_deref().unwrap_or("")) {
            Ok(date) => date,
            Err(reason) => return Ok(Err(reason)),
        };

        let sell_price = match normalize_price(record.sell_price.as_deref().unwrap_or("")) {
            Ok(price) => price,
            Err(reason) => return Ok(Err(reason)),
        };

        let buy_price = match normalize_optional_price(record.buy_price.as_deref()) {
            Ok(price) => price,
            Err(reason) => return Ok(Err(reason)),
        };

        let unit = match record.unit.as_deref().map(str::trim) {
            Some(unit) if !unit.is_empty() => truncate(unit, UNIT_LEN).to_string(),
            _ => self.config.default_unit.clone(),
        };

        self.store
            .insert_observation(&NewObservation {
                date,
                sell_price,
                buy_price,
                unit,
                product_id,
                reseller_id,
            })
            .await?;

        self.report.observations_staged += 1;
        self.committer.stage(&mut *self.store).await?;

        Ok(Ok(()))
    }

    /// Count a skipped row; log full detail only for the first few so a
    /// systematically malformed file cannot flood the log. The final
    /// summary always carries the true total.
    fn record_rejection(&mut self, row: usize, reason: &RejectReason) {
        self.report.errors += 1;

        if self.report.errors <= self.config.error_log_cap as u64 {
            warn!(row = row + 1, reason = %reason, "Skipping row");
        } else if self.report.errors == self.config.error_log_cap as u64 + 1 {
            warn!(
                cap = self.config.error_log_cap,
                "Further skipped rows will be counted silently"
            );
        }
    }
}

/// Build creation-time reseller attributes from a raw record, with the
/// source loader's `N/A` placeholders for absent descriptive columns
fn reseller_attrs(record: &RawRecord) -> ResellerAttrs {
    let name = record.reseller_name.as_deref().unwrap_or(MISSING_ATTR);
    let municipality = record.municipality.as_deref().unwrap_or(MISSING_ATTR);
    let state = record.state.as_deref().unwrap_or(MISSING_ATTR);
    let region = record.region.as_deref().unwrap_or(MISSING_ATTR);

    let brand = record
        .brand
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(|b| truncate(b, BRAND_LEN).to_string());

    ResellerAttrs {
        name: truncate(name.trim(), RESELLER_NAME_LEN).to_string(),
        municipality: truncate(municipality.trim(), MUNICIPALITY_LEN).to_string(),
        state: truncate(&state.trim().to_uppercase(), STATE_LEN).to_string(),
        region: truncate(&region.trim().to_uppercase(), REGION_LEN).to_string(),
        brand,
    }
}
