//! FPD Ingest Library
//!
//! Batch loader for the Brazilian fuel price dataset published on the
//! dados.gov.br open-data portal. Reads the semicolon-delimited CSV and
//! loads it into a normalized relational store of products, resellers
//! (fuel stations keyed by CNPJ) and price observations.
//!
//! # Pipeline
//!
//! - [`normalize`]: pure field canonicalization (CNPJ, dates, prices)
//! - [`resolver`]: natural key -> surrogate id, get-or-create with a
//!   run-scoped cache
//! - [`committer`]: bounded-size transaction batching
//! - [`pipeline`]: per-row orchestration, skip-and-continue on bad rows
//! - [`report`]: end-of-run summary
//! - [`store`]: the durable store contract and its PostgreSQL backend
//!
//! # Example
//!
//! ```no_run
//! use fpd_ingest::config::IngestConfig;
//! use fpd_ingest::pipeline::Pipeline;
//! use fpd_ingest::store::pg::PgStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = sqlx::PgPool::connect("postgresql://localhost/fpd").await?;
//!     let mut store = PgStore::new(pool);
//!     let report = Pipeline::new(&mut store, IngestConfig::default())
//!         .run_file("./data/combustiveis.csv".as_ref())
//!         .await?;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```

pub mod committer;
pub mod config;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod store;
