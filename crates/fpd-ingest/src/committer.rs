//! Batch commit management
//!
//! Bounds the number of uncommitted writes held in the active transaction.
//! The committer counts staged price observations and asks the store for a
//! durability commit whenever the threshold is reached, plus one final
//! flush after the input is exhausted. A failed commit invalidates the
//! whole pending batch and is escalated as fatal; already-committed batches
//! are never undone.

use anyhow::{Context, Result};
use tracing::info;

use crate::store::Store;

/// Groups staged rows into bounded-size transactions
#[derive(Debug)]
pub struct BatchCommitter {
    batch_size: usize,
    staged_in_batch: usize,
    commits: u64,
    total_staged: u64,
}

impl BatchCommitter {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            staged_in_batch: 0,
            commits: 0,
            total_staged: 0,
        }
    }

    /// Record one staged observation and commit the batch at the threshold.
    ///
    /// Returns whether a commit was issued.
    pub async fn stage<S: Store>(&mut self, store: &mut S) -> Result<bool> {
        self.staged_in_batch += 1;
        self.total_staged += 1;

        if self.staged_in_batch < self.batch_size {
            return Ok(false);
        }

        store.commit().await.context("Batch commit failed")?;
        self.commits += 1;
        self.staged_in_batch = 0;

        info!(
            observations = self.total_staged,
            commits = self.commits,
            "Committed batch"
        );

        Ok(true)
    }

    /// Flush whatever remains after the input is exhausted.
    ///
    /// Always asks the store to commit: even with no staged observations
    /// the batch may hold entity inserts from rows that were later skipped.
    pub async fn finish<S: Store>(&mut self, store: &mut S) -> Result<()> {
        store.commit().await.context("Final batch commit failed")?;

        if self.staged_in_batch > 0 {
            self.commits += 1;
            self.staged_in_batch = 0;
        }

        Ok(())
    }

    /// Commits issued so far
    pub fn commits(&self) -> u64 {
        self.commits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem::MemStore;
    use crate::store::{NewObservation, ProductId, ResellerId, Store};
    use chrono::NaiveDate;

    fn observation() -> NewObservation {
        NewObservation {
            date: NaiveDate::from_ymd_opt(2023, 3, 15).unwrap(),
            sell_price: 5.89,
            buy_price: None,
            unit: "R$/litro".to_string(),
            product_id: ProductId(1),
            reseller_id: ResellerId(1),
        }
    }

    #[tokio::test]
    async fn test_commits_at_threshold() {
        let mut store = MemStore::new();
        let mut committer = BatchCommitter::new(3);

        for i in 0..7 {
            store.insert_observation(&observation()).await.unwrap();
            let committed = committer.stage(&mut store).await.unwrap();
            assert_eq!(committed, i == 2 || i == 5);
        }

        assert_eq!(store.commit_calls, 2);
        assert_eq!(store.observations.len(), 6);

        committer.finish(&mut store).await.unwrap();
        assert_eq!(store.commit_calls, 3);
        assert_eq!(store.observations.len(), 7);
        assert_eq!(committer.commits(), 3);
    }

    #[tokio::test]
    async fn test_finish_with_empty_batch_is_a_noop() {
        let mut store = MemStore::new();
        let mut committer = BatchCommitter::new(3);

        committer.finish(&mut store).await.unwrap();

        assert_eq!(store.commit_calls, 0);
        assert_eq!(committer.commits(), 0);
    }

    #[tokio::test]
    async fn test_commit_failure_is_escalated() {
        let mut store = MemStore::new();
        store.fail_on_commit = Some(1);
        let mut committer = BatchCommitter::new(1);

        store.insert_observation(&observation()).await.unwrap();
        let err = committer.stage(&mut store).await.unwrap_err();

        assert!(err.to_string().contains("Batch commit failed"));
        assert!(store.observations.is_empty());
    }
}
