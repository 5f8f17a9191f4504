use std::future::Future;

use tracing::{error, info};

use crate::error::ImportError;

/// Configuration for batched inserts.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { batch_size: 100 }
    }
}

impl BatchConfig {
    /// Sets the batch size. Zero is treated as 1.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }
}

/// Result of a batched insert run.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Rows in batches that were accepted.
    pub inserted: usize,
    /// Number of batches attempted.
    pub batches: usize,
    /// One entry per rejected batch.
    pub errors: Vec<ImportError>,
}

impl BatchOutcome {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Inserts `records` in fixed-size batches, one batch at a time.
///
/// A rejected batch is logged and left out of `inserted`; the remaining
/// batches are still attempted.
///
/// # Arguments
///
/// * `records` - Rows to insert, in order
/// * `config` - Batch configuration
/// * `insert` - Async function that stores one batch
///
/// # Example
///
/// ```ignore
/// let outcome = persist_in_batches(&records, &BatchConfig::default(), |batch| {
///     store.insert_assets(batch)
/// })
/// .await;
/// ```
pub async fn persist_in_batches<T, F, Fut>(
    records: &[T],
    config: &BatchConfig,
    mut insert: F,
) -> BatchOutcome
where
    T: Clone,
    F: FnMut(Vec<T>) -> Fut,
    Fut: Future<Output = Result<(), ImportError>>,
{
    let mut outcome = BatchOutcome::default();

    for (index, chunk) in records.chunks(config.batch_size.max(1)).enumerate() {
        outcome.batches += 1;
        let batch_number = index + 1;

        match insert(chunk.to_vec()).await {
            Ok(()) => {
                info!("Inserted batch {} ({} rows)", batch_number, chunk.len());
                outcome.inserted += chunk.len();
            }
            Err(e) => {
                error!("Error inserting batch {}: {}", batch_number, e);
                outcome.errors.push(e);
            }
        }
    }

    outcome
}
