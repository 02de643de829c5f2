use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Observational gauge of batches currently being ingested.
///
/// Injected through application state; nothing in the ingestion path reads
/// it to make decisions.
#[derive(Clone, Default)]
pub struct ActiveBatches {
    count: Arc<AtomicUsize>,
}

impl ActiveBatches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    /// Registers a batch; the count drops again when the guard goes away.
    pub fn enter(&self, batch_id: &str) -> BatchGuard {
        let active = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(batch_id, active, "batch started");
        BatchGuard {
            count: self.count.clone(),
            batch_id: batch_id.to_string(),
            finished: false,
        }
    }
}

pub struct BatchGuard {
    count: Arc<AtomicUsize>,
    batch_id: String,
    finished: bool,
}

impl BatchGuard {
    /// Marks the batch as having returned normally or with an error.
    pub fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for BatchGuard {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::Relaxed);
        if !self.finished {
            // Future dropped mid-stream: client went away or task was cancelled.
            tracing::error!(batch_id = %self.batch_id, "CONNECTION RESET: batch abandoned before completion");
        }
    }
}
