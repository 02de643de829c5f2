use crate::api::error::AppError;
use crate::config::IngestConfig;
use crate::models::BatchReport;
use crate::services::batch::UploadBatch;
use crate::services::diagnostics::ActiveBatches;
use crate::services::multipart::FieldSource;
use crate::services::scratch::ScratchDir;
use crate::services::sequencer::FieldSequencer;
use crate::utils::format::human_size;
use uuid::Uuid;

pub struct IngestService {
    config: IngestConfig,
    active: ActiveBatches,
}

impl IngestService {
    pub fn new(config: IngestConfig, active: ActiveBatches) -> Self {
        Self { config, active }
    }

    pub fn active_batches(&self) -> &ActiveBatches {
        &self.active
    }

    /// Ingests every checksum/content pair from `source` into a fresh scratch
    /// directory and returns the verification report.
    ///
    /// Any error aborts the whole batch. The scratch directory is removed on
    /// every path, including this future being dropped mid-stream.
    pub async fn ingest<S: FieldSource>(&self, source: &mut S) -> Result<BatchReport, AppError> {
        let batch_id = Uuid::new_v4().to_string();
        let scratch = ScratchDir::create_in(&self.config.scratch_root())?;
        let mut batch = UploadBatch::new(scratch);

        let guard = self.active.enter(&batch_id);
        tracing::debug!("TASKS: {} active batches", self.active.current());

        let sequencer = FieldSequencer::new(self.config.max_declaration_len);
        let result = sequencer.run(source, &mut batch).await;
        guard.finish();

        match result {
            Ok(()) => {
                let report = batch.finish()?;
                tracing::info!(
                    "DONE uploaded {} files ({}), TOTAL HASH CHECK: {}",
                    report.file_count,
                    human_size(report.total_bytes),
                    report.verdict
                );
                if let Ok(json) = serde_json::to_string(&report) {
                    tracing::debug!("Batch {} report: {}", batch_id, json);
                }
                Ok(report)
            }
            Err(e) => {
                tracing::warn!(
                    "Batch {} aborted after {} files: {}",
                    batch_id,
                    batch.file_count(),
                    e
                );
                Err(e)
            }
        }
    }
}
