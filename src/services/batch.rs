use crate::models::{BatchReport, ChecksumDeclaration, FileTransfer};
use crate::services::scratch::ScratchDir;
use crate::services::verification::VerificationAggregator;
use std::io;

/// State owned by one ingestion request.
///
/// Dropping the batch removes its scratch directory; `finish` does the same
/// explicitly and returns the report.
pub struct UploadBatch {
    scratch: ScratchDir,
    verification: VerificationAggregator,
}

impl UploadBatch {
    pub fn new(scratch: ScratchDir) -> Self {
        Self {
            scratch,
            verification: VerificationAggregator::new(),
        }
    }

    pub fn scratch(&self) -> &ScratchDir {
        &self.scratch
    }

    pub fn file_count(&self) -> usize {
        self.verification.file_count()
    }

    pub fn transfers(&self) -> &[FileTransfer] {
        self.verification.transfers()
    }

    pub fn batch_verdict(&self) -> bool {
        self.verification.batch_verdict()
    }

    pub fn declare(&mut self, declaration: &ChecksumDeclaration) {
        self.verification.declare(declaration);
    }

    pub fn record(
        &mut self,
        declaration: ChecksumDeclaration,
        computed_hash: String,
        byte_size: u64,
    ) -> &FileTransfer {
        self.verification.record(
            declaration.logical_name,
            declaration.declared_hash,
            computed_hash,
            byte_size,
        )
    }

    pub fn finish(self) -> io::Result<BatchReport> {
        self.scratch.close()?;
        Ok(self.verification.into_report())
    }
}
