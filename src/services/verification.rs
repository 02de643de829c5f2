use crate::models::{BatchReport, ChecksumDeclaration, FileTransfer};

/// Collects declared and computed checksums for one batch.
///
/// A mismatch is data, not a failure: it is recorded and reported while the
/// rest of the batch keeps streaming.
#[derive(Debug, Default)]
pub struct VerificationAggregator {
    declared: usize,
    transfers: Vec<FileTransfer>,
}

impl VerificationAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, _declaration: &ChecksumDeclaration) {
        self.declared += 1;
    }

    pub fn record(
        &mut self,
        logical_name: String,
        declared_hash: String,
        computed_hash: String,
        byte_size: u64,
    ) -> &FileTransfer {
        self.transfers.push(FileTransfer::new(
            logical_name,
            declared_hash,
            computed_hash,
            byte_size,
        ));
        &self.transfers[self.transfers.len() - 1]
    }

    /// True iff every transfer matched and no declaration is left without one.
    pub fn batch_verdict(&self) -> bool {
        self.transfers.len() == self.declared && self.transfers.iter().all(FileTransfer::matched)
    }

    pub fn file_count(&self) -> usize {
        self.transfers.len()
    }

    pub fn declared_count(&self) -> usize {
        self.declared
    }

    pub fn mismatches(&self) -> usize {
        self.transfers.iter().filter(|t| !t.matched()).count()
    }

    pub fn total_bytes(&self) -> u64 {
        self.transfers.iter().map(FileTransfer::byte_size).sum()
    }

    pub fn transfers(&self) -> &[FileTransfer] {
        &self.transfers
    }

    pub fn into_report(self) -> BatchReport {
        BatchReport {
            file_count: self.file_count(),
            declared_count: self.declared_count(),
            total_bytes: self.total_bytes(),
            mismatches: self.mismatches(),
            verdict: self.batch_verdict(),
            transfers: self.transfers,
        }
    }
}
