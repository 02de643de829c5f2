use serde::Serialize;

/// Checksum a client declared for one logical file, parsed from an `md5` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumDeclaration {
    pub logical_name: String,
    pub declared_hash: String,
}

/// Outcome of one fully drained content field.
///
/// Fields are private so that `matched` can only ever be derived from the two
/// hashes, never set on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTransfer {
    logical_name: String,
    byte_size: u64,
    computed_hash: String,
    declared_hash: String,
    matched: bool,
}

impl FileTransfer {
    pub fn new(
        logical_name: String,
        declared_hash: String,
        computed_hash: String,
        byte_size: u64,
    ) -> Self {
        let matched = computed_hash == declared_hash;
        Self {
            logical_name,
            byte_size,
            computed_hash,
            declared_hash,
            matched,
        }
    }

    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    pub fn computed_hash(&self) -> &str {
        &self.computed_hash
    }

    pub fn declared_hash(&self) -> &str {
        &self.declared_hash
    }

    pub fn matched(&self) -> bool {
        self.matched
    }
}

/// Summary of a finished batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub transfers: Vec<FileTransfer>,
    pub file_count: usize,
    pub declared_count: usize,
    pub total_bytes: u64,
    pub mismatches: usize,
    pub verdict: bool,
}
