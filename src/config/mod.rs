use std::env;
use std::path::PathBuf;

/// Configuration for the ingestion endpoint
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Maximum request body size in bytes (default: 4 GB)
    pub max_request_size: usize,

    /// Root directory for batch scratch directories (default: system temp dir)
    pub scratch_root: Option<PathBuf>,

    /// Maximum length of a declared checksum field in bytes (default: 1 KB)
    pub max_declaration_len: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_request_size: 4 * 1024 * 1024 * 1024, // 4 GB
            scratch_root: None,
            max_declaration_len: 1024,
        }
    }
}

impl IngestConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_request_size: env::var("MAX_REQUEST_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_request_size),

            scratch_root: env::var("SCRATCH_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .or(default.scratch_root),

            max_declaration_len: env::var("MAX_DECLARATION_LEN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_declaration_len),
        }
    }

    /// Create config for development and tests (small body limit)
    pub fn development() -> Self {
        Self {
            max_request_size: 64 * 1024 * 1024,
            scratch_root: None,
            max_declaration_len: 1024,
        }
    }

    /// Directory under which each batch creates its own scratch directory
    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_root.clone().unwrap_or_else(env::temp_dir)
    }
}
