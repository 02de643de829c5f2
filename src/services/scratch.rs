use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;

/// Batch-scoped staging directory.
///
/// Removed with everything inside it when dropped, so every exit path of a
/// batch (success, protocol error, I/O error, cancelled future) reclaims it.
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    pub fn create_in(root: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(root)?;
        let dir = tempfile::Builder::new().prefix("batch-").tempdir_in(root)?;
        tracing::debug!("Created scratch directory {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Creates a fresh staging file; never reuses another transfer's file.
    pub fn create_file(&self) -> io::Result<ScratchFile> {
        let (file, path) = tempfile::Builder::new()
            .prefix("transfer-")
            .tempfile_in(self.dir.path())?
            .keep()?;

        Ok(ScratchFile {
            file: tokio::fs::File::from_std(file),
            path,
        })
    }

    /// Removes the directory, reporting any failure instead of swallowing it.
    pub fn close(self) -> io::Result<()> {
        let path = self.dir.path().to_owned();
        self.dir.close()?;
        tracing::debug!("Removed scratch directory {}", path.display());
        Ok(())
    }
}

pub struct ScratchFile {
    file: tokio::fs::File,
    path: PathBuf,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk).await
    }

    /// Flushes and syncs the file before the handle is released.
    pub async fn finish(mut self) -> io::Result<PathBuf> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        Ok(self.path)
    }
}
