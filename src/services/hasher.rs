use crate::api::error::AppError;
use crate::services::multipart::IncomingField;
use crate::services::scratch::ScratchDir;
use crate::utils::hash::Md5Accumulator;
use std::path::PathBuf;

pub struct StreamedFile {
    pub byte_size: u64,
    pub computed_hash: String,
    pub path: PathBuf,
}

/// Streams one content field into a new scratch file while hashing it.
///
/// Every chunk is counted, hashed and written before the next one is pulled,
/// so the digest always covers exactly the bytes on disk and memory stays
/// bounded by the transport's chunk size.
pub async fn stream_to_scratch<F: IncomingField>(
    field: &mut F,
    scratch: &ScratchDir,
) -> Result<StreamedFile, AppError> {
    let mut file = scratch.create_file()?;
    let mut hasher = Md5Accumulator::new();
    let mut byte_size: u64 = 0;

    while let Some(chunk) = field.read_chunk().await? {
        if chunk.is_empty() {
            continue;
        }
        byte_size += chunk.len() as u64;
        hasher.update(&chunk);
        file.write_chunk(&chunk).await?;
    }

    let path = file.finish().await?;

    Ok(StreamedFile {
        byte_size,
        computed_hash: hasher.finalize_hex(),
        path,
    })
}
