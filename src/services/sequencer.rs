use crate::api::error::AppError;
use crate::models::ChecksumDeclaration;
use crate::services::batch::UploadBatch;
use crate::services::hasher::stream_to_scratch;
use crate::services::multipart::{FieldSource, IncomingField};
use crate::utils::format::human_size;

pub const CHECKSUM_FIELD: &str = "md5";
pub const CONTENT_FIELD: &str = "content";

/// Position in the `batch := (checksum_field content_field)*` grammar.
enum SequencerState {
    AwaitingDeclaration,
    AwaitingContent(ChecksumDeclaration),
}

/// Walks the fields of one request in arrival order, pairing every checksum
/// field with the content field that follows it.
pub struct FieldSequencer {
    max_declaration_len: usize,
}

impl FieldSequencer {
    pub fn new(max_declaration_len: usize) -> Self {
        Self {
            max_declaration_len,
        }
    }

    pub async fn run<S: FieldSource>(
        &self,
        source: &mut S,
        batch: &mut UploadBatch,
    ) -> Result<(), AppError> {
        let mut state = SequencerState::AwaitingDeclaration;

        loop {
            let next = source.next_field().await?;
            state = match (state, next) {
                (SequencerState::AwaitingDeclaration, None) => return Ok(()),
                (SequencerState::AwaitingContent(declaration), None) => {
                    tracing::error!("No more fields after checksum for {}", declaration.logical_name);
                    return Err(AppError::MalformedRequest(format!(
                        "Checksum for '{}' is not followed by a '{}' field",
                        declaration.logical_name, CONTENT_FIELD
                    )));
                }
                (SequencerState::AwaitingDeclaration, Some(mut field)) => {
                    let declaration = self.read_declaration(&mut field).await?;
                    batch.declare(&declaration);
                    SequencerState::AwaitingContent(declaration)
                }
                (SequencerState::AwaitingContent(declaration), Some(mut field)) => {
                    transfer_content(&mut field, declaration, batch).await?;
                    SequencerState::AwaitingDeclaration
                }
            };
        }
    }

    async fn read_declaration<F: IncomingField>(
        &self,
        field: &mut F,
    ) -> Result<ChecksumDeclaration, AppError> {
        expect_field_name(field, CHECKSUM_FIELD)?;
        let logical_name = field.file_name().unwrap_or("unnamed").to_string();

        let raw = field.read_fully(self.max_declaration_len).await?;
        let declared_hash = String::from_utf8(raw.to_vec()).map_err(|_| {
            AppError::MalformedRequest(format!(
                "Checksum for '{}' is not valid UTF-8",
                logical_name
            ))
        })?;

        Ok(ChecksumDeclaration {
            logical_name,
            declared_hash,
        })
    }
}

async fn transfer_content<F: IncomingField>(
    field: &mut F,
    declaration: ChecksumDeclaration,
    batch: &mut UploadBatch,
) -> Result<(), AppError> {
    expect_field_name(field, CONTENT_FIELD)?;

    match field.file_name() {
        Some(name) if name != declaration.logical_name => tracing::warn!(
            "Content filename '{}' differs from declared '{}', keeping declared name",
            name,
            declaration.logical_name
        ),
        _ => {}
    }
    tracing::info!("FORM: {}, FILENAME: {}", CONTENT_FIELD, declaration.logical_name);

    let streamed = stream_to_scratch(field, batch.scratch()).await?;
    let transfer = batch.record(declaration, streamed.computed_hash, streamed.byte_size);

    if transfer.matched() {
        tracing::info!(
            "DONE with: {}, TRANSFER SIZE: {}, MD5: {}, HASH CHECK: true",
            transfer.logical_name(),
            human_size(transfer.byte_size()),
            transfer.computed_hash()
        );
    } else {
        tracing::warn!(
            "DONE with: {}, TRANSFER SIZE: {}, MD5: {}, HASH CHECK: false (declared {})",
            transfer.logical_name(),
            human_size(transfer.byte_size()),
            transfer.computed_hash(),
            transfer.declared_hash()
        );
    }

    Ok(())
}

fn expect_field_name<F: IncomingField>(field: &F, expected: &str) -> Result<(), AppError> {
    match field.name() {
        Some(name) if name == expected => Ok(()),
        other => Err(AppError::MalformedRequest(format!(
            "Expected '{}' field, got '{}'",
            expected,
            other.unwrap_or("<unnamed>")
        ))),
    }
}
