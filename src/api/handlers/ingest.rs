use crate::api::error::AppError;
use crate::services::multipart::MultipartFields;
use axum::extract::{Multipart, State};

/// Accepts a batch of `md5`/`content` field pairs.
///
/// Hash mismatches still yield `200 OK`; they are reported in the logs.
#[utoipa::path(
    post,
    path = "/",
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "Repeated pairs of an `md5` field (declared hex digest) followed by a `content` field, both carrying the file name"
    ),
    responses(
        (status = 200, description = "Batch ingested", body = String),
        (status = 400, description = "Field pairing violated or transfer interrupted"),
        (status = 413, description = "Request body too large")
    ),
    tag = "ingest"
)]
pub async fn ingest_batch(
    State(state): State<crate::AppState>,
    multipart: Multipart,
) -> Result<&'static str, AppError> {
    let mut fields = MultipartFields(multipart);
    let report = state.ingest.ingest(&mut fields).await?;

    if !report.verdict {
        tracing::warn!(
            "Batch completed with {} of {} files failing verification",
            report.mismatches,
            report.file_count
        );
    }

    Ok("OK")
}
