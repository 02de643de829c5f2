//! Forward-only view over the fields of a multipart body.
//!
//! The sequencer only needs to pull the next field and then drain it, either
//! all at once (short declaration values) or chunk by chunk (file content).
//! `MultipartFields` implements this over axum's extractor; tests provide
//! scripted sources.

use crate::api::error::AppError;
use axum::extract::Multipart;
use axum::extract::multipart::Field;
use bytes::{Bytes, BytesMut};
use std::future::Future;

pub trait FieldSource: Send {
    type Field<'a>: IncomingField
    where
        Self: 'a;

    /// Next field in arrival order, or `None` once the body is exhausted.
    fn next_field(
        &mut self,
    ) -> impl Future<Output = Result<Option<Self::Field<'_>>, AppError>> + Send;
}

pub trait IncomingField: Send {
    fn name(&self) -> Option<&str>;

    fn file_name(&self) -> Option<&str>;

    /// Read the remaining value into memory. Fails with `MalformedRequest`
    /// once more than `limit` bytes have arrived.
    fn read_fully(&mut self, limit: usize) -> impl Future<Output = Result<Bytes, AppError>> + Send;

    /// Next chunk of the value, `None` at the end of the field.
    fn read_chunk(&mut self) -> impl Future<Output = Result<Option<Bytes>, AppError>> + Send;
}

pub struct MultipartFields(pub Multipart);

impl FieldSource for MultipartFields {
    type Field<'a>
        = MultipartField<'a>
    where
        Self: 'a;

    async fn next_field(&mut self) -> Result<Option<MultipartField<'_>>, AppError> {
        let field = self.0.next_field().await?;
        Ok(field.map(MultipartField))
    }
}

pub struct MultipartField<'a>(Field<'a>);

impl IncomingField for MultipartField<'_> {
    fn name(&self) -> Option<&str> {
        self.0.name()
    }

    fn file_name(&self) -> Option<&str> {
        self.0.file_name()
    }

    async fn read_fully(&mut self, limit: usize) -> Result<Bytes, AppError> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.0.chunk().await? {
            if buf.len() + chunk.len() > limit {
                return Err(AppError::MalformedRequest(format!(
                    "Field '{}' exceeds {} bytes",
                    self.0.name().unwrap_or_default(),
                    limit
                )));
            }
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }

    async fn read_chunk(&mut self) -> Result<Option<Bytes>, AppError> {
        Ok(self.0.chunk().await?)
    }
}
