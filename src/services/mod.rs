pub mod batch;
pub mod diagnostics;
pub mod hasher;
pub mod ingest;
pub mod multipart;
pub mod scratch;
pub mod sequencer;
pub mod verification;
