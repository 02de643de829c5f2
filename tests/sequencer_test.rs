use bulk_ingest::api::error::AppError;
use bulk_ingest::config::IngestConfig;
use bulk_ingest::services::batch::UploadBatch;
use bulk_ingest::services::diagnostics::ActiveBatches;
use bulk_ingest::services::ingest::IngestService;
use bulk_ingest::services::multipart::{FieldSource, IncomingField};
use bulk_ingest::services::scratch::ScratchDir;
use bulk_ingest::services::sequencer::FieldSequencer;
use bulk_ingest::utils::hash::calculate_md5;
use bytes::Bytes;
use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

const HELLO_MD5: &str = "5d41402abc4b2a76b9719d911017c592";
const EMPTY_MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";

enum Step {
    Data(Bytes),
    Reset,
    Stall,
}

struct ScriptedField {
    name: &'static str,
    file_name: Option<String>,
    steps: VecDeque<Step>,
}

impl ScriptedField {
    fn checksum(file_name: &str, hash: &str) -> Self {
        Self {
            name: "md5",
            file_name: Some(file_name.to_string()),
            steps: VecDeque::from([Step::Data(Bytes::copy_from_slice(hash.as_bytes()))]),
        }
    }

    fn content(file_name: &str, data: &[u8], chunk_size: usize) -> Self {
        let steps = data
            .chunks(chunk_size.max(1))
            .map(|c| Step::Data(Bytes::copy_from_slice(c)))
            .collect();
        Self {
            name: "content",
            file_name: Some(file_name.to_string()),
            steps,
        }
    }

    fn then(mut self, step: Step) -> Self {
        self.steps.push_back(step);
        self
    }
}

impl IncomingField for ScriptedField {
    fn name(&self) -> Option<&str> {
        Some(self.name)
    }

    fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    async fn read_fully(&mut self, limit: usize) -> Result<Bytes, AppError> {
        let mut buf = Vec::new();
        while let Some(chunk) = self.read_chunk().await? {
            buf.extend_from_slice(&chunk);
            if buf.len() > limit {
                return Err(AppError::MalformedRequest("declaration too long".into()));
            }
        }
        Ok(Bytes::from(buf))
    }

    async fn read_chunk(&mut self) -> Result<Option<Bytes>, AppError> {
        match self.steps.pop_front() {
            None => Ok(None),
            Some(Step::Data(bytes)) => Ok(Some(bytes)),
            Some(Step::Reset) => Err(AppError::TransferInterrupted(
                "connection reset by peer".into(),
            )),
            Some(Step::Stall) => std::future::pending().await,
        }
    }
}

struct ScriptedSource {
    fields: VecDeque<ScriptedField>,
}

impl ScriptedSource {
    fn new(fields: Vec<ScriptedField>) -> Self {
        Self {
            fields: fields.into(),
        }
    }
}

impl FieldSource for ScriptedSource {
    type Field<'a>
        = ScriptedField
    where
        Self: 'a;

    async fn next_field(&mut self) -> Result<Option<ScriptedField>, AppError> {
        Ok(self.fields.pop_front())
    }
}

fn service(root: &Path) -> IngestService {
    let config = IngestConfig {
        scratch_root: Some(root.to_path_buf()),
        ..IngestConfig::development()
    };
    IngestService::new(config, ActiveBatches::new())
}

fn entries(root: &Path) -> usize {
    std::fs::read_dir(root).unwrap().count()
}

#[tokio::test]
async fn test_scenario_a_matching_hash() {
    let root = tempfile::tempdir().unwrap();
    let mut source = ScriptedSource::new(vec![
        ScriptedField::checksum("hello.txt", HELLO_MD5),
        ScriptedField::content("hello.txt", b"hello", 2),
    ]);

    let report = service(root.path()).ingest(&mut source).await.unwrap();

    assert_eq!(report.file_count, 1);
    let transfer = &report.transfers[0];
    assert_eq!(transfer.logical_name(), "hello.txt");
    assert_eq!(transfer.byte_size(), 5);
    assert_eq!(transfer.computed_hash(), HELLO_MD5);
    assert!(transfer.matched());
    assert!(report.verdict);
    assert_eq!(entries(root.path()), 0);
}

#[tokio::test]
async fn test_scenario_b_altered_declaration() {
    let root = tempfile::tempdir().unwrap();
    let mut source = ScriptedSource::new(vec![
        ScriptedField::checksum("hello.txt", "5d41402abc4b2a76b9719d911017c593"),
        ScriptedField::content("hello.txt", b"hello", 5),
    ]);

    let report = service(root.path()).ingest(&mut source).await.unwrap();

    assert!(!report.transfers[0].matched());
    assert_eq!(report.mismatches, 1);
    assert!(!report.verdict);
}

#[tokio::test]
async fn test_scenario_c_zero_byte_content() {
    let root = tempfile::tempdir().unwrap();
    let mut source = ScriptedSource::new(vec![
        ScriptedField::checksum("empty.bin", EMPTY_MD5),
        ScriptedField::content("empty.bin", b"", 1),
    ]);

    let report = service(root.path()).ingest(&mut source).await.unwrap();

    let transfer = &report.transfers[0];
    assert_eq!(transfer.byte_size(), 0);
    assert_eq!(transfer.computed_hash(), EMPTY_MD5);
    assert!(report.verdict);
}

#[tokio::test]
async fn test_scenario_e_two_files_back_to_back() {
    let root = tempfile::tempdir().unwrap();
    let second = b"second file contents".to_vec();
    let mut source = ScriptedSource::new(vec![
        ScriptedField::checksum("a.txt", HELLO_MD5),
        ScriptedField::content("a.txt", b"hello", 3),
        ScriptedField::checksum("b.txt", &calculate_md5(&second)),
        ScriptedField::content("b.txt", &second, 4),
    ]);

    let report = service(root.path()).ingest(&mut source).await.unwrap();

    assert_eq!(report.file_count, 2);
    assert_eq!(report.declared_count, 2);
    assert_eq!(report.total_bytes, 5 + second.len() as u64);
    assert!(report.verdict);
}

#[tokio::test]
async fn test_transfers_follow_arrival_order() {
    let root = tempfile::tempdir().unwrap();
    let names = ["zeta", "alpha", "mid", "omega", "beta"];
    let mut fields = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let data = vec![i as u8; i * 10];
        fields.push(ScriptedField::checksum(name, &calculate_md5(&data)));
        fields.push(ScriptedField::content(name, &data, 7));
    }
    let mut source = ScriptedSource::new(fields);

    let report = service(root.path()).ingest(&mut source).await.unwrap();

    let got: Vec<_> = report.transfers.iter().map(|t| t.logical_name()).collect();
    assert_eq!(got, names);
    assert!(report.verdict);
}

#[tokio::test]
async fn test_empty_batch_is_valid() {
    let root = tempfile::tempdir().unwrap();
    let mut source = ScriptedSource::new(vec![]);

    let report = service(root.path()).ingest(&mut source).await.unwrap();

    assert_eq!(report.file_count, 0);
    assert!(report.verdict);
    assert_eq!(entries(root.path()), 0);
}

#[tokio::test]
async fn test_any_single_corrupted_byte_is_detected() {
    let root = tempfile::tempdir().unwrap();
    let original = b"integrity matters".to_vec();
    let declared = calculate_md5(&original);

    for pos in 0..original.len() {
        let mut corrupted = original.clone();
        corrupted[pos] ^= 0x01;

        let mut source = ScriptedSource::new(vec![
            ScriptedField::checksum("f", &declared),
            ScriptedField::content("f", &corrupted, 4),
        ]);
        let report = service(root.path()).ingest(&mut source).await.unwrap();

        assert!(!report.transfers[0].matched(), "byte {} flipped", pos);
        assert!(!report.verdict);
    }
}

#[tokio::test]
async fn test_chunk_boundaries_do_not_affect_hash() {
    let root = tempfile::tempdir().unwrap();
    let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    let expected = calculate_md5(&data);

    for chunk_size in [1, 13, 512, 4096, 10_000] {
        let mut source = ScriptedSource::new(vec![
            ScriptedField::checksum("data.bin", &expected),
            ScriptedField::content("data.bin", &data, chunk_size),
        ]);
        let report = service(root.path()).ingest(&mut source).await.unwrap();

        assert_eq!(report.transfers[0].computed_hash(), expected);
        assert_eq!(report.transfers[0].byte_size(), data.len() as u64);
    }
}

#[tokio::test]
async fn test_mismatch_does_not_stop_batch() {
    let root = tempfile::tempdir().unwrap();
    let mut source = ScriptedSource::new(vec![
        ScriptedField::checksum("bad", "not-a-real-digest"),
        ScriptedField::content("bad", b"hello", 2),
        ScriptedField::checksum("good", HELLO_MD5),
        ScriptedField::content("good", b"hello", 2),
    ]);

    let report = service(root.path()).ingest(&mut source).await.unwrap();

    assert_eq!(report.file_count, 2);
    assert!(!report.transfers[0].matched());
    assert!(report.transfers[1].matched());
    assert!(!report.verdict);
}

#[tokio::test]
async fn test_content_without_checksum_is_malformed() {
    let root = tempfile::tempdir().unwrap();
    let mut source = ScriptedSource::new(vec![ScriptedField::content("a", b"hello", 5)]);

    let err = service(root.path()).ingest(&mut source).await.unwrap_err();

    assert!(matches!(err, AppError::MalformedRequest(_)));
    assert_eq!(entries(root.path()), 0);
}

#[tokio::test]
async fn test_checksum_followed_by_checksum_is_malformed() {
    let root = tempfile::tempdir().unwrap();
    let mut source = ScriptedSource::new(vec![
        ScriptedField::checksum("a", HELLO_MD5),
        ScriptedField::checksum("b", HELLO_MD5),
    ]);

    let err = service(root.path()).ingest(&mut source).await.unwrap_err();

    assert!(matches!(err, AppError::MalformedRequest(_)));
    assert_eq!(entries(root.path()), 0);
}

#[tokio::test]
async fn test_checksum_at_end_of_stream_is_malformed() {
    let root = tempfile::tempdir().unwrap();
    let mut source = ScriptedSource::new(vec![
        ScriptedField::checksum("a", HELLO_MD5),
        ScriptedField::content("a", b"hello", 5),
        ScriptedField::checksum("b", HELLO_MD5),
    ]);

    let err = service(root.path()).ingest(&mut source).await.unwrap_err();

    assert!(matches!(err, AppError::MalformedRequest(_)));
    assert_eq!(entries(root.path()), 0);
}

#[tokio::test]
async fn test_non_utf8_declaration_is_malformed() {
    let root = tempfile::tempdir().unwrap();
    let mut checksum = ScriptedField::checksum("a", "");
    checksum.steps = VecDeque::from([Step::Data(Bytes::from_static(&[0xff, 0xfe]))]);
    let mut source = ScriptedSource::new(vec![checksum, ScriptedField::content("a", b"x", 1)]);

    let err = service(root.path()).ingest(&mut source).await.unwrap_err();

    assert!(matches!(err, AppError::MalformedRequest(_)));
}

#[tokio::test]
async fn test_oversized_declaration_is_malformed() {
    let root = tempfile::tempdir().unwrap();
    let huge = "a".repeat(4096);
    let mut source = ScriptedSource::new(vec![
        ScriptedField::checksum("a", &huge),
        ScriptedField::content("a", b"x", 1),
    ]);

    let err = service(root.path()).ingest(&mut source).await.unwrap_err();

    assert!(matches!(err, AppError::MalformedRequest(_)));
}

#[tokio::test]
async fn test_scenario_d_reset_halfway_records_nothing() {
    let root = tempfile::tempdir().unwrap();
    let data = vec![7u8; 1000];
    let half = &data[..500];

    let scratch = ScratchDir::create_in(root.path()).unwrap();
    let mut batch = UploadBatch::new(scratch);
    let mut source = ScriptedSource::new(vec![
        ScriptedField::checksum("done", HELLO_MD5),
        ScriptedField::content("done", b"hello", 5),
        ScriptedField::checksum("big.bin", &calculate_md5(&data)),
        ScriptedField::content("big.bin", half, 100).then(Step::Reset),
    ]);

    let err = FieldSequencer::new(1024)
        .run(&mut source, &mut batch)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::TransferInterrupted(_)));
    assert_eq!(batch.file_count(), 1);
    assert_eq!(batch.transfers()[0].logical_name(), "done");
    assert!(!batch.batch_verdict());

    drop(batch);
    assert_eq!(entries(root.path()), 0);
}

#[tokio::test]
async fn test_reset_through_service_cleans_scratch() {
    let root = tempfile::tempdir().unwrap();
    let svc = service(root.path());
    let data = vec![1u8; 2048];
    let mut source = ScriptedSource::new(vec![
        ScriptedField::checksum("big.bin", &calculate_md5(&data)),
        ScriptedField::content("big.bin", &data[..1024], 256).then(Step::Reset),
    ]);

    let err = svc.ingest(&mut source).await.unwrap_err();

    assert!(matches!(err, AppError::TransferInterrupted(_)));
    assert_eq!(entries(root.path()), 0);
    assert_eq!(svc.active_batches().current(), 0);
}

#[tokio::test]
async fn test_cancelled_batch_cleans_scratch() {
    let root = tempfile::tempdir().unwrap();
    let svc = service(root.path());
    let data = vec![9u8; 2048];
    let mut source = ScriptedSource::new(vec![
        ScriptedField::checksum("slow.bin", &calculate_md5(&data)),
        ScriptedField::content("slow.bin", &data[..1024], 256).then(Step::Stall),
    ]);

    let outcome = tokio::time::timeout(Duration::from_millis(200), svc.ingest(&mut source)).await;

    assert!(outcome.is_err(), "ingest should still be waiting on the stalled field");
    assert_eq!(entries(root.path()), 0);
    assert_eq!(svc.active_batches().current(), 0);
}
