//! End-to-end pipeline tests over the in-memory and local backends.

use std::io::Write;
use std::sync::Arc;

use sema_config::PipelineConfig;
use sema_core::{content_id, EmbeddingGenerator, FailureKind, SearchQuery, VectorIndex};
use sema_embed::{ChunkConfig, DocumentEmbedder, HashEmbedder};
use sema_index::{FsBlobStore, MemoryBlobStore, MemoryVectorIndex, SqliteVectorIndex};
use sema_pipeline::{FileUpload, HealthCheck, IngestionPipeline, QueryError, RetrievalPipeline};

const DIM: usize = 128;

const HELLO_PDF: &[u8] = include_bytes!("../../sema-extract/tests/fixtures/hello.pdf");

fn config() -> PipelineConfig {
    PipelineConfig {
        max_concurrent: 4,
        retry_attempts: 2,
        retry_backoff_ms: 1,
    }
}

fn embedder() -> Arc<DocumentEmbedder> {
    Arc::new(DocumentEmbedder::new(
        Arc::new(HashEmbedder::new(DIM)),
        ChunkConfig {
            window_chars: 2000,
            overlap_chars: 200,
        },
    ))
}

fn memory_stack() -> (IngestionPipeline, RetrievalPipeline) {
    let blobs = Arc::new(MemoryBlobStore::new());
    let index = Arc::new(MemoryVectorIndex::new(DIM));
    let embedder = embedder();

    (
        IngestionPipeline::new(blobs, embedder.clone(), index.clone(), config()),
        RetrievalPipeline::new(embedder, index, config()),
    )
}

fn minimal_docx(text: &str) -> Vec<u8> {
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>"#,
        text
    );

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", zip::write::FileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn test_self_retrieval_ranks_first() {
    let (ingest, retrieve) = memory_stack();

    let text = "the quick brown fox jumps over the lazy dog";
    ingest.ingest_file("fox.txt", text.as_bytes()).await;
    ingest
        .ingest_file("other.txt", b"completely unrelated gardening notes")
        .await;

    let response = retrieve
        .search(SearchQuery::new(text, 10))
        .await
        .unwrap();

    assert_eq!(response.results[0].rank, 1);
    assert_eq!(response.results[0].document.filename, "fox.txt");
    assert!(response.results[0].score > 0.9);
}

#[tokio::test]
async fn test_query_partial_overlap_scores_above_half() {
    let (ingest, retrieve) = memory_stack();

    let outcome = ingest.ingest_file("hello.txt", b"hello world").await;
    let document = outcome.document().unwrap();
    assert_eq!(document.content, "hello world");

    let response = retrieve
        .search(SearchQuery::new("hello", 1))
        .await
        .unwrap();

    assert_eq!(response.total_results, 1);
    assert_eq!(response.results[0].rank, 1);
    assert_eq!(response.results[0].document.id, document.id);
    assert!(response.results[0].score >= 0.5);
}

#[tokio::test]
async fn test_idempotent_reupload() {
    let blobs = Arc::new(MemoryBlobStore::new());
    let index = Arc::new(MemoryVectorIndex::new(DIM));
    let embedder = embedder();
    let ingest = IngestionPipeline::new(blobs.clone(), embedder, index.clone(), config());

    let bytes = b"identical bytes both times";
    let first = ingest.ingest_file("dup.txt", bytes).await;
    let second = ingest.ingest_file("dup.txt", bytes).await;

    assert_eq!(first.document().unwrap().id, second.document().unwrap().id);
    assert_eq!(first.document().unwrap().id, content_id(bytes));
    // Exactly one blob and one index entry survive
    assert_eq!(blobs.len(), 1);
    assert_eq!(index.len().await.unwrap(), 1);
}

#[tokio::test]
async fn test_top_k_boundaries() {
    let (ingest, retrieve) = memory_stack();
    ingest.ingest_file("a.txt", b"first entry").await;
    ingest.ingest_file("b.txt", b"second entry").await;

    // Zero is rejected
    let err = retrieve
        .search(SearchQuery::new("entry", 0))
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidTopK { top_k: 0 }));

    // Larger than the corpus returns the whole corpus, no padding
    let response = retrieve
        .search(SearchQuery::new("entry", 50))
        .await
        .unwrap();
    assert_eq!(response.total_results, 2);
}

#[tokio::test]
async fn test_identical_queries_are_deterministic() {
    let (ingest, retrieve) = memory_stack();
    for (name, text) in [
        ("a.txt", "alpha shared tokens"),
        ("b.txt", "beta shared tokens"),
        ("c.txt", "gamma shared tokens"),
        ("d.txt", "delta shared tokens"),
    ] {
        ingest.ingest_file(name, text.as_bytes()).await;
    }

    let run = || retrieve.search(SearchQuery::new("shared tokens", 10));
    let first = run().await.unwrap();
    let second = run().await.unwrap();

    let ids = |r: &sema_core::SearchResponse| {
        r.results
            .iter()
            .map(|x| (x.rank, x.document.id.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(&first), ids(&second));
}

#[tokio::test]
async fn test_format_coverage_end_to_end() {
    let (ingest, retrieve) = memory_stack();

    let outcomes = ingest
        .ingest_batch(vec![
            FileUpload::new("hello.pdf", HELLO_PDF.to_vec()),
            FileUpload::new("plain.txt", b"plain text body".to_vec()),
            FileUpload::new("report.docx", minimal_docx("quarterly report body")),
            FileUpload::new(
                "config.json",
                br#"{"server": {"port": 8080}}"#.to_vec(),
            ),
        ])
        .await;

    for outcome in &outcomes {
        let document = outcome.document().expect("all formats should ingest");
        assert!(!document.content.trim().is_empty());
    }

    // Each is retrievable by its own content
    let response = retrieve
        .search(SearchQuery::new("quarterly report", 1))
        .await
        .unwrap();
    assert_eq!(response.results[0].document.filename, "report.docx");

    let response = retrieve
        .search(SearchQuery::new("server port 8080", 1))
        .await
        .unwrap();
    assert_eq!(response.results[0].document.filename, "config.json");

    // Unrecognized extension is rejected as a validation failure
    let outcome = ingest.ingest_file("tool.exe", b"binary junk").await;
    assert_eq!(
        outcome.failure().unwrap().kind,
        FailureKind::Validation
    );
}

#[tokio::test]
async fn test_partial_batch_failure_keeps_siblings() {
    let (ingest, retrieve) = memory_stack();

    let outcomes = ingest
        .ingest_batch(vec![
            FileUpload::new("good-one.txt", b"searchable text one".to_vec()),
            FileUpload::new("corrupt.pdf", b"not actually a pdf".to_vec()),
            FileUpload::new("good-two.txt", b"searchable text two".to_vec()),
        ])
        .await;

    assert!(outcomes[0].is_success());
    assert!(outcomes[2].is_success());

    let failure = outcomes[1].failure().expect("corrupt file must fail");
    assert_eq!(failure.filename, "corrupt.pdf");
    assert_eq!(failure.kind, FailureKind::Extraction);

    // The two successes are independently queryable afterward
    let response = retrieve
        .search(SearchQuery::new("searchable text", 10))
        .await
        .unwrap();
    assert_eq!(response.total_results, 2);
}

#[tokio::test]
async fn test_local_stack_roundtrip() {
    // Filesystem blobs + SQLite index, the shipped local deployment
    let dir = tempfile::tempdir().unwrap();
    let blobs = Arc::new(FsBlobStore::new(dir.path().join("blobs")).unwrap());
    let embedder = embedder();
    let index = Arc::new(
        SqliteVectorIndex::open(dir.path().join("index.db"), embedder.model_id(), DIM).unwrap(),
    );

    let ingest =
        IngestionPipeline::new(blobs.clone(), embedder.clone(), index.clone(), config());
    let retrieve = RetrievalPipeline::new(embedder.clone(), index.clone(), config());

    let outcome = ingest
        .ingest_file("durable.txt", b"durable local document")
        .await;
    let document = outcome.document().unwrap();

    // Original bytes are retrievable under the content-addressed key
    let location = sema_core::BlobLocation(format!(
        "documents/{}/durable.txt",
        document.id
    ));
    let stored = sema_core::BlobStore::get(blobs.as_ref(), &location)
        .await
        .unwrap();
    assert_eq!(stored, b"durable local document");

    let response = retrieve
        .search(SearchQuery::new("durable local document", 1))
        .await
        .unwrap();
    assert_eq!(response.results[0].document.id, document.id);

    let health = HealthCheck::new(blobs, index, embedder).check().await;
    assert!(health.is_healthy());
}
