//! End-to-end flows through ingestion, retrieval and synthesis with in-process models.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use docqa_core::{Embedding, EmbeddingModel, LanguageModel, llm::LLMRequest};
use docqa_openai::OpenAI;
use docqa_rag::synthesis::{APOLOGY, NO_MATCHES};
use docqa_rag::{ChunkMetadata, Rag, SearchResult, Synthesizer, VectorStore};
use tempfile::tempdir;

/// Bag-of-letters embedder: deterministic and dimension 26.
#[derive(Clone, Default)]
struct LetterEmbedder {
    calls: Arc<AtomicUsize>,
}

impl EmbeddingModel for LetterEmbedder {
    fn dim(&self) -> usize {
        26
    }

    async fn embed_batch(&self, texts: &[String]) -> docqa_core::Result<Vec<Embedding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|text| {
                let mut v = vec![0.0; 26];
                for c in text.to_ascii_lowercase().bytes().filter(u8::is_ascii_lowercase) {
                    v[usize::from(c - b'a')] += 1.0;
                }
                v
            })
            .collect())
    }
}

#[derive(Clone, Default)]
struct CountingModel {
    calls: Arc<AtomicUsize>,
}

impl LanguageModel for CountingModel {
    fn model_id(&self) -> &str {
        "counting"
    }

    async fn respond(&self, _request: LLMRequest) -> docqa_core::Result {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("## Summary\n• **Python** is used for web development, data science, and AI.".into())
    }
}

fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

#[tokio::test]
async fn single_short_document_is_retrievable() {
    let dir = tempdir().unwrap();
    let rag = Rag::builder(LetterEmbedder::default(), CountingModel::default())
        .data_dir(dir.path())
        .chunking(1000, 200)
        .build()
        .unwrap();

    let path = write(
        dir.path(),
        "doc.txt",
        "Python is a versatile language used for web development, data science, and AI.",
    );
    let outcome = rag.try_ingest(&path, "doc.txt").await.unwrap();
    assert_eq!(outcome.chunks, 1);

    let results = rag.retrieve("What is Python used for?", 5).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].metadata.source_file, "doc.txt");
    assert_eq!(results[0].metadata.chunk_id, "doc.txt_chunk_0");

    let response = rag.query("What is Python used for?").await;
    assert!(response.answer.contains("**Python**"));
    assert_eq!(response.sources.len(), 1);
}

#[tokio::test]
async fn empty_index_answers_without_generation() {
    let dir = tempdir().unwrap();
    let model = CountingModel::default();
    let calls = Arc::clone(&model.calls);
    let rag = Rag::builder(LetterEmbedder::default(), model)
        .data_dir(dir.path())
        .build()
        .unwrap();

    assert!(rag.retrieve("What is Python used for?", 5).await.is_empty());

    let response = rag.query("What is Python used for?").await;
    assert_eq!(response.answer, NO_MATCHES);
    assert!(response.sources.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreachable_generation_service_yields_apology() {
    let model = OpenAI::builder("test-key")
        .base_url("http://127.0.0.1:9/v1")
        .timeout(Duration::from_secs(2))
        .build();
    let synthesizer = Synthesizer::new(model);

    let retrieved = [SearchResult {
        score: 0.0,
        metadata: ChunkMetadata {
            text: "Python is a versatile language.".into(),
            source_file: "doc.txt".into(),
            chunk_id: "doc.txt_chunk_0".into(),
        },
    }];
    let answer = synthesizer.synthesize("What is Python used for?", &retrieved).await;
    assert_eq!(answer, APOLOGY);
}

#[tokio::test]
async fn persisted_index_survives_restart() {
    let dir = tempdir().unwrap();
    let text: String = "Rust ownership and borrowing keep memory safe. ".repeat(60);
    let path = write(dir.path(), "rust.txt", &text);

    let expected = {
        let rag = Rag::builder(LetterEmbedder::default(), CountingModel::default())
            .data_dir(dir.path())
            .build()
            .unwrap();
        rag.ingest(&path, "rust.txt").await.unwrap();
        rag.store().snapshot()
    };
    assert_eq!(expected.len(), 4);

    let rag = Rag::builder(LetterEmbedder::default(), CountingModel::default())
        .data_dir(dir.path())
        .build()
        .unwrap();
    let loaded = rag.store().snapshot();
    assert_eq!(loaded.len(), expected.len());
    assert_eq!(loaded.entries(), expected.entries());

    let reopened = VectorStore::open(rag.store().files().clone());
    assert_eq!(reopened.sources().get("rust.txt"), Some(&4));
}

#[tokio::test]
async fn top_k_bounds_and_orders_results() {
    let dir = tempdir().unwrap();
    let rag = Rag::builder(LetterEmbedder::default(), CountingModel::default())
        .data_dir(dir.path())
        .chunking(40, 10)
        .build()
        .unwrap();

    let body = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu nu xi \
                omicron pi rho sigma tau upsilon phi chi psi omega";
    let path = write(dir.path(), "greek.txt", body);
    rag.try_ingest(&path, "greek.txt").await.unwrap();
    assert!(rag.len() > 3);

    let results = rag.retrieve("sigma tau", 3).await;
    assert_eq!(results.len(), 3);
    assert!(results.windows(2).all(|w| w[0].score <= w[1].score));
}

#[tokio::test]
async fn reingesting_same_file_appends_duplicates() {
    let dir = tempdir().unwrap();
    let rag = Rag::builder(LetterEmbedder::default(), CountingModel::default())
        .data_dir(dir.path())
        .build()
        .unwrap();
    let path = write(dir.path(), "doc.txt", "The same text twice.");

    rag.try_ingest(&path, "doc.txt").await.unwrap();
    rag.try_ingest(&path, "doc.txt").await.unwrap();

    let results = rag.retrieve("same text", 5).await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].metadata, results[1].metadata);
    assert_eq!(results[0].score, results[1].score);
}
