//! Implementations of the `ingest`, `query`, `retrieve` and `status` subcommands.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use docqa_rag::chunking::FixedSizeChunker;
use docqa_rag::{
    IndexFiles, IngestOutcome, Ingestor, QueryResponse, Rag, RagConfig, Retriever, SearchResult,
    VectorStore,
};
use serde::Serialize;

use crate::settings::Settings;
use crate::upload;

/// Characters of chunk text shown per retrieved hit.
const SNIPPET_CHARS: usize = 160;

/// Loads the persisted index off the async runtime.
///
/// # Errors
/// Fails only if the blocking task panics; unreadable files yield an empty store.
pub async fn open_store(config: &RagConfig) -> anyhow::Result<Arc<VectorStore>> {
    let files = IndexFiles::from_config(config);
    let store = tokio::task::spawn_blocking(move || VectorStore::open(files))
        .await
        .context("index loading task failed")?;
    Ok(Arc::new(store))
}

/// Stores `path` as an upload and waits for its ingestion.
///
/// # Errors
/// Fails if the embedding key is missing, the file is rejected, or ingestion fails.
pub async fn ingest(settings: &Settings, path: &Path) -> anyhow::Result<IngestOutcome> {
    let embedder = settings.embedder()?;
    let config = settings.rag_config();
    let chunker = FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?;
    let stored = upload::store(path, &config.uploads_dir())?;

    let store = open_store(&config).await?;
    let ingestor = Ingestor::new(Arc::new(embedder), store, Arc::new(chunker));
    let outcome = ingestor.try_ingest(&stored.path, &stored.filename).await?;
    Ok(outcome)
}

/// Nearest chunks for `question`, without generation.
///
/// # Errors
/// Fails if the embedding key is missing. Service failures yield an empty list.
pub async fn retrieve(
    settings: &Settings,
    question: &str,
    top_k: Option<usize>,
) -> anyhow::Result<Vec<SearchResult>> {
    let embedder = settings.embedder()?;
    let store = open_store(&settings.rag_config()).await?;
    let retriever = Retriever::new(Arc::new(embedder), store);
    Ok(retriever
        .retrieve(question, top_k.unwrap_or(settings.top_k))
        .await)
}

/// Answers `question` from the indexed documents.
///
/// # Errors
/// Fails if an API key is missing or the chunking settings are invalid. Service failures are
/// reported inside the answer.
pub async fn query(
    settings: &Settings,
    question: &str,
    top_k: Option<usize>,
) -> anyhow::Result<QueryResponse> {
    settings.require_api_keys()?;
    let embedder = settings.embedder()?;
    let generator = settings.generator()?;
    let config = settings.rag_config();

    let rag = tokio::task::spawn_blocking(move || {
        Rag::builder(embedder, generator).config(config).build()
    })
    .await
    .context("index loading task failed")??;

    let top_k = top_k.unwrap_or(rag.config().default_top_k);
    Ok(rag.query_with_k(question, top_k).await)
}

/// Index and configuration summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// Data directory in use.
    pub data_dir: PathBuf,
    /// Vectors in the persisted index.
    pub vectors: usize,
    /// Vector dimension, unknown while the index is empty.
    pub dimension: Option<usize>,
    /// Chunk count per source file.
    pub sources: BTreeMap<String, usize>,
    /// Environment variables of missing API keys.
    pub missing_api_keys: Vec<&'static str>,
}

impl StatusReport {
    /// `true` when both services can be reached.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.missing_api_keys.is_empty()
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "data dir:   {}", self.data_dir.display())?;
        writeln!(f, "vectors:    {}", self.vectors)?;
        match self.dimension {
            Some(dim) => writeln!(f, "dimension:  {dim}")?,
            None => writeln!(f, "dimension:  -")?,
        }
        if self.sources.is_empty() {
            writeln!(f, "documents:  none")?;
        } else {
            writeln!(f, "documents:")?;
            for (source, chunks) in &self.sources {
                writeln!(f, "  {source} ({chunks} chunks)")?;
            }
        }
        if self.is_ready() {
            write!(f, "api keys:   ok")
        } else {
            write!(f, "api keys:   missing {}", self.missing_api_keys.join(", "))
        }
    }
}

/// Inspects the persisted index. Needs no API key.
///
/// # Errors
/// Fails only if loading the index panics.
pub async fn status(settings: &Settings) -> anyhow::Result<StatusReport> {
    let config = settings.rag_config();
    let store = open_store(&config).await?;
    Ok(StatusReport {
        data_dir: config.data_dir,
        vectors: store.len(),
        dimension: store.dimension(),
        sources: store.sources(),
        missing_api_keys: settings.missing_api_keys(),
    })
}

/// Renders an answer followed by its sources.
#[must_use]
pub fn format_response(response: &QueryResponse) -> String {
    let mut out = response.answer.trim_end().to_owned();
    if !response.sources.is_empty() {
        out.push_str("\n\nSources:");
        for source in &response.sources {
            // Writing into a String cannot fail.
            let _ = write!(out, "\n  - {} [{}]", source.source_file, source.chunk_id);
        }
    }
    out
}

/// Renders retrieved hits, nearest first.
#[must_use]
pub fn format_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "no matches".to_owned();
    }
    results
        .iter()
        .enumerate()
        .map(|(rank, hit)| {
            let snippet = snippet(&hit.metadata.text);
            format!(
                "{}. {} [{}] distance {:.4}\n   {snippet}",
                rank + 1,
                hit.metadata.source_file,
                hit.metadata.chunk_id,
                hit.score
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn snippet(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}
