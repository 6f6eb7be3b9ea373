//! Retrieval-augmented question answering over a private document corpus.
//!
//! Documents are split by a [`FixedSizeChunker`](chunking::FixedSizeChunker), embedded in one
//! batch, and appended to a [`VectorStore`]: an exact L2 index with a typed metadata table,
//! persisted as a checksummed pair of files. Questions are embedded, matched against the store,
//! and answered by a language model that is told to use only the retrieved chunks.
//!
//! - [`Rag::ingest`] – background ingestion of one `.pdf` or `.txt` document.
//! - [`Rag::retrieve`] – nearest chunks for a question, never failing.
//! - [`Rag::synthesize`] – grounded answer, or a fixed apology if generation fails.
//! - [`Rag::query`] – both of the above, returning the answer with its sources.
//!
//! ```rust,no_run
//! use docqa_openai::OpenAI;
//! use docqa_rag::Rag;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let rag = Rag::builder(OpenAI::jina("jina-key"), OpenAI::groq("groq-key"))
//!     .data_dir("./data")
//!     .build()?;
//!
//! rag.ingest("./data/uploads/handbook.pdf", "handbook.pdf").await?;
//! let response = rag.query("What is the refund policy?").await;
//! println!("{}", response.answer);
//! # Ok(()) }
//! ```

pub mod checksum;
pub mod chunking;
pub mod config;
pub mod error;
pub mod index;
pub mod ingestion;
pub mod persistence;
pub mod rag;
pub mod retrieval;
pub mod store;
pub mod synthesis;
pub mod types;

pub use config::{RagConfig, RagConfigBuilder};
pub use error::{RagError, Result};
pub use index::FlatIndex;
pub use ingestion::{IngestOutcome, Ingestor};
pub use persistence::IndexFiles;
pub use rag::{Rag, RagBuilder};
pub use retrieval::Retriever;
pub use store::VectorStore;
pub use synthesis::Synthesizer;
pub use types::{Chunk, ChunkMetadata, QueryResponse, SearchResult, Source};
