//! # docqa
//!
//! Facade crate for the docqa workspace: re-exports the provider-neutral traits from
//! [`docqa_core`] and, behind features, the pipeline and provider crates.
//!
//! ## Features
//!
//! - `rag` (default): [`rag`], the chunk/embed/index/retrieve/answer pipeline.
//! - `openai`: [`openai`], an OpenAI-compatible client preset for Jina and Groq.
//! - `pdf-process`: [`pdf`], plain-text extraction from PDF and TXT files.
//! - `full`: all of the above.
//!
//! ## Example
//!
//! ```rust,no_run
//! # #[cfg(all(feature = "rag", feature = "openai"))]
//! # async fn demo() -> anyhow::Result<()> {
//! use docqa::openai::OpenAI;
//! use docqa::rag::Rag;
//!
//! let rag = Rag::builder(OpenAI::jina("jina-key"), OpenAI::groq("groq-key"))
//!     .data_dir("./data")
//!     .build()?;
//! rag.ingest("./data/uploads/handbook.pdf", "handbook.pdf").await?;
//!
//! let response = rag.query("How long is the refund window?").await;
//! println!("{}", response.answer);
//! for source in &response.sources {
//!     println!("- {} ({})", source.source_file, source.chunk_id);
//! }
//! # Ok(()) }
//! ```

pub use docqa_core::*;

/// OpenAI-compatible provider.
#[cfg(feature = "openai")]
pub use docqa_openai as openai;

/// Retrieval-augmented question answering.
#[cfg(feature = "rag")]
pub use docqa_rag as rag;

/// Document text extraction.
#[cfg(feature = "pdf-process")]
pub use docqa_pdf_process as pdf;
