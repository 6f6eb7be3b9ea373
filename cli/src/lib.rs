//! Command-line front end for docqa.
//!
//! This crate holds the boundary layer around [`docqa_rag`]: settings loading, upload intake,
//! and the subcommands of the `docqa` binary.
//!
//! # Usage
//!
//! ```bash
//! export DOCQA_JINA_API_KEY=... DOCQA_GROQ_API_KEY=...
//! docqa ingest ./handbook.pdf
//! docqa query "What is the refund policy?"
//! docqa retrieve "refund policy" --top-k 3
//! docqa status
//! ```
//!
//! Settings come from built-in defaults, then `docqa.toml`, then `DOCQA_*` environment
//! variables.

pub mod commands;
pub mod settings;
pub mod upload;

pub use settings::Settings;
