//! Basic RAG flow with a toy embedder and a model that echoes its context.
//!
//! Run with `cargo run -p docqa-rag --example basic`.

use docqa_core::{Embedding, EmbeddingModel, LanguageModel, llm::LLMRequest};
use docqa_rag::Rag;

struct DemoEmbedder;

impl EmbeddingModel for DemoEmbedder {
    fn dim(&self) -> usize {
        4
    }

    async fn embed_batch(&self, texts: &[String]) -> docqa_core::Result<Vec<Embedding>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0; self.dim()];
                for (idx, byte) in text.to_lowercase().bytes().enumerate() {
                    vector[idx % self.dim()] += f32::from(byte) / 255.0;
                }
                vector
            })
            .collect())
    }
}

struct EchoContext;

impl LanguageModel for EchoContext {
    fn model_id(&self) -> &str {
        "echo-context"
    }

    async fn respond(&self, request: LLMRequest) -> docqa_core::Result {
        let user = request
            .messages()
            .last()
            .map(|m| m.content().to_owned())
            .unwrap_or_default();
        Ok(format!("## Context received\n{user}"))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let rag = Rag::builder(DemoEmbedder, EchoContext)
        .data_dir(dir.path())
        .chunking(80, 20)
        .build()?;

    let docs = [
        ("rag.txt", "Retrieval-Augmented Generation uses embeddings to fetch context."),
        ("chunking.txt", "Chunking splits large files into overlapping passages for indexing."),
        ("rust.txt", "Rust focuses on performance and safety using ownership and borrowing."),
    ];
    for (name, body) in docs {
        let path = dir.path().join(name);
        std::fs::write(&path, body)?;
        rag.ingest(path, name).await?;
    }

    let response = rag.query_with_k("How do I prep documents for RAG?", 2).await;
    println!("{}\n", response.answer);
    for source in &response.sources {
        println!("- {} ({})", source.source_file, source.chunk_id);
    }
    Ok(())
}
