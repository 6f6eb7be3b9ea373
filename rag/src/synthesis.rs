//! Grounded answer synthesis.
//!
//! Retrieved chunks are rendered into a tagged context block, paired with a fixed grounding
//! instruction, and sent to the language model with deterministic decoding. Generation failures
//! never escape: they are logged and replaced by [`APOLOGY`].

use std::fmt::Write as _;
use std::time::Instant;

use anyhow::anyhow;
use docqa_core::LanguageModel;
use docqa_core::llm::{LLMRequest, Message, Parameters};

use crate::error::{RagError, Result};
use crate::types::SearchResult;

/// Answer returned when generation fails for any reason.
pub const APOLOGY: &str = "I apologize, but I encountered an error while processing your request. Please try again later.";

/// Sentence the model must use when the context lacks the answer.
pub const REFUSAL: &str = "I don't know based on the provided documents.";

/// Answer returned without calling the model when retrieval finds nothing.
pub const NO_MATCHES: &str =
    "I don't know based on the provided documents (No relevant matches found).";

/// Context block used when no retrieved chunk carries text.
pub const NO_CONTEXT: &str = "No relevant context found.";

/// Placeholder for missing provenance fields.
const UNKNOWN: &str = "unknown";

/// Instruction enforcing formatting, typo tolerance and strict grounding.
pub const SYSTEM_PROMPT: &str = concat!(
    "You are a professional assistant. Answer questions using ONLY the provided context.\n\n",
    "STRICT FORMATTING RULES:\n",
    "1. Start with a direct, high-level summary (1-2 sentences).\n",
    "2. Use clear headers with '##' to organize main topics.\n",
    "3. Use bullet points (•) for all lists and key details.\n",
    "4. Use **bold** for important entities (names, tools, dates, metrics).\n",
    "5. Keep paragraphs short and readable.\n",
    "6. If the context contains code, format it properly.\n",
    "7. Ensure the answer flows logically and is easy to scan.\n\n",
    "SAFETY & GROUNDING RULES:\n",
    "- Infer user intent if there are typos (e.g., 'teck stak' -> 'Tech Stack').\n",
    "- STICK STRICTLY TO THE CONTEXT. Do not use outside knowledge.\n",
    "- If the answer is partially available, provide what is there and mention what is missing.\n",
    "- If the answer is NOT in the context, say exactly: 'I don't know based on the provided documents.'\n",
    "- Do not fabricate information."
);

/// Renders retrieved chunks as `<chunk source='..' id='..'>` blocks.
///
/// Chunk text is trimmed and chunks without text are skipped; missing provenance becomes
/// `unknown`. Returns [`NO_CONTEXT`] if nothing usable remains.
#[must_use]
pub fn build_context(retrieved: &[SearchResult]) -> String {
    let mut context = String::new();
    for result in retrieved {
        let metadata = &result.metadata;
        let text = metadata.text.trim();
        if text.is_empty() {
            continue;
        }
        let source = non_empty_or_unknown(&metadata.source_file);
        let chunk_id = non_empty_or_unknown(&metadata.chunk_id);
        // Writing into a String cannot fail.
        let _ = write!(
            context,
            "<chunk source='{source}' id='{chunk_id}'>\n{text}\n</chunk>\n\n"
        );
    }
    if context.is_empty() {
        tracing::warn!("no usable context for question");
        context.push_str(NO_CONTEXT);
    }
    context
}

fn non_empty_or_unknown(value: &str) -> &str {
    if value.is_empty() { UNKNOWN } else { value }
}

/// Builds the two-turn grounded request with temperature zero.
#[must_use]
pub fn build_request(question: &str, context: &str) -> LLMRequest {
    LLMRequest::new(vec![
        Message::system(SYSTEM_PROMPT),
        Message::user(format!("Context:\n{context}\n\nQuestion:\n{question}")),
    ])
    .with_parameters(Parameters::default().temperature(0.0))
}

/// Produces grounded answers with a language model.
#[derive(Debug, Clone)]
pub struct Synthesizer<L> {
    model: L,
}

impl<L: LanguageModel> Synthesizer<L> {
    /// Creates a synthesizer around `model`.
    pub const fn new(model: L) -> Self {
        Self { model }
    }

    /// Model used for generation.
    pub const fn model(&self) -> &L {
        &self.model
    }

    /// Generates an answer, falling back to [`APOLOGY`] on any failure.
    pub async fn synthesize(&self, question: &str, retrieved: &[SearchResult]) -> String {
        match self.try_synthesize(question, retrieved).await {
            Ok(answer) => answer,
            Err(err) => {
                tracing::error!(
                    model = %self.model.model_id(),
                    error = %err,
                    "error calling language model"
                );
                APOLOGY.to_owned()
            }
        }
    }

    /// Generates an answer and reports failures.
    ///
    /// # Errors
    /// Returns [`RagError::Generation`] if the model call fails or yields an empty completion.
    pub async fn try_synthesize(&self, question: &str, retrieved: &[SearchResult]) -> Result<String> {
        let context = build_context(retrieved);
        let request = build_request(question, &context);

        let started = Instant::now();
        let answer = self
            .model
            .respond(request)
            .await
            .map_err(RagError::Generation)?;
        if answer.trim().is_empty() {
            return Err(RagError::Generation(anyhow!("model returned an empty completion")));
        }

        let latency_ms = (started.elapsed().as_secs_f64() * 100_000.0).round() / 100.0;
        tracing::info!(
            model = %self.model.model_id(),
            latency_ms,
            "answer generated"
        );
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkMetadata;
    use docqa_core::llm::Role;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingModel {
        reply: Option<String>,
        requests: Arc<Mutex<Vec<LLMRequest>>>,
    }

    impl LanguageModel for RecordingModel {
        fn model_id(&self) -> &str {
            "recording"
        }

        async fn respond(&self, request: LLMRequest) -> docqa_core::Result {
            self.requests.lock().push(request);
            self.reply
                .clone()
                .ok_or_else(|| anyhow!("connection reset by peer"))
        }
    }

    fn hit(text: &str, source: &str, chunk_id: &str) -> SearchResult {
        SearchResult {
            score: 0.5,
            metadata: ChunkMetadata {
                text: text.into(),
                source_file: source.into(),
                chunk_id: chunk_id.into(),
            },
        }
    }

    #[test]
    fn context_tags_each_chunk() {
        let context = build_context(&[
            hit("  first text \n", "a.pdf", "a.pdf_chunk_0"),
            hit("second", "b.txt", "b.txt_chunk_800"),
        ]);
        assert_eq!(
            context,
            "<chunk source='a.pdf' id='a.pdf_chunk_0'>\nfirst text\n</chunk>\n\n\
             <chunk source='b.txt' id='b.txt_chunk_800'>\nsecond\n</chunk>\n\n"
        );
    }

    #[test]
    fn context_defaults_and_skips() {
        let context = build_context(&[hit("   ", "a.pdf", "x"), hit("body", "", "")]);
        assert_eq!(context, "<chunk source='unknown' id='unknown'>\nbody\n</chunk>\n\n");
    }

    #[test]
    fn empty_context_marker() {
        assert_eq!(build_context(&[]), NO_CONTEXT);
        assert_eq!(build_context(&[hit("\n\t", "a", "b")]), NO_CONTEXT);
    }

    #[test]
    fn request_shape() {
        let request = build_request("What is Python?", "CTX");
        let messages = request.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role(), Role::System);
        assert!(messages[0].content().contains(REFUSAL));
        assert!(messages[0].content().contains("teck stak"));
        assert_eq!(messages[1].role(), Role::User);
        assert_eq!(messages[1].content(), "Context:\nCTX\n\nQuestion:\nWhat is Python?");
        assert_eq!(request.parameters().temperature, Some(0.0));
    }

    #[tokio::test]
    async fn returns_model_answer() {
        let model = RecordingModel {
            reply: Some("## Summary\n• **Python** is versatile.".into()),
            ..Default::default()
        };
        let requests = Arc::clone(&model.requests);
        let synthesizer = Synthesizer::new(model);

        let answer = synthesizer
            .synthesize("What is Python?", &[hit("Python is versatile.", "doc.txt", "doc.txt_chunk_0")])
            .await;
        assert!(answer.contains("**Python**"));

        let recorded = requests.lock();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].messages()[1].content().contains("<chunk source='doc.txt'"));
    }

    #[tokio::test]
    async fn transport_error_becomes_apology() {
        let synthesizer = Synthesizer::new(RecordingModel::default());
        let answer = synthesizer.synthesize("q", &[hit("t", "s", "c")]).await;
        assert_eq!(answer, APOLOGY);

        let err = synthesizer.try_synthesize("q", &[]).await.unwrap_err();
        assert!(matches!(err, RagError::Generation(_)));
    }

    #[tokio::test]
    async fn empty_completion_becomes_apology() {
        let synthesizer = Synthesizer::new(RecordingModel {
            reply: Some("   ".into()),
            ..Default::default()
        });
        assert_eq!(synthesizer.synthesize("q", &[]).await, APOLOGY);
    }

    #[tokio::test]
    async fn empty_context_still_calls_model() {
        let model = RecordingModel {
            reply: Some(REFUSAL.into()),
            ..Default::default()
        };
        let requests = Arc::clone(&model.requests);
        let synthesizer = Synthesizer::new(model);

        assert_eq!(synthesizer.synthesize("q", &[]).await, REFUSAL);
        assert!(requests.lock()[0].messages()[1].content().contains(NO_CONTEXT));
    }
}
