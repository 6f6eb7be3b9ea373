//! Model & endpoint constants
//!
//! These constants cover the OpenAI-compatible endpoints the pipeline talks to by default plus
//! the stable model names used with them. Users can always pass custom strings.

/// Default `OpenAI` API base URL (chat, embeddings, etc.).
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// [`Groq`](https://console.groq.com/docs/openai)'s OpenAI-compatible base URL.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
/// [`Jina AI`](https://jina.ai/embeddings)'s embeddings base URL.
pub const JINA_BASE_URL: &str = "https://api.jina.ai/v1";

// ============================================================
// 1. GENERATION MODELS
// ============================================================

/// Llama 3.3 70B served by Groq; the default grounded-answer model.
pub const LLAMA_3_3_70B_VERSATILE: &str = "llama-3.3-70b-versatile";

/// Llama 3.1 8B served by Groq; cheaper and faster.
pub const LLAMA_3_1_8B_INSTANT: &str = "llama-3.1-8b-instant";

/// Cheapest small `OpenAI` chat model.
pub const GPT4O_MINI: &str = "gpt-4o-mini";

// ============================================================
// 2. EMBEDDING MODELS
// ============================================================

/// Jina multilingual embedding model (1024-dim).
pub const JINA_EMBEDDINGS_V3: &str = "jina-embeddings-v3";

/// Jina English embedding model (768-dim).
pub const JINA_EMBEDDINGS_V2_BASE_EN: &str = "jina-embeddings-v2-base-en";

/// Small + inexpensive `OpenAI` embedding model (1536-dim).
pub const EMBEDDING_SMALL: &str = "text-embedding-3-small";

/// High-accuracy `OpenAI` embedding model (3072-dim).
pub const EMBEDDING_LARGE: &str = "text-embedding-3-large";
