//! Layered settings: built-in defaults, then `docqa.toml`, then `DOCQA_*` environment variables.

use std::path::{Path, PathBuf};

use docqa_openai::{JINA_EMBEDDINGS_V3, LLAMA_3_3_70B_VERSATILE, OpenAI};
use docqa_rag::RagConfig;
use docqa_rag::config::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_TOP_K};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Settings file looked up in the working directory when no path is given.
pub const DEFAULT_SETTINGS_FILE: &str = "docqa.toml";

/// Prefix of environment variables overriding settings.
pub const ENV_PREFIX: &str = "DOCQA_";

/// Environment variable carrying the embedding service key.
pub const JINA_KEY_VAR: &str = "DOCQA_JINA_API_KEY";

/// Environment variable carrying the generation service key.
pub const GROQ_KEY_VAR: &str = "DOCQA_GROQ_API_KEY";

/// Runtime settings of the command-line front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the index and the uploads directory.
    pub data_dir: PathBuf,
    /// Key for the Jina embeddings API.
    pub jina_api_key: Option<String>,
    /// Key for the Groq chat completions API.
    pub groq_api_key: Option<String>,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Generation model identifier.
    pub generation_model: String,
    /// Chunk window in characters.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap: usize,
    /// Chunks retrieved per question.
    pub top_k: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            jina_api_key: None,
            groq_api_key: None,
            embedding_model: JINA_EMBEDDINGS_V3.to_owned(),
            generation_model: LLAMA_3_3_70B_VERSATILE.to_owned(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl Settings {
    /// Provider chain used by [`load`](Self::load).
    ///
    /// A missing settings file is not an error; the layer is simply empty.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let file = file.unwrap_or_else(|| Path::new(DEFAULT_SETTINGS_FILE));
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Loads settings from all layers.
    ///
    /// # Errors
    /// Fails if a layer holds a value of the wrong type.
    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        Self::from_figment(&Self::figment(file))
    }

    /// Extracts settings from an arbitrary provider chain.
    ///
    /// # Errors
    /// Fails if a layer holds a value of the wrong type.
    pub fn from_figment(figment: &Figment) -> anyhow::Result<Self> {
        figment
            .extract()
            .map_err(|e| anyhow::anyhow!("invalid settings: {e}"))
    }

    /// Environment variables of every API key that is absent or blank.
    #[must_use]
    pub fn missing_api_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if present(self.jina_api_key.as_deref()).is_none() {
            missing.push(JINA_KEY_VAR);
        }
        if present(self.groq_api_key.as_deref()).is_none() {
            missing.push(GROQ_KEY_VAR);
        }
        missing
    }

    /// Pipeline configuration derived from these settings.
    #[must_use]
    pub fn rag_config(&self) -> RagConfig {
        RagConfig::builder()
            .data_dir(&self.data_dir)
            .chunk_size(self.chunk_size)
            .chunk_overlap(self.chunk_overlap)
            .default_top_k(self.top_k)
            .build()
    }

    /// Embedding client.
    ///
    /// # Errors
    /// Fails if the Jina key is missing.
    pub fn embedder(&self) -> anyhow::Result<OpenAI> {
        let key = present(self.jina_api_key.as_deref())
            .ok_or_else(|| anyhow::anyhow!("set {JINA_KEY_VAR} to use the embedding service"))?;
        Ok(OpenAI::jina(key).with_embedding_model(&self.embedding_model))
    }

    /// Generation client.
    ///
    /// # Errors
    /// Fails if the Groq key is missing.
    pub fn generator(&self) -> anyhow::Result<OpenAI> {
        let key = present(self.groq_api_key.as_deref())
            .ok_or_else(|| anyhow::anyhow!("set {GROQ_KEY_VAR} to use the generation service"))?;
        Ok(OpenAI::groq(key).with_model(&self.generation_model))
    }

    /// Fails with every missing key listed at once.
    ///
    /// # Errors
    /// Fails if any key is missing.
    pub fn require_api_keys(&self) -> anyhow::Result<()> {
        let missing = self.missing_api_keys();
        if missing.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("missing API keys: {}", missing.join(", "))
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
