use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if the provider returned any.
    pub(crate) fn into_text(self) -> Option<String> {
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(MessageContent::into_text)?;
        if text.is_empty() { None } else { Some(text) }
    }
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize, Default)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<MessageContent>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Blocks(Vec<ContentPart>),
    Text(String),
}

impl MessageContent {
    fn into_text(self) -> String {
        match self {
            Self::Blocks(parts) => parts.into_iter().map(ContentPart::into_text).collect(),
            Self::Text(text) => text,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        #[serde(rename = "type", default)]
        #[allow(dead_code)]
        _kind: Option<String>,
        text: String,
    },
    Inline(String),
}

impl ContentPart {
    fn into_text(self) -> String {
        match self {
            Self::Text { text, .. } | Self::Inline(text) => text,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    pub(crate) data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingItem {
    #[serde(default)]
    pub(crate) index: Option<usize>,
    pub(crate) embedding: Vec<f32>,
}
