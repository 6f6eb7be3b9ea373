use docqa_core::llm::{Message, Parameters};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessagePayload>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl ChatCompletionRequest {
    pub(crate) fn new(model: &str, messages: &[Message], parameters: &Parameters) -> Self {
        Self {
            model: model.to_owned(),
            messages: to_chat_messages(messages),
            stream: false,
            temperature: parameters.temperature,
            top_p: parameters.top_p,
            max_tokens: parameters.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatMessagePayload {
    role: &'static str,
    content: String,
}

pub fn to_chat_messages(messages: &[Message]) -> Vec<ChatMessagePayload> {
    messages
        .iter()
        .map(|message| ChatMessagePayload {
            role: message.role().as_str(),
            content: message.content().to_owned(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_roles_in_order() {
        let messages = [Message::system("rules"), Message::user("question")];
        let request = ChatCompletionRequest::new("m", &messages, &Parameters::default());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "m");
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "question");
    }

    #[test]
    fn zero_temperature_is_sent() {
        let params = Parameters::default().temperature(0.0);
        let request = ChatCompletionRequest::new("m", &[Message::user("q")], &params);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["temperature"], 0.0);
        assert!(json.get("max_tokens").is_none());
    }
}
