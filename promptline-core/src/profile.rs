//! Model request/response shapes
//!
//! Bedrock's `InvokeModel` takes a model-specific JSON body. Two shapes are
//! supported, picked from the model identifier:
//!
//! - [`ModelProfile::Arn`] - identifiers starting with `arn:` (inference
//!   profiles and provisioned Claude models), Anthropic messages format
//! - [`ModelProfile::ShortName`] - everything else, Amazon Nova `messages-v1`

use serde_json::{json, Value};

/// Anthropic API version understood by Bedrock
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Maximum tokens requested in the Anthropic format
pub const MAX_TOKENS: u32 = 1000;

/// Nova messages schema version
pub const NOVA_SCHEMA_VERSION: &str = "messages-v1";

/// Text returned when a response carries no usable text
pub const NO_RESPONSE_TEXT: &str = "No response text";

/// Request/response shape for a model identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProfile {
    /// Anthropic messages format (Claude behind an ARN)
    Arn,
    /// Amazon Nova messages-v1 format
    ShortName,
}

impl ModelProfile {
    /// Pick the profile for a model identifier
    pub fn for_model_id(model_id: &str) -> Self {
        if model_id.starts_with("arn:") {
            Self::Arn
        } else {
            Self::ShortName
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arn => "arn",
            Self::ShortName => "short_name",
        }
    }

    /// Build the `InvokeModel` body for a single user prompt
    pub fn build_request(&self, prompt: &str) -> Value {
        match self {
            Self::Arn => json!({
                "anthropic_version": ANTHROPIC_VERSION,
                "max_tokens": MAX_TOKENS,
                "messages": [
                    {"role": "user", "content": [{"type": "text", "text": prompt}]}
                ]
            }),
            Self::ShortName => json!({
                "schemaVersion": NOVA_SCHEMA_VERSION,
                "messages": [
                    {"role": "user", "content": [{"text": prompt}]}
                ]
            }),
        }
    }

    /// Pull the generated text out of a model response
    ///
    /// Never fails: any missing step yields [`NO_RESPONSE_TEXT`].
    pub fn extract_text(&self, response: &Value) -> String {
        match self {
            Self::Arn => anthropic_text(response),
            Self::ShortName => nova_text(response),
        }
        .unwrap_or_else(|| NO_RESPONSE_TEXT.to_string())
    }
}

/// Concatenate every `content[]` block of type `text`, in order
fn anthropic_text(response: &Value) -> Option<String> {
    let text: String = response
        .get("content")
        .and_then(Value::as_array)?
        .iter()
        .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect();

    (!text.is_empty()).then_some(text)
}

/// `output.message.content[0].text`
fn nova_text(response: &Value) -> Option<String> {
    response
        .get("output")?
        .get("message")?
        .get("content")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_selection() {
        let cases = [
            (
                "arn:aws:bedrock:us-east-1:123:inference-profile/us.anthropic.claude",
                ModelProfile::Arn,
            ),
            ("arn:", ModelProfile::Arn),
            ("amazon.nova-pro-v1:0", ModelProfile::ShortName),
            (
                "anthropic.claude-3-haiku-20240307-v1:0",
                ModelProfile::ShortName,
            ),
            ("ARN:aws:bedrock", ModelProfile::ShortName),
            (" arn:aws", ModelProfile::ShortName),
            ("", ModelProfile::ShortName),
        ];

        for (model_id, expected) in cases {
            assert_eq!(
                ModelProfile::for_model_id(model_id),
                expected,
                "Failed for {:?}",
                model_id
            );
        }
    }

    #[test]
    fn test_arn_request_shape() {
        let body = ModelProfile::Arn.build_request("Tell me a joke");
        assert_eq!(
            body,
            json!({
                "anthropic_version": "bedrock-2023-05-31",
                "max_tokens": 1000,
                "messages": [
                    {"role": "user", "content": [{"type": "text", "text": "Tell me a joke"}]}
                ]
            })
        );
    }

    #[test]
    fn test_short_name_request_shape() {
        let body = ModelProfile::ShortName.build_request("Tell me a joke");
        assert_eq!(
            body,
            json!({
                "schemaVersion": "messages-v1",
                "messages": [
                    {"role": "user", "content": [{"text": "Tell me a joke"}]}
                ]
            })
        );
    }

    #[test]
    fn test_arn_extract_concatenates_text_blocks() {
        let response = json!({
            "content": [
                {"type": "text", "text": "Hello, "},
                {"type": "tool_use", "id": "t1", "name": "x", "input": {}},
                {"type": "text", "text": "world"},
                {"type": "text"}
            ]
        });
        assert_eq!(ModelProfile::Arn.extract_text(&response), "Hello, world");
    }

    #[test]
    fn test_arn_extract_defaults() {
        let cases = [
            json!({}),
            json!({"content": []}),
            json!({"content": "text"}),
            json!({"content": [{"type": "text", "text": ""}]}),
            json!({"content": [{"type": "image"}]}),
            Value::Null,
        ];

        for response in cases {
            assert_eq!(
                ModelProfile::Arn.extract_text(&response),
                NO_RESPONSE_TEXT,
                "Failed for {}",
                response
            );
        }
    }

    #[test]
    fn test_short_name_extract() {
        let response = json!({
            "output": {"message": {"role": "assistant", "content": [{"text": "Hi there"}, {"text": "ignored"}]}},
            "stopReason": "end_turn"
        });
        assert_eq!(ModelProfile::ShortName.extract_text(&response), "Hi there");
    }

    #[test]
    fn test_short_name_extract_defaults() {
        let cases = [
            json!({}),
            json!({"output": {}}),
            json!({"output": {"message": {}}}),
            json!({"output": {"message": {"content": []}}}),
            json!({"output": {"message": {"content": [{}]}}}),
            json!({"output": {"message": {"content": [{"text": 5}]}}}),
            json!([]),
        ];

        for response in cases {
            assert_eq!(
                ModelProfile::ShortName.extract_text(&response),
                NO_RESPONSE_TEXT,
                "Failed for {}",
                response
            );
        }
    }
}
