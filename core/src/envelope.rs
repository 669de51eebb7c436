use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The `{content: [{type: "text", text}]}` wrapper tool callers expect.
///
/// Always exactly one content item whose `text` is itself a JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Envelope {
    pub content: Vec<ContentItem>,
    /// Set only on MCP `tools/call` results that report a domain failure
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ContentItem {
    /// Always "text"
    #[serde(rename = "type")]
    pub kind: String,
    /// JSON-encoded payload
    pub text: String,
}

impl Envelope {
    /// Wrap a serializable payload as the envelope's single text item.
    pub fn json<T: Serialize>(payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::text(serde_json::to_string(payload)?))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem {
                kind: "text".to_string(),
                text: text.into(),
            }],
            is_error: None,
        }
    }

    /// The JSON document carried in the text item, if it parses.
    pub fn decoded(&self) -> Option<serde_json::Value> {
        let [item] = self.content.as_slice() else {
            return None;
        };
        serde_json::from_str(&item.text).ok()
    }

    /// Envelope flagged as a failed tool call; the text is `{"error": message}`.
    pub fn error(message: impl Into<String>) -> Self {
        let body = serde_json::json!({ "error": message.into() });
        Self {
            is_error: Some(true),
            ..Self::text(body.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn json_envelope_has_one_text_item_with_valid_json() {
        let envelope = Envelope::json(&json!({"results": []})).unwrap();
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["content"].as_array().unwrap().len(), 1);
        assert_eq!(value["content"][0]["type"], "text");
        assert!(value.get("isError").is_none());

        let inner: Value = serde_json::from_str(&envelope.content[0].text).unwrap();
        assert_eq!(inner, json!({"results": []}));
    }

    #[test]
    fn error_envelope_sets_is_error() {
        let envelope = Envelope::error("Not found");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["isError"], true);
        assert_eq!(envelope.decoded(), Some(json!({"error": "Not found"})));
    }

    #[test]
    fn decoded_reads_back_the_payload() {
        let envelope = Envelope::json(&json!({"id": "acc_1"})).unwrap();
        assert_eq!(envelope.decoded(), Some(json!({"id": "acc_1"})));
        assert_eq!(Envelope::text("plain words").decoded(), None);
    }
}
