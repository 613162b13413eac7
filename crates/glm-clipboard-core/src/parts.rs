//! Chat message types exchanged with the host.
//!
//! The host hands over loosely-typed JSON. Parts are modelled as a sum type
//! keyed on their `type` field; anything that is neither a file part nor a
//! well-formed text part is carried through verbatim as [`Part::Other`].
//! Fields the host adds that are not modelled here survive a round trip.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

pub const TEXT_TYPE: &str = "text";
pub const FILE_TYPE: &str = "file";

/// A `{ "modelID": ... }` reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelRef {
    #[serde(rename = "modelID", default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModelRef {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: Some(model_id.into()),
            extra: Map::new(),
        }
    }
}

/// What the host passes as the hook's `input`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatInput {
    /// Model the user requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatInput {
    pub fn for_model(model_id: impl Into<String>) -> Self {
        Self {
            model: Some(ModelRef::new(model_id)),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageInfo {
    /// Model the host resolved for this message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What the host passes as the hook's `output`; hooks mutate it in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageInfo>,
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatOutput {
    pub fn new(parts: Vec<Part>) -> Self {
        Self {
            parts,
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.message.get_or_insert_default().model = Some(ModelRef::new(model_id));
        self
    }

    /// The message's resolved model, else the requested one, else `""`.
    pub fn resolved_model_id<'a>(&'a self, input: &'a ChatInput) -> &'a str {
        self.message
            .as_ref()
            .and_then(|m| m.model.as_ref())
            .and_then(|m| m.model_id.as_deref())
            .or_else(|| input.model.as_ref().and_then(|m| m.model_id.as_deref()))
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPart {
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TextPart {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            extra: Map::new(),
        }
    }
}

/// A file attachment. Fields are kept exactly as the host sent them (nulls
/// and wrongly-typed values included); the accessors read string values only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilePart {
    fields: Map<String, Value>,
}

impl FilePart {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn url(&self) -> Option<&str> {
        self.string_field("url")
    }

    pub fn mime(&self) -> Option<&str> {
        self.string_field("mime")
    }

    pub fn filename(&self) -> Option<&str> {
        self.string_field("filename")
    }

    /// Every field except `type`.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn string_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// One unit of a chat message.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(TextPart),
    File(FilePart),
    /// Unknown or malformed part, kept exactly as received
    Other(Value),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextPart::new(text))
    }

    /// Classify a raw JSON part by its `type` discriminator.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(fields) = &value else {
            return Self::Other(value);
        };

        let mut body = fields.clone();
        let kind = body.remove("type");
        match kind.as_ref().and_then(Value::as_str) {
            Some(TEXT_TYPE) => serde_json::from_value(Value::Object(body))
                .map(Self::Text)
                .unwrap_or(Self::Other(value)),
            Some(FILE_TYPE) => Self::File(FilePart::new(body)),
            _ => Self::Other(value),
        }
    }

    /// The part's `url` field, if it has a string one.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::File(file) => file.url(),
            Self::Text(text) => text.extra.get("url").and_then(Value::as_str),
            Self::Other(value) => value.get("url").and_then(Value::as_str),
        }
    }

    /// Replace this part with a text part carrying `text`.
    ///
    /// Every other field is kept except `url`, so the result is never picked
    /// up again as an inline attachment.
    pub fn into_text_reference(self, text: String) -> Self {
        let mut extra = match self {
            Self::Text(part) => part.extra,
            Self::File(part) => part.fields,
            Self::Other(Value::Object(fields)) => fields,
            Self::Other(_) => Map::new(),
        };
        for key in ["type", "url", "text"] {
            extra.remove(key);
        }

        Self::Text(TextPart { text, extra })
    }
}

impl<'de> Deserialize<'de> for Part {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

#[derive(Serialize)]
struct Tagged<'a, T> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    body: &'a T,
}

impl Serialize for Part {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(body) => Tagged {
                kind: TEXT_TYPE,
                body,
            }
            .serialize(serializer),
            Self::File(body) => Tagged {
                kind: FILE_TYPE,
                body,
            }
            .serialize(serializer),
            Self::Other(value) => value.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classifies_parts() {
        let parts: Vec<Part> = serde_json::from_value(json!([
            { "type": "text", "text": "hi" },
            { "type": "file", "url": "data:,x", "filename": "a.txt" },
            { "type": "agent", "name": "build" },
            { "type": "text", "text": 42 },
            null
        ]))
        .unwrap();

        assert!(matches!(&parts[0], Part::Text(t) if t.text == "hi"));
        assert!(matches!(&parts[1], Part::File(f) if f.filename() == Some("a.txt")));
        assert!(matches!(&parts[2], Part::Other(v) if v["type"] == "agent"));
        assert!(matches!(parts[3], Part::Other(_)));
        assert_eq!(parts[4], Part::Other(Value::Null));
    }

    #[test]
    fn test_round_trip_keeps_unknown_fields() {
        let raw = json!({
            "type": "file",
            "id": "prt_1",
            "mime": "image/png",
            "url": "data:image/png;base64,AQID",
            "source": { "kind": "clipboard" }
        });
        let part: Part = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&part).unwrap(), raw);

        let other = json!({ "type": "agent", "url": 7 });
        let part: Part = serde_json::from_value(other.clone()).unwrap();
        assert_eq!(serde_json::to_value(&part).unwrap(), other);
    }

    #[test]
    fn test_file_part_keeps_null_fields() {
        let raw = json!({ "type": "file", "url": null, "mime": null, "filename": null });
        let part: Part = serde_json::from_value(raw.clone()).unwrap();

        let Part::File(file) = &part else {
            panic!("Expected file part, got {part:?}");
        };
        assert_eq!(file.url(), None);
        assert_eq!(file.mime(), None);
        assert_eq!(serde_json::to_value(&part).unwrap(), raw);
    }

    #[test]
    fn test_output_without_message_stays_without_one() {
        let raw = json!({ "parts": [{ "type": "file", "url": 3 }] });
        let output: ChatOutput = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(output.message, None);
        assert_eq!(serde_json::to_value(&output).unwrap(), raw);
    }

    #[test]
    fn test_url_lookup() {
        let file: Part = serde_json::from_value(json!({ "type": "file", "url": "data:,a" })).unwrap();
        assert_eq!(file.url(), Some("data:,a"));

        let odd: Part = serde_json::from_value(json!({ "type": "image", "url": "data:,b" })).unwrap();
        assert_eq!(odd.url(), Some("data:,b"));

        let numeric: Part = serde_json::from_value(json!({ "type": "file", "url": 3 })).unwrap();
        assert_eq!(numeric.url(), None);

        assert_eq!(Part::text("plain").url(), None);
    }

    #[test]
    fn test_text_reference_drops_url_only() {
        let part: Part = serde_json::from_value(json!({
            "type": "file",
            "id": "prt_9",
            "mime": "image/png",
            "filename": "paste.png",
            "url": "data:image/png;base64,AQID"
        }))
        .unwrap();

        let rewritten = part.into_text_reference("see /tmp/x.png".to_string());
        assert_eq!(
            serde_json::to_value(&rewritten).unwrap(),
            json!({
                "type": "text",
                "text": "see /tmp/x.png",
                "id": "prt_9",
                "mime": "image/png",
                "filename": "paste.png"
            })
        );
        assert_eq!(rewritten.url(), None);
    }

    #[test]
    fn test_resolved_model_id_precedence() {
        let input = ChatInput::for_model("glm-4.6");

        let output = ChatOutput::new(vec![]).with_model("gpt-5");
        assert_eq!(output.resolved_model_id(&input), "gpt-5");

        let output = ChatOutput::new(vec![]);
        assert_eq!(output.resolved_model_id(&input), "glm-4.6");
        assert_eq!(output.resolved_model_id(&ChatInput::default()), "");
    }

    #[test]
    fn test_output_deserializes_host_shape() {
        let output: ChatOutput = serde_json::from_value(json!({
            "message": { "id": "msg_1", "model": { "providerID": "zai", "modelID": "glm-5" } },
            "parts": [{ "type": "text", "text": "hello" }]
        }))
        .unwrap();

        assert_eq!(output.resolved_model_id(&ChatInput::default()), "glm-5");
        let message = output.message.as_ref().unwrap();
        assert_eq!(message.extra.get("id"), Some(&json!("msg_1")));
        assert_eq!(output.parts.len(), 1);
    }
}
