//! Reading and rewriting the text blocks of a Messages API reply.

use serde_json::{json, Value};

/// Concatenates the `text` of every content block; blocks without text
/// contribute nothing.
pub fn reply_text(body: &Value) -> String {
    body.get("content")
        .and_then(Value::as_array)
        .map(|blocks| {
            blocks
                .iter()
                .filter_map(|block| block.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Drops every "```json" and "```" marker, wherever it appears, and trims.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parses model text into a JSON object. Anything else, including valid JSON
/// that is not an object, is `None`.
pub fn parse_model_json(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(&strip_code_fences(text)) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Replaces the reply's content with one text block, keeping every other
/// envelope field.
pub fn replace_reply_text(body: &mut Value, text: String) {
    if let Some(envelope) = body.as_object_mut() {
        envelope.insert(
            "content".to_string(),
            json!([{ "type": "text", "text": text }]),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_text_blocks_in_order() {
        let body = json!({
            "content": [
                { "type": "text", "text": "{\"a\":" },
                { "type": "tool_use", "id": "x" },
                { "type": "text", "text": " 1}" }
            ]
        });
        assert_eq!(reply_text(&body), "{\"a\": 1}");
        assert_eq!(reply_text(&json!({ "error": "x" })), "");
    }

    #[test]
    fn strips_fences_anywhere() {
        let text = "```json\n{\"subject\": \"Plan\"}\n```\n";
        assert_eq!(strip_code_fences(text), "{\"subject\": \"Plan\"}");
        assert_eq!(
            parse_model_json(text),
            Some(json!({ "subject": "Plan" }))
        );
    }

    #[test]
    fn rejects_prose_and_non_objects() {
        assert_eq!(parse_model_json("I cannot evaluate this text."), None);
        assert_eq!(parse_model_json("[1, 2, 3]"), None);
        assert_eq!(parse_model_json(""), None);
    }

    #[test]
    fn replacement_keeps_envelope_metadata() {
        let mut body = json!({
            "id": "msg_1",
            "model": "claude",
            "content": [{ "type": "text", "text": "old" }, { "type": "text", "text": "more" }],
            "usage": { "input_tokens": 10 }
        });
        replace_reply_text(&mut body, "new".to_string());
        assert_eq!(body["content"], json!([{ "type": "text", "text": "new" }]));
        assert_eq!(body["id"], "msg_1");
        assert_eq!(body["usage"]["input_tokens"], 10);
    }
}
