// Helpers for reading the provider's generateContent envelope.

use serde_json::Value;

/// Extract the concatenated text parts of the first candidate.
/// Returns `None` when there is no candidate or every part is empty.
pub fn extract_candidate_text(payload: &Value) -> Option<String> {
    let parts = payload
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|v| v.as_str()))
        .collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Extract the model version reported by the provider
pub fn extract_model_version(payload: &Value) -> Option<String> {
    payload
        .get("modelVersion")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Extract the provider error message from an error envelope
pub fn extract_error_message(payload: &Value) -> Option<String> {
    let error = payload.get("error")?;
    error
        .get("message")
        .and_then(|v| v.as_str())
        .or_else(|| error.as_str())
        .map(|s| s.to_string())
}

/// Extract usage statistics and format as a display string
pub fn extract_usage_line(payload: &Value) -> String {
    if let Some(usage) = payload.get("usageMetadata") {
        let input = usage
            .get("promptTokenCount")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        let output = usage
            .get("candidatesTokenCount")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        let total = usage
            .get("totalTokenCount")
            .and_then(|v| v.as_u64())
            .unwrap_or(input + output);
        return format!("usage(input={input}, output={output}, total={total})");
    }
    "usage(unknown)".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let payload = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        });
        assert_eq!(extract_candidate_text(&payload), Some("{\"a\":1}".to_string()));
    }

    #[test]
    fn missing_or_blank_text_is_none() {
        assert_eq!(extract_candidate_text(&json!({})), None);
        assert_eq!(extract_candidate_text(&json!({ "candidates": [] })), None);
        let blank = json!({ "candidates": [{ "content": { "parts": [{ "text": "  " }] } }] });
        assert_eq!(extract_candidate_text(&blank), None);
        let blocked = json!({ "candidates": [{ "finishReason": "SAFETY" }] });
        assert_eq!(extract_candidate_text(&blocked), None);
    }

    #[test]
    fn usage_line_reads_usage_metadata() {
        let payload = json!({
            "usageMetadata": { "promptTokenCount": 812, "candidatesTokenCount": 640 }
        });
        assert_eq!(
            extract_usage_line(&payload),
            "usage(input=812, output=640, total=1452)"
        );
        assert_eq!(extract_usage_line(&json!({})), "usage(unknown)");
    }

    #[test]
    fn error_message_prefers_nested_message() {
        let payload = json!({ "error": { "code": 400, "message": "API key not valid." } });
        assert_eq!(
            extract_error_message(&payload),
            Some("API key not valid.".to_string())
        );
        assert_eq!(
            extract_error_message(&json!({ "error": "quota" })),
            Some("quota".to_string())
        );
    }
}
