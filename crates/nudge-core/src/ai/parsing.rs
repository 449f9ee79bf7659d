//! JSON parsing helpers for AI backend responses
//!
//! Models often wrap the JSON payload in a markdown fence or surround it
//! with prose. These helpers dig the array out and decode it.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::Insight;

/// Fenced code block delimiter
const FENCE: &str = "```";

/// Insight record as emitted by the model
#[derive(Debug, Deserialize)]
struct RawInsight {
    insight: String,
    tip: String,
}

/// Truncate long responses for error messages
fn truncate(s: &str) -> String {
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s.to_string()
    }
}

/// Extract the JSON payload from a raw model response
///
/// If the response contains a fenced block, the content of the first block
/// is used with any leading language tag (e.g. `json`) removed. Otherwise
/// the outermost `[` ... `]` span is used when the response carries extra
/// text around it.
pub fn extract_json_payload(response: &str) -> &str {
    let response = response.trim();

    if response.contains(FENCE) {
        let block = response.split(FENCE).nth(1).unwrap_or("");
        let tag_len = block
            .char_indices()
            .find(|(_, c)| !c.is_ascii_alphabetic())
            .map(|(i, _)| i)
            .unwrap_or(block.len());
        return block[tag_len..].trim();
    }

    if response.starts_with('[') {
        return response;
    }

    match (response.find('['), response.rfind(']')) {
        (Some(s), Some(e)) if s < e => &response[s..=e],
        _ => response,
    }
}

/// Parse an insight list from a model response
///
/// Records with a blank insight or tip are dropped. A response that is not a JSON
/// array of `{insight, tip}` records, or that yields no usable records, is a
/// decode error.
pub fn parse_insights(response: &str) -> Result<Vec<Insight>> {
    let payload = extract_json_payload(response);
    if payload.is_empty() {
        return Err(Error::ResponseDecode(format!(
            "No JSON found in AI response | Raw: {}",
            truncate(response.trim())
        )));
    }

    let raw: Vec<RawInsight> = serde_json::from_str(payload).map_err(|e| {
        Error::ResponseDecode(format!(
            "Invalid insights JSON from AI: {} | Raw: {}",
            e,
            truncate(payload)
        ))
    })?;

    let insights: Vec<Insight> = raw
        .into_iter()
        .filter(|r| !r.insight.trim().is_empty() && !r.tip.trim().is_empty())
        .map(|r| Insight::new(r.insight.trim(), r.tip.trim()))
        .collect();

    if insights.is_empty() {
        return Err(Error::ResponseDecode(
            "AI response contained no insights".into(),
        ));
    }

    Ok(insights)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_array() {
        let response = r#"[{"insight": "Food is 60% of spend", "tip": "Cook at home twice a week"}]"#;
        let insights = parse_insights(response).unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].insight, "Food is 60% of spend");
        assert_eq!(insights[0].tip, "Cook at home twice a week");
    }

    #[test]
    fn test_parse_fenced_with_language_tag() {
        let response = r#"
```json
[
  {"insight": "Travel spending doubled", "tip": "Book trips earlier"},
  {"insight": "Coffee adds up", "tip": "Brew at home"}
]
```
"#;
        let insights = parse_insights(response).unwrap();
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[1].tip, "Brew at home");
    }

    #[test]
    fn test_parse_fenced_without_tag() {
        let response = "```\n[{\"insight\": \"a\", \"tip\": \"b\"}]\n```";
        let insights = parse_insights(response).unwrap();
        assert_eq!(insights, vec![Insight::new("a", "b")]);
    }

    #[test]
    fn test_parse_fenced_tag_on_same_line() {
        let response = "```json[{\"insight\": \"a\", \"tip\": \"b\"}]```";
        let insights = parse_insights(response).unwrap();
        assert_eq!(insights.len(), 1);
    }

    #[test]
    fn test_parse_uses_first_fenced_block() {
        let response = "Here you go:\n```json\n[{\"insight\": \"first\", \"tip\": \"t\"}]\n```\nAnd also:\n```json\n[{\"insight\": \"second\", \"tip\": \"t\"}]\n```";
        let insights = parse_insights(response).unwrap();
        assert_eq!(insights[0].insight, "first");
    }

    #[test]
    fn test_parse_array_with_surrounding_text() {
        let response = r#"Sure! Here are your insights:
[{"insight": "Rent dominates", "tip": "Review your lease"}]
Hope this helps."#;
        let insights = parse_insights(response).unwrap();
        assert_eq!(insights[0].insight, "Rent dominates");
    }

    #[test]
    fn test_parse_drops_blank_insights() {
        let response = r#"[{"insight": "  ", "tip": "x"}, {"insight": "Real one", "tip": "y"}]"#;
        let insights = parse_insights(response).unwrap();
        assert_eq!(insights, vec![Insight::new("Real one", "y")]);
    }

    #[test]
    fn test_parse_drops_blank_tips() {
        let response = r#"[{"insight": "Food is high", "tip": " "}, {"insight": "Fuel is up", "tip": "Carpool"}]"#;
        let insights = parse_insights(response).unwrap();
        assert_eq!(insights, vec![Insight::new("Fuel is up", "Carpool")]);
    }

    #[test]
    fn test_parse_only_blank_tips_is_error() {
        let response = r#"[{"insight": "Food is high", "tip": ""}]"#;
        assert!(matches!(
            parse_insights(response),
            Err(Error::ResponseDecode(_))
        ));
    }

    #[test]
    fn test_parse_object_is_error() {
        let response = r#"{"insight": "a", "tip": "b"}"#;
        assert!(matches!(
            parse_insights(response),
            Err(Error::ResponseDecode(_))
        ));
    }

    #[test]
    fn test_parse_empty_array_is_error() {
        assert!(matches!(parse_insights("[]"), Err(Error::ResponseDecode(_))));
    }

    #[test]
    fn test_parse_missing_tip_is_error() {
        let response = r#"[{"insight": "no tip here"}]"#;
        assert!(parse_insights(response).is_err());
    }

    #[test]
    fn test_parse_prose_is_error() {
        let response = "I'm sorry, I can't help with that.";
        let err = parse_insights(response).unwrap_err();
        assert!(err.to_string().contains("Invalid insights JSON"));
    }

    #[test]
    fn test_parse_blank_response_is_error() {
        let err = parse_insights("   \n ").unwrap_err();
        assert!(err.to_string().contains("No JSON found"));
    }

    #[test]
    fn test_extract_payload_variants() {
        assert_eq!(extract_json_payload("  [1]  "), "[1]");
        assert_eq!(extract_json_payload("```json\n[2]\n```"), "[2]");
        assert_eq!(extract_json_payload("text [3] text"), "[3]");
        assert_eq!(extract_json_payload("no array"), "no array");
    }

    #[test]
    fn test_truncate_long_raw() {
        let long = "x".repeat(500);
        let t = truncate(&long);
        assert_eq!(t.len(), 203);
        assert!(t.ends_with("..."));
    }
}
