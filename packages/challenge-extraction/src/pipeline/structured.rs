//! JSON-object strategy: prompt for a JSON object, decode the reply.
//!
//! Decoding is a fallback chain: strict decode from the first `{`, then the
//! outermost `{...}` span, then an empty object.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tracing::debug;

use super::prompts::{format_json_prompt, JSON_OBJECT_PROMPT};
use crate::traits::strategy::ExtractionStrategy;
use crate::types::fields::{is_sentinel, FieldKey, FieldKind, FieldValue};
use crate::types::result::ExtractionResult;

/// Prompt for a JSON object, parse with [`parse_json_reply`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonObjectStrategy;

impl ExtractionStrategy for JsonObjectStrategy {
    fn name(&self) -> &'static str {
        "json"
    }

    fn template(&self) -> &'static str {
        JSON_OBJECT_PROMPT
    }

    fn render(&self, content: &str) -> String {
        format_json_prompt(content)
    }

    fn parse(&self, reply: &str) -> ExtractionResult {
        parse_json_reply(reply)
    }
}

fn outer_object() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[\s\S]*\}").expect("valid regex"))
}

/// Remove a surrounding Markdown code fence, with or without a language tag.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let body = trimmed.trim_start_matches('`');
    // Drop the info string ("json", "JSON", ...) up to the end of the line.
    let body = match body.find('\n') {
        Some(nl) if !body[..nl].contains('{') => &body[nl + 1..],
        _ => body.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    body.trim_end().trim_end_matches('`').trim()
}

/// Decode the first JSON object in a reply, or an empty map.
pub fn decode_reply_object(reply: &str) -> Map<String, Value> {
    let text = strip_code_fence(reply);
    let from_brace = match text.find('{') {
        Some(start) => &text[start..],
        None => text,
    };

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(from_brace) {
        return map;
    }

    if let Some(span) = outer_object().find(text) {
        match serde_json::from_str::<Value>(span.as_str()) {
            Ok(Value::Object(map)) => return map,
            Ok(_) => debug!("Outermost braces did not decode to an object"),
            Err(e) => debug!(error = %e, "Salvage decode failed"),
        }
    }

    Map::new()
}

/// Parse a JSON-object reply into a complete result.
pub fn parse_json_reply(reply: &str) -> ExtractionResult {
    let object = decode_reply_object(reply);
    ExtractionResult::from_fn(|key| match object.get(key.column()) {
        Some(value) => convert_value(key, value),
        None => FieldValue::Missing,
    })
}

fn convert_value(key: FieldKey, value: &Value) -> FieldValue {
    match (key.kind(), value) {
        (_, Value::Null) => FieldValue::Missing,
        (_, Value::String(s)) if is_sentinel(s) => FieldValue::Missing,

        (FieldKind::List, Value::Array(items)) => FieldValue::list(items.iter().map(scalar_text)),
        (FieldKind::List, Value::String(s)) => FieldValue::list([s]),
        (FieldKind::List, _) => FieldValue::Missing,

        (FieldKind::Count, Value::Number(n)) => match n.as_u64() {
            Some(count) => FieldValue::Count(count),
            None => FieldValue::Text(n.to_string()),
        },

        (_, Value::String(s)) => FieldValue::text(s),
        (_, other) => FieldValue::text(scalar_text(other)),
    }
}

/// Text of a JSON value: strings unquoted, everything else as JSON.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fenced_reply_with_sentinel() {
        let reply = "```json\n{\"number_of_birders\": 12, \"winner_name\": \"Not found\"}\n```";
        let result = parse_json_reply(reply);

        assert_eq!(result.get(FieldKey::NumberOfBirders), &FieldValue::Count(12));
        assert_eq!(result.get(FieldKey::WinnerName), &FieldValue::Missing);
        for key in FieldKey::ALL {
            if key != FieldKey::NumberOfBirders {
                assert!(result.get(key).is_missing(), "{} should be missing", key);
            }
        }
    }

    #[test]
    fn test_plain_fence_and_leading_prose() {
        let reply = "```\nHere you go: {\"location_of_challenge\": \"Cape May\"}\n```";
        let result = parse_json_reply(reply);
        assert_eq!(
            result.get(FieldKey::LocationOfChallenge),
            &FieldValue::Text("Cape May".into())
        );
    }

    #[test]
    fn test_salvage_outermost_braces() {
        let reply = "Sure! {\"number_of_species\": 87} Hope this helps.";
        let result = parse_json_reply(reply);
        assert_eq!(result.get(FieldKey::NumberOfSpecies), &FieldValue::Count(87));
    }

    #[test]
    fn test_garbage_is_all_missing() {
        for reply in ["", "no json here", "{not json}", "[1, 2, 3]", "```json\n```"] {
            let result = parse_json_reply(reply);
            assert!(result.is_empty(), "reply {:?} should parse to nothing", reply);
            assert_eq!(result.keys().count(), FieldKey::ALL.len());
        }
    }

    #[test]
    fn test_list_fields() {
        let reply = r#"{
            "names_of_birders": ["Ana", "Not found", " ", "Bo"],
            "bird_species_mentioned": "Snowy Owl",
            "tips_or_important_points": 7
        }"#;
        let result = parse_json_reply(reply);
        assert_eq!(
            result.get(FieldKey::NamesOfBirders),
            &FieldValue::List(vec!["Ana".into(), "Bo".into()])
        );
        assert_eq!(
            result.get(FieldKey::BirdSpeciesMentioned),
            &FieldValue::List(vec!["Snowy Owl".into()])
        );
        assert_eq!(result.get(FieldKey::TipsOrImportantPoints), &FieldValue::Missing);
    }

    #[test]
    fn test_scalars_pass_through() {
        let reply = r#"{
            "number_of_lists": "about 40",
            "number_of_observations": -3,
            "extra_condition": true,
            "winner_name": "  Jane Doe "
        }"#;
        let result = parse_json_reply(reply);
        assert_eq!(
            result.get(FieldKey::NumberOfLists),
            &FieldValue::Text("about 40".into())
        );
        assert_eq!(
            result.get(FieldKey::NumberOfObservations),
            &FieldValue::Text("-3".into())
        );
        assert_eq!(
            result.get(FieldKey::ExtraCondition),
            &FieldValue::Text("true".into())
        );
        assert_eq!(
            result.get(FieldKey::WinnerName),
            &FieldValue::Text("Jane Doe".into())
        );
    }

    #[test]
    fn test_extra_keys_ignored() {
        let result = parse_json_reply(r#"{"number_of_birders": 2, "mood": "great"}"#);
        assert_eq!(result.keys().collect::<Vec<_>>(), FieldKey::ALL.to_vec());
        assert_eq!(result.found_count(), 1);
    }

    #[test]
    fn test_strategy_render_pairs_with_parse() {
        let strategy = JsonObjectStrategy;
        assert_eq!(strategy.name(), "json");
        assert!(strategy.render("page").contains("JSON object"));
        assert_eq!(
            strategy.parse(r#"{"number_of_birders": 5}"#).get(FieldKey::NumberOfBirders),
            &FieldValue::Count(5)
        );
    }

    proptest! {
        #[test]
        fn parse_is_total(reply in ".*") {
            let result = parse_json_reply(&reply);
            prop_assert_eq!(result.keys().collect::<Vec<_>>(), FieldKey::ALL.to_vec());
        }
    }
}
