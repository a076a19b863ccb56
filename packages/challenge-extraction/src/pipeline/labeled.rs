//! Labeled-lines strategy: prompt for one labeled section per field, then
//! recover each section with tolerant pattern matching.
//!
//! Labels are found at line starts, case-insensitively, ignoring bullet,
//! heading and emphasis decoration, with an optional colon or dash after the
//! label. A section runs until the next label found after it, or the end of
//! the reply.

use regex::Regex;
use std::sync::OnceLock;

use super::prompts::{format_labeled_prompt, LABELED_LINES_PROMPT};
use crate::traits::strategy::ExtractionStrategy;
use crate::types::fields::{FieldKey, FieldKind, FieldValue};
use crate::types::result::ExtractionResult;

/// Prompt for labeled lines, parse with [`parse_labeled_reply`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LabeledLinesStrategy;

impl ExtractionStrategy for LabeledLinesStrategy {
    fn name(&self) -> &'static str {
        "labeled"
    }

    fn template(&self) -> &'static str {
        LABELED_LINES_PROMPT
    }

    fn render(&self, content: &str) -> String {
        format_labeled_prompt(content)
    }

    fn parse(&self, reply: &str) -> ExtractionResult {
        parse_labeled_reply(reply)
    }
}

/// Spellings accepted for a field's label.
fn label_aliases(key: FieldKey) -> Vec<String> {
    let mut aliases = vec![key.label().to_string(), key.column().replace('_', " ")];
    aliases.push(key.column().to_string());
    aliases.dedup();
    aliases
}

fn label_pattern(key: FieldKey) -> String {
    let alternatives = label_aliases(key)
        .iter()
        .map(|alias| regex::escape(alias).replace('\'', "['’]?").replace(' ', r"[ \t]+"))
        .collect::<Vec<_>>()
        .join("|");

    format!(
        r"(?im)^[ \t]*(?:(?:[-*+•>#]+|\d+[.)])[ \t]*)*(?:\*\*|__)?[ \t]*(?:{})\b[ \t]*(?:\*\*|__)?[ \t]*[:\-–—]?[ \t]*(?:\*\*|__)?",
        alternatives
    )
}

fn label_regexes() -> &'static [(FieldKey, Regex)] {
    static RES: OnceLock<Vec<(FieldKey, Regex)>> = OnceLock::new();
    RES.get_or_init(|| {
        FieldKey::ALL
            .into_iter()
            .map(|k| (k, Regex::new(&label_pattern(k)).expect("valid label regex")))
            .collect()
    })
}

fn label_regex(key: FieldKey) -> &'static Regex {
    let (_, re) = label_regexes()
        .iter()
        .find(|(k, _)| *k == key)
        .expect("every field has a label regex");
    re
}

fn count_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d[\d,]*").expect("valid regex"))
}

fn list_item_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:[-*+•]|\d+[.)])\s+(.*)$").expect("valid regex"))
}

/// Text following `key`'s label, up to the next label of any other field.
pub fn section<'a>(reply: &'a str, key: FieldKey) -> Option<&'a str> {
    let start = label_regex(key).find(reply)?.end();

    let end = label_regexes()
        .iter()
        .filter(|(k, _)| *k != key)
        .filter_map(|(_, re)| re.find_at(reply, start).map(|m| m.start()))
        .min()
        .unwrap_or(reply.len());

    Some(&reply[start..end])
}

/// Parse a labeled-lines reply into a complete result.
pub fn parse_labeled_reply(reply: &str) -> ExtractionResult {
    ExtractionResult::from_fn(|key| match section(reply, key) {
        Some(span) => match key.kind() {
            FieldKind::Count => parse_count(span),
            FieldKind::List => parse_list(span),
            FieldKind::Text => parse_text(key, span),
        },
        None => FieldValue::Missing,
    })
}

/// First run of digits (thousands separators allowed).
fn parse_count(span: &str) -> FieldValue {
    count_pattern()
        .find(span)
        .and_then(|m| m.as_str().replace(',', "").parse::<u64>().ok())
        .map(FieldValue::Count)
        .unwrap_or(FieldValue::Missing)
}

/// Bullet or numbered lines only.
fn parse_list(span: &str) -> FieldValue {
    FieldValue::list(
        span.lines()
            .filter_map(|line| list_item_pattern().captures(line))
            .filter_map(|caps| caps.get(1))
            .map(|item| strip_emphasis(item.as_str())),
    )
}

/// First non-blank line, undecorated.
fn parse_text(key: FieldKey, span: &str) -> FieldValue {
    let Some(line) = span.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return FieldValue::Missing;
    };

    // The oracle sometimes repeats the label on the value line.
    let line = match label_regex(key).find(line) {
        Some(m) if m.start() == 0 => &line[m.end()..],
        _ => line,
    };

    let line = match list_item_pattern().captures(line).and_then(|c| c.get(1)) {
        Some(item) => item.as_str(),
        None => line,
    };

    FieldValue::text(strip_emphasis(line))
}

fn strip_emphasis(text: &str) -> String {
    text.replace("**", "")
        .replace("__", "")
        .trim()
        .trim_matches(|c| c == '*' || c == '_' || c == '`')
        .trim()
        .to_string()
}
