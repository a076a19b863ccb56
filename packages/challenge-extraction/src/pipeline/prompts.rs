//! LLM prompts for challenge attribute extraction.
//!
//! Both templates enumerate the Field Set in canonical order, state each
//! field's shape and tell the oracle which sentinel to use for missing values.

use sha2::{Digest, Sha256};

use crate::types::fields::{FieldKey, FieldKind, MISSING_SENTINEL};

/// Prompt asking for a single JSON object keyed by column name.
pub const JSON_OBJECT_PROMPT: &str = r#"Extract structured information from the text below about a birding challenge.
Return your answer as a JSON object with the following keys:
{fields}

If a value is missing, use "{sentinel}". Do not include any explanation or markdown, only output the JSON.

Text:
"""{content}""""#;

/// Prompt asking for one labeled section per field, in order.
pub const LABELED_LINES_PROMPT: &str = r#"Extract structured information from the text below about a birding challenge.
Answer with one labeled section per field, in exactly this order, using exactly these labels:
{fields}

Rules:
- Write each label followed by a colon, then the value on the same line.
- For list fields, put each item on its own line starting with "- ".
- If a value cannot be found in the text, write "{sentinel}".
- Do not add any other commentary.

Text:
"""{content}""""#;

/// Field lines for the JSON-object prompt, e.g. `- winner_name (string or "Not found")`.
fn json_field_lines() -> String {
    FieldKey::ALL
        .iter()
        .map(|k| {
            format!(
                "- {} ({} or \"{}\")",
                k.column(),
                k.kind().describe(),
                MISSING_SENTINEL
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Field lines for the labeled-lines prompt, e.g. `Winner's name: <string>`.
fn labeled_field_lines() -> String {
    FieldKey::ALL
        .iter()
        .map(|k| match k.kind() {
            FieldKind::List => format!("{}:\n- <item>\n- <item>", k.label()),
            kind => format!("{}: <{}>", k.label(), kind.describe()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the JSON-object prompt with page content.
pub fn format_json_prompt(content: &str) -> String {
    JSON_OBJECT_PROMPT
        .replace("{fields}", &json_field_lines())
        .replace("{sentinel}", MISSING_SENTINEL)
        .replace("{content}", content)
}

/// Format the labeled-lines prompt with page content.
pub fn format_labeled_prompt(content: &str) -> String {
    LABELED_LINES_PROMPT
        .replace("{fields}", &labeled_field_lines())
        .replace("{sentinel}", MISSING_SENTINEL)
        .replace("{content}", content)
}

/// Hash of a prompt template, logged so output tables can be traced to it.
pub fn template_hash(template: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(template.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_hash_is_consistent() {
        let hash1 = template_hash(JSON_OBJECT_PROMPT);
        let hash2 = template_hash(JSON_OBJECT_PROMPT);
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64); // SHA-256 hex
        assert_ne!(hash1, template_hash(LABELED_LINES_PROMPT));
    }

    #[test]
    fn test_json_prompt_lists_every_column() {
        let formatted = format_json_prompt("Big Sit at the marsh");
        for key in FieldKey::ALL {
            assert!(formatted.contains(key.column()), "missing {}", key);
        }
        assert!(formatted.contains("- number_of_birders (integer or \"Not found\")"));
        assert!(formatted.contains("- names_of_birders (list of strings or \"Not found\")"));
        assert!(formatted.contains("\"\"\"Big Sit at the marsh\"\"\""));
        assert!(!formatted.contains("{content}"));
    }

    #[test]
    fn test_labeled_prompt_keeps_order() {
        let formatted = format_labeled_prompt("text");
        let positions: Vec<usize> = FieldKey::ALL
            .iter()
            .map(|k| formatted.find(k.label()).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(formatted.contains("Bird species mentioned:\n- <item>"));
        assert!(formatted.contains("write \"Not found\""));
    }
}
