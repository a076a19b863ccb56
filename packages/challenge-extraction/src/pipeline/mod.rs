//! Extraction pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Prompt rendering and reply parsing (JSON object or labeled lines)
//! - Oracle calls with credential rotation
//! - Merge into the table by URL and persistence

pub mod driver;
pub mod labeled;
pub mod prompts;
pub mod rotation;
pub mod structured;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;
use crate::traits::strategy::ExtractionStrategy;

pub use driver::{FailedUrl, Pipeline, RunReport};
pub use labeled::{parse_labeled_reply, LabeledLinesStrategy};
pub use prompts::{
    format_json_prompt, format_labeled_prompt, template_hash, JSON_OBJECT_PROMPT,
    LABELED_LINES_PROMPT,
};
pub use rotation::call_oracle;
pub use structured::{parse_json_reply, JsonObjectStrategy};

/// Reply format requested from the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptFormat {
    #[default]
    Json,
    Labeled,
}

impl PromptFormat {
    /// The strategy pairing this format's prompt with its parser.
    pub fn strategy(self) -> Box<dyn ExtractionStrategy> {
        match self {
            Self::Json => Box::new(JsonObjectStrategy),
            Self::Labeled => Box::new(LabeledLinesStrategy),
        }
    }
}

impl FromStr for PromptFormat {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "labeled" | "labelled" | "text" => Ok(Self::Labeled),
            other => Err(ExtractionError::Config(format!(
                "unknown prompt format '{}' (expected 'json' or 'labeled')",
                other
            ))),
        }
    }
}

impl fmt::Display for PromptFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Labeled => "labeled",
        })
    }
}
