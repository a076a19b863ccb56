//! Prompt rendering and reply parsing, paired.

use crate::types::result::ExtractionResult;

/// A prompt format together with the parser for replies in that format.
///
/// The two halves are not interchangeable across strategies: a reply to a
/// JSON-object prompt must be parsed by the JSON-object parser.
pub trait ExtractionStrategy: Send + Sync {
    /// Short identifier for log lines and configuration.
    fn name(&self) -> &'static str;

    /// The raw instruction template, fingerprinted at run start.
    fn template(&self) -> &'static str;

    /// Render the instruction prompt embedding the page content.
    fn render(&self, content: &str) -> String;

    /// Parse an oracle reply. Never fails; unusable input yields missing values.
    fn parse(&self, reply: &str) -> ExtractionResult;
}
