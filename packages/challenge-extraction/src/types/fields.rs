//! The fixed set of challenge attributes and their value types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token the oracle is told to emit when a value is not in the text.
pub const MISSING_SENTINEL: &str = "Not found";

/// Shape of a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Non-negative integer
    Count,
    /// Free text
    Text,
    /// Ordered list of strings
    List,
}

impl FieldKind {
    /// Shape description used in prompts.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Count => "integer",
            Self::Text => "string",
            Self::List => "list of strings",
        }
    }
}

/// One attribute of the Field Set.
///
/// Declaration order is the canonical order used by prompts, labeled replies
/// and table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    NumberOfBirders,
    NumberOfObservations,
    NumberOfLists,
    NumberOfSpecies,
    NumberOfUniqueListsWithMedia,
    NamesOfBirders,
    WinnerName,
    HowWasWinnerChosen,
    LocationOfChallenge,
    ChecklistRequirements,
    ExtraCondition,
    TipsOrImportantPoints,
    BirdSpeciesMentioned,
}

impl FieldKey {
    /// Every field, in canonical order.
    pub const ALL: [FieldKey; 13] = [
        FieldKey::NumberOfBirders,
        FieldKey::NumberOfObservations,
        FieldKey::NumberOfLists,
        FieldKey::NumberOfSpecies,
        FieldKey::NumberOfUniqueListsWithMedia,
        FieldKey::NamesOfBirders,
        FieldKey::WinnerName,
        FieldKey::HowWasWinnerChosen,
        FieldKey::LocationOfChallenge,
        FieldKey::ChecklistRequirements,
        FieldKey::ExtraCondition,
        FieldKey::TipsOrImportantPoints,
        FieldKey::BirdSpeciesMentioned,
    ];

    /// Column name in the table and key name in JSON replies.
    pub fn column(self) -> &'static str {
        match self {
            Self::NumberOfBirders => "number_of_birders",
            Self::NumberOfObservations => "number_of_observations",
            Self::NumberOfLists => "number_of_lists",
            Self::NumberOfSpecies => "number_of_species",
            Self::NumberOfUniqueListsWithMedia => "number_of_unique_lists_with_media",
            Self::NamesOfBirders => "names_of_birders",
            Self::WinnerName => "winner_name",
            Self::HowWasWinnerChosen => "how_was_winner_chosen",
            Self::LocationOfChallenge => "location_of_challenge",
            Self::ChecklistRequirements => "checklist_requirements",
            Self::ExtraCondition => "extra_condition",
            Self::TipsOrImportantPoints => "tips_or_important_points",
            Self::BirdSpeciesMentioned => "bird_species_mentioned",
        }
    }

    /// Human label used by the labeled-lines reply format.
    pub fn label(self) -> &'static str {
        match self {
            Self::NumberOfBirders => "Number of birders",
            Self::NumberOfObservations => "Number of observations",
            Self::NumberOfLists => "Number of lists",
            Self::NumberOfSpecies => "Number of species",
            Self::NumberOfUniqueListsWithMedia => "Number of unique lists with media",
            Self::NamesOfBirders => "Names of birders",
            Self::WinnerName => "Winner's name",
            Self::HowWasWinnerChosen => "How the winner was chosen",
            Self::LocationOfChallenge => "Location of challenge",
            Self::ChecklistRequirements => "Checklist requirements",
            Self::ExtraCondition => "Extra condition",
            Self::TipsOrImportantPoints => "Tips or important points",
            Self::BirdSpeciesMentioned => "Bird species mentioned",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Self::NumberOfBirders
            | Self::NumberOfObservations
            | Self::NumberOfLists
            | Self::NumberOfSpecies
            | Self::NumberOfUniqueListsWithMedia => FieldKind::Count,
            Self::NamesOfBirders | Self::TipsOrImportantPoints | Self::BirdSpeciesMentioned => {
                FieldKind::List
            }
            Self::WinnerName
            | Self::HowWasWinnerChosen
            | Self::LocationOfChallenge
            | Self::ChecklistRequirements
            | Self::ExtraCondition => FieldKind::Text,
        }
    }

    /// Look up a field by its column name.
    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.column() == column)
    }

    /// Column names of the whole Field Set, in order.
    pub fn columns() -> impl Iterator<Item = &'static str> {
        Self::ALL.into_iter().map(FieldKey::column)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A parsed field value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Value not found in the source text
    #[default]
    Missing,
    Count(u64),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Build a text value, treating blank strings and the sentinel as missing.
    pub fn text(value: impl AsRef<str>) -> Self {
        let value = value.as_ref().trim();
        if value.is_empty() || is_sentinel(value) {
            Self::Missing
        } else {
            Self::Text(value.to_string())
        }
    }

    /// Build a list value, dropping blank and sentinel items.
    ///
    /// A list with nothing left in it is missing.
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let items: Vec<String> = items
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty() && !is_sentinel(s))
            .collect();
        if items.is_empty() {
            Self::Missing
        } else {
            Self::List(items)
        }
    }

    /// Flat string form used by tabular stores.
    ///
    /// Lists become JSON arrays with non-ASCII characters kept as-is;
    /// missing values become the empty string.
    pub fn to_cell_string(&self) -> String {
        match self {
            Self::Missing => String::new(),
            Self::Count(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::List(items) => encode_list(items),
        }
    }
}

/// Serialize a list the way it is stored in a flat table cell.
pub fn encode_list(items: &[String]) -> String {
    // Serializing a slice of strings cannot fail.
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Parse a stored list cell back into its items.
pub fn decode_list(cell: &str) -> Option<Vec<String>> {
    serde_json::from_str(cell).ok()
}

/// Whether a string is the missing-sentinel, ignoring case and trailing dots.
pub fn is_sentinel(value: &str) -> bool {
    value
        .trim()
        .trim_end_matches('.')
        .eq_ignore_ascii_case(MISSING_SENTINEL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_field_set_is_complete_and_ordered() {
        assert_eq!(FieldKey::ALL.len(), 13);
        let mut sorted = FieldKey::ALL;
        sorted.sort();
        assert_eq!(sorted, FieldKey::ALL);
        assert_eq!(FieldKey::ALL[0].column(), "number_of_birders");
        assert_eq!(FieldKey::ALL[12].column(), "bird_species_mentioned");
    }

    #[test]
    fn test_from_column_roundtrip() {
        for key in FieldKey::ALL {
            assert_eq!(FieldKey::from_column(key.column()), Some(key));
        }
        assert_eq!(FieldKey::from_column("Article URL"), None);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(FieldKey::NumberOfSpecies.kind(), FieldKind::Count);
        assert_eq!(FieldKey::WinnerName.kind(), FieldKind::Text);
        assert_eq!(FieldKey::BirdSpeciesMentioned.kind(), FieldKind::List);
    }

    #[test]
    fn test_sentinel_detection() {
        assert!(is_sentinel("Not found"));
        assert!(is_sentinel("  not found. "));
        assert!(is_sentinel("NOT FOUND"));
        assert!(!is_sentinel("Not found anywhere in Ohio"));
    }

    #[test]
    fn test_text_and_list_constructors() {
        assert_eq!(FieldValue::text("  "), FieldValue::Missing);
        assert_eq!(FieldValue::text("Not found"), FieldValue::Missing);
        assert_eq!(FieldValue::text(" Ohio "), FieldValue::Text("Ohio".into()));

        assert_eq!(
            FieldValue::list(["Robin", " ", "Not found", "Wren"]),
            FieldValue::List(vec!["Robin".into(), "Wren".into()])
        );
        assert_eq!(FieldValue::list(Vec::<String>::new()), FieldValue::Missing);
    }

    #[test]
    fn test_cell_strings() {
        assert_eq!(FieldValue::Missing.to_cell_string(), "");
        assert_eq!(FieldValue::Count(42).to_cell_string(), "42");
        assert_eq!(
            FieldValue::List(vec!["Grünfink".into(), "Élan".into()]).to_cell_string(),
            r#"["Grünfink","Élan"]"#
        );
    }

    proptest! {
        #[test]
        fn list_cells_roundtrip(items in proptest::collection::vec(".*", 0..8)) {
            let encoded = encode_list(&items);
            prop_assert_eq!(decode_list(&encoded), Some(items));
        }
    }
}
