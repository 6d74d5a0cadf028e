//! Document-wide definitions collected before flow parsing.

use std::collections::{HashMap, HashSet};

/// A resolved link reference definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDefinition {
    /// Label as written, without brackets.
    pub label: String,
    pub url: String,
    pub title: Option<String>,
}

/// Link and footnote definitions keyed by normalized label.
///
/// Built once per parse; the first definition of a label wins.
#[derive(Debug, Default)]
pub struct MetaRegistry {
    definitions: HashMap<String, LinkDefinition>,
    footnotes: HashSet<String>,
}

impl MetaRegistry {
    /// Records a definition unless the label is already taken.
    pub fn add_definition(&mut self, identifier: String, definition: LinkDefinition) {
        self.definitions.entry(identifier).or_insert(definition);
    }

    pub fn add_footnote(&mut self, identifier: String) {
        self.footnotes.insert(identifier);
    }

    /// Looks up a definition by raw (un-normalized) label.
    pub fn definition(&self, label: &str) -> Option<&LinkDefinition> {
        self.definitions.get(&normalize_label(label))
    }

    pub fn has_definition(&self, label: &str) -> bool {
        self.definition(label).is_some()
    }

    pub fn has_footnote(&self, label: &str) -> bool {
        self.footnotes.contains(&normalize_label(label))
    }

    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    pub fn footnote_count(&self) -> usize {
        self.footnotes.len()
    }
}

/// Case-folds and collapses whitespace so labels compare as equal.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .to_uppercase()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Foo Bar", "foo bar")]
    #[case("  foo \n\t bar ", "foo bar")]
    #[case("ẞ", "ss")]
    #[case("ΑΓΩ", "αγω")]
    fn normalizes(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_label(raw), expected);
    }

    #[test]
    fn first_definition_wins() {
        let mut meta = MetaRegistry::default();
        let def = |url: &str| LinkDefinition {
            label: "Foo".into(),
            url: url.into(),
            title: None,
        };
        meta.add_definition(normalize_label("Foo"), def("/first"));
        meta.add_definition(normalize_label("FOO"), def("/second"));

        assert_eq!(meta.definition("foo").unwrap().url, "/first");
        assert_eq!(meta.definition_count(), 1);
        assert!(!meta.has_definition("bar"));
    }

    #[test]
    fn footnotes_are_case_insensitive() {
        let mut meta = MetaRegistry::default();
        meta.add_footnote(normalize_label("Note"));
        assert!(meta.has_footnote("NOTE"));
        assert_eq!(meta.footnote_count(), 1);
    }
}
