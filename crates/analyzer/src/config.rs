// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Completion configuration
//!
//! A flat record of the preference values the editor feeds into the
//! analyzer. The analyzer owns no persisted state; these values arrive
//! with every request.

use serde::{Deserialize, Serialize};

/// Case applied to inserted keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsertCase {
    Upper,
    Lower,
    #[default]
    AsTyped,
}

/// Policy for appending a generated alias after a table proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AliasInsertMode {
    /// Never append an alias.
    #[default]
    None,
    /// Append `" <alias>"`.
    Plain,
    /// Append `" AS <alias>"`.
    Extended,
}

/// Analyzer options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompletionConfig {
    /// Case folding applied to inserted keywords.
    pub insert_case: InsertCase,
    /// Always insert fully-qualified names.
    pub use_fq_names: bool,
    /// Never expand references to fully-qualified names.
    pub use_short_names: bool,
    /// Sort unscored matches alphabetically.
    pub sort_alphabetically: bool,
    /// Substring (fuzzy) matching instead of prefix matching.
    pub search_inside_names: bool,
    /// Search outside the selected container.
    pub search_globally: bool,
    /// Include procedures in column-context searches.
    pub search_procedures: bool,
    /// Propose attribute values at value positions.
    pub show_values: bool,
    /// Hide cross-schema duplicates of active-container objects.
    pub hide_duplicates: bool,
    /// Disable expensive lookups and fuzzy scoring.
    pub simple_mode: bool,
    /// Alias injection policy for table proposals.
    pub alias_insert_mode: AliasInsertMode,
    /// Use the structural table-reference analyzer.
    pub experimental_reference_analyzer: bool,
    /// Merge in-document word proposals.
    pub hippie_enabled: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            insert_case: InsertCase::AsTyped,
            use_fq_names: false,
            use_short_names: false,
            sort_alphabetically: false,
            search_inside_names: false,
            search_globally: false,
            search_procedures: false,
            show_values: true,
            hide_duplicates: false,
            simple_mode: false,
            alias_insert_mode: AliasInsertMode::None,
            experimental_reference_analyzer: false,
            hippie_enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CompletionConfig::default();
        assert_eq!(config.insert_case, InsertCase::AsTyped);
        assert_eq!(config.alias_insert_mode, AliasInsertMode::None);
        assert!(config.show_values);
        assert!(!config.simple_mode);
    }

    #[test]
    fn test_config_deserializes_from_flat_keys() {
        let config: CompletionConfig = serde_json::from_str(
            r#"{
                "insert-case": "upper",
                "alias-insert-mode": "extended",
                "search-inside-names": true,
                "hippie-enabled": true
            }"#,
        )
        .unwrap();
        assert_eq!(config.insert_case, InsertCase::Upper);
        assert_eq!(config.alias_insert_mode, AliasInsertMode::Extended);
        assert!(config.search_inside_names);
        assert!(config.hippie_enabled);
        assert!(!config.use_fq_names);
    }
}
