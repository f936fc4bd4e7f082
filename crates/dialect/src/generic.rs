// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Generic SQL dialect
//!
//! Standard-SQL implementation of the [`Dialect`] contract. Vendor
//! dialects start from this one and override separators, quote pairs or
//! keyword tables as needed.

use crate::keywords::{
    ATTRIBUTE_QUERY_WORDS, DDL_KEYWORDS, DML_KEYWORDS, ENTITY_QUERY_WORDS, EXECUTE_KEYWORDS,
    EXEC_QUERY_WORDS, FUNCTION_KEYWORDS, QUERY_KEYWORDS, RESERVED_KEYWORDS, TYPE_KEYWORDS,
};
use crate::syntax::IdentifierCase;
use crate::{Dialect, KeywordKind};
use std::collections::HashMap;

/// Generic SQL dialect with standard keyword tables.
pub struct GenericDialect {
    keyword_kinds: HashMap<&'static str, KeywordKind>,
    stores_unquoted_case: IdentifierCase,
    supports_alias_in_update: bool,
}

impl GenericDialect {
    pub fn new() -> Self {
        let mut keyword_kinds = HashMap::new();
        for kw in RESERVED_KEYWORDS {
            keyword_kinds.insert(*kw, KeywordKind::Keyword);
        }
        for kw in FUNCTION_KEYWORDS {
            keyword_kinds.insert(*kw, KeywordKind::Function);
        }
        for kw in TYPE_KEYWORDS {
            keyword_kinds.insert(*kw, KeywordKind::Type);
        }
        Self {
            keyword_kinds,
            stores_unquoted_case: IdentifierCase::Mixed,
            supports_alias_in_update: false,
        }
    }

    /// Override the unquoted identifier storage case.
    pub fn with_unquoted_case(mut self, case: IdentifierCase) -> Self {
        self.stores_unquoted_case = case;
        self
    }

    /// Allow aliases in UPDATE/DELETE statements.
    pub fn with_alias_in_update(mut self) -> Self {
        self.supports_alias_in_update = true;
        self
    }
}

impl Default for GenericDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &str {
        "Generic SQL"
    }

    fn keyword_kind(&self, word: &str) -> Option<KeywordKind> {
        self.keyword_kinds
            .get(word.to_uppercase().as_str())
            .copied()
    }

    fn matched_keywords(&self, prefix: &str) -> Vec<String> {
        let upper = prefix.to_uppercase();
        let mut matches: Vec<String> = self
            .keyword_kinds
            .keys()
            .filter(|k| k.starts_with(&upper))
            .map(|k| (*k).to_string())
            .collect();
        matches.sort();
        matches
    }

    fn is_entity_query_word(&self, word: &str) -> bool {
        contains_ignore_case(ENTITY_QUERY_WORDS, word)
    }

    fn is_attribute_query_word(&self, word: &str) -> bool {
        contains_ignore_case(ATTRIBUTE_QUERY_WORDS, word)
    }

    fn is_exec_query_word(&self, word: &str) -> bool {
        contains_ignore_case(EXEC_QUERY_WORDS, word)
    }

    fn query_keywords(&self) -> &[&str] {
        QUERY_KEYWORDS
    }

    fn dml_keywords(&self) -> &[&str] {
        DML_KEYWORDS
    }

    fn ddl_keywords(&self) -> &[&str] {
        DDL_KEYWORDS
    }

    fn execute_keywords(&self) -> &[&str] {
        EXECUTE_KEYWORDS
    }

    fn stores_unquoted_case(&self) -> IdentifierCase {
        self.stores_unquoted_case
    }

    fn supports_alias_in_update(&self) -> bool {
        self.supports_alias_in_update
    }
}

fn contains_ignore_case(words: &[&str], word: &str) -> bool {
    words.iter().any(|w| w.eq_ignore_ascii_case(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_kinds() {
        let dialect = GenericDialect::new();
        assert_eq!(dialect.keyword_kind("select"), Some(KeywordKind::Keyword));
        assert_eq!(dialect.keyword_kind("COUNT"), Some(KeywordKind::Function));
        assert_eq!(dialect.keyword_kind("varchar"), Some(KeywordKind::Type));
        assert_eq!(dialect.keyword_kind("users"), None);
    }

    #[test]
    fn test_matched_keywords_prefix() {
        let dialect = GenericDialect::new();
        let matches = dialect.matched_keywords("SEL");
        assert_eq!(matches, vec!["SELECT".to_string()]);
        assert!(dialect.matched_keywords("zzz").is_empty());
    }

    #[test]
    fn test_context_words() {
        let dialect = GenericDialect::new();
        assert!(dialect.is_entity_query_word("from"));
        assert!(dialect.is_entity_query_word("JOIN"));
        assert!(dialect.is_attribute_query_word("WHERE"));
        assert!(dialect.is_attribute_query_word("on"));
        assert!(dialect.is_exec_query_word("CALL"));
        assert!(!dialect.is_entity_query_word("WHERE"));
        // LIKE must not delimit a clause: the classifier reads it as a
        // previous word when deciding on value proposals.
        assert!(!dialect.is_clause_keyword("LIKE"));
        assert!(!dialect.is_clause_keyword("VALUES"));
        assert!(!dialect.is_clause_keyword("CREATE"));
    }

    #[test]
    fn test_quote_identifier_if_needed() {
        let dialect = GenericDialect::new();
        assert_eq!(dialect.quote_identifier_if_needed("users"), "users");
        assert_eq!(
            dialect.quote_identifier_if_needed("order items"),
            "\"order items\""
        );
        assert_eq!(dialect.quote_identifier_if_needed("select"), "\"select\"");
        assert_eq!(dialect.quote_identifier_if_needed("1st"), "\"1st\"");
    }
}
