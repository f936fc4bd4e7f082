// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL Completion - Dialect Layer
//!
//! This crate defines the dialect contract consumed by the completion
//! analyzer. A dialect answers the questions the analyzer asks about SQL
//! text without parsing it:
//!
//! - which words open an entity context (`FROM`, `UPDATE`, ...), an
//!   attribute context (`SELECT`, `WHERE`, ...) or an execute context
//!   (`CALL`, `EXEC`, ...)
//! - what kind a keyword is ([`KeywordKind`]) and which keywords match a
//!   typed prefix
//! - how identifiers are quoted and how unquoted identifiers are stored
//!   ([`IdentifierCase`])
//! - which characters separate identifier hierarchy levels
//!
//! [`SyntaxManager`] bundles a dialect with editor-level casing policy and
//! is the handle the analyzer actually carries around. [`text`] holds the
//! small text utilities (fuzzy scoring, mask matching) shared by keyword
//! assist and catalog searches.

pub mod generic;
pub mod keywords;
pub mod syntax;
pub mod text;

pub use generic::GenericDialect;
pub use syntax::{IdentifierCase, SyntaxManager};

use std::sync::Arc;

/// Kind of a dialect keyword.
///
/// Mirrors the proposal kinds the analyzer emits: plain keywords,
/// functions (completed with parentheses), type names (never proposed),
/// literals and everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum KeywordKind {
    /// Reserved or clause keyword (`SELECT`, `WHERE`, ...)
    Keyword,
    /// Built-in function (`COUNT`, `UPPER`, ...)
    Function,
    /// Data type name (`INTEGER`, `VARCHAR`, ...)
    Type,
    /// Literal value (used for value and in-document proposals)
    Literal,
    /// Anything else (objects, generated fragments)
    Other,
}

/// SQL dialect contract.
///
/// The generic implementation in [`generic`] covers standard SQL; drivers
/// can provide their own implementation for vendor dialects.
pub trait Dialect: Send + Sync {
    /// Dialect display name.
    fn name(&self) -> &str;

    /// Identifier hierarchy separator, typically `.`.
    fn struct_separator(&self) -> char {
        '.'
    }

    /// Catalog qualifier separator, usually the struct separator as a string.
    fn catalog_separator(&self) -> &str {
        "."
    }

    /// Identifier quote pairs, in preference order.
    fn identifier_quote_strings(&self) -> &[(&str, &str)] {
        &[("\"", "\""), ("`", "`")]
    }

    /// Kind of the given word, or `None` if it is not a keyword.
    ///
    /// Lookup is case-insensitive.
    fn keyword_kind(&self, word: &str) -> Option<KeywordKind>;

    /// All keywords starting with the given prefix (case-insensitive).
    fn matched_keywords(&self, prefix: &str) -> Vec<String>;

    /// True if the word opens an entity (table) context.
    fn is_entity_query_word(&self, word: &str) -> bool;

    /// True if the word opens an attribute (column) context.
    fn is_attribute_query_word(&self, word: &str) -> bool;

    /// True if the word starts a routine invocation.
    fn is_exec_query_word(&self, word: &str) -> bool;

    /// True if the word delimits a clause for the purpose of left-context
    /// scanning. The word detector stops collecting previous words at the
    /// first clause keyword.
    fn is_clause_keyword(&self, word: &str) -> bool {
        self.is_entity_query_word(word)
            || self.is_attribute_query_word(word)
            || self.is_exec_query_word(word)
    }

    /// Keywords that can start a query statement.
    fn query_keywords(&self) -> &[&str];

    /// Keywords that can start a DML statement.
    fn dml_keywords(&self) -> &[&str];

    /// Keywords that can start a DDL statement.
    fn ddl_keywords(&self) -> &[&str];

    /// Keywords that can start a routine invocation.
    fn execute_keywords(&self) -> &[&str];

    /// How the database stores unquoted identifiers.
    fn stores_unquoted_case(&self) -> IdentifierCase {
        IdentifierCase::Mixed
    }

    /// True if table aliases are valid in SELECT statements.
    fn supports_alias_in_select(&self) -> bool {
        true
    }

    /// True if table aliases are valid in UPDATE/DELETE statements.
    fn supports_alias_in_update(&self) -> bool {
        false
    }

    /// Quote an identifier if its spelling requires quoting, otherwise
    /// return it unchanged.
    fn quote_identifier_if_needed(&self, name: &str) -> String {
        if name.is_empty() {
            return name.to_string();
        }
        let plain = name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        let leading_ok = name
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false);
        if plain && leading_ok && self.keyword_kind(name) != Some(KeywordKind::Keyword) {
            name.to_string()
        } else {
            let (open, close) = self.identifier_quote_strings()[0];
            format!("{open}{name}{close}")
        }
    }
}

/// Shared dialect handle.
pub type DialectRef = Arc<dyn Dialect>;
