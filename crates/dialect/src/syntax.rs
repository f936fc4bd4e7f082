// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Syntax manager
//!
//! Bundles a dialect with the editor-level casing policy. The analyzer
//! never talks to a dialect directly for separator or casing questions;
//! it goes through the [`SyntaxManager`] carried in the completion
//! request.

use crate::{Dialect, DialectRef};
use std::sync::Arc;

/// Case folding applied to identifiers or keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierCase {
    /// Fold to upper case.
    Upper,
    /// Fold to lower case.
    Lower,
    /// Keep as written.
    #[default]
    Mixed,
}

impl IdentifierCase {
    /// Apply the fold to a token.
    pub fn transform(&self, token: &str) -> String {
        match self {
            IdentifierCase::Upper => token.to_uppercase(),
            IdentifierCase::Lower => token.to_lowercase(),
            IdentifierCase::Mixed => token.to_string(),
        }
    }
}

/// Dialect handle plus editor casing policy.
#[derive(Clone)]
pub struct SyntaxManager {
    dialect: DialectRef,
    keyword_case: IdentifierCase,
}

impl SyntaxManager {
    /// Create a syntax manager with the default keyword casing (upper).
    pub fn new(dialect: DialectRef) -> Self {
        Self {
            dialect,
            keyword_case: IdentifierCase::Upper,
        }
    }

    /// Override the keyword casing policy.
    pub fn with_keyword_case(mut self, keyword_case: IdentifierCase) -> Self {
        self.keyword_case = keyword_case;
        self
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn dialect_ref(&self) -> DialectRef {
        Arc::clone(&self.dialect)
    }

    /// Case applied to keywords when the insert case is "as typed".
    pub fn keyword_case(&self) -> IdentifierCase {
        self.keyword_case
    }

    /// Identifier hierarchy separator of the dialect.
    pub fn struct_separator(&self) -> char {
        self.dialect.struct_separator()
    }
}

impl std::fmt::Debug for SyntaxManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxManager")
            .field("dialect", &self.dialect.name())
            .field("keyword_case", &self.keyword_case)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GenericDialect;

    #[test]
    fn test_identifier_case_transform() {
        assert_eq!(IdentifierCase::Upper.transform("select"), "SELECT");
        assert_eq!(IdentifierCase::Lower.transform("SELECT"), "select");
        assert_eq!(IdentifierCase::Mixed.transform("SeLeCt"), "SeLeCt");
    }

    #[test]
    fn test_syntax_manager_defaults() {
        let syntax = SyntaxManager::new(Arc::new(GenericDialect::new()));
        assert_eq!(syntax.struct_separator(), '.');
        assert_eq!(syntax.keyword_case(), IdentifierCase::Upper);
    }
}
