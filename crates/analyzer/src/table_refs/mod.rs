// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Table-reference analysis
//!
//! Extracts `table → alias` pairs from the active statement text. Two
//! interchangeable implementations satisfy the same contract:
//!
//! - [`PatternTableRefs`]: regex scan over `FROM`/`JOIN`/`UPDATE`/`INTO`
//!   clauses (default)
//! - [`StructuralTableRefs`]: a real SQL parse with a relation visitor,
//!   opt-in via the `experimental-reference-analyzer` option
//!
//! Both are tolerant of syntax errors and return best-effort results on
//! partial input.

pub mod pattern;
pub mod structural;

pub use pattern::PatternTableRefs;
pub use structural::StructuralTableRefs;

use std::collections::HashMap;

/// One table reference found in the active statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    /// Table name as written, possibly qualified.
    pub table: String,
    /// Alias, if the statement declares one.
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(table: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            table: table.into(),
            alias,
        }
    }
}

/// Extraction contract shared by both implementations.
pub trait TableReferencesAnalyzer: Send + Sync {
    /// References whose table name (or its last segment, or alias)
    /// matches the fragment. Empty fragment returns all references;
    /// `exact_match` requires equality instead of a prefix match. All
    /// matching is case-insensitive and preserves statement order.
    fn filtered_table_references(&self, fragment: &str, exact_match: bool) -> Vec<TableRef>;

    /// `table name → alias` for every aliased reference in the statement.
    fn table_aliases_from_query(&self) -> HashMap<String, String>;
}

/// Filter helper shared by both implementations.
pub(crate) fn filter_references(
    references: &[TableRef],
    fragment: &str,
    exact_match: bool,
) -> Vec<TableRef> {
    if fragment.is_empty() {
        return references.to_vec();
    }
    references
        .iter()
        .filter(|r| reference_matches(r, fragment, exact_match))
        .cloned()
        .collect()
}

fn reference_matches(reference: &TableRef, fragment: &str, exact_match: bool) -> bool {
    let candidates = [
        Some(reference.table.as_str()),
        reference.table.rsplit('.').next(),
        reference.alias.as_deref(),
    ];
    candidates.into_iter().flatten().any(|candidate| {
        if exact_match {
            candidate.eq_ignore_ascii_case(fragment)
        } else {
            sql_completion_dialect::text::starts_with_ignore_case(candidate, fragment)
        }
    })
}

/// Deduplicate by table name, first occurrence wins; a later alias fills
/// a missing one.
pub(crate) fn dedup_references(references: Vec<TableRef>) -> Vec<TableRef> {
    let mut out: Vec<TableRef> = Vec::new();
    for reference in references {
        match out
            .iter_mut()
            .find(|r| r.table.eq_ignore_ascii_case(&reference.table))
        {
            Some(existing) => {
                if existing.alias.is_none() {
                    existing.alias = reference.alias;
                }
            }
            None => out.push(reference),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_references() {
        let refs = vec![
            TableRef::new("public.users", Some("u".into())),
            TableRef::new("orders", None),
        ];
        assert_eq!(filter_references(&refs, "", false).len(), 2);
        assert_eq!(filter_references(&refs, "use", false).len(), 1);
        assert_eq!(filter_references(&refs, "u", true).len(), 1);
        assert_eq!(filter_references(&refs, "orders", true).len(), 1);
        assert!(filter_references(&refs, "ord", true).is_empty());
    }

    #[test]
    fn test_dedup_references() {
        let refs = vec![
            TableRef::new("users", None),
            TableRef::new("USERS", Some("u".into())),
            TableRef::new("orders", Some("o".into())),
        ];
        let deduped = dedup_references(refs);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].alias.as_deref(), Some("u"));
    }
}
