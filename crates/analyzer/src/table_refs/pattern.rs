// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Pattern-based table references
//!
//! Regex scan over the active statement for `FROM`/`JOIN`/`UPDATE`/`INTO`
//! clauses followed by dotted identifiers and optional aliases. It never
//! fails on broken input; whatever the regex finds is the answer.

use super::{dedup_references, filter_references, TableRef, TableReferencesAnalyzer};
use regex::Regex;
use sql_completion_dialect::DialectRef;
use std::collections::HashMap;
use std::sync::OnceLock;

fn clause_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // keyword, dotted (possibly quoted) name, optional [AS] alias
        Regex::new(
            r#"(?i)\b(from|join|update|into)\s+((?:[A-Za-z_][\w$]*|"[^"]*"|`[^`]*`)(?:\s*\.\s*(?:[A-Za-z_][\w$]*|"[^"]*"|`[^`]*`))*)(?:[ \t]+(?:(as)[ \t]+)?([A-Za-z_][\w$]*))?"#,
        )
        .expect("clause regex")
    })
}

fn continuation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // ", name [AS] [alias]" after a FROM-clause entry
        Regex::new(
            r#"^\s*,\s*((?:[A-Za-z_][\w$]*|"[^"]*"|`[^`]*`)(?:\s*\.\s*(?:[A-Za-z_][\w$]*|"[^"]*"|`[^`]*`))*)(?:[ \t]+(?:(as)[ \t]+)?([A-Za-z_][\w$]*))?"#,
        )
        .expect("continuation regex")
    })
}

/// Default table-reference analyzer.
pub struct PatternTableRefs {
    statement: String,
    dialect: DialectRef,
}

impl PatternTableRefs {
    pub fn new(statement: Option<&str>, dialect: DialectRef) -> Self {
        Self {
            statement: statement.unwrap_or_default().to_string(),
            dialect,
        }
    }

    fn references(&self) -> Vec<TableRef> {
        let mut references = Vec::new();
        let mut position = 0;
        while let Some(captures) = clause_regex().captures_at(&self.statement, position) {
            let keyword = captures.get(1).map(|m| m.as_str().to_uppercase());
            let Some(name) = captures.get(2) else {
                break;
            };
            let table = name.as_str().to_string();
            let alias = self.accept_alias(captures.get(4).map(|m| m.as_str()));
            // A rejected alias candidate is a keyword; the scan must
            // resume before it so the next clause is not swallowed.
            position = if alias.is_some() {
                captures.get(0).map(|m| m.end()).unwrap_or(name.end())
            } else {
                name.end()
            };
            references.push(TableRef::new(table, alias));
            // FROM clauses can list more tables separated by commas.
            if keyword.as_deref() == Some("FROM") {
                while let Some(cont) = continuation_regex().captures(&self.statement[position..]) {
                    let Some(name) = cont.get(1) else {
                        break;
                    };
                    let table = name.as_str().to_string();
                    let alias = self.accept_alias(cont.get(3).map(|m| m.as_str()));
                    let end = if alias.is_some() {
                        cont.get(0).map(|m| m.end()).unwrap_or(name.end())
                    } else {
                        name.end()
                    };
                    references.push(TableRef::new(table, alias));
                    position += end;
                }
            }
        }
        dedup_references(references)
    }

    /// Alias candidates that are dialect keywords are clause words, not
    /// aliases (`FROM users WHERE ...`).
    fn accept_alias(&self, candidate: Option<&str>) -> Option<String> {
        let candidate = candidate?;
        if self.dialect.keyword_kind(candidate).is_some() {
            None
        } else {
            Some(candidate.to_string())
        }
    }
}

impl TableReferencesAnalyzer for PatternTableRefs {
    fn filtered_table_references(&self, fragment: &str, exact_match: bool) -> Vec<TableRef> {
        filter_references(&self.references(), fragment, exact_match)
    }

    fn table_aliases_from_query(&self) -> HashMap<String, String> {
        self.references()
            .into_iter()
            .filter_map(|r| r.alias.map(|alias| (r.table, alias)))
            .collect()
    }
}
