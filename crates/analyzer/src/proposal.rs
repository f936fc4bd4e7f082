// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Proposal construction
//!
//! Converts candidate objects and keywords into proposal records. All
//! replacement-string policy lives here: alias injection, WHERE-clause
//! qualification, full qualification, identifier quoting and the final
//! case-folding step (quoted and fully-qualified replacements bypass
//! case folding entirely).

use crate::analyzer::CompletionAnalyzer;
use crate::config::AliasInsertMode;
use crate::config::InsertCase;
use sql_completion_catalog::{DbObject, ObjectPath, ObjectType};
use sql_completion_dialect::KeywordKind;
use std::collections::HashSet;

/// Extra flags carried by a proposal for the editor layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposalParams {
    /// Routine proposal is a call (not a declaration).
    pub exec: Option<bool>,
    /// Editor should not append a trailing space.
    pub no_space: bool,
}

/// One completion proposal.
#[derive(Debug, Clone)]
pub struct Proposal {
    /// Text shown in the proposal list.
    pub display_string: String,
    /// Text inserted into the document.
    pub replace_string: String,
    /// Cursor position after insertion, relative to the replacement
    /// start.
    pub cursor_position: usize,
    pub kind: KeywordKind,
    /// Fuzzy match score; 0 when unscored.
    pub score: i32,
    /// Catalog object backing this proposal, if any.
    pub backing_object: Option<DbObject>,
    /// Container of the backing object.
    pub container_path: Option<ObjectPath>,
    pub is_fully_qualified: bool,
    pub is_single_object: bool,
    pub params: ProposalParams,
    /// Absolute offset of the replaced span.
    pub replacement_offset: usize,
    /// Length of the replaced span.
    pub replacement_length: usize,
}

impl CompletionAnalyzer {
    /// Build a proposal, applying quoting-aware case folding and the
    /// function-call shape.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn create_proposal(
        &self,
        display: String,
        replace: String,
        kind: KeywordKind,
        is_fully_qualified: bool,
        is_object: bool,
        object: Option<DbObject>,
        is_single_object: bool,
        params: ProposalParams,
    ) -> Proposal {
        let quoted = self.detector.is_quoted(&replace);
        let mut replace = if quoted || is_fully_qualified {
            replace
        } else {
            self.convert_keyword_case(&replace, is_object)
        };
        let cursor_position;
        if kind == KeywordKind::Function {
            replace.push_str("()");
            cursor_position = replace.chars().count() - 1;
        } else {
            cursor_position = replace.chars().count();
        }
        let (replacement_offset, replacement_length) = self.detector.replacement_span();
        let container_path = object.as_ref().and_then(|o| o.container_path());
        Proposal {
            display_string: display,
            replace_string: replace,
            cursor_position,
            kind,
            score: 0,
            backing_object: object,
            container_path,
            is_fully_qualified,
            is_single_object,
            params,
            replacement_offset,
            replacement_length,
        }
    }

    /// Build a proposal without any replacement-string rewriting. Used
    /// for value literals and in-document words, which must be inserted
    /// exactly as read.
    pub(crate) fn raw_proposal(
        &self,
        display: String,
        replace: String,
        kind: KeywordKind,
    ) -> Proposal {
        let (replacement_offset, replacement_length) = self.detector.replacement_span();
        let cursor_position = replace.chars().count();
        Proposal {
            display_string: display,
            replace_string: replace,
            cursor_position,
            kind,
            score: 0,
            backing_object: None,
            container_path: None,
            is_fully_qualified: false,
            is_single_object: true,
            params: ProposalParams::default(),
            replacement_offset,
            replacement_length,
        }
    }

    /// Final case-folding step. Identifiers follow the dialect's
    /// unquoted storage rule; keywords follow the insert-case option,
    /// with the syntax manager's keyword case for "as typed".
    pub(crate) fn convert_keyword_case(&self, token: &str, is_object: bool) -> String {
        let dialect = self.request.syntax().dialect();
        if is_object {
            return dialect.stores_unquoted_case().transform(token);
        }
        match self.request.config().insert_case {
            InsertCase::Upper => token.to_uppercase(),
            InsertCase::Lower => token.to_lowercase(),
            InsertCase::AsTyped => {
                if dialect.keyword_kind(token) == Some(KeywordKind::Keyword) {
                    self.request.syntax().keyword_case().transform(token)
                } else {
                    dialect.stores_unquoted_case().transform(token)
                }
            }
        }
    }

    /// Convert a catalog object into a proposal, deciding alias
    /// injection, qualification and quoting.
    pub(crate) fn make_proposal_from_object(
        &self,
        object: &DbObject,
        use_short_name: bool,
        params: ProposalParams,
    ) -> Proposal {
        let config = self.request.config();
        let dialect = self.request.syntax().dialect();
        let separator = self.request.syntax().struct_separator();
        let prev = self.prev_key_word.as_deref().unwrap_or("");

        let mut object_name: Option<String> = None;
        let mut replace: Option<String> = None;
        let mut is_fully_qualified = false;
        let mut is_single_object = true;

        // Alias injection after FROM/INTO/JOIN for entity proposals.
        let mut alias_to_append: Option<String> = None;
        if matches!(prev, "FROM" | "INTO" | "JOIN")
            && object.as_entity().is_some()
            && config.alias_insert_mode != AliasInsertMode::None
            && dialect.supports_alias_in_select()
        {
            if let Some(statement) = &self.request.active_statement {
                let first = first_keyword(&statement.text).to_uppercase();
                let is_dml_statement =
                    dialect.dml_keywords().iter().any(|k| k.eq_ignore_ascii_case(&first));
                if dialect.supports_alias_in_update() || !is_dml_statement {
                    let taken: HashSet<String> = self
                        .table_refs
                        .table_aliases_from_query()
                        .values()
                        .map(|a| a.to_lowercase())
                        .collect();
                    let generated = generate_entity_alias(object.name(), |candidate| {
                        taken.contains(&candidate.to_lowercase())
                            || dialect.keyword_kind(candidate).is_some()
                            || !self
                                .table_refs
                                .filtered_table_references(candidate, true)
                                .is_empty()
                    });
                    if !generated.eq_ignore_ascii_case(object.name()) {
                        alias_to_append = Some(generated);
                    }
                }
            }
        }

        // WHERE/AND columns get qualified with the table's alias.
        if matches!(prev, "WHERE" | "AND") {
            if let Some(attribute) = object.as_attribute() {
                let table_name = attribute.entity_path.last().unwrap_or_default().to_string();
                let aliases = self.table_refs.table_aliases_from_query();
                let alias = aliases
                    .iter()
                    .find(|(key, _)| {
                        key.eq_ignore_ascii_case(&table_name)
                            || key
                                .rsplit(separator)
                                .next()
                                .map(|last| last.eq_ignore_ascii_case(&table_name))
                                .unwrap_or(false)
                    })
                    .map(|(_, alias)| alias.clone());
                let mut name = dialect.quote_identifier_if_needed(&attribute.name);
                if self.detector.word_part().is_empty() {
                    let qualifier =
                        alias.unwrap_or_else(|| dialect.quote_identifier_if_needed(&table_name));
                    name = format!("{qualifier}{separator}{name}");
                }
                object_name = Some(name.clone());
                replace = Some(name);
            }
        }

        if object_name.is_none() {
            object_name = Some(if use_short_name {
                object.name().to_string()
            } else {
                object.path().qualified_name(separator)
            });
        }

        if replace.is_none() {
            // A reference found outside the active container is replaced
            // with its fully-qualified name, unless the user typed a
            // qualified fragment already.
            if !config.use_short_names
                && !self.detector.contains_separator(self.detector.full_word())
            {
                if let Some(reference) = object.as_reference() {
                    if !reference.container.is_root() {
                        if let Some(selected) = self.active_object() {
                            if selected.path() != reference.container {
                                let fq = format!(
                                    "{}{}{}",
                                    reference.container.qualified_name(separator),
                                    separator,
                                    dialect.quote_identifier_if_needed(&reference.name)
                                );
                                if reference.object_type != ObjectType::Procedure {
                                    is_fully_qualified = true;
                                }
                                is_single_object = false;
                                replace = Some(fq);
                            }
                        }
                    }
                }
            }
        }
        if replace.is_none() {
            if config.use_fq_names {
                is_fully_qualified = true;
                replace = Some(object.path().qualified_name(separator));
            } else {
                replace = Some(dialect.quote_identifier_if_needed(object.name()));
            }
        }

        let mut replace = replace.unwrap_or_default();
        if !matches!(prev, "WHERE" | "AND") {
            if let Some(alias) = &alias_to_append {
                if config.alias_insert_mode == AliasInsertMode::Extended {
                    replace.push(' ');
                    replace.push_str(&self.convert_keyword_case("as", false));
                }
                replace.push(' ');
                replace.push_str(alias);
            }
        }

        self.create_proposal(
            object_name.unwrap_or_default(),
            replace,
            KeywordKind::Other,
            is_fully_qualified,
            true,
            Some(object.clone()),
            is_single_object,
            params,
        )
    }
}

/// Generate a fresh table alias from the entity name: initials of the
/// `_`-separated (or camel-cased) words, then a numeric suffix until the
/// candidate is free.
pub(crate) fn generate_entity_alias(name: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let mut base = String::new();
    for word in name.split('_').filter(|w| !w.is_empty()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            base.extend(first.to_lowercase());
        }
        for c in chars {
            if c.is_uppercase() {
                base.extend(c.to_lowercase());
            }
        }
    }
    if base.is_empty() {
        base.push('t');
    }
    let mut candidate = base.clone();
    let mut suffix = 1u32;
    while is_taken(&candidate) {
        suffix += 1;
        candidate = format!("{base}{suffix}");
    }
    candidate
}

/// First keyword-like token of a statement.
pub(crate) fn first_keyword(statement: &str) -> &str {
    let trimmed = statement.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    &trimmed[..end]
}
