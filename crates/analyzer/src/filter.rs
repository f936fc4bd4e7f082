// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Keyword assist and post-filtering
//!
//! Keyword assist runs after object resolution: it matches the typed
//! prefix against the dialect keyword set, restricted to the keywords
//! the classifier allows at this position (statement leads when nothing
//! was typed, `FROM` after a SELECT expression, `SET` after UPDATE, and
//! so on).
//!
//! The post-filter then deduplicates by display string, hides
//! cross-schema duplicates of active-container objects, and applies the
//! data source's navigator filters.

use crate::analyzer::{CompletionAnalyzer, ALL_COLUMNS_PATTERN};
use crate::proposal::ProposalParams;
use crate::request::QueryType;
use sql_completion_catalog::DataSource;
use sql_completion_dialect::text::fuzzy_score;
use sql_completion_dialect::KeywordKind;
use std::collections::HashSet;
use std::sync::Arc;

impl CompletionAnalyzer {
    /// Propose keywords matching the prefix, honoring the allowed-set
    /// derived from the classifier state.
    pub(crate) fn keyword_assist(&mut self) {
        let dialect = self.request.syntax().dialect_ref();
        let mut matched_keywords: Vec<String> = Vec::new();
        let mut allowed_keywords: Option<HashSet<String>> = None;

        match self.prev_key_word.clone() {
            None => {
                let mut allowed = HashSet::new();
                for keyword in dialect
                    .query_keywords()
                    .iter()
                    .chain(dialect.dml_keywords())
                    .chain(dialect.ddl_keywords())
                    .chain(dialect.execute_keywords())
                {
                    allowed.insert((*keyword).to_string());
                }
                allowed_keywords = Some(allowed);
            }
            Some(prev)
                if dialect
                    .query_keywords()
                    .iter()
                    .any(|k| k.eq_ignore_ascii_case(&prev)) =>
            {
                // Inside a SELECT expression list: once the expression is
                // closed, FROM becomes the only continuation worth
                // offering.
                let delimiter = self.detector.prev_delimiter().to_string();
                if delimiter == ALL_COLUMNS_PATTERN
                    || (!self.prev_words.is_empty()
                        && (delimiter.is_empty() || delimiter.ends_with(')')))
                {
                    let mut allowed = HashSet::new();
                    if self.proposals.is_empty() && self.prev_words.is_empty() {
                        if !self.detector.next_word().eq_ignore_ascii_case("FROM") {
                            allowed.insert("FROM".to_string());
                            if self.word_part.is_empty() || self.word_part == ALL_COLUMNS_PATTERN {
                                matched_keywords = vec!["FROM".to_string()];
                            }
                        }
                    } else if delimiter == ALL_COLUMNS_PATTERN {
                        // Keep the star, insert after it.
                        self.detector.shift_offset(1);
                    }
                    allowed_keywords = Some(allowed);
                }
            }
            Some(prev) if dialect.is_entity_query_word(&prev) => {
                let mut allowed = HashSet::new();
                match prev.as_str() {
                    "DELETE" => {
                        allowed.insert("FROM".to_string());
                    }
                    "INSERT" => {
                        allowed.insert("INTO".to_string());
                    }
                    "UPDATE" => {
                        allowed.insert("SET".to_string());
                    }
                    _ => {
                        if !self.detector.next_word().eq_ignore_ascii_case("WHERE")
                            && prev != "INTO"
                        {
                            allowed.insert("WHERE".to_string());
                        }
                    }
                }
                if self.word_part.is_empty() {
                    matched_keywords = allowed.iter().cloned().collect();
                }
                allowed_keywords = Some(allowed);
            }
            _ => {}
        }

        if matched_keywords.is_empty() && !self.word_part.is_empty() {
            matched_keywords = dialect.matched_keywords(&self.word_part);
            if !self.request.is_simple_mode() {
                let word_part = self.word_part.clone();
                matched_keywords.sort_by_key(|keyword| fuzzy_score(keyword, &word_part));
            }
        }

        for keyword in matched_keywords {
            let Some(kind) = dialect.keyword_kind(&keyword) else {
                continue;
            };
            if kind == KeywordKind::Type {
                continue;
            }
            if self.query_type == Some(QueryType::Column)
                && !matches!(
                    kind,
                    KeywordKind::Function | KeywordKind::Keyword | KeywordKind::Other
                )
            {
                continue;
            }
            if let Some(allowed) = &allowed_keywords {
                if !allowed.contains(&keyword) {
                    continue;
                }
            }
            let proposal = self.create_proposal(
                keyword.clone(),
                keyword,
                kind,
                false,
                false,
                None,
                false,
                ProposalParams::default(),
            );
            self.proposals.push(proposal);
        }
    }

    /// Final filtering: dedup, duplicate hiding, navigator filters.
    pub(crate) fn filter_proposals(&mut self, data_source: &Arc<dyn DataSource>) {
        // Stable dedup by display string, first occurrence wins.
        let mut seen = HashSet::new();
        self.proposals
            .retain(|proposal| seen.insert(proposal.display_string.clone()));

        // Drop shadowed duplicates: when an active-container object and a
        // foreign one share a name, only the active one survives.
        let selected = self.active_object();
        if self.request.config().hide_duplicates {
            if let Some(selected) = selected {
                let selected_path = selected.path();
                let mut drop = vec![false; self.proposals.len()];
                for i in 0..self.proposals.len() {
                    let Some(object) = &self.proposals[i].backing_object else {
                        continue;
                    };
                    if self.proposals[i].container_path.as_ref() != Some(&selected_path) {
                        continue;
                    }
                    let name = object.name().to_string();
                    for (j, other) in self.proposals.iter().enumerate() {
                        if i == j || drop[j] {
                            continue;
                        }
                        let Some(other_object) = &other.backing_object else {
                            continue;
                        };
                        if other_object.name() == name
                            && other.container_path.as_ref() != Some(&selected_path)
                        {
                            drop[j] = true;
                        }
                    }
                }
                let mut index = 0;
                self.proposals.retain(|_| {
                    let dropped = drop[index];
                    index += 1;
                    !dropped
                });
            }
        }

        // Navigator object filters, per container and object class.
        let settings = data_source.settings();
        self.proposals.retain(|proposal| {
            let Some(object) = &proposal.backing_object else {
                return true;
            };
            match settings.object_filter(object.object_type(), proposal.container_path.as_ref()) {
                Some(filter) => filter.matches(object.name()),
                None => true,
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::analyzer::CompletionAnalyzer;
    use crate::config::CompletionConfig;
    use sql_completion_catalog::{DataSource, DbObject, ObjectPath};
    use sql_completion_test_utils::{MockCatalogBuilder, RequestBuilder};
    use std::sync::Arc;

    #[test]
    fn test_hide_duplicates_keeps_active_container_object() {
        let catalog = MockCatalogBuilder::new()
            .with_standard_schema()
            .with_archive_schema()
            .build();
        let config = CompletionConfig {
            hide_duplicates: true,
            ..CompletionConfig::default()
        };
        let request = RequestBuilder::new(catalog.clone(), "SELECT * FROM |")
            .with_config(config)
            .build();
        let mut analyzer = CompletionAnalyzer::new(request);

        let public_users = DbObject::Entity(
            catalog
                .entity(&ObjectPath::from_parts(["public", "users"]))
                .unwrap(),
        );
        let archive_users = DbObject::Entity(
            catalog
                .entity(&ObjectPath::from_parts(["archive", "users"]))
                .unwrap(),
        );
        let params = analyzer.base_params();
        let active = analyzer.make_proposal_from_object(&public_users, true, params.clone());
        let mut foreign = analyzer.make_proposal_from_object(&archive_users, true, params);
        foreign.display_string = "archive.users".to_string();
        analyzer.proposals.push(active);
        analyzer.proposals.push(foreign);

        let data_source: Arc<dyn DataSource> = catalog;
        analyzer.filter_proposals(&data_source);
        assert_eq!(analyzer.proposals.len(), 1);
        assert_eq!(analyzer.proposals[0].display_string, "users");
    }

    #[test]
    fn test_duplicate_displays_are_dropped_stably() {
        let catalog = MockCatalogBuilder::new().with_standard_schema().build();
        let request = RequestBuilder::new(catalog.clone(), "SELECT * FROM |").build();
        let mut analyzer = CompletionAnalyzer::new(request);
        let first = analyzer.raw_proposal(
            "users".into(),
            "users".into(),
            sql_completion_dialect::KeywordKind::Other,
        );
        let mut second = analyzer.raw_proposal(
            "users".into(),
            "users_second".into(),
            sql_completion_dialect::KeywordKind::Other,
        );
        second.score = 9;
        analyzer.proposals.push(first);
        analyzer.proposals.push(second);

        let data_source: Arc<dyn DataSource> = catalog;
        analyzer.filter_proposals(&data_source);
        assert_eq!(analyzer.proposals.len(), 1);
        assert_eq!(analyzer.proposals[0].replace_string, "users");
    }
}
