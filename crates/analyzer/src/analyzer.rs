// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Completion analyzer
//!
//! The one-shot engine behind content assist: classify the cursor
//! context, resolve candidate objects against the catalog, build
//! proposals, post-filter. One analyzer instance serves exactly one
//! request; [`CompletionAnalyzer::run`] consumes it and returns the
//! read-only outcome.
//!
//! Control flow mirrors the pipeline described in the crate docs:
//!
//! ```text
//! classify() ──► resolve (by query type) ──► proposal builder
//!                                        ──► keyword assist / hippie
//!                                        ──► post-filter
//! ```
//!
//! Catalog failures inside resolution steps are logged at debug level
//! and yield no children; only monitor cancellation aborts a run.

use crate::error::CompletionError;
use crate::proposal::{Proposal, ProposalParams};
use crate::request::{CompletionRequest, PartitionKind, QueryType};
use crate::table_refs::{PatternTableRefs, StructuralTableRefs, TableReferencesAnalyzer};
use crate::word_detector::WordDetector;
use sql_completion_catalog::{
    CatalogError, CatalogResult, DataSource, DbObject, Entity, ObjectContainer, ObjectPath,
    ObjectSearchParams, ObjectType, ProgressMonitor, StructureAssistant,
};
use sql_completion_dialect::text::{fuzzy_score, starts_with_ignore_case};
use sql_completion_dialect::KeywordKind;
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Replacement pattern standing for "all columns".
pub(crate) const ALL_COLUMNS_PATTERN: &str = "*";
/// Upper bound on enumerated attribute values.
pub const MAX_ATTRIBUTE_VALUE_PROPOSALS: usize = 50;
/// Upper bound on structure-assistant results.
pub const MAX_STRUCT_PROPOSALS: usize = 100;

/// Read-only result of a completion run.
pub struct CompletionOutcome {
    proposals: Vec<Proposal>,
    search_finished: bool,
}

impl CompletionOutcome {
    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    /// True when the analyzer decided no further default behavior
    /// applies (e.g. the cursor sits on a table alias).
    pub fn is_search_finished(&self) -> bool {
        self.search_finished
    }
}

/// Classifier output; running it twice on the same request yields the
/// same record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Classification {
    pub query_type: Option<QueryType>,
    pub search_prefix: String,
    pub span_shift: isize,
    pub suppress: bool,
    pub prev_key_word: Option<String>,
    pub prev_words: Vec<String>,
    pub exec_param: bool,
}

/// One-shot completion analyzer.
pub struct CompletionAnalyzer {
    pub(crate) request: CompletionRequest,
    pub(crate) table_refs: Box<dyn TableReferencesAnalyzer>,
    pub(crate) detector: WordDetector,
    pub(crate) query_type: Option<QueryType>,
    pub(crate) word_part: String,
    pub(crate) prev_key_word: Option<String>,
    pub(crate) prev_words: Vec<String>,
    pub(crate) exec_param: bool,
    pub(crate) proposals: Vec<Proposal>,
    pub(crate) search_finished: bool,
}

impl CompletionAnalyzer {
    pub fn new(request: CompletionRequest) -> Self {
        let detector = WordDetector::new(
            request.document.as_ref(),
            request.syntax(),
            request.offset,
        );
        let statement_text = request.active_statement.as_ref().map(|s| s.text.as_str());
        let dialect = request.syntax().dialect_ref();
        let table_refs: Box<dyn TableReferencesAnalyzer> =
            if request.config().experimental_reference_analyzer {
                Box::new(StructuralTableRefs::new(statement_text, dialect))
            } else {
                Box::new(PatternTableRefs::new(statement_text, dialect))
            };
        Self {
            request,
            table_refs,
            detector,
            query_type: None,
            word_part: String::new(),
            prev_key_word: None,
            prev_words: Vec::new(),
            exec_param: true,
            proposals: Vec::new(),
            search_finished: false,
        }
    }

    /// Run the analyzer once and return the proposal list.
    ///
    /// On cancellation the partial list is discarded and
    /// [`CompletionError::Cancelled`] is returned.
    #[instrument(skip(self, monitor), fields(offset = self.request.offset))]
    pub async fn run(mut self, monitor: &ProgressMonitor) -> Result<CompletionOutcome, CompletionError> {
        monitor.check_cancelled().map_err(CompletionError::from)?;
        self.analyze(monitor).await?;
        Ok(CompletionOutcome {
            proposals: self.proposals,
            search_finished: self.search_finished,
        })
    }

    /// Classify the cursor context. Pure with respect to the request;
    /// span adjustment is returned, not applied.
    pub(crate) fn classify(&self) -> Classification {
        let dialect = self.request.syntax().dialect();
        let detector = &self.detector;
        let is_in_literal = self.request.partition == PartitionKind::String;

        let mut prev_key_word = match detector.prev_key_word() {
            "" => None,
            word => Some(word.to_string()),
        };
        let mut prev_words: Vec<String> = detector.prev_words().to_vec();

        // A keyword left of the active statement start belongs to the
        // previous statement.
        let out_of_statement = match (&self.request.active_statement, detector.prev_key_word_offset())
        {
            (None, _) => true,
            (Some(statement), Some(offset)) => offset < statement.offset,
            (Some(_), None) => false,
        };
        if out_of_statement {
            prev_key_word = None;
            prev_words.clear();
        }

        let is_prev_word_empty = prev_words.is_empty();
        let prev_delimiter = detector.prev_delimiter().to_string();
        let mut search_prefix = detector.word_part().to_string();
        let mut query_type = None;
        let mut span_shift = 0isize;
        let mut suppress = false;

        if let Some(prev) = prev_key_word.as_deref() {
            if dialect.is_entity_query_word(prev) {
                if prev == "DELETE" || prev == "INSERT" {
                    query_type = None;
                } else if prev == "INTO"
                    && !is_prev_word_empty
                    && (prev_delimiter == "(" || prev_delimiter == ",")
                {
                    query_type = Some(QueryType::Column);
                } else if prev == "INTO"
                    && !is_prev_word_empty
                    && matches!(prev_delimiter.as_str(), "(*" | "{*" | "[*")
                {
                    span_shift = -(ALL_COLUMNS_PATTERN.len() as isize);
                    search_prefix = ALL_COLUMNS_PATTERN.to_string();
                    query_type = Some(QueryType::Column);
                } else if prev == "JOIN" && is_prev_word_empty {
                    query_type = Some(QueryType::Join);
                } else if !is_prev_word_empty && prev_delimiter.is_empty() {
                    // Cursor sits right after a table alias; leave unset.
                } else if prev == "INTO" && is_in_literal {
                    // INSERT INTO t VALUES ('|') proposes nothing.
                    suppress = true;
                } else {
                    query_type = Some(QueryType::Table);
                }
            } else if dialect.is_attribute_query_word(prev) {
                query_type = Some(QueryType::Column);
                let cur_char = self
                    .request
                    .offset
                    .checked_sub(1)
                    .and_then(|o| self.request.document.char_at(o));
                if !self.request.is_simple_mode()
                    && detector.word_part().is_empty()
                    && cur_char.map(|c| prev_delimiter.contains(c)).unwrap_or(false)
                    && prev_delimiter == ALL_COLUMNS_PATTERN
                    && !detector.next_word().is_empty()
                {
                    span_shift = -(ALL_COLUMNS_PATTERN.len() as isize);
                    search_prefix = ALL_COLUMNS_PATTERN.to_string();
                }
            } else if dialect.is_exec_query_word(prev) {
                query_type = Some(QueryType::Exec);
            }
        }

        let previous_word = prev_words
            .first()
            .map(|w| w.to_uppercase())
            .unwrap_or_default();
        let exec_param = !matches!(previous_word.as_str(), "PROCEDURE" | "FUNCTION");

        Classification {
            query_type,
            search_prefix,
            span_shift,
            suppress,
            prev_key_word,
            prev_words,
            exec_param,
        }
    }

    async fn analyze(&mut self, monitor: &ProgressMonitor) -> Result<(), CompletionError> {
        let classification = self.classify();
        if classification.suppress {
            return Ok(());
        }
        self.query_type = classification.query_type;
        self.word_part = classification.search_prefix;
        self.prev_key_word = classification.prev_key_word;
        self.prev_words = classification.prev_words;
        self.exec_param = classification.exec_param;
        self.detector.shift_offset(classification.span_shift);

        let Some(data_source) = self.request.data_source() else {
            return Ok(());
        };

        let is_in_literal = self.request.partition == PartitionKind::String;
        let in_quoted_identifier = self.request.partition == PartitionKind::QuotedIdentifier;
        let word_part = self.word_part.clone();
        let empty_word = word_part.is_empty();
        let is_number = !word_part.is_empty() && word_part.parse::<f64>().is_ok();
        let simple_mode = self.request.is_simple_mode();
        let config_show_values = self.request.config().show_values;
        let previous_word = self
            .prev_words
            .first()
            .map(|w| w.to_uppercase())
            .unwrap_or_default();

        if let Some(query_type) = self.query_type {
            if empty_word || is_in_literal || is_number || in_quoted_identifier {
                // No usable prefix: propose from statement tables,
                // session defaults and data-source roots.
                let mut root_objects: Option<Vec<DbObject>> = None;
                if query_type == QueryType::Column {
                    let objects = self.table_list_from_alias(monitor, &data_source).await?;
                    if let Some(prev) = self.prev_key_word.clone() {
                        if prev == "ON" {
                            for object in &objects {
                                if let Some(entity) = object.as_entity() {
                                    self.make_join_column_proposals(monitor, &data_source, &entity)
                                        .await?;
                                }
                            }
                        }
                        if matches!(prev.as_str(), "SET" | "WHERE" | "AND" | "OR" | "ON")
                            && !simple_mode
                        {
                            let is_like = previous_word == "LIKE" || previous_word == "ILIKE";
                            let delimiter = self.detector.prev_delimiter();
                            let waits_for_value = is_in_literal
                                || (!self.prev_words.is_empty() && is_like)
                                || (!delimiter.is_empty() && !delimiter.ends_with(')'));
                            if waits_for_value && config_show_values {
                                let objects = objects.clone();
                                for object in &objects {
                                    if let Some(entity) = object.as_entity() {
                                        self.make_proposals_from_attribute_values(
                                            monitor,
                                            is_in_literal || is_number,
                                            &entity,
                                        )
                                        .await?;
                                    }
                                }
                            }
                        }
                    }
                    root_objects = Some(objects);
                } else {
                    if let Some(context) = self.request.execution_context() {
                        if let Some(schema) = context.default_schema() {
                            self.make_proposals_from_children(monitor, &data_source, &schema, None, false)
                                .await?;
                        }
                        if let Some(catalog) = context.default_catalog() {
                            self.make_proposals_from_children(
                                monitor,
                                &data_source,
                                &catalog,
                                None,
                                false,
                            )
                            .await?;
                        }
                    }
                    self.make_data_source_proposals(monitor, &data_source).await?;
                }

                if !is_in_literal {
                    match &root_objects {
                        Some(objects) => {
                            let objects = objects.clone();
                            for object in &objects {
                                self.make_proposals_from_children(
                                    monitor,
                                    &data_source,
                                    object,
                                    None,
                                    false,
                                )
                                .await?;
                            }
                        }
                        None => {
                            if self.active_object().is_none() {
                                let root = DbObject::Container(data_source.root());
                                self.make_proposals_from_children(
                                    monitor,
                                    &data_source,
                                    &root,
                                    None,
                                    false,
                                )
                                .await?;
                            }
                        }
                    }
                    if query_type == QueryType::Join && !self.proposals.is_empty() {
                        let root = data_source.root();
                        if let Some(left) = self.table_from_alias(monitor, &root, None).await? {
                            if let Some(left) = left.as_entity() {
                                self.filter_non_joinable(monitor, &left).await?;
                            }
                        }
                    }
                }
            } else if !is_in_literal {
                // Dotted or partial prefix.
                let mut root_object: Option<DbObject> = None;
                if query_type == QueryType::Column {
                    let mut container: Arc<dyn ObjectContainer> = data_source.root();
                    if let Some(selected) = self.active_object().and_then(|o| o.as_container()) {
                        container = selected;
                    }
                    let separator = self.request.syntax().struct_separator();
                    let catalog_separator = self
                        .request
                        .syntax()
                        .dialect()
                        .catalog_separator()
                        .to_string();

                    let mut table_alias: Option<String> = None;
                    if word_part == ALL_COLUMNS_PATTERN {
                        if !self.prev_words.is_empty()
                            && self.prev_key_word.as_deref() != Some("INTO")
                        {
                            let prev_word = &self.prev_words[0];
                            if let Some(position) = prev_word.rfind(&catalog_separator) {
                                table_alias = Some(prev_word[..position].to_string());
                            }
                        }
                    }
                    if table_alias.is_none() {
                        if let Some(position) = word_part.rfind(separator) {
                            table_alias = Some(word_part[..position].to_string());
                        }
                    }
                    if table_alias.is_none() && !word_part.is_empty() {
                        // The whole prefix may name an alias; the cursor
                        // is then on the alias and nothing is proposed.
                        if self
                            .table_from_alias(monitor, &container, Some(&word_part))
                            .await?
                            .is_some()
                        {
                            self.search_finished = true;
                            return Ok(());
                        }
                    }
                    root_object = self
                        .table_from_alias(monitor, &container, table_alias.as_deref())
                        .await?;
                    if root_object.is_none() {
                        if let Some(alias) = &table_alias {
                            let names = self.detector.split_identifier(alias);
                            root_object =
                                self.find_object_by_fqn(monitor, &container, &names).await?;
                        }
                    }
                }
                match &root_object {
                    Some(root) => {
                        self.make_proposals_from_children(
                            monitor,
                            &data_source,
                            root,
                            Some(word_part.clone()),
                            false,
                        )
                        .await?;
                    }
                    None => {
                        if query_type != QueryType::Column && query_type != QueryType::Exec {
                            self.make_data_source_proposals(monitor, &data_source).await?;
                        }
                    }
                }
            }

            if !simple_mode
                && !is_in_literal
                && (query_type == QueryType::Exec
                    || (query_type == QueryType::Column
                        && self.request.config().search_procedures))
            {
                let exec = self.exec_param;
                self.make_procedures_proposals(monitor, &data_source, &word_part, exec)
                    .await?;
            }
        } else if !is_in_literal
            && !simple_mode
            && matches!(previous_word.as_str(), "PROCEDURE" | "FUNCTION")
        {
            let exec = self.exec_param;
            self.make_procedures_proposals(monitor, &data_source, &word_part, exec)
                .await?;
        }

        if !empty_word && !is_in_literal && !in_quoted_identifier {
            self.make_proposals_from_query_parts();
        }

        if !self.search_finished && !is_in_literal && !in_quoted_identifier {
            self.keyword_assist();
            if self.request.config().hippie_enabled {
                self.make_proposals_from_hippie();
            }
        }
        self.filter_proposals(&data_source);
        Ok(())
    }

    /// The session-selected innermost object.
    pub(crate) fn active_object(&self) -> Option<DbObject> {
        self.request
            .execution_context()
            .and_then(|context| context.active_object())
    }

    fn selected_containers(&self) -> Vec<Arc<dyn ObjectContainer>> {
        self.request
            .execution_context()
            .map(|context| {
                context
                    .selected_objects()
                    .iter()
                    .filter_map(|o| o.as_container())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn base_params(&self) -> ProposalParams {
        ProposalParams {
            exec: Some(self.exec_param),
            no_space: false,
        }
    }

    /// Dotted-path descent from the data source root (or a selected
    /// container as a first-step fallback).
    async fn make_data_source_proposals(
        &mut self,
        monitor: &ProgressMonitor,
        data_source: &Arc<dyn DataSource>,
    ) -> Result<(), CompletionError> {
        if self.request.execution_context().is_none() {
            return Ok(());
        }
        let root = data_source.root();
        let dialect = self.request.syntax().dialect_ref();
        let separator = self.request.syntax().struct_separator();
        let tokens: Vec<String> = self
            .detector
            .split_word_part()
            .into_iter()
            .filter(|t| !t.is_empty())
            .collect();
        let selected_containers = self.selected_containers();

        let mut container: Option<Arc<dyn ObjectContainer>> = Some(root.clone());
        let mut child_object: Option<DbObject> = Some(DbObject::Container(root.clone()));
        let mut last_token: Option<String> = None;

        for (i, token) in tokens.iter().enumerate() {
            if i == tokens.len() - 1 && !self.word_part.ends_with(separator) {
                last_token = Some(token.clone());
                break;
            }
            let Some(current) = container.clone() else {
                break;
            };
            let object_name = if self.detector.is_quoted(token) {
                self.detector.remove_quotes(token)
            } else {
                dialect.stores_unquoted_case().transform(token)
            };
            absorb(current.cache_structure(monitor).await)?;
            child_object = absorb(current.child(monitor, &object_name).await)?.flatten();
            if child_object.is_none() && i == 0 {
                for selected in &selected_containers {
                    absorb(selected.cache_structure(monitor).await)?;
                    if let Some(found) =
                        absorb(selected.child(monitor, &object_name).await)?.flatten()
                    {
                        child_object = Some(found);
                        container = Some(selected.clone());
                        break;
                    }
                }
            }
            if child_object.is_none() {
                if i == 0 {
                    // Maybe a table alias.
                    child_object = self.table_from_alias(monitor, &current, Some(token)).await?;
                    if child_object.is_none() && !self.request.is_simple_mode() {
                        // Last resort: structure assistant, tightly bounded.
                        if let Some(assistant) = data_source.structure_assistant() {
                            let params = ObjectSearchParams::new(
                                assistant.auto_complete_object_types(),
                                self.detector.remove_quotes(token),
                            )
                            .with_case_sensitive(self.detector.is_quoted(token))
                            .with_max_results(2);
                            if let Some(references) =
                                absorb(assistant.find_objects_by_mask(monitor, &params).await)?
                            {
                                if let Some(first) = references.first() {
                                    child_object =
                                        absorb(assistant.resolve_reference(monitor, first).await)?
                                            .flatten();
                                }
                            }
                        }
                    }
                } else {
                    // Path element not found.
                    return Ok(());
                }
            }
            container = child_object.as_ref().and_then(|c| c.as_container());
        }

        let Some(child) = child_object else {
            return Ok(());
        };
        match last_token {
            None => {
                self.make_proposals_from_children(monitor, data_source, &child, None, false)
                    .await?;
            }
            Some(last) => {
                self.make_proposals_from_children(
                    monitor,
                    data_source,
                    &child,
                    Some(last.clone()),
                    false,
                )
                .await?;
                if tokens.len() == 1 {
                    // The selected containers may hold closer matches;
                    // they go in front.
                    let child_path = child.path();
                    for selected in &selected_containers {
                        if *selected.path() != child_path {
                            let object = DbObject::Container(selected.clone());
                            self.make_proposals_from_children(
                                monitor,
                                data_source,
                                &object,
                                Some(last.clone()),
                                true,
                            )
                            .await?;
                        }
                    }
                    if self.proposals.is_empty() && !self.request.is_simple_mode() {
                        if let Some(assistant) = data_source.structure_assistant() {
                            let scope = container.clone();
                            self.make_proposals_from_assistant(
                                monitor,
                                &assistant,
                                scope.as_ref(),
                                None,
                                &last,
                            )
                            .await?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Resolve a single table from the statement's table references.
    ///
    /// `None` token resolves the first referenced table; the literal
    /// `*` token resolves nothing.
    pub(crate) async fn table_from_alias(
        &self,
        monitor: &ProgressMonitor,
        container: &Arc<dyn ObjectContainer>,
        token: Option<&str>,
    ) -> Result<Option<DbObject>, CompletionError> {
        let mut token = token.unwrap_or("").to_string();
        if token == ALL_COLUMNS_PATTERN {
            return Ok(None);
        }
        let catalog_separator = self
            .request
            .syntax()
            .dialect()
            .catalog_separator()
            .to_string();
        while token.ends_with(&catalog_separator) {
            token.truncate(token.len() - catalog_separator.len());
        }
        let references = self.table_refs.filtered_table_references(&token, true);
        for reference in references {
            if reference.table.is_empty() {
                continue;
            }
            let names = self.detector.split_identifier(&reference.table);
            if let Some(object) = self.find_object_by_fqn(monitor, container, &names).await? {
                return Ok(Some(object));
            }
        }
        Ok(None)
    }

    /// Resolve every table referenced by the active statement.
    async fn table_list_from_alias(
        &self,
        monitor: &ProgressMonitor,
        data_source: &Arc<dyn DataSource>,
    ) -> Result<Vec<DbObject>, CompletionError> {
        let root = data_source.root();
        let mut objects = Vec::new();
        for reference in self.table_refs.filtered_table_references("", false) {
            if reference.table.is_empty() {
                continue;
            }
            let names = self.detector.split_identifier(&reference.table);
            if let Some(object) = self.find_object_by_fqn(monitor, &root, &names).await? {
                objects.push(object);
            }
        }
        Ok(objects)
    }

    /// Walk a dotted name through the container tree. Unquoted segments
    /// follow the dialect's storage case; quoted segments are used
    /// verbatim. The selected containers are retried for the first
    /// segment.
    pub(crate) async fn find_object_by_fqn(
        &self,
        monitor: &ProgressMonitor,
        container: &Arc<dyn ObjectContainer>,
        names: &[String],
    ) -> Result<Option<DbObject>, CompletionError> {
        let names: Vec<&String> = names.iter().filter(|n| !n.is_empty()).collect();
        if names.is_empty() {
            return Ok(None);
        }
        let dialect = self.request.syntax().dialect_ref();
        let mut current: Arc<dyn ObjectContainer> = container.clone();
        for (i, raw) in names.iter().enumerate() {
            let name = if self.detector.is_quoted(raw) {
                self.detector.remove_quotes(raw)
            } else {
                dialect.stores_unquoted_case().transform(raw)
            };
            absorb(current.cache_structure(monitor).await)?;
            let mut child = absorb(current.child(monitor, &name).await)?.flatten();
            if child.is_none() && i == 0 {
                for selected in self.selected_containers() {
                    if let Some(found) = absorb(selected.child(monitor, &name).await)?.flatten() {
                        child = Some(found);
                        break;
                    }
                }
            }
            let Some(mut child) = child else {
                return Ok(None);
            };
            // Follow synonyms encountered along the path.
            if let Some(synonym) = child.as_synonym() {
                if let Some(target) = absorb(synonym.target(monitor).await)?.flatten() {
                    child = target;
                }
            }
            if i == names.len() - 1 {
                return Ok(Some(child));
            }
            current = match child.as_container() {
                Some(next) => next,
                None => return Ok(None),
            };
        }
        Ok(None)
    }

    /// Walk to the container at `path`, if it exists.
    async fn container_at(
        &self,
        monitor: &ProgressMonitor,
        root: &Arc<dyn ObjectContainer>,
        path: &ObjectPath,
    ) -> Result<Option<Arc<dyn ObjectContainer>>, CompletionError> {
        let mut current = root.clone();
        for segment in path.segments() {
            let child = absorb(current.child(monitor, segment).await)?.flatten();
            current = match child.and_then(|c| c.as_container()) {
                Some(next) => next,
                None => return Ok(None),
            };
        }
        Ok(Some(current))
    }

    /// Generate a join condition for `<left> JOIN <right> ON |`.
    async fn make_join_column_proposals(
        &mut self,
        monitor: &ProgressMonitor,
        data_source: &Arc<dyn DataSource>,
        left: &Arc<dyn Entity>,
    ) -> Result<(), CompletionError> {
        let Some(keyword_offset) = self.detector.prev_key_word_offset() else {
            return Ok(());
        };
        // The table being joined sits immediately left of ON.
        let join_detector = WordDetector::with_limit(
            self.request.document.as_ref(),
            self.request.syntax(),
            keyword_offset,
            2,
        );
        let Some(right_name) = join_detector.prev_words().first() else {
            return Ok(());
        };
        let names = self.detector.split_identifier(right_name);
        let root = data_source.root();
        let Some(right) = self.find_object_by_fqn(monitor, &root, &names).await? else {
            return Ok(());
        };
        let Some(right) = right.as_entity() else {
            return Ok(());
        };
        if let Some(condition) = self.generate_table_join(monitor, left, &right).await? {
            let proposal = self.create_proposal(
                condition.clone(),
                condition,
                KeywordKind::Other,
                false,
                false,
                None,
                false,
                ProposalParams::default(),
            );
            self.proposals.push(proposal);
        }
        Ok(())
    }

    /// Equality chain over the FK attribute pairs between two entities,
    /// in either direction.
    async fn generate_table_join(
        &self,
        monitor: &ProgressMonitor,
        left: &Arc<dyn Entity>,
        right: &Arc<dyn Entity>,
    ) -> Result<Option<String>, CompletionError> {
        let dialect = self.request.syntax().dialect();
        let left_name = dialect.quote_identifier_if_needed(left.name());
        let right_name = dialect.quote_identifier_if_needed(right.name());
        for association in absorb(left.associations(monitor).await)?.unwrap_or_default() {
            if association.referenced_entity == *right.path() {
                return Ok(Some(join_condition(
                    &left_name,
                    &right_name,
                    &association.attribute_pairs,
                )));
            }
        }
        for association in absorb(right.associations(monitor).await)?.unwrap_or_default() {
            if association.referenced_entity == *left.path() {
                return Ok(Some(join_condition(
                    &right_name,
                    &left_name,
                    &association.attribute_pairs,
                )));
            }
        }
        Ok(None)
    }

    async fn tables_have_joins(
        &self,
        monitor: &ProgressMonitor,
        from: &Arc<dyn Entity>,
        to: &Arc<dyn Entity>,
    ) -> Result<bool, CompletionError> {
        let associations = absorb(from.associations(monitor).await)?.unwrap_or_default();
        Ok(associations
            .iter()
            .any(|a| a.referenced_entity == *to.path()))
    }

    /// Keep only proposals joinable with the left table; survivors get
    /// `" ON"` appended.
    async fn filter_non_joinable(
        &mut self,
        monitor: &ProgressMonitor,
        left: &Arc<dyn Entity>,
    ) -> Result<(), CompletionError> {
        let mut joinable = Vec::new();
        for proposal in &self.proposals {
            let Some(DbObject::Entity(right)) = &proposal.backing_object else {
                continue;
            };
            if self.tables_have_joins(monitor, right, left).await?
                || self.tables_have_joins(monitor, left, right).await?
            {
                let mut kept = proposal.clone();
                kept.replace_string.push_str(" ON");
                kept.cursor_position = kept.replace_string.chars().count();
                joinable.push(kept);
            }
        }
        if !joinable.is_empty() {
            self.proposals = joinable;
        }
        Ok(())
    }

    /// Procedure search through the structure assistant, inferring the
    /// container from a qualified prefix when the user spells a path
    /// into another schema.
    async fn make_procedures_proposals(
        &mut self,
        monitor: &ProgressMonitor,
        data_source: &Arc<dyn DataSource>,
        word_part: &str,
        exec: bool,
    ) -> Result<(), CompletionError> {
        let Some(assistant) = data_source.structure_assistant() else {
            return Ok(());
        };
        let root = data_source.root();
        let mut scope: Arc<dyn ObjectContainer> = root.clone();
        if let Some(selected) = self.active_object().and_then(|o| o.as_container()) {
            let separator = self.request.syntax().struct_separator();
            if self.request.config().search_globally && !self.detector.contains_separator(word_part)
            {
                // Global search: no container hint for the assistant.
            } else if word_part.len() > 1
                && self.detector.contains_separator(word_part)
                && !word_part.contains(selected.name())
            {
                // A path into another schema: locate its container
                // through the selected container's parent.
                let names = self.detector.split_identifier(word_part);
                if !names.is_empty() {
                    let ends_on_separator = word_part.ends_with(separator);
                    let index = if ends_on_separator {
                        names.len() - 1
                    } else if names.len() > 1 {
                        names.len() - 2
                    } else {
                        0
                    };
                    let container_name = self.detector.remove_quotes(&names[index]);
                    if let Some(parent_path) = selected.path().parent() {
                        if let Some(parent) =
                            self.container_at(monitor, &root, &parent_path).await?
                        {
                            if let Some(found) =
                                absorb(parent.child(monitor, &container_name).await)?.flatten()
                            {
                                if let Some(found) = found.as_container() {
                                    scope = found;
                                }
                            }
                        }
                    }
                }
            } else {
                scope = selected;
            }
        }
        let params = ProposalParams {
            exec: Some(exec),
            no_space: false,
        };
        self.make_proposals_from_assistant_with_params(
            monitor,
            &assistant,
            Some(&scope),
            Some(vec![ObjectType::Procedure]),
            word_part,
            params,
        )
        .await
    }

    async fn make_proposals_from_assistant(
        &mut self,
        monitor: &ProgressMonitor,
        assistant: &Arc<dyn StructureAssistant>,
        scope: Option<&Arc<dyn ObjectContainer>>,
        object_types: Option<Vec<ObjectType>>,
        object_name: &str,
    ) -> Result<(), CompletionError> {
        let params = self.base_params();
        self.make_proposals_from_assistant_with_params(
            monitor,
            assistant,
            scope,
            object_types,
            object_name,
            params,
        )
        .await
    }

    async fn make_proposals_from_assistant_with_params(
        &mut self,
        monitor: &ProgressMonitor,
        assistant: &Arc<dyn StructureAssistant>,
        scope: Option<&Arc<dyn ObjectContainer>>,
        object_types: Option<Vec<ObjectType>>,
        object_name: &str,
        params: ProposalParams,
    ) -> Result<(), CompletionError> {
        let scoped = scope.map(|c| !c.path().is_root()).unwrap_or(false);
        let mask = self.make_object_name_mask(object_name, scoped);
        let search = ObjectSearchParams::new(
            object_types.unwrap_or_else(|| assistant.auto_complete_object_types()),
            mask,
        )
        .with_parent(scope.and_then(|c| {
            if c.path().is_root() {
                None
            } else {
                Some(c.path().clone())
            }
        }))
        .with_case_sensitive(self.detector.is_quoted(object_name))
        .with_global_search(self.request.config().search_globally)
        .with_max_results(MAX_STRUCT_PROPOSALS);
        let Some(references) = absorb(assistant.find_objects_by_mask(monitor, &search).await)?
        else {
            return Ok(());
        };
        for reference in references {
            let object = DbObject::Reference(Arc::new(reference));
            let proposal = self.make_proposal_from_object(&object, scoped, params.clone());
            self.proposals.push(proposal);
        }
        Ok(())
    }

    /// Mask for assistant searches, per the object-name mask rules.
    pub(crate) fn make_object_name_mask(&self, object_name: &str, scoped: bool) -> String {
        let separator = self.request.syntax().struct_separator();
        let mut name = object_name.to_string();
        if self.detector.contains_separator(&name) {
            if scoped {
                if name.ends_with(separator) {
                    name.clear();
                } else {
                    let parts = self.detector.split_identifier(&name);
                    name = parts
                        .last()
                        .map(|p| self.detector.remove_quotes(p))
                        .unwrap_or_default();
                }
            }
        } else {
            name = self.detector.remove_quotes(&name);
        }
        if self.request.config().search_inside_names {
            if name.is_empty() {
                "%".to_string()
            } else {
                format!("%{name}%")
            }
        } else {
            format!("{name}%")
        }
    }

    /// Enumerate a parent's children (container children or entity
    /// attributes), filter by the start part, and emit proposals.
    ///
    /// Hidden children are skipped and virtual containers are flattened
    /// into their parent. Runs on the local-cache monitor unless the
    /// data source allows extra metadata reads.
    pub(crate) async fn make_proposals_from_children(
        &mut self,
        monitor: &ProgressMonitor,
        data_source: &Arc<dyn DataSource>,
        parent: &DbObject,
        start_part: Option<String>,
        add_first: bool,
    ) -> Result<(), CompletionError> {
        if self.query_type == Some(QueryType::Exec) {
            return Ok(());
        }
        let md_monitor = if data_source.settings().extra_metadata_read {
            monitor.clone()
        } else {
            monitor.local_cache()
        };

        let mut parent = parent.clone();
        if let Some(synonym) = parent.as_synonym() {
            if !md_monitor.is_force_cache_usage() {
                match absorb(synonym.target(&md_monitor).await)?.flatten() {
                    Some(target) => parent = target,
                    None => debug!("can't resolve synonym target"),
                }
            }
        }

        let separator = self.request.syntax().struct_separator();
        let start_part = start_part.map(|raw| {
            let cleaned = self.detector.remove_quotes(&raw).to_uppercase();
            match cleaned.rfind(separator) {
                Some(position) => cleaned[position + separator.len_utf8()..].to_string(),
                None => cleaned,
            }
        });
        let start_part = start_part.filter(|s| !s.is_empty());

        let children: Vec<DbObject> = if let Some(container) = parent.as_container() {
            absorb(container.children(&md_monitor).await)?.unwrap_or_default()
        } else if let Some(entity) = parent.as_entity() {
            absorb(entity.attributes(&md_monitor).await)?
                .unwrap_or_default()
                .into_iter()
                .map(DbObject::Attribute)
                .collect()
        } else {
            Vec::new()
        };
        if children.is_empty() {
            return Ok(());
        }

        // Skip hidden children; splice virtual containers in place.
        let mut flat: Vec<DbObject> = Vec::new();
        let mut queue: VecDeque<DbObject> = children.into();
        while let Some(child) = queue.pop_front() {
            if child.is_hidden() {
                continue;
            }
            if child.is_virtual() {
                if let Some(container) = child.as_container() {
                    for sub in absorb(container.children(&md_monitor).await)?.unwrap_or_default() {
                        queue.push_back(sub);
                    }
                }
                continue;
            }
            flat.push(child);
        }

        let simple_mode = self.request.is_simple_mode();
        let all_objects = !simple_mode && start_part.as_deref() == Some(ALL_COLUMNS_PATTERN);
        if all_objects {
            // One proposal replacing `*` with every visible column.
            let object_prefix = self.prev_words.first().and_then(|prev| {
                if prev.ends_with(separator) {
                    Some(prev.clone())
                } else {
                    None
                }
            });
            let dialect = self.request.syntax().dialect();
            let mut combined = String::new();
            for child in &flat {
                if !combined.is_empty() {
                    combined.push_str(", ");
                    if let Some(prefix) = &object_prefix {
                        combined.push_str(prefix);
                    }
                }
                combined.push_str(&dialect.quote_identifier_if_needed(child.name()));
            }
            if !combined.is_empty() {
                let proposal = self.create_proposal(
                    combined.clone(),
                    combined,
                    KeywordKind::Other,
                    false,
                    false,
                    None,
                    false,
                    ProposalParams::default(),
                );
                self.proposals.push(proposal);
            }
            return Ok(());
        }

        let search_inside = self.request.config().search_inside_names;
        let mut matched: Vec<DbObject> = Vec::new();
        let mut scores: HashMap<String, i32> = HashMap::new();
        for child in flat {
            match &start_part {
                _ if search_inside => {
                    let score = match &start_part {
                        Some(start) => fuzzy_score(child.name(), start),
                        None => 1,
                    };
                    if score > 0 {
                        scores.insert(child.name().to_string(), score);
                        matched.push(child);
                    }
                }
                Some(start) => {
                    if starts_with_ignore_case(child.name(), start) {
                        matched.push(child);
                    }
                }
                None => matched.push(child),
            }
        }
        if matched.is_empty() {
            return Ok(());
        }

        if start_part.is_none() || scores.is_empty() {
            if self.request.config().sort_alphabetically {
                matched.sort_by(compare_objects);
            }
        } else {
            matched.sort_by(|a, b| {
                let score_a = scores.get(a.name()).copied().unwrap_or(0);
                let score_b = scores.get(b.name()).copied().unwrap_or(0);
                match score_b.cmp(&score_a) {
                    Ordering::Equal => compare_objects(a, b),
                    other => other,
                }
            });
        }

        let use_short_name = !parent.path().is_root();
        let params = self.base_params();
        let mut child_proposals = Vec::new();
        for child in matched {
            let mut proposal = self.make_proposal_from_object(&child, use_short_name, params.clone());
            if let Some(score) = scores.get(child.name()) {
                proposal.score = *score;
            }
            child_proposals.push(proposal);
        }
        if add_first {
            // The most specific container's objects go first.
            for (i, proposal) in child_proposals.into_iter().enumerate() {
                self.proposals.insert(i, proposal);
            }
        } else {
            self.proposals.extend(child_proposals);
        }
        Ok(())
    }

    /// Offer table names and aliases already present in the statement,
    /// at top priority.
    pub(crate) fn make_proposals_from_query_parts(&mut self) {
        if self.query_type.is_none() && self.prev_key_word.as_deref() == Some("FROM") {
            // Cursor is at an alias position after FROM.
            return;
        }
        let word_part = self.word_part.clone();
        let Some(statement) = &self.request.active_statement else {
            return;
        };
        if statement.text.is_empty() || word_part.is_empty() {
            return;
        }
        if self.detector.contains_separator(&word_part) || word_part == ALL_COLUMNS_PATTERN {
            return;
        }
        let references = self.table_refs.filtered_table_references(&word_part, false);
        for reference in references {
            let mut front = Vec::new();
            if !reference.table.is_empty() && !has_proposal(&self.proposals, &reference.table) {
                front.push(reference.table.clone());
            }
            if let Some(alias) = &reference.alias {
                if !alias.is_empty() && !has_proposal(&self.proposals, alias) {
                    front.push(alias.clone());
                }
            }
            for name in front {
                let proposal = self.create_proposal(
                    name.clone(),
                    name,
                    KeywordKind::Other,
                    false,
                    false,
                    None,
                    false,
                    ProposalParams {
                        exec: None,
                        no_space: true,
                    },
                );
                self.proposals.insert(0, proposal);
            }
        }
    }
}

/// Stable display-string membership test.
pub(crate) fn has_proposal(proposals: &[Proposal], display: &str) -> bool {
    proposals.iter().any(|p| p.display_string == display)
}

fn join_condition(owner: &str, referenced: &str, pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(own, other)| format!("{owner}.{own} = {referenced}.{other}"))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Attributes order by ordinal, everything else by name.
fn compare_objects(a: &DbObject, b: &DbObject) -> Ordering {
    match (a.as_attribute(), b.as_attribute()) {
        (Some(left), Some(right)) => left.ordinal.cmp(&right.ordinal),
        _ => a.name().to_lowercase().cmp(&b.name().to_lowercase()),
    }
}

/// Swallow a catalog failure (log at debug, yield `None`), but let
/// cancellation abort the run.
pub(crate) fn absorb<T>(result: CatalogResult<T>) -> Result<Option<T>, CompletionError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(CatalogError::Cancelled) => Err(CompletionError::Cancelled),
        Err(error) => {
            debug!(%error, "catalog lookup failed during completion");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompletionConfig;
    use sql_completion_test_utils::{MockCatalogBuilder, RequestBuilder};

    fn analyzer_for(sql: &str) -> CompletionAnalyzer {
        let catalog = MockCatalogBuilder::new().with_standard_schema().build();
        CompletionAnalyzer::new(RequestBuilder::new(catalog, sql).build())
    }

    fn analyzer_with_config(sql: &str, config: CompletionConfig) -> CompletionAnalyzer {
        let catalog = MockCatalogBuilder::new().with_standard_schema().build();
        CompletionAnalyzer::new(RequestBuilder::new(catalog, sql).with_config(config).build())
    }

    #[test]
    fn test_classification_is_idempotent() {
        let analyzer = analyzer_for("SELECT * FROM users WHERE status = '|");
        assert_eq!(analyzer.classify(), analyzer.classify());
    }

    #[test]
    fn test_classification_table() {
        let analyzer = analyzer_for("SELECT * FROM |");
        let classification = analyzer.classify();
        assert_eq!(classification.query_type, Some(QueryType::Table));
        assert!(!classification.suppress);
    }

    #[test]
    fn test_classification_join_and_column() {
        assert_eq!(
            analyzer_for("SELECT * FROM users u JOIN |").classify().query_type,
            Some(QueryType::Join)
        );
        assert_eq!(
            analyzer_for("SELECT * FROM users WHERE |").classify().query_type,
            Some(QueryType::Column)
        );
        assert_eq!(
            analyzer_for("CALL |").classify().query_type,
            Some(QueryType::Exec)
        );
    }

    #[test]
    fn test_classification_delete_and_insert_stay_unset() {
        assert_eq!(analyzer_for("DELETE |").classify().query_type, None);
        assert_eq!(analyzer_for("INSERT |").classify().query_type, None);
    }

    #[test]
    fn test_classification_into_column_list() {
        let classification = analyzer_for("INSERT INTO users (|").classify();
        assert_eq!(classification.query_type, Some(QueryType::Column));
        assert_eq!(classification.span_shift, 0);
    }

    #[test]
    fn test_classification_into_star_rewrites_prefix() {
        let classification = analyzer_for("INSERT INTO users (*|").classify();
        assert_eq!(classification.query_type, Some(QueryType::Column));
        assert_eq!(classification.search_prefix, "*");
        assert_eq!(classification.span_shift, -1);
    }

    #[test]
    fn test_classification_suppresses_into_literal() {
        let classification = analyzer_for("INSERT INTO users VALUES ('|')").classify();
        assert!(classification.suppress);
    }

    #[test]
    fn test_classification_procedure_declaration() {
        let classification = analyzer_for("CREATE PROCEDURE |").classify();
        assert_eq!(classification.query_type, None);
        assert!(!classification.exec_param);
    }

    #[test]
    fn test_object_name_mask_prefix_mode() {
        let analyzer = analyzer_for("SELECT pro|");
        assert_eq!(analyzer.make_object_name_mask("pro", false), "pro%");
        assert_eq!(analyzer.make_object_name_mask("", false), "%");
        assert_eq!(analyzer.make_object_name_mask("public.pro", true), "pro%");
        assert_eq!(analyzer.make_object_name_mask("public.", true), "%");
    }

    #[test]
    fn test_object_name_mask_inside_mode() {
        let config = CompletionConfig {
            search_inside_names: true,
            ..CompletionConfig::default()
        };
        let analyzer = analyzer_with_config("SELECT pro|", config);
        assert_eq!(analyzer.make_object_name_mask("pro", false), "%pro%");
        assert_eq!(analyzer.make_object_name_mask("", false), "%");
    }
}

