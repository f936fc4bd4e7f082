// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Request fixtures
//!
//! Builds [`CompletionRequest`]s from SQL snippets with a `|` cursor
//! marker, deriving the partition verdict and the active statement span
//! the way the editor layer would.

use sql_completion_analyzer::{
    CompletionConfig, CompletionContext, CompletionRequest, PartitionKind, StatementSpan,
    TextDocument,
};
use sql_completion_catalog::{DbObject, MemoryCatalog, MemoryExecutionContext, ObjectPath};
use sql_completion_dialect::{GenericDialect, SyntaxManager};
use std::sync::Arc;

/// Fluent builder for completion requests over a mock catalog.
pub struct RequestBuilder {
    catalog: Arc<MemoryCatalog>,
    sql: String,
    config: CompletionConfig,
    with_selection: bool,
}

impl RequestBuilder {
    /// `sql` must contain exactly one `|` marking the cursor.
    pub fn new(catalog: Arc<MemoryCatalog>, sql: &str) -> Self {
        Self {
            catalog,
            sql: sql.to_string(),
            config: CompletionConfig::default(),
            with_selection: true,
        }
    }

    pub fn with_config(mut self, config: CompletionConfig) -> Self {
        self.config = config;
        self
    }

    /// Build a request without a selected schema (no execution-context
    /// defaults).
    pub fn without_selection(mut self) -> Self {
        self.with_selection = false;
        self
    }

    pub fn build(self) -> CompletionRequest {
        let cursor = self.sql.find('|').expect("sql fixture needs a | cursor");
        let text = self.sql.replacen('|', "", 1);
        let document = Arc::new(TextDocument::new(&text));

        let partition = partition_at(&text, cursor);
        let statement = active_statement(&text, cursor);

        let syntax = SyntaxManager::new(Arc::new(GenericDialect::new()));
        let mut execution_context = MemoryExecutionContext::new(Arc::clone(&self.catalog));
        if self.with_selection {
            if let Some(schema) = schema_object(&self.catalog, "public") {
                execution_context = execution_context.with_default_schema(schema);
            }
        }

        CompletionRequest {
            document,
            offset: cursor,
            active_statement: Some(statement),
            partition,
            context: Arc::new(CompletionContext {
                syntax,
                data_source: Some(self.catalog.clone()),
                execution_context: Some(Arc::new(execution_context)),
                config: self.config,
            }),
        }
    }
}

fn schema_object(catalog: &Arc<MemoryCatalog>, name: &str) -> Option<DbObject> {
    catalog.container(&ObjectPath::from_parts([name])).map(|container| {
        let container: Arc<dyn sql_completion_catalog::ObjectContainer> = container;
        DbObject::Container(container)
    })
}

/// String partition when an odd number of single quotes precedes the
/// cursor; quoted-identifier partition for double quotes.
fn partition_at(text: &str, cursor: usize) -> PartitionKind {
    let before: String = text.chars().take(cursor).collect();
    let single = before.matches('\'').count();
    let double = before.matches('"').count();
    if single % 2 == 1 {
        PartitionKind::String
    } else if double % 2 == 1 {
        PartitionKind::QuotedIdentifier
    } else {
        PartitionKind::Code
    }
}

/// The `;`-delimited statement containing the cursor.
fn active_statement(text: &str, cursor: usize) -> StatementSpan {
    let before: String = text.chars().take(cursor).collect();
    let start = before.rfind(';').map(|i| i + 1).unwrap_or(0);
    let end = text[cursor..]
        .find(';')
        .map(|i| cursor + i)
        .unwrap_or(text.len());
    let raw = &text[start..end];
    let trimmed_start = start + (raw.len() - raw.trim_start().len());
    StatementSpan::new(trimmed_start, raw.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockCatalogBuilder;

    #[test]
    fn test_partition_detection() {
        assert_eq!(partition_at("WHERE x = 'a", 12), PartitionKind::String);
        assert_eq!(partition_at("WHERE x = 'a'", 13), PartitionKind::Code);
        assert_eq!(partition_at("SELECT \"co", 10), PartitionKind::QuotedIdentifier);
    }

    #[test]
    fn test_active_statement_span() {
        let statement = active_statement("SELECT 1; SELECT name FROM users", 20);
        assert_eq!(statement.offset, 10);
        assert_eq!(statement.text, "SELECT name FROM users");
    }

    #[test]
    fn test_request_builder() {
        let catalog = MockCatalogBuilder::new().with_standard_schema().build();
        let request = RequestBuilder::new(catalog, "SELECT * FROM us|").build();
        assert_eq!(request.offset, 16);
        assert_eq!(request.partition, PartitionKind::Code);
        assert!(request.active_statement.is_some());
        assert!(request.context.execution_context.is_some());
    }
}
