// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Completion request
//!
//! The immutable input of one analyzer run: the document, the cursor,
//! the active statement span, the partition verdict of the external
//! lexer, and the shared completion context (syntax manager, data
//! source, execution context, configuration).

use crate::config::CompletionConfig;
use crate::document::Document;
use sql_completion_catalog::{DataSource, ExecutionContext};
use sql_completion_dialect::SyntaxManager;
use std::sync::Arc;

/// Partition verdict at the cursor, produced by the editor's lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    /// Plain SQL code.
    Code,
    /// Inside a string literal.
    String,
    /// Inside a quoted identifier.
    QuotedIdentifier,
}

/// The smallest statement span containing the cursor.
#[derive(Debug, Clone)]
pub struct StatementSpan {
    /// Absolute offset of the statement start.
    pub offset: usize,
    /// Statement text.
    pub text: String,
}

impl StatementSpan {
    pub fn new(offset: usize, text: impl Into<String>) -> Self {
        Self {
            offset,
            text: text.into(),
        }
    }
}

/// Kind of proposal source selected by the context classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Table,
    Column,
    Join,
    Exec,
}

/// Shared environment of a completion request.
pub struct CompletionContext {
    pub syntax: SyntaxManager,
    pub data_source: Option<Arc<dyn DataSource>>,
    pub execution_context: Option<Arc<dyn ExecutionContext>>,
    pub config: CompletionConfig,
}

/// Immutable input of one analyzer run.
pub struct CompletionRequest {
    pub document: Arc<dyn Document>,
    pub offset: usize,
    pub active_statement: Option<StatementSpan>,
    pub partition: PartitionKind,
    pub context: Arc<CompletionContext>,
}

impl CompletionRequest {
    pub fn config(&self) -> &CompletionConfig {
        &self.context.config
    }

    pub fn syntax(&self) -> &SyntaxManager {
        &self.context.syntax
    }

    pub fn data_source(&self) -> Option<Arc<dyn DataSource>> {
        self.context.data_source.clone()
    }

    pub fn execution_context(&self) -> Option<Arc<dyn ExecutionContext>> {
        self.context.execution_context.clone()
    }

    pub fn is_simple_mode(&self) -> bool {
        self.context.config.simple_mode
    }
}
