// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Attribute value proposals
//!
//! At value positions (`WHERE status = '|'`) the analyzer proposes the
//! values of the column named left of the operator. Dictionary-backed
//! columns read label/value pairs from the referenced dictionary entity;
//! plain enumerable columns read their own values. The metadata session
//! is scoped to this one step and released on every exit path.

use crate::analyzer::{absorb, CompletionAnalyzer, MAX_ATTRIBUTE_VALUE_PROPOSALS};
use crate::error::CompletionError;
use sql_completion_catalog::{
    AttributeValueSource, Entity, LabelValue, ProgressMonitor,
};
use sql_completion_dialect::KeywordKind;
use std::sync::Arc;
use tracing::debug;

impl CompletionAnalyzer {
    /// Propose values of the attribute named by the last previous word.
    ///
    /// `in_literal` selects the rendering: inside a string literal the
    /// raw value is inserted, otherwise a SQL literal.
    pub(crate) async fn make_proposals_from_attribute_values(
        &mut self,
        monitor: &ProgressMonitor,
        in_literal: bool,
        entity: &Arc<dyn Entity>,
    ) -> Result<(), CompletionError> {
        let Some(last_word) = self.prev_words.last() else {
            return Ok(());
        };
        let mut column_name = last_word.clone();
        if !self.detector.is_quoted(&column_name) {
            let separator = self.request.syntax().struct_separator();
            if let Some(position) = column_name.find(separator) {
                column_name = column_name[position + separator.len_utf8()..].to_string();
            }
        }
        let column_name = self.detector.remove_quotes(&column_name);

        let Some(attribute) = absorb(entity.attribute(monitor, &column_name).await)?.flatten()
        else {
            return Ok(());
        };
        let Some(context) = self.request.execution_context() else {
            return Ok(());
        };
        let session = match context.open_session(monitor, "Read attribute values") {
            Ok(session) => session,
            Err(sql_completion_catalog::CatalogError::Cancelled) => {
                return Err(CompletionError::Cancelled)
            }
            Err(error) => {
                debug!(%error, "can't open metadata session for value enumeration");
                return Ok(());
            }
        };

        let mut values: Vec<LabelValue> = Vec::new();
        if let AttributeValueSource::Dictionary { entity: dictionary } = &attribute.value_source {
            values = absorb(
                session
                    .dictionary_values(monitor, dictionary, MAX_ATTRIBUTE_VALUE_PROPOSALS)
                    .await,
            )?
            .unwrap_or_default();
        }
        if values.is_empty() && attribute.value_source == AttributeValueSource::Enumerable {
            let full_word = self.detector.full_word().to_string();
            let pattern = if in_literal && !full_word.is_empty() {
                Some(full_word)
            } else {
                None
            };
            values = absorb(
                session
                    .attribute_values(
                        monitor,
                        &attribute,
                        pattern.as_deref(),
                        MAX_ATTRIBUTE_VALUE_PROPOSALS,
                    )
                    .await,
            )?
            .unwrap_or_default();
        }
        if values.is_empty() {
            return Ok(());
        }

        values.sort_by(|a, b| a.value.compare(&b.value));
        for pair in values {
            let replacement = if in_literal {
                pair.value.native_text()
            } else {
                pair.value.to_sql_literal()
            };
            let mut display = replacement.clone();
            if let Some(label) = &pair.label {
                if *label != pair.value.native_text() {
                    display = format!("{display} - {label}");
                }
            }
            let proposal = self.raw_proposal(display, replacement, KeywordKind::Literal);
            self.proposals.push(proposal);
        }
        Ok(())
    }
}
