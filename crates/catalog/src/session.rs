// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Execution context and value sessions
//!
//! The execution context carries the session-selected defaults (catalog,
//! schema, selected object chain) and opens scoped sessions for value
//! enumeration. A session is released when dropped; the analyzer keeps it
//! alive only for the duration of one value-enumeration step.

use crate::error::CatalogResult;
use crate::model::{DbObject, EntityAttribute, LabelValue, ObjectPath};
use crate::monitor::ProgressMonitor;
use async_trait::async_trait;

/// Session-selected defaults of a connected editor.
pub trait ExecutionContext: Send + Sync {
    /// Currently selected catalog, if the source has catalogs.
    fn default_catalog(&self) -> Option<DbObject>;

    /// Currently selected schema.
    fn default_schema(&self) -> Option<DbObject>;

    /// Selected object chain, outermost first (e.g. catalog, then schema).
    fn selected_objects(&self) -> Vec<DbObject>;

    /// The innermost selected object.
    fn active_object(&self) -> Option<DbObject> {
        self.selected_objects().into_iter().next_back()
    }

    /// Open a metadata session. Dropping the returned session releases it.
    fn open_session(
        &self,
        monitor: &ProgressMonitor,
        purpose: &str,
    ) -> CatalogResult<Box<dyn ValueSession>>;
}

/// Scoped session used to read attribute values.
#[async_trait]
pub trait ValueSession: Send + Sync {
    /// Read up to `max_results` distinct values of the attribute,
    /// optionally restricted to values starting with `pattern`.
    async fn attribute_values(
        &self,
        monitor: &ProgressMonitor,
        attribute: &EntityAttribute,
        pattern: Option<&str>,
        max_results: usize,
    ) -> CatalogResult<Vec<LabelValue>>;

    /// Read up to `max_results` label/value pairs from a dictionary
    /// entity.
    async fn dictionary_values(
        &self,
        monitor: &ProgressMonitor,
        dictionary: &ObjectPath,
        max_results: usize,
    ) -> CatalogResult<Vec<LabelValue>>;
}
