// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Structure assistant
//!
//! Drivers that can search their catalog by mask without the caller
//! knowing the schema expose this capability. The analyzer uses it as a
//! fallback when dotted-path descent fails and for procedure search.

use crate::error::CatalogResult;
use crate::model::{DbObject, ObjectPath, ObjectReference, ObjectType};
use crate::monitor::ProgressMonitor;
use async_trait::async_trait;

/// Parameters of a mask search.
#[derive(Debug, Clone)]
pub struct ObjectSearchParams {
    /// Object classes to look for.
    pub object_types: Vec<ObjectType>,
    /// SQL mask (`%`/`_`) the object name must match.
    pub mask: String,
    /// Restrict the search below this container.
    pub parent: Option<ObjectPath>,
    /// Match the mask case-sensitively (quoted input).
    pub case_sensitive: bool,
    /// Search outside the selected container too.
    pub global_search: bool,
    /// Upper bound on returned references.
    pub max_results: usize,
}

impl ObjectSearchParams {
    pub fn new(object_types: Vec<ObjectType>, mask: impl Into<String>) -> Self {
        Self {
            object_types,
            mask: mask.into(),
            parent: None,
            case_sensitive: false,
            global_search: false,
            max_results: 100,
        }
    }

    pub fn with_parent(mut self, parent: Option<ObjectPath>) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_global_search(mut self, global_search: bool) -> Self {
        self.global_search = global_search;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

/// Mask-search capability of a data source.
#[async_trait]
pub trait StructureAssistant: Send + Sync {
    /// Object classes searched when the caller does not narrow the search.
    fn auto_complete_object_types(&self) -> Vec<ObjectType>;

    /// Find objects whose name matches the mask.
    async fn find_objects_by_mask(
        &self,
        monitor: &ProgressMonitor,
        params: &ObjectSearchParams,
    ) -> CatalogResult<Vec<ObjectReference>>;

    /// Resolve a reference returned by [`find_objects_by_mask`] to a live
    /// object.
    ///
    /// [`find_objects_by_mask`]: StructureAssistant::find_objects_by_mask
    async fn resolve_reference(
        &self,
        monitor: &ProgressMonitor,
        reference: &ObjectReference,
    ) -> CatalogResult<Option<DbObject>>;
}
