// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Navigator object filters
//!
//! Users can hide catalog objects per container and per object class with
//! include/exclude glob lists. The data source container carries these
//! filters together with the cache policy flag; the analyzer applies them
//! as the last proposal filtering step.

use crate::model::{ObjectPath, ObjectType};
use serde::{Deserialize, Serialize};
use sql_completion_dialect::text::glob_matches;

/// Include/exclude glob filter over object names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectFilter {
    pub enabled: bool,
    /// Keep only names matching one of these globs (empty = keep all).
    pub include: Vec<String>,
    /// Drop names matching one of these globs.
    pub exclude: Vec<String>,
}

impl ObjectFilter {
    pub fn new() -> Self {
        Self {
            enabled: true,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    pub fn including(mut self, pattern: impl Into<String>) -> Self {
        self.include.push(pattern.into());
        self
    }

    pub fn excluding(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// True if the name survives the filter.
    pub fn matches(&self, name: &str) -> bool {
        if !self.enabled {
            return true;
        }
        if self.exclude.iter().any(|p| glob_matches(p, name)) {
            return false;
        }
        if self.include.is_empty() {
            return true;
        }
        self.include.iter().any(|p| glob_matches(p, name))
    }
}

/// A filter bound to an object class and optionally to one container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterBinding {
    pub object_type: ObjectType,
    /// `None` binds the filter to every container.
    pub container: Option<ObjectPath>,
    pub filter: ObjectFilter,
}

/// Container-level settings the analyzer reads from the data source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSourceSettings {
    /// Allow live metadata reads during completion; when off, child
    /// enumeration runs on the local-cache monitor only.
    pub extra_metadata_read: bool,
    /// Navigator object filters.
    pub filters: Vec<FilterBinding>,
}

impl DataSourceSettings {
    /// Find the filter bound to this object class and container.
    ///
    /// A binding with an explicit container wins over a global one.
    pub fn object_filter(
        &self,
        object_type: ObjectType,
        container: Option<&ObjectPath>,
    ) -> Option<&ObjectFilter> {
        let mut global = None;
        for binding in &self.filters {
            if binding.object_type != object_type {
                continue;
            }
            match (&binding.container, container) {
                (Some(bound), Some(actual)) if bound == actual => return Some(&binding.filter),
                (None, _) => global = Some(&binding.filter),
                _ => {}
            }
        }
        global
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_include_exclude() {
        let filter = ObjectFilter::new().including("users*").excluding("*_tmp");
        assert!(filter.matches("users"));
        assert!(filter.matches("users_archive"));
        assert!(!filter.matches("users_tmp"));
        assert!(!filter.matches("orders"));
    }

    #[test]
    fn test_disabled_filter_matches_everything() {
        let filter = ObjectFilter {
            enabled: false,
            include: vec!["nope".into()],
            exclude: vec!["*".into()],
        };
        assert!(filter.matches("anything"));
    }

    #[test]
    fn test_settings_container_binding_wins() {
        let schema = ObjectPath::from_parts(["public"]);
        let settings = DataSourceSettings {
            extra_metadata_read: true,
            filters: vec![
                FilterBinding {
                    object_type: ObjectType::Table,
                    container: None,
                    filter: ObjectFilter::new().excluding("*"),
                },
                FilterBinding {
                    object_type: ObjectType::Table,
                    container: Some(schema.clone()),
                    filter: ObjectFilter::new(),
                },
            ],
        };
        let bound = settings
            .object_filter(ObjectType::Table, Some(&schema))
            .unwrap();
        assert!(bound.matches("users"));
        let global = settings.object_filter(ObjectType::Table, None).unwrap();
        assert!(!global.matches("users"));
    }
}
