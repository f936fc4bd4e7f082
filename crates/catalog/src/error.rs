// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for catalog operations
//!
//! This module defines the error types used throughout the catalog layer.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur during catalog operations
#[derive(Debug, Error, Clone, Serialize)]
pub enum CatalogError {
    /// The progress monitor was cancelled between catalog calls
    #[error("Operation cancelled")]
    Cancelled,

    /// Failed to connect to the database
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Metadata query execution failed
    #[error("Metadata query failed: {0}")]
    QueryFailed(String),

    /// Requested object was not found
    #[error("Object '{0}' not found in '{1}'")]
    ObjectNotFound(String, String),

    /// Permission denied for requested operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A cache-only monitor refused a live metadata read
    #[error("Metadata for '{0}' is not cached")]
    NotCached(String),

    /// The specified feature is not supported by this catalog implementation
    #[error("Feature not supported: {0}")]
    NotSupported(String),
}
