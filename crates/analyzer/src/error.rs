// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Completion error types
//!
//! Only two things can interrupt an analyzer run: cancellation through
//! the progress monitor, and catalog failures that the analyzer chose
//! not to absorb. Ordinary catalog errors during resolution are logged
//! and the affected step yields no children.

use sql_completion_catalog::CatalogError;

/// Errors surfaced by a completion run.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// The progress monitor was cancelled; the caller discards partial
    /// results.
    #[error("Completion cancelled")]
    Cancelled,

    /// Catalog failure that aborted the run.
    #[error("Catalog error: {0}")]
    Catalog(CatalogError),
}

impl From<CatalogError> for CompletionError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::Cancelled => CompletionError::Cancelled,
            other => CompletionError::Catalog(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_maps_to_cancelled() {
        let error: CompletionError = CatalogError::Cancelled.into();
        assert!(matches!(error, CompletionError::Cancelled));

        let error: CompletionError = CatalogError::QueryFailed("boom".into()).into();
        assert!(matches!(error, CompletionError::Catalog(_)));
    }
}
