// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL Completion - Analyzer
//!
//! The completion analyzer core: given a document, a cursor offset and a
//! live catalog view, compute a ranked list of completion proposals
//! appropriate to the cursor's syntactic context.
//!
//! ## Architecture
//!
//! - `word_detector`: lexical neighborhood of the cursor
//! - `table_refs`: `table → alias` extraction from the active statement
//!   (pattern-based by default, structural opt-in)
//! - `analyzer`: context classification and catalog resolution
//! - `proposal`: replacement-string construction (aliases,
//!   qualification, quoting, case folding)
//! - `values`: attribute value enumeration at value positions
//! - `filter`: keyword assist and post-filtering
//! - `hippie`: in-document word completion
//!
//! ## Flow
//!
//! ```text
//! 1. Editor builds a CompletionRequest (document, offset, statement,
//!    partition verdict, context)
//!    ↓
//! 2. CompletionAnalyzer::new(request)
//!    ↓
//! 3. analyzer.run(&monitor).await
//!    ↓
//! 4. CompletionOutcome { proposals, search_finished }
//! ```
//!
//! The analyzer is single-use and synchronous per invocation: every
//! catalog call is a suspension point on the caller's task, nothing is
//! cached across runs, and cancelling the monitor aborts the run.

pub mod analyzer;
pub mod config;
pub mod document;
pub mod error;
pub mod filter;
pub mod hippie;
pub mod proposal;
pub mod request;
pub mod table_refs;
pub mod values;
pub mod word_detector;

// Re-exports
pub use analyzer::{
    CompletionAnalyzer, CompletionOutcome, MAX_ATTRIBUTE_VALUE_PROPOSALS, MAX_STRUCT_PROPOSALS,
};
pub use config::{AliasInsertMode, CompletionConfig, InsertCase};
pub use document::{Document, TextDocument};
pub use error::CompletionError;
pub use proposal::{Proposal, ProposalParams};
pub use request::{
    CompletionContext, CompletionRequest, PartitionKind, QueryType, StatementSpan,
};
pub use table_refs::{
    PatternTableRefs, StructuralTableRefs, TableRef, TableReferencesAnalyzer,
};
pub use word_detector::WordDetector;
