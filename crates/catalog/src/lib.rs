// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL Completion - Catalog Layer
//!
//! This crate provides the database abstraction consumed by the
//! completion analyzer. It defines:
//!
//! - the lazy, monitor-driven object tree ([`DbObject`] and the
//!   [`ObjectContainer`]/[`Entity`]/[`Synonym`] capability traits)
//! - [`ProgressMonitor`] with cooperative cancellation and the
//!   local-cache policy
//! - the [`StructureAssistant`] mask-search contract
//! - navigator [`ObjectFilter`]s and container settings
//! - scoped [`ValueSession`]s for attribute value enumeration
//! - [`MemoryCatalog`], a complete in-memory implementation used by the
//!   playground and the test suites
//!
//! ## Architecture
//!
//! The analyzer never touches a database driver directly. Every lookup
//! goes through the traits defined here, every call takes a monitor, and
//! every call may suspend. Drivers decide whether a cache-only monitor
//! can be answered; the in-memory catalog always can.

pub mod assistant;
pub mod error;
pub mod filter;
pub mod memory;
pub mod model;
pub mod monitor;
pub mod session;

// Re-exports
pub use assistant::{ObjectSearchParams, StructureAssistant};
pub use error::{CatalogError, CatalogResult};
pub use filter::{DataSourceSettings, FilterBinding, ObjectFilter};
pub use memory::{MemoryCatalog, MemoryContainer, MemoryEntity, MemoryExecutionContext};
pub use model::{
    Association, AttributeValueSource, DataSource, DataType, DataValue, DbObject, Entity,
    EntityAttribute, LabelValue, ObjectContainer, ObjectPath, ObjectReference, ObjectType,
    Procedure, RoutineKind, Synonym,
};
pub use monitor::{CancelHandle, ProgressMonitor};
pub use session::{ExecutionContext, ValueSession};
