// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog object model
//!
//! The completion analyzer sees a database as a lazy, monitor-driven tree
//! of objects: data source root → catalogs → schemas → entities →
//! attributes, with procedures and synonyms interleaved. The node types
//! fall into two groups:
//!
//! - capability traits for nodes that answer questions lazily
//!   ([`ObjectContainer`], [`Entity`], [`Synonym`]): every call may
//!   suspend to do I/O and receives a [`ProgressMonitor`]
//! - plain records for leaf data ([`EntityAttribute`], [`Procedure`],
//!   [`ObjectReference`], [`Association`])
//!
//! [`DbObject`] is the tagged variant the analyzer dispatches on.

use crate::assistant::StructureAssistant;
use crate::error::CatalogResult;
use crate::filter::DataSourceSettings;
use crate::monitor::ProgressMonitor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

/// Absolute position of an object under the data source root.
///
/// The root itself has the empty path; a column of `public.users` lives
/// at `["public", "users", "<column>"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectPath(Vec<String>);

impl ObjectPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut parts = self.0.clone();
        parts.push(name.into());
        Self(parts)
    }

    pub fn parent(&self) -> Option<ObjectPath> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Dotted name relative to the data source root.
    pub fn qualified_name(&self, separator: char) -> String {
        let mut out = String::new();
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(separator);
            }
            out.push_str(part);
        }
        out
    }
}

/// Class tag used by structure assistants and navigator filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    Catalog,
    Schema,
    Table,
    View,
    Column,
    Procedure,
    Synonym,
}

/// Column data type, reduced to what proposal rendering needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    BigInt,
    Decimal,
    Float,
    Varchar(Option<u32>),
    Text,
    Boolean,
    Date,
    Time,
    Timestamp,
    Json,
    Uuid,
    Other(String),
}

impl DataType {
    /// True if values of this type render as quoted SQL literals.
    pub fn is_string_like(&self) -> bool {
        matches!(
            self,
            DataType::Varchar(_)
                | DataType::Text
                | DataType::Date
                | DataType::Time
                | DataType::Timestamp
                | DataType::Uuid
                | DataType::Json
        )
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Integer => write!(f, "INTEGER"),
            DataType::BigInt => write!(f, "BIGINT"),
            DataType::Decimal => write!(f, "DECIMAL"),
            DataType::Float => write!(f, "FLOAT"),
            DataType::Varchar(Some(len)) => write!(f, "VARCHAR({len})"),
            DataType::Varchar(None) => write!(f, "VARCHAR"),
            DataType::Text => write!(f, "TEXT"),
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::Date => write!(f, "DATE"),
            DataType::Time => write!(f, "TIME"),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
            DataType::Json => write!(f, "JSON"),
            DataType::Uuid => write!(f, "UUID"),
            DataType::Other(name) => write!(f, "{name}"),
        }
    }
}

/// A single attribute value read during value enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl DataValue {
    /// Value as it appears inside an already-open string literal.
    pub fn native_text(&self) -> String {
        match self {
            DataValue::Null => "NULL".to_string(),
            DataValue::Bool(b) => b.to_string(),
            DataValue::Int(i) => i.to_string(),
            DataValue::Float(v) => v.to_string(),
            DataValue::Text(s) => s.clone(),
        }
    }

    /// Value as a standalone SQL literal.
    pub fn to_sql_literal(&self) -> String {
        match self {
            DataValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
            other => other.native_text(),
        }
    }

    /// Ordering used to sort enumerated values before proposing them.
    pub fn compare(&self, other: &DataValue) -> Ordering {
        use DataValue::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Less,
            (_, Null) => Ordering::Greater,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Int(a), Float(b)) => (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal),
            (Float(a), Int(b)) => a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal),
            (Text(a), Text(b)) => a.cmp(b),
            (Bool(_), _) => Ordering::Less,
            (_, Bool(_)) => Ordering::Greater,
            (Text(_), _) => Ordering::Greater,
            (_, Text(_)) => Ordering::Less,
        }
    }
}

/// Value plus optional dictionary label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelValue {
    pub value: DataValue,
    pub label: Option<String>,
}

impl LabelValue {
    pub fn plain(value: DataValue) -> Self {
        Self { value, label: None }
    }

    pub fn labeled(value: DataValue, label: impl Into<String>) -> Self {
        Self {
            value,
            label: Some(label.into()),
        }
    }
}

/// Where an attribute's proposal values come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValueSource {
    /// Values cannot be enumerated.
    NotEnumerable,
    /// Values are read from the column itself.
    Enumerable,
    /// Values come from a referenced dictionary entity.
    Dictionary { entity: ObjectPath },
}

/// Typed column of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityAttribute {
    pub name: String,
    pub entity_path: ObjectPath,
    pub data_type: DataType,
    pub ordinal: u32,
    pub nullable: bool,
    pub hidden: bool,
    pub value_source: AttributeValueSource,
}

impl EntityAttribute {
    pub fn new(name: impl Into<String>, entity_path: ObjectPath, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            entity_path,
            data_type,
            ordinal: 0,
            nullable: true,
            hidden: false,
            value_source: AttributeValueSource::NotEnumerable,
        }
    }

    pub fn with_ordinal(mut self, ordinal: u32) -> Self {
        self.ordinal = ordinal;
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn with_value_source(mut self, source: AttributeValueSource) -> Self {
        self.value_source = source;
        self
    }

    pub fn path(&self) -> ObjectPath {
        self.entity_path.child(self.name.clone())
    }
}

/// Foreign-key style association between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub name: String,
    /// Referencing entity.
    pub owner: ObjectPath,
    /// Referenced entity.
    pub referenced_entity: ObjectPath,
    /// `(owner column, referenced column)` pairs.
    pub attribute_pairs: Vec<(String, String)>,
}

/// Routine flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutineKind {
    Procedure,
    Function,
}

/// Stored routine record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    pub name: String,
    pub container: ObjectPath,
    pub kind: RoutineKind,
}

impl Procedure {
    pub fn new(name: impl Into<String>, container: ObjectPath, kind: RoutineKind) -> Self {
        Self {
            name: name.into(),
            container,
            kind,
        }
    }

    pub fn path(&self) -> ObjectPath {
        self.container.child(self.name.clone())
    }
}

/// Unresolved handle returned by structure assistants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectReference {
    pub name: String,
    pub container: ObjectPath,
    pub object_type: ObjectType,
}

impl ObjectReference {
    pub fn new(name: impl Into<String>, container: ObjectPath, object_type: ObjectType) -> Self {
        Self {
            name: name.into(),
            container,
            object_type,
        }
    }

    pub fn path(&self) -> ObjectPath {
        self.container.child(self.name.clone())
    }
}

/// Node that holds other nodes and can pre-cache its structure.
#[async_trait]
pub trait ObjectContainer: Send + Sync {
    fn name(&self) -> &str;

    fn path(&self) -> &ObjectPath;

    fn container_type(&self) -> ObjectType;

    fn is_hidden(&self) -> bool {
        false
    }

    /// Virtual containers are flattened during child enumeration.
    fn is_virtual(&self) -> bool {
        false
    }

    /// Ask the driver to bulk-load direct children.
    async fn cache_structure(&self, monitor: &ProgressMonitor) -> CatalogResult<()>;

    /// Look up a direct child by name.
    async fn child(&self, monitor: &ProgressMonitor, name: &str) -> CatalogResult<Option<DbObject>>;

    /// All direct children.
    async fn children(&self, monitor: &ProgressMonitor) -> CatalogResult<Vec<DbObject>>;
}

/// Table-like node with attributes and associations.
#[async_trait]
pub trait Entity: Send + Sync {
    fn name(&self) -> &str;

    fn path(&self) -> &ObjectPath;

    fn is_hidden(&self) -> bool {
        false
    }

    async fn attributes(
        &self,
        monitor: &ProgressMonitor,
    ) -> CatalogResult<Vec<Arc<EntityAttribute>>>;

    async fn attribute(
        &self,
        monitor: &ProgressMonitor,
        name: &str,
    ) -> CatalogResult<Option<Arc<EntityAttribute>>>;

    async fn associations(&self, monitor: &ProgressMonitor) -> CatalogResult<Vec<Association>>;
}

/// Alias node resolving to another object.
#[async_trait]
pub trait Synonym: Send + Sync {
    fn name(&self) -> &str;

    fn path(&self) -> &ObjectPath;

    async fn target(&self, monitor: &ProgressMonitor) -> CatalogResult<Option<DbObject>>;
}

/// Tagged variant over every catalog node the analyzer can meet.
#[derive(Clone)]
pub enum DbObject {
    Container(Arc<dyn ObjectContainer>),
    Entity(Arc<dyn Entity>),
    Attribute(Arc<EntityAttribute>),
    Procedure(Arc<Procedure>),
    Synonym(Arc<dyn Synonym>),
    Reference(Arc<ObjectReference>),
}

impl DbObject {
    pub fn name(&self) -> &str {
        match self {
            DbObject::Container(c) => c.name(),
            DbObject::Entity(e) => e.name(),
            DbObject::Attribute(a) => &a.name,
            DbObject::Procedure(p) => &p.name,
            DbObject::Synonym(s) => s.name(),
            DbObject::Reference(r) => &r.name,
        }
    }

    pub fn path(&self) -> ObjectPath {
        match self {
            DbObject::Container(c) => c.path().clone(),
            DbObject::Entity(e) => e.path().clone(),
            DbObject::Attribute(a) => a.path(),
            DbObject::Procedure(p) => p.path(),
            DbObject::Synonym(s) => s.path().clone(),
            DbObject::Reference(r) => r.path(),
        }
    }

    /// Path of the owning container, if any.
    pub fn container_path(&self) -> Option<ObjectPath> {
        match self {
            DbObject::Attribute(a) => Some(a.entity_path.clone()),
            DbObject::Procedure(p) => Some(p.container.clone()),
            DbObject::Reference(r) => Some(r.container.clone()),
            other => other.path().parent(),
        }
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            DbObject::Container(c) => c.container_type(),
            DbObject::Entity(_) => ObjectType::Table,
            DbObject::Attribute(_) => ObjectType::Column,
            DbObject::Procedure(_) => ObjectType::Procedure,
            DbObject::Synonym(_) => ObjectType::Synonym,
            DbObject::Reference(r) => r.object_type,
        }
    }

    pub fn is_hidden(&self) -> bool {
        match self {
            DbObject::Container(c) => c.is_hidden(),
            DbObject::Entity(e) => e.is_hidden(),
            DbObject::Attribute(a) => a.hidden,
            _ => false,
        }
    }

    pub fn is_virtual(&self) -> bool {
        match self {
            DbObject::Container(c) => c.is_virtual(),
            _ => false,
        }
    }

    pub fn as_container(&self) -> Option<Arc<dyn ObjectContainer>> {
        match self {
            DbObject::Container(c) => Some(Arc::clone(c)),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<Arc<dyn Entity>> {
        match self {
            DbObject::Entity(e) => Some(Arc::clone(e)),
            _ => None,
        }
    }

    pub fn as_attribute(&self) -> Option<Arc<EntityAttribute>> {
        match self {
            DbObject::Attribute(a) => Some(Arc::clone(a)),
            _ => None,
        }
    }

    pub fn as_synonym(&self) -> Option<Arc<dyn Synonym>> {
        match self {
            DbObject::Synonym(s) => Some(Arc::clone(s)),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<Arc<ObjectReference>> {
        match self {
            DbObject::Reference(r) => Some(Arc::clone(r)),
            _ => None,
        }
    }
}

impl std::fmt::Debug for DbObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            DbObject::Container(_) => "Container",
            DbObject::Entity(_) => "Entity",
            DbObject::Attribute(_) => "Attribute",
            DbObject::Procedure(_) => "Procedure",
            DbObject::Synonym(_) => "Synonym",
            DbObject::Reference(_) => "Reference",
        };
        write!(f, "{}({})", kind, self.path().qualified_name('.'))
    }
}

/// Root handle of a connected data source.
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;

    /// Root container of the object tree.
    fn root(&self) -> Arc<dyn ObjectContainer>;

    /// Container-level settings (cache policy, navigator filters).
    fn settings(&self) -> &DataSourceSettings;

    /// Mask-search capability, if the driver provides one.
    fn structure_assistant(&self) -> Option<Arc<dyn StructureAssistant>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path() {
        let path = ObjectPath::from_parts(["public", "users"]);
        assert_eq!(path.qualified_name('.'), "public.users");
        assert_eq!(path.last(), Some("users"));
        assert_eq!(path.parent().unwrap().qualified_name('.'), "public");
        assert!(ObjectPath::root().is_root());
        assert_eq!(path.child("id").qualified_name('.'), "public.users.id");
    }

    #[test]
    fn test_data_value_literals() {
        assert_eq!(DataValue::Text("it's".into()).to_sql_literal(), "'it''s'");
        assert_eq!(DataValue::Int(42).to_sql_literal(), "42");
        assert_eq!(DataValue::Text("active".into()).native_text(), "active");
        assert_eq!(DataValue::Null.to_sql_literal(), "NULL");
    }

    #[test]
    fn test_data_value_ordering() {
        let mut values = vec![
            DataValue::Text("b".into()),
            DataValue::Null,
            DataValue::Text("a".into()),
        ];
        values.sort_by(|a, b| a.compare(b));
        assert_eq!(values[0], DataValue::Null);
        assert_eq!(values[1], DataValue::Text("a".into()));
    }
}
