// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # In-memory catalog
//!
//! A complete catalog implementation backed by plain data structures.
//! Used by the playground and the test suites; it is also the reference
//! for driver authors because it implements every capability the
//! analyzer consumes: the container tree, entities with associations,
//! synonyms, the structure assistant and value sessions.

use crate::assistant::{ObjectSearchParams, StructureAssistant};
use crate::error::{CatalogError, CatalogResult};
use crate::filter::DataSourceSettings;
use crate::model::{
    Association, DataSource, DbObject, Entity, EntityAttribute, LabelValue, ObjectContainer,
    ObjectPath, ObjectReference, ObjectType, Procedure, RoutineKind, Synonym,
};
use crate::monitor::ProgressMonitor;
use crate::session::{ExecutionContext, ValueSession};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

/// In-memory data source.
pub struct MemoryCatalog {
    name: String,
    root: Arc<MemoryContainer>,
    entities: Arc<RwLock<HashMap<String, Arc<MemoryEntity>>>>,
    containers: Arc<RwLock<HashMap<String, Arc<MemoryContainer>>>>,
    settings: DataSourceSettings,
}

impl MemoryCatalog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: Arc::new(MemoryContainer::new(
                String::new(),
                ObjectPath::root(),
                ObjectType::Catalog,
                false,
            )),
            entities: Arc::new(RwLock::new(HashMap::new())),
            containers: Arc::new(RwLock::new(HashMap::new())),
            settings: DataSourceSettings::default(),
        }
    }

    pub fn set_settings(&mut self, settings: DataSourceSettings) {
        self.settings = settings;
    }

    pub fn root_container(&self) -> Arc<MemoryContainer> {
        Arc::clone(&self.root)
    }

    /// Add a child container under `parent`.
    pub fn add_container(
        &self,
        parent: &Arc<MemoryContainer>,
        name: impl Into<String>,
        container_type: ObjectType,
    ) -> Arc<MemoryContainer> {
        let name = name.into();
        let container = Arc::new(MemoryContainer::new(
            name.clone(),
            parent.path.child(name),
            container_type,
            false,
        ));
        parent.push_child(DbObject::Container(container.clone()));
        self.containers
            .write()
            .expect("container index poisoned")
            .insert(container.path.qualified_name('.'), container.clone());
        container
    }

    /// Add a virtual container; child enumeration flattens its children
    /// into the parent's proposals.
    pub fn add_virtual_container(
        &self,
        parent: &Arc<MemoryContainer>,
        name: impl Into<String>,
        container_type: ObjectType,
    ) -> Arc<MemoryContainer> {
        let name = name.into();
        let container = Arc::new(MemoryContainer::new(
            name.clone(),
            parent.path.child(name),
            container_type,
            true,
        ));
        parent.push_child(DbObject::Container(container.clone()));
        self.containers
            .write()
            .expect("container index poisoned")
            .insert(container.path.qualified_name('.'), container.clone());
        container
    }

    /// Add an entity (table) under `parent`.
    pub fn add_entity(
        &self,
        parent: &Arc<MemoryContainer>,
        name: impl Into<String>,
    ) -> Arc<MemoryEntity> {
        let name = name.into();
        let entity = Arc::new(MemoryEntity::new(name.clone(), parent.path.child(name)));
        parent.push_child(DbObject::Entity(entity.clone()));
        self.entities
            .write()
            .expect("entity index poisoned")
            .insert(entity.path.qualified_name('.'), entity.clone());
        entity
    }

    /// Add a synonym pointing at an existing object.
    pub fn add_synonym(
        &self,
        parent: &Arc<MemoryContainer>,
        name: impl Into<String>,
        target: DbObject,
    ) -> Arc<MemorySynonym> {
        let name = name.into();
        let synonym = Arc::new(MemorySynonym {
            name: name.clone(),
            path: parent.path.child(name),
            target,
        });
        parent.push_child(DbObject::Synonym(synonym.clone()));
        synonym
    }

    /// Add a stored routine under `parent`.
    pub fn add_procedure(
        &self,
        parent: &Arc<MemoryContainer>,
        name: impl Into<String>,
        kind: RoutineKind,
    ) -> Arc<Procedure> {
        let procedure = Arc::new(Procedure::new(name, parent.path.clone(), kind));
        parent.push_child(DbObject::Procedure(procedure.clone()));
        procedure
    }

    /// Synchronous container lookup. The in-memory tree never suspends,
    /// so fixtures and wiring code can reach containers directly.
    pub fn container(&self, path: &ObjectPath) -> Option<Arc<MemoryContainer>> {
        if path.is_root() {
            return Some(Arc::clone(&self.root));
        }
        self.containers
            .read()
            .expect("container index poisoned")
            .get(&path.qualified_name('.'))
            .cloned()
    }

    /// Look up a registered entity by path.
    pub fn entity(&self, path: &ObjectPath) -> Option<Arc<MemoryEntity>> {
        self.entities
            .read()
            .expect("entity index poisoned")
            .get(&path.qualified_name('.'))
            .cloned()
    }
}

impl DataSource for MemoryCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    fn root(&self) -> Arc<dyn ObjectContainer> {
        self.root.clone()
    }

    fn settings(&self) -> &DataSourceSettings {
        &self.settings
    }

    fn structure_assistant(&self) -> Option<Arc<dyn StructureAssistant>> {
        Some(Arc::new(MemoryAssistant {
            root: Arc::clone(&self.root),
        }))
    }
}

/// Container node of the in-memory tree.
pub struct MemoryContainer {
    name: String,
    path: ObjectPath,
    container_type: ObjectType,
    virtual_container: bool,
    children: RwLock<Vec<DbObject>>,
}

impl MemoryContainer {
    fn new(name: String, path: ObjectPath, container_type: ObjectType, virtual_: bool) -> Self {
        Self {
            name,
            path,
            container_type,
            virtual_container: virtual_,
            children: RwLock::new(Vec::new()),
        }
    }

    fn push_child(&self, child: DbObject) {
        self.children
            .write()
            .expect("children poisoned")
            .push(child);
    }

    fn children_snapshot(&self) -> Vec<DbObject> {
        self.children.read().expect("children poisoned").clone()
    }
}

#[async_trait]
impl ObjectContainer for MemoryContainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &ObjectPath {
        &self.path
    }

    fn container_type(&self) -> ObjectType {
        self.container_type
    }

    fn is_virtual(&self) -> bool {
        self.virtual_container
    }

    async fn cache_structure(&self, monitor: &ProgressMonitor) -> CatalogResult<()> {
        monitor.check_cancelled()
    }

    async fn child(&self, monitor: &ProgressMonitor, name: &str) -> CatalogResult<Option<DbObject>> {
        monitor.check_cancelled()?;
        let children = self.children.read().expect("children poisoned");
        if let Some(exact) = children.iter().find(|c| c.name() == name) {
            return Ok(Some(exact.clone()));
        }
        Ok(children
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn children(&self, monitor: &ProgressMonitor) -> CatalogResult<Vec<DbObject>> {
        monitor.check_cancelled()?;
        Ok(self.children_snapshot())
    }
}

/// Entity node of the in-memory tree.
pub struct MemoryEntity {
    name: String,
    path: ObjectPath,
    attributes: RwLock<Vec<Arc<EntityAttribute>>>,
    associations: RwLock<Vec<Association>>,
    values: RwLock<HashMap<String, Vec<LabelValue>>>,
    dictionary_rows: RwLock<Vec<LabelValue>>,
}

impl MemoryEntity {
    fn new(name: String, path: ObjectPath) -> Self {
        Self {
            name,
            path,
            attributes: RwLock::new(Vec::new()),
            associations: RwLock::new(Vec::new()),
            values: RwLock::new(HashMap::new()),
            dictionary_rows: RwLock::new(Vec::new()),
        }
    }

    pub fn entity_path(&self) -> &ObjectPath {
        &self.path
    }

    /// Append an attribute; the ordinal is assigned from the insertion
    /// position when the attribute carries none.
    pub fn add_attribute(&self, mut attribute: EntityAttribute) -> Arc<EntityAttribute> {
        let mut attributes = self.attributes.write().expect("attributes poisoned");
        if attribute.ordinal == 0 {
            attribute.ordinal = attributes.len() as u32 + 1;
        }
        attribute.entity_path = self.path.clone();
        let attribute = Arc::new(attribute);
        attributes.push(attribute.clone());
        attribute
    }

    pub fn add_association(&self, association: Association) {
        self.associations
            .write()
            .expect("associations poisoned")
            .push(association);
    }

    /// Register enumerable values for one attribute.
    pub fn set_values(&self, attribute: &str, values: Vec<LabelValue>) {
        self.values
            .write()
            .expect("values poisoned")
            .insert(attribute.to_string(), values);
    }

    /// Register the rows served when this entity is used as a dictionary.
    pub fn set_dictionary_rows(&self, rows: Vec<LabelValue>) {
        *self.dictionary_rows.write().expect("dictionary poisoned") = rows;
    }

    fn values_for(&self, attribute: &str) -> Vec<LabelValue> {
        self.values
            .read()
            .expect("values poisoned")
            .get(attribute)
            .cloned()
            .unwrap_or_default()
    }

    fn dictionary_snapshot(&self) -> Vec<LabelValue> {
        self.dictionary_rows
            .read()
            .expect("dictionary poisoned")
            .clone()
    }
}

#[async_trait]
impl Entity for MemoryEntity {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &ObjectPath {
        &self.path
    }

    async fn attributes(
        &self,
        monitor: &ProgressMonitor,
    ) -> CatalogResult<Vec<Arc<EntityAttribute>>> {
        monitor.check_cancelled()?;
        Ok(self.attributes.read().expect("attributes poisoned").clone())
    }

    async fn attribute(
        &self,
        monitor: &ProgressMonitor,
        name: &str,
    ) -> CatalogResult<Option<Arc<EntityAttribute>>> {
        monitor.check_cancelled()?;
        Ok(self
            .attributes
            .read()
            .expect("attributes poisoned")
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn associations(&self, monitor: &ProgressMonitor) -> CatalogResult<Vec<Association>> {
        monitor.check_cancelled()?;
        Ok(self
            .associations
            .read()
            .expect("associations poisoned")
            .clone())
    }
}

/// Synonym node of the in-memory tree.
pub struct MemorySynonym {
    name: String,
    path: ObjectPath,
    target: DbObject,
}

#[async_trait]
impl Synonym for MemorySynonym {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &ObjectPath {
        &self.path
    }

    async fn target(&self, monitor: &ProgressMonitor) -> CatalogResult<Option<DbObject>> {
        monitor.check_cancelled()?;
        Ok(Some(self.target.clone()))
    }
}

/// Structure assistant walking the in-memory tree.
struct MemoryAssistant {
    root: Arc<MemoryContainer>,
}

#[async_trait]
impl StructureAssistant for MemoryAssistant {
    fn auto_complete_object_types(&self) -> Vec<ObjectType> {
        vec![
            ObjectType::Schema,
            ObjectType::Table,
            ObjectType::View,
            ObjectType::Synonym,
            ObjectType::Procedure,
        ]
    }

    async fn find_objects_by_mask(
        &self,
        monitor: &ProgressMonitor,
        params: &ObjectSearchParams,
    ) -> CatalogResult<Vec<ObjectReference>> {
        let mut references = Vec::new();
        let mut queue: VecDeque<Arc<dyn ObjectContainer>> = VecDeque::new();
        queue.push_back(self.root.clone());

        while let Some(container) = queue.pop_front() {
            monitor.check_cancelled()?;
            for child in container.children(monitor).await? {
                if references.len() >= params.max_results {
                    tracing::debug!(mask = %params.mask, "mask search hit the result cap");
                    return Ok(references);
                }
                let in_scope = match (&params.parent, params.global_search) {
                    (Some(parent), false) => path_starts_with(&child.path(), parent),
                    _ => true,
                };
                if in_scope
                    && params.object_types.contains(&child.object_type())
                    && mask_applies(&params.mask, child.name(), params.case_sensitive)
                {
                    references.push(ObjectReference::new(
                        child.name().to_string(),
                        child.container_path().unwrap_or_default(),
                        child.object_type(),
                    ));
                }
                if let Some(sub) = child.as_container() {
                    queue.push_back(sub);
                }
            }
        }
        Ok(references)
    }

    async fn resolve_reference(
        &self,
        monitor: &ProgressMonitor,
        reference: &ObjectReference,
    ) -> CatalogResult<Option<DbObject>> {
        let mut current: Arc<dyn ObjectContainer> = self.root.clone();
        let path = reference.path();
        let segments = path.segments();
        for (i, segment) in segments.iter().enumerate() {
            let child = match current.child(monitor, segment).await? {
                Some(child) => child,
                None => return Ok(None),
            };
            if i == segments.len() - 1 {
                return Ok(Some(child));
            }
            current = match child.as_container() {
                Some(container) => container,
                None => return Ok(None),
            };
        }
        Ok(None)
    }
}

fn path_starts_with(path: &ObjectPath, prefix: &ObjectPath) -> bool {
    let p = path.segments();
    let pre = prefix.segments();
    p.len() >= pre.len() && p[..pre.len()] == *pre
}

fn mask_applies(mask: &str, name: &str, case_sensitive: bool) -> bool {
    use sql_completion_dialect::text::{mask_matches, mask_matches_exact_case};
    if case_sensitive {
        mask_matches_exact_case(mask, name)
    } else {
        mask_matches(mask, name)
    }
}

/// Execution context over an in-memory catalog.
pub struct MemoryExecutionContext {
    catalog: Arc<MemoryCatalog>,
    default_catalog: Option<DbObject>,
    default_schema: Option<DbObject>,
    selected: Vec<DbObject>,
}

impl MemoryExecutionContext {
    pub fn new(catalog: Arc<MemoryCatalog>) -> Self {
        Self {
            catalog,
            default_catalog: None,
            default_schema: None,
            selected: Vec::new(),
        }
    }

    pub fn with_default_catalog(mut self, catalog: DbObject) -> Self {
        self.selected.push(catalog.clone());
        self.default_catalog = Some(catalog);
        self
    }

    pub fn with_default_schema(mut self, schema: DbObject) -> Self {
        self.selected.push(schema.clone());
        self.default_schema = Some(schema);
        self
    }
}

impl ExecutionContext for MemoryExecutionContext {
    fn default_catalog(&self) -> Option<DbObject> {
        self.default_catalog.clone()
    }

    fn default_schema(&self) -> Option<DbObject> {
        self.default_schema.clone()
    }

    fn selected_objects(&self) -> Vec<DbObject> {
        self.selected.clone()
    }

    fn open_session(
        &self,
        monitor: &ProgressMonitor,
        _purpose: &str,
    ) -> CatalogResult<Box<dyn ValueSession>> {
        monitor.check_cancelled()?;
        Ok(Box::new(MemorySession {
            catalog: Arc::clone(&self.catalog),
        }))
    }
}

struct MemorySession {
    catalog: Arc<MemoryCatalog>,
}

#[async_trait]
impl ValueSession for MemorySession {
    async fn attribute_values(
        &self,
        monitor: &ProgressMonitor,
        attribute: &EntityAttribute,
        pattern: Option<&str>,
        max_results: usize,
    ) -> CatalogResult<Vec<LabelValue>> {
        monitor.check_cancelled()?;
        let entity = self.catalog.entity(&attribute.entity_path).ok_or_else(|| {
            CatalogError::ObjectNotFound(
                attribute.entity_path.qualified_name('.'),
                self.catalog.name.clone(),
            )
        })?;
        let mut values = entity.values_for(&attribute.name);
        if let Some(pattern) = pattern {
            let lower = pattern.to_lowercase();
            values.retain(|v| v.value.native_text().to_lowercase().starts_with(&lower));
        }
        values.truncate(max_results);
        Ok(values)
    }

    async fn dictionary_values(
        &self,
        monitor: &ProgressMonitor,
        dictionary: &ObjectPath,
        max_results: usize,
    ) -> CatalogResult<Vec<LabelValue>> {
        monitor.check_cancelled()?;
        let entity = self.catalog.entity(dictionary).ok_or_else(|| {
            CatalogError::ObjectNotFound(
                dictionary.qualified_name('.'),
                self.catalog.name.clone(),
            )
        })?;
        let mut rows = entity.dictionary_snapshot();
        rows.truncate(max_results);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataType, DataValue};

    fn sample_catalog() -> MemoryCatalog {
        let catalog = MemoryCatalog::new("memory");
        let root = catalog.root_container();
        let schema = catalog.add_container(&root, "public", ObjectType::Schema);
        let users = catalog.add_entity(&schema, "users");
        users.add_attribute(EntityAttribute::new(
            "id",
            ObjectPath::root(),
            DataType::Integer,
        ));
        users.add_attribute(EntityAttribute::new(
            "name",
            ObjectPath::root(),
            DataType::Text,
        ));
        catalog
    }

    #[tokio::test]
    async fn test_tree_navigation() {
        let catalog = sample_catalog();
        let monitor = ProgressMonitor::new();
        let root = catalog.root();
        let schema = root.child(&monitor, "public").await.unwrap().unwrap();
        let schema = schema.as_container().unwrap();
        let users = schema.child(&monitor, "users").await.unwrap().unwrap();
        let users = users.as_entity().unwrap();
        let attributes = users.attributes(&monitor).await.unwrap();
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].name, "id");
        assert_eq!(attributes[0].ordinal, 1);
    }

    #[tokio::test]
    async fn test_child_lookup_is_case_insensitive() {
        let catalog = sample_catalog();
        let monitor = ProgressMonitor::new();
        let root = catalog.root();
        assert!(root.child(&monitor, "PUBLIC").await.unwrap().is_some());
        assert!(root.child(&monitor, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_assistant_mask_search() {
        let catalog = sample_catalog();
        let monitor = ProgressMonitor::new();
        let assistant = catalog.structure_assistant().unwrap();
        let params = ObjectSearchParams::new(vec![ObjectType::Table], "use%");
        let refs = assistant
            .find_objects_by_mask(&monitor, &params)
            .await
            .unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "users");

        let resolved = assistant
            .resolve_reference(&monitor, &refs[0])
            .await
            .unwrap();
        assert!(resolved.unwrap().as_entity().is_some());
    }

    #[tokio::test]
    async fn test_cancelled_monitor_rejects_reads() {
        let catalog = sample_catalog();
        let monitor = ProgressMonitor::new();
        monitor.cancel_handle().cancel();
        let root = catalog.root();
        assert!(matches!(
            root.children(&monitor).await,
            Err(CatalogError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn test_value_session() {
        let catalog = sample_catalog();
        let users = catalog
            .entity(&ObjectPath::from_parts(["public", "users"]))
            .unwrap();
        users.set_values(
            "name",
            vec![
                LabelValue::plain(DataValue::Text("alice".into())),
                LabelValue::plain(DataValue::Text("bob".into())),
            ],
        );
        let catalog = Arc::new(catalog);
        let context = MemoryExecutionContext::new(Arc::clone(&catalog));
        let monitor = ProgressMonitor::new();
        let session = context.open_session(&monitor, "read values").unwrap();
        let attribute = EntityAttribute::new(
            "name",
            ObjectPath::from_parts(["public", "users"]),
            DataType::Text,
        );
        let all = session
            .attribute_values(&monitor, &attribute, None, 10)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        let filtered = session
            .attribute_values(&monitor, &attribute, Some("al"), 10)
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].value, DataValue::Text("alice".into()));
    }
}
