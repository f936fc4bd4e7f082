// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mock catalog for testing
//!
//! Builds an in-memory catalog tree with a fluent API and a standard
//! schema shared by most analyzer tests.

use sql_completion_catalog::{
    Association, AttributeValueSource, DataSourceSettings, DataType, DataValue, DbObject,
    EntityAttribute, LabelValue, MemoryCatalog, MemoryContainer, ObjectPath,
    ObjectType, RoutineKind,
};
use std::sync::Arc;

/// Builder for mock catalogs.
///
/// The catalog has a single `public` schema under the root; every added
/// table lands there unless a second schema is requested explicitly.
pub struct MockCatalogBuilder {
    catalog: MemoryCatalog,
    schema: Arc<MemoryContainer>,
}

impl Default for MockCatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalogBuilder {
    pub fn new() -> Self {
        let catalog = MemoryCatalog::new("mock");
        let root = catalog.root_container();
        let schema = catalog.add_container(&root, "public", ObjectType::Schema);
        Self { catalog, schema }
    }

    /// The standard test schema: `users`, `orders` (FK to `users`) and
    /// `products`, plus two routines. `users.status` is enumerable over
    /// `active`/`inactive`.
    pub fn with_standard_schema(self) -> Self {
        let users = self.catalog.add_entity(&self.schema, "users");
        users.add_attribute(attribute("id", DataType::Integer));
        users.add_attribute(attribute("name", DataType::Varchar(Some(100))));
        users.add_attribute(attribute("email", DataType::Varchar(Some(255))));
        users.add_attribute(
            attribute("status", DataType::Varchar(Some(20)))
                .with_value_source(AttributeValueSource::Enumerable),
        );
        users.add_attribute(attribute("created_at", DataType::Timestamp));
        users.set_values(
            "status",
            vec![
                LabelValue::plain(DataValue::Text("active".into())),
                LabelValue::plain(DataValue::Text("inactive".into())),
            ],
        );

        let orders = self.catalog.add_entity(&self.schema, "orders");
        orders.add_attribute(attribute("id", DataType::Integer));
        orders.add_attribute(attribute("user_id", DataType::Integer));
        orders.add_attribute(attribute("total", DataType::Decimal));
        orders.add_attribute(attribute("status", DataType::Varchar(Some(20))));
        orders.add_attribute(attribute("created_at", DataType::Timestamp));
        orders.add_association(Association {
            name: "orders_user_id_fkey".to_string(),
            owner: orders.entity_path().clone(),
            referenced_entity: users.entity_path().clone(),
            attribute_pairs: vec![("user_id".to_string(), "id".to_string())],
        });

        let products = self.catalog.add_entity(&self.schema, "products");
        products.add_attribute(attribute("id", DataType::Integer));
        products.add_attribute(attribute("name", DataType::Varchar(Some(255))));
        products.add_attribute(attribute("price", DataType::Decimal));
        products.add_attribute(attribute("stock", DataType::Integer));

        self.catalog
            .add_procedure(&self.schema, "cleanup_sessions", RoutineKind::Procedure);
        self.catalog
            .add_procedure(&self.schema, "order_total", RoutineKind::Function);

        self
    }

    /// A second `archive` schema holding a `users` table, for duplicate
    /// hiding and cross-schema tests.
    pub fn with_archive_schema(self) -> Self {
        let root = self.catalog.root_container();
        let archive = self.catalog.add_container(&root, "archive", ObjectType::Schema);
        let users = self.catalog.add_entity(&archive, "users");
        users.add_attribute(attribute("id", DataType::Integer));
        users.add_attribute(attribute("archived_at", DataType::Timestamp));
        self
    }

    /// A `countries` dictionary plus a `users.country_id` column backed
    /// by it.
    pub fn with_country_dictionary(self) -> Self {
        let countries = self.catalog.add_entity(&self.schema, "countries");
        countries.add_attribute(attribute("code", DataType::Varchar(Some(2))));
        countries.add_attribute(attribute("name", DataType::Varchar(Some(100))));
        countries.set_dictionary_rows(vec![
            LabelValue::labeled(DataValue::Text("DE".into()), "Germany"),
            LabelValue::labeled(DataValue::Text("FR".into()), "France"),
        ]);
        if let Some(users) = self
            .catalog
            .entity(&ObjectPath::from_parts(["public", "users"]))
        {
            users.add_attribute(
                attribute("country_id", DataType::Varchar(Some(2))).with_value_source(
                    AttributeValueSource::Dictionary {
                        entity: countries.entity_path().clone(),
                    },
                ),
            );
        }
        self
    }

    /// Add a custom table with plain columns.
    pub fn with_table(self, name: &str, columns: &[(&str, DataType)]) -> Self {
        let entity = self.catalog.add_entity(&self.schema, name);
        for (column, data_type) in columns {
            entity.add_attribute(attribute(column, data_type.clone()));
        }
        self
    }

    /// Add a synonym in `public` for an existing entity.
    pub fn with_synonym(self, name: &str, target: &str) -> Self {
        if let Some(entity) = self
            .catalog
            .entity(&ObjectPath::from_parts(["public", target]))
        {
            self.catalog
                .add_synonym(&self.schema, name, DbObject::Entity(entity));
        }
        self
    }

    /// Override the data-source settings (cache policy, filters).
    pub fn with_settings(mut self, settings: DataSourceSettings) -> Self {
        self.catalog.set_settings(settings);
        self
    }

    pub fn build(self) -> Arc<MemoryCatalog> {
        Arc::new(self.catalog)
    }
}

fn attribute(name: &str, data_type: DataType) -> EntityAttribute {
    EntityAttribute::new(name, ObjectPath::root(), data_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sql_completion_catalog::{DataSource, Entity, ProgressMonitor};

    #[tokio::test]
    async fn test_standard_schema_layout() {
        let catalog = MockCatalogBuilder::new().with_standard_schema().build();
        let monitor = ProgressMonitor::new();
        let root = catalog.root();
        let schema = root
            .child(&monitor, "public")
            .await
            .unwrap()
            .unwrap()
            .as_container()
            .unwrap();
        let children = schema.children(&monitor).await.unwrap();
        let names: Vec<&str> = children.iter().map(|c| c.name()).collect();
        assert!(names.contains(&"users"));
        assert!(names.contains(&"orders"));
        assert!(names.contains(&"products"));
        assert!(names.contains(&"cleanup_sessions"));

        let users = schema
            .child(&monitor, "users")
            .await
            .unwrap()
            .unwrap()
            .as_entity()
            .unwrap();
        let attributes = users.attributes(&monitor).await.unwrap();
        assert_eq!(attributes.len(), 5);
        assert_eq!(attributes[0].name, "id");
    }

    #[tokio::test]
    async fn test_orders_reference_users() {
        let catalog = MockCatalogBuilder::new().with_standard_schema().build();
        let monitor = ProgressMonitor::new();
        let orders = catalog
            .entity(&ObjectPath::from_parts(["public", "orders"]))
            .unwrap();
        let associations = orders.associations(&monitor).await.unwrap();
        assert_eq!(associations.len(), 1);
        assert_eq!(
            associations[0].referenced_entity,
            ObjectPath::from_parts(["public", "users"])
        );
    }
}
