// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Structural table references
//!
//! Parses the active statement with `sqlparser` and collects table
//! factors (with aliases) from the AST. Completion input is usually
//! incomplete, so a failed parse is not an error: the extraction falls
//! back to the pattern scan, keeping the contract best-effort.

use super::{dedup_references, filter_references, PatternTableRefs, TableRef, TableReferencesAnalyzer};
use sql_completion_dialect::DialectRef;
use sqlparser::ast::{
    FromTable, Query, SetExpr, Statement, TableFactor, TableWithJoins, UpdateTableFromKind,
};
use sqlparser::dialect::GenericDialect as ParserDialect;
use sqlparser::parser::Parser;
use std::collections::HashMap;
use tracing::debug;

/// Opt-in table-reference analyzer backed by a real SQL parse.
pub struct StructuralTableRefs {
    statement: String,
    fallback: PatternTableRefs,
}

impl StructuralTableRefs {
    pub fn new(statement: Option<&str>, dialect: DialectRef) -> Self {
        Self {
            statement: statement.unwrap_or_default().to_string(),
            fallback: PatternTableRefs::new(statement, dialect),
        }
    }

    fn references(&self) -> Vec<TableRef> {
        if self.statement.trim().is_empty() {
            return Vec::new();
        }
        match Parser::parse_sql(&ParserDialect {}, &self.statement) {
            Ok(statements) => {
                let mut references = Vec::new();
                for statement in &statements {
                    collect_statement(statement, &mut references);
                }
                dedup_references(references)
            }
            Err(error) => {
                debug!(%error, "statement parse failed, using pattern extraction");
                self.fallback.filtered_table_references("", false)
            }
        }
    }
}

impl TableReferencesAnalyzer for StructuralTableRefs {
    fn filtered_table_references(&self, fragment: &str, exact_match: bool) -> Vec<TableRef> {
        filter_references(&self.references(), fragment, exact_match)
    }

    fn table_aliases_from_query(&self) -> HashMap<String, String> {
        self.references()
            .into_iter()
            .filter_map(|r| r.alias.map(|alias| (r.table, alias)))
            .collect()
    }
}

fn collect_statement(statement: &Statement, references: &mut Vec<TableRef>) {
    match statement {
        Statement::Query(query) => collect_query(query, references),
        Statement::Insert(insert) => {
            references.push(TableRef::new(insert.table.to_string(), None));
            if let Some(source) = &insert.source {
                collect_query(source, references);
            }
        }
        Statement::Update { table, from, .. } => {
            collect_table_with_joins(table, references);
            if let Some(from) = from {
                match from {
                    UpdateTableFromKind::BeforeSet(tables)
                    | UpdateTableFromKind::AfterSet(tables) => {
                        for t in tables {
                            collect_table_with_joins(t, references);
                        }
                    }
                }
            }
        }
        Statement::Delete(delete) => {
            let from_tables = match &delete.from {
                FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => tables,
            };
            for t in from_tables {
                collect_table_with_joins(t, references);
            }
            if let Some(using) = &delete.using {
                for t in using {
                    collect_table_with_joins(t, references);
                }
            }
        }
        _ => {}
    }
}

fn collect_query(query: &Query, references: &mut Vec<TableRef>) {
    collect_set_expr(&query.body, references);
}

fn collect_set_expr(body: &SetExpr, references: &mut Vec<TableRef>) {
    match body {
        SetExpr::Select(select) => {
            for table_with_joins in &select.from {
                collect_table_with_joins(table_with_joins, references);
            }
        }
        SetExpr::Query(query) => collect_query(query, references),
        SetExpr::SetOperation { left, right, .. } => {
            collect_set_expr(left, references);
            collect_set_expr(right, references);
        }
        _ => {}
    }
}

fn collect_table_with_joins(table: &TableWithJoins, references: &mut Vec<TableRef>) {
    collect_table_factor(&table.relation, references);
    for join in &table.joins {
        collect_table_factor(&join.relation, references);
    }
}

fn collect_table_factor(factor: &TableFactor, references: &mut Vec<TableRef>) {
    match factor {
        TableFactor::Table { name, alias, .. } => {
            let alias = alias.as_ref().map(|a| a.name.value.clone());
            references.push(TableRef::new(name.to_string(), alias));
        }
        TableFactor::Derived { subquery, .. } => collect_query(subquery, references),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => collect_table_with_joins(table_with_joins, references),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sql_completion_dialect::GenericDialect;
    use std::sync::Arc;

    fn analyzer(statement: &str) -> StructuralTableRefs {
        StructuralTableRefs::new(Some(statement), Arc::new(GenericDialect::new()))
    }

    #[test]
    fn test_select_with_aliases() {
        let refs = analyzer("SELECT * FROM users AS u JOIN orders o ON u.id = o.user_id")
            .filtered_table_references("", false);
        assert_eq!(
            refs,
            vec![
                TableRef::new("users", Some("u".into())),
                TableRef::new("orders", Some("o".into())),
            ]
        );
    }

    #[test]
    fn test_subquery_and_union() {
        let refs = analyzer(
            "SELECT * FROM (SELECT id FROM orders) t UNION SELECT id FROM users",
        )
        .filtered_table_references("", false);
        let names: Vec<&str> = refs.iter().map(|r| r.table.as_str()).collect();
        assert!(names.contains(&"orders"));
        assert!(names.contains(&"users"));
    }

    #[test]
    fn test_update_and_delete() {
        let refs = analyzer("UPDATE users SET name = 'x' WHERE id = 1")
            .filtered_table_references("", false);
        assert_eq!(refs[0].table, "users");

        let refs =
            analyzer("DELETE FROM orders WHERE id = 1").filtered_table_references("", false);
        assert_eq!(refs[0].table, "orders");
    }

    #[test]
    fn test_partial_input_falls_back_to_pattern_scan() {
        // Not parseable as a statement, but the FROM clause is visible.
        let refs = analyzer("SELECT * FROM users u WHERE ").filtered_table_references("", false);
        assert_eq!(refs, vec![TableRef::new("users", Some("u".into()))]);
    }

    #[test]
    fn test_qualified_name() {
        let refs = analyzer("SELECT * FROM public.users").filtered_table_references("", false);
        assert_eq!(refs[0].table, "public.users");
    }
}
