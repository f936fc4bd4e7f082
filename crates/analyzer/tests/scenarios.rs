// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! End-to-end completion scenarios over the mock catalog.
//!
//! Each test drives the full pipeline: request fixture → classifier →
//! resolver → proposal builder → post-filter.

use sql_completion_analyzer::{
    AliasInsertMode, CompletionAnalyzer, CompletionConfig, CompletionError, CompletionOutcome,
};
use sql_completion_catalog::{
    DataSourceSettings, FilterBinding, MemoryCatalog, ObjectFilter, ObjectType, ProgressMonitor,
};
use sql_completion_dialect::KeywordKind;
use sql_completion_test_utils::{MockCatalogBuilder, RequestBuilder};
use std::collections::HashSet;
use std::sync::Arc;

async fn complete(sql: &str) -> CompletionOutcome {
    complete_with(sql, CompletionConfig::default()).await
}

async fn complete_with(sql: &str, config: CompletionConfig) -> CompletionOutcome {
    let catalog = MockCatalogBuilder::new().with_standard_schema().build();
    complete_on(catalog, sql, config).await
}

async fn complete_on(
    catalog: Arc<MemoryCatalog>,
    sql: &str,
    config: CompletionConfig,
) -> CompletionOutcome {
    let request = RequestBuilder::new(catalog, sql).with_config(config).build();
    let analyzer = CompletionAnalyzer::new(request);
    analyzer
        .run(&ProgressMonitor::new())
        .await
        .expect("completion run")
}

fn displays(outcome: &CompletionOutcome) -> Vec<&str> {
    outcome
        .proposals()
        .iter()
        .map(|p| p.display_string.as_str())
        .collect()
}

fn assert_no_duplicate_displays(outcome: &CompletionOutcome) {
    let mut seen = HashSet::new();
    for proposal in outcome.proposals() {
        assert!(
            seen.insert(&proposal.display_string),
            "duplicate display string: {}",
            proposal.display_string
        );
    }
}

#[tokio::test]
async fn test_tables_after_from() {
    let outcome = complete("SELECT * FROM |").await;
    let names = displays(&outcome);
    assert!(names.contains(&"users"));
    assert!(names.contains(&"orders"));
    assert!(names.contains(&"products"));
    // No column proposals in a table context.
    assert!(!names.contains(&"email"));
    assert_no_duplicate_displays(&outcome);
}

#[tokio::test]
async fn test_alias_columns_are_exactly_the_attributes() {
    let outcome = complete("SELECT u.| FROM users u").await;
    let names = displays(&outcome);
    assert_eq!(
        names,
        vec!["id", "name", "email", "status", "created_at"],
        "exactly the attributes of users, in attribute order"
    );
    assert!(outcome
        .proposals()
        .iter()
        .all(|p| p.kind != KeywordKind::Keyword));
}

#[tokio::test]
async fn test_value_proposals_inside_string_literal() {
    let outcome = complete("SELECT * FROM users WHERE status = '|'").await;
    let names = displays(&outcome);
    assert_eq!(names, vec!["active", "inactive"]);
    // STRING partition: raw values, literal kind, nothing else.
    for proposal in outcome.proposals() {
        assert_eq!(proposal.kind, KeywordKind::Literal);
        assert!(!proposal.replace_string.contains('\''));
    }
}

#[tokio::test]
async fn test_value_proposals_outside_literal_are_sql_literals() {
    let outcome = complete("SELECT * FROM users WHERE status = |").await;
    let values: Vec<&str> = outcome
        .proposals()
        .iter()
        .filter(|p| p.kind == KeywordKind::Literal)
        .map(|p| p.replace_string.as_str())
        .collect();
    assert_eq!(values, vec!["'active'", "'inactive'"]);
}

#[tokio::test]
async fn test_join_keeps_only_joinable_tables() {
    let outcome = complete("SELECT * FROM users u JOIN |").await;
    let orders = outcome
        .proposals()
        .iter()
        .find(|p| p.display_string == "orders")
        .expect("orders is joinable with users");
    assert!(orders.replace_string.ends_with(" ON"));
    let names = displays(&outcome);
    assert!(!names.contains(&"products"), "products has no FK to users");
    assert!(!names.contains(&"users"));
}

#[tokio::test]
async fn test_insert_into_column_list() {
    let outcome = complete("INSERT INTO users (|)").await;
    let names = displays(&outcome);
    assert_eq!(names, vec!["id", "name", "email", "status", "created_at"]);
}

#[tokio::test]
async fn test_keyword_assist_at_statement_start() {
    let outcome = complete("SEL|").await;
    let select = outcome
        .proposals()
        .iter()
        .find(|p| p.display_string == "SELECT")
        .expect("SELECT proposed for SEL");
    assert_eq!(select.kind, KeywordKind::Keyword);
    assert_eq!(select.replace_string, "SELECT");
    assert!(select.backing_object.is_none());
}

#[tokio::test]
async fn test_cursor_on_alias_finishes_search() {
    let outcome = complete("SELECT u| FROM users u").await;
    assert!(outcome.is_search_finished());
    assert!(outcome.proposals().is_empty());
}

#[tokio::test]
async fn test_partial_column_prefix() {
    let outcome = complete("SELECT na| FROM users").await;
    let names = displays(&outcome);
    assert!(names.contains(&"name"));
    assert!(!names.contains(&"id"));
}

#[tokio::test]
async fn test_star_expands_to_all_columns() {
    let outcome = complete("SELECT *| FROM users").await;
    let combined = outcome
        .proposals()
        .iter()
        .find(|p| p.display_string.contains(", "))
        .expect("combined all-columns proposal");
    assert_eq!(
        combined.display_string,
        "id, name, email, status, created_at"
    );
    // The replacement span was widened to cover the star.
    assert_eq!(combined.replacement_length, 1);
}

#[tokio::test]
async fn test_join_condition_after_on() {
    let outcome = complete("SELECT * FROM users JOIN orders ON |").await;
    let names = displays(&outcome);
    assert!(names.contains(&"orders.user_id = users.id"));
}

#[tokio::test]
async fn test_where_columns_get_alias_qualifier() {
    let outcome = complete("SELECT * FROM users u WHERE |").await;
    let names = displays(&outcome);
    assert!(names.contains(&"u.id"));
    assert!(names.contains(&"u.status"));
}

#[tokio::test]
async fn test_alias_injection_plain_and_extended() {
    let config = CompletionConfig {
        alias_insert_mode: AliasInsertMode::Plain,
        ..CompletionConfig::default()
    };
    let outcome = complete_with("SELECT * FROM |", config).await;
    let users = outcome
        .proposals()
        .iter()
        .find(|p| p.display_string == "users")
        .unwrap();
    assert_eq!(users.replace_string, "users u");

    let config = CompletionConfig {
        alias_insert_mode: AliasInsertMode::Extended,
        ..CompletionConfig::default()
    };
    let outcome = complete_with("SELECT * FROM |", config).await;
    let users = outcome
        .proposals()
        .iter()
        .find(|p| p.display_string == "users")
        .unwrap();
    assert_eq!(users.replace_string, "users AS u");
}

#[tokio::test]
async fn test_generated_alias_avoids_used_aliases() {
    let config = CompletionConfig {
        alias_insert_mode: AliasInsertMode::Plain,
        ..CompletionConfig::default()
    };
    // "u" is taken by the statement, so users gets "u2".
    let outcome = complete_with("SELECT * FROM urls u JOIN |", config).await;
    let users = outcome
        .proposals()
        .iter()
        .find(|p| p.display_string == "users")
        .expect("users proposed after JOIN");
    assert_eq!(users.replace_string, "users u2");
}

#[tokio::test]
async fn test_dotted_schema_prefix_descends() {
    let outcome = complete("SELECT * FROM public.|").await;
    let names = displays(&outcome);
    assert!(names.contains(&"users"));
    assert!(names.contains(&"orders"));
}

#[tokio::test]
async fn test_simple_mode_containment() {
    let config = CompletionConfig {
        simple_mode: true,
        ..CompletionConfig::default()
    };
    let outcome = complete_with("SELECT * FROM us|", config).await;
    for proposal in outcome.proposals() {
        if let Some(object) = &proposal.backing_object {
            assert!(
                object.name().to_lowercase().starts_with("us"),
                "object proposal {} does not extend the prefix",
                object.name()
            );
        }
    }
}

#[tokio::test]
async fn test_fuzzy_matching_inside_names() {
    let config = CompletionConfig {
        search_inside_names: true,
        ..CompletionConfig::default()
    };
    let outcome = complete_with("SELECT tat| FROM users", config).await;
    let status = outcome
        .proposals()
        .iter()
        .find(|p| p.display_string == "status")
        .expect("fuzzy match finds status");
    assert!(status.score > 0);
}

#[tokio::test]
async fn test_procedures_after_call() {
    let outcome = complete("CALL |").await;
    let names = displays(&outcome);
    assert!(names.contains(&"cleanup_sessions"));
    assert!(names.contains(&"order_total"));
    for proposal in outcome.proposals() {
        assert_eq!(proposal.params.exec, Some(true));
    }
}

#[tokio::test]
async fn test_procedure_declaration_is_not_a_call() {
    let outcome = complete("CREATE PROCEDURE clean|").await;
    let cleanup = outcome
        .proposals()
        .iter()
        .find(|p| p.display_string == "cleanup_sessions")
        .expect("declaration search finds the procedure");
    assert_eq!(cleanup.params.exec, Some(false));
}

#[tokio::test]
async fn test_statement_aliases_proposed_first() {
    let outcome = complete("SELECT * FROM users usr WHERE us|").await;
    let names = displays(&outcome);
    assert_eq!(names[0], "usr", "statement aliases come first");
    assert!(names.contains(&"users"));
    assert!(names.contains(&"usr"));
    let users = outcome
        .proposals()
        .iter()
        .find(|p| p.display_string == "users")
        .unwrap();
    assert!(users.params.no_space);
}

#[tokio::test]
async fn test_dictionary_values_show_labels() {
    let catalog = MockCatalogBuilder::new()
        .with_standard_schema()
        .with_country_dictionary()
        .build();
    let outcome = complete_on(
        catalog,
        "SELECT * FROM users WHERE country_id = '|'",
        CompletionConfig::default(),
    )
    .await;
    let names = displays(&outcome);
    assert!(names.contains(&"DE - Germany"));
    assert!(names.contains(&"FR - France"));
    let germany = outcome
        .proposals()
        .iter()
        .find(|p| p.display_string == "DE - Germany")
        .unwrap();
    assert_eq!(germany.replace_string, "DE");
}

#[tokio::test]
async fn test_synonym_resolves_to_target_columns() {
    let catalog = MockCatalogBuilder::new()
        .with_standard_schema()
        .with_synonym("people", "users")
        .build();
    let outcome = complete_on(
        catalog,
        "SELECT p.| FROM people p",
        CompletionConfig::default(),
    )
    .await;
    let names = displays(&outcome);
    assert!(names.contains(&"email"), "columns come from the synonym target");
}

#[tokio::test]
async fn test_navigator_filter_hides_tables() {
    let settings = DataSourceSettings {
        extra_metadata_read: true,
        filters: vec![FilterBinding {
            object_type: ObjectType::Table,
            container: None,
            filter: ObjectFilter::new().excluding("orders*"),
        }],
    };
    let catalog = MockCatalogBuilder::new()
        .with_standard_schema()
        .with_settings(settings)
        .build();
    let outcome = complete_on(catalog, "SELECT * FROM |", CompletionConfig::default()).await;
    let names = displays(&outcome);
    assert!(names.contains(&"users"));
    assert!(!names.contains(&"orders"));
}

#[tokio::test]
async fn test_hippie_words_from_document() {
    let config = CompletionConfig {
        hippie_enabled: true,
        ..CompletionConfig::default()
    };
    let outcome = complete_with(
        "SELECT custom_metric FROM telemetry; SELECT cus|",
        config,
    )
    .await;
    let hippie = outcome
        .proposals()
        .iter()
        .find(|p| p.display_string == "custom_metric")
        .expect("in-document word proposed");
    assert_eq!(hippie.kind, KeywordKind::Literal);
}

#[tokio::test]
async fn test_cancellation_aborts_run() {
    let catalog = MockCatalogBuilder::new().with_standard_schema().build();
    let request = RequestBuilder::new(catalog, "SELECT * FROM |").build();
    let analyzer = CompletionAnalyzer::new(request);
    let monitor = ProgressMonitor::new();
    monitor.cancel_handle().cancel();
    let result = analyzer.run(&monitor).await;
    assert!(matches!(result, Err(CompletionError::Cancelled)));
}

#[tokio::test]
async fn test_structural_analyzer_handles_partial_input() {
    let config = CompletionConfig {
        experimental_reference_analyzer: true,
        ..CompletionConfig::default()
    };
    let outcome = complete_with("SELECT u.| FROM users AS u", config).await;
    let names = displays(&outcome);
    assert_eq!(names, vec!["id", "name", "email", "status", "created_at"]);
}

#[tokio::test]
async fn test_no_duplicates_across_sources() {
    // Root children and default-schema children overlap; the post-filter
    // keeps one proposal per display string.
    let outcome = complete("SELECT * FROM |").await;
    assert_no_duplicate_displays(&outcome);

    let outcome = complete("INSERT INTO |").await;
    assert_no_duplicate_displays(&outcome);
}

#[tokio::test]
async fn test_string_partition_purity() {
    let outcome = complete("SELECT * FROM users WHERE name = 'al|'").await;
    for proposal in outcome.proposals() {
        assert_ne!(proposal.kind, KeywordKind::Keyword);
    }
}
