// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL keyword tables
//!
//! Keyword lists shared by the generic dialect. Split by the role a word
//! plays for the analyzer rather than by SQL standard chapter: clause
//! openers drive context classification, statement leads drive keyword
//! assist at the start of a statement.

/// Words that open an entity (table) context.
pub const ENTITY_QUERY_WORDS: &[&str] = &[
    "FROM", "TABLE", "INTO", "UPDATE", "DELETE", "INSERT", "JOIN", "MERGE", "TRUNCATE",
];

/// Words that open an attribute (column) context.
pub const ATTRIBUTE_QUERY_WORDS: &[&str] = &[
    "SELECT", "WHERE", "SET", "ON", "BY", "HAVING", "AND", "OR", "USING", "DISTINCT",
];

/// Words that start a routine invocation.
pub const EXEC_QUERY_WORDS: &[&str] = &["CALL", "EXEC", "EXECUTE"];

/// Statement leads offered when nothing has been typed yet.
pub const QUERY_KEYWORDS: &[&str] = &["SELECT", "WITH"];
pub const DML_KEYWORDS: &[&str] = &["INSERT", "UPDATE", "DELETE", "MERGE"];
pub const DDL_KEYWORDS: &[&str] = &["CREATE", "ALTER", "DROP", "TRUNCATE"];
pub const EXECUTE_KEYWORDS: &[&str] = &["CALL", "EXEC", "EXECUTE"];

/// Reserved and clause keywords of standard SQL.
pub const RESERVED_KEYWORDS: &[&str] = &[
    "ALL",
    "ALTER",
    "AND",
    "AS",
    "ASC",
    "BETWEEN",
    "BY",
    "CALL",
    "CASE",
    "CHECK",
    "COLUMN",
    "COMMIT",
    "CONSTRAINT",
    "CREATE",
    "CROSS",
    "DEFAULT",
    "DELETE",
    "DESC",
    "DISTINCT",
    "DROP",
    "ELSE",
    "END",
    "EXCEPT",
    "EXEC",
    "EXECUTE",
    "EXISTS",
    "FOREIGN",
    "FROM",
    "FULL",
    "FUNCTION",
    "GRANT",
    "GROUP",
    "HAVING",
    "ILIKE",
    "IN",
    "INDEX",
    "INNER",
    "INSERT",
    "INTERSECT",
    "INTO",
    "IS",
    "JOIN",
    "KEY",
    "LEFT",
    "LIKE",
    "LIMIT",
    "MERGE",
    "NOT",
    "NULL",
    "OFFSET",
    "ON",
    "OR",
    "ORDER",
    "OUTER",
    "PRIMARY",
    "PROCEDURE",
    "REFERENCES",
    "REVOKE",
    "RIGHT",
    "ROLLBACK",
    "SELECT",
    "SET",
    "TABLE",
    "THEN",
    "TRUNCATE",
    "UNION",
    "UNIQUE",
    "UPDATE",
    "USING",
    "VALUES",
    "VIEW",
    "WHEN",
    "WHERE",
    "WITH",
];

/// Built-in functions proposed with trailing parentheses.
pub const FUNCTION_KEYWORDS: &[&str] = &[
    "ABS", "AVG", "CAST", "COALESCE", "CONCAT", "COUNT", "LENGTH", "LOWER", "MAX", "MIN",
    "NULLIF", "ROUND", "SUBSTRING", "SUM", "TRIM", "UPPER",
];

/// Type names. Never proposed by keyword assist.
pub const TYPE_KEYWORDS: &[&str] = &[
    "BIGINT",
    "BINARY",
    "BLOB",
    "BOOLEAN",
    "CHAR",
    "DATE",
    "DECIMAL",
    "DOUBLE",
    "FLOAT",
    "INT",
    "INTEGER",
    "JSON",
    "NUMERIC",
    "REAL",
    "SMALLINT",
    "TEXT",
    "TIME",
    "TIMESTAMP",
    "VARCHAR",
];
