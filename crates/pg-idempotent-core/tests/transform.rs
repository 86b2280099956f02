//! End-to-end transformation properties.

mod common;
use common::*;

use pg_idempotent_core::lexer::split;
use pg_idempotent_core::{
    StatementStatus, StatementType, TransformOptions, Transformer, split_and_classify, transform,
};

#[test]
fn transform_is_idempotent() {
    let once = transform_ok(MIGRATION);
    assert_eq!(once.transformed_count, 11);

    let twice = transform_ok(&once.transformed_sql);
    assert_eq!(twice.transformed_count, 0);
    assert_eq!(twice.transformed_sql, once.transformed_sql);
}

#[test]
fn transform_preserves_statement_count() {
    let result = transform_ok(MIGRATION);
    assert_eq!(result.statement_count, split(MIGRATION).len());
    assert_eq!(split(&result.transformed_sql).len(), result.statement_count);
    assert!(result.validation.unwrap().valid);
}

#[test]
fn transform_preserves_order() {
    let result = transform_ok(MIGRATION);
    let before: Vec<_> = split_and_classify(MIGRATION)
        .into_iter()
        .map(|s| s.object_name)
        .collect();
    let after: Vec<_> = result.statements.into_iter().map(|s| s.object_name).collect();
    assert_eq!(before, after);
}

#[test]
fn transform_output_is_already_idempotent() {
    let result = transform_ok(MIGRATION);
    for statement in split_and_classify(&result.transformed_sql) {
        let status = statement.status();
        assert!(
            matches!(
                status,
                StatementStatus::AlreadyIdempotent | StatementStatus::CannotTransform
            ),
            "{} is {status}",
            statement.raw_text
        );
    }
}

#[test]
fn transform_native_guards() {
    assert_eq!(
        rewrite_one("CREATE TABLE users (id int);"),
        "CREATE TABLE IF NOT EXISTS users (id int);"
    );
    assert_eq!(
        rewrite_one("CREATE SEQUENCE order_seq START 100;"),
        "CREATE SEQUENCE IF NOT EXISTS order_seq START 100;"
    );
    assert_eq!(
        rewrite_one("CREATE SCHEMA AUTHORIZATION joe;"),
        "CREATE SCHEMA IF NOT EXISTS AUTHORIZATION joe;"
    );
    assert_eq!(
        rewrite_one("DROP FOREIGN DATA WRAPPER fdw;"),
        "DROP FOREIGN DATA WRAPPER IF EXISTS fdw;"
    );
    assert_eq!(
        rewrite_one("ALTER TABLE ONLY t DROP COLUMN c;"),
        "ALTER TABLE ONLY t DROP COLUMN IF EXISTS c;"
    );
}

#[test]
fn transform_or_replace() {
    assert_eq!(
        rewrite_one("CREATE PROCEDURE p() LANGUAGE sql AS $$ SELECT 1 $$;"),
        "CREATE OR REPLACE PROCEDURE p() LANGUAGE sql AS $$ SELECT 1 $$;"
    );
}

#[test]
fn transform_wrapper_keeps_statement_verbatim() {
    let original = "CREATE   TYPE  mood AS ENUM (\n  'sad', -- low\n  'ok'\n);";
    let out = rewrite_one(original);
    assert!(out.starts_with("DO $pg_idempotent$\nBEGIN\n"));
    assert!(out.contains(&format!("\n{original}\nEXCEPTION\n")));
    assert!(out.ends_with("END\n$pg_idempotent$;"));
}

#[test]
fn transform_wrapper_catches_only_duplicates() {
    let out = rewrite_one("CREATE POLICY p ON t USING (true);");
    assert!(out.contains("    WHEN duplicate_object THEN\n"));
    assert!(!out.contains("OTHERS"));
}

#[test]
fn transform_dollar_quote_safety() {
    let sql = "CREATE TRIGGER t AFTER INSERT ON x FOR EACH ROW EXECUTE FUNCTION f('$pg_idempotent$');";
    let result = transform_ok(sql);
    assert!(result.transformed_sql.starts_with("DO $pg_idempotent_1$\n"));
    assert!(result.validation.unwrap().valid);
    assert_eq!(split(&result.transformed_sql).len(), 1);
}

#[test]
fn transform_nested_function_body_survives_wrap() {
    let sql = "CREATE DOMAIN positive AS int CHECK (VALUE > 0);\n\
               CREATE FUNCTION f() RETURNS int AS $$ SELECT 1; $$ LANGUAGE sql;";
    let result = transform_ok(sql);
    assert_eq!(result.transformed_count, 2);
    assert_eq!(split(&result.transformed_sql).len(), 2);
}

#[test]
fn transform_concurrently_passthrough() {
    let sql = "CREATE INDEX CONCURRENTLY idx ON t(c);";
    let result = transform_ok(sql);
    assert_eq!(result.transformed_sql, sql);
    assert_eq!(result.transformed_count, 0);
    assert!(!result.statements[0].can_be_wrapped);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("cannot be wrapped"));
    assert!(result.errors.is_empty());
}

#[test]
fn transform_unknown_passthrough() {
    let result = transform_ok("VACUUM ANALYZE t;");
    assert_eq!(result.transformed_sql, "VACUUM ANALYZE t;");
    assert_eq!(result.statements[0].statement_type, StatementType::Unknown);
    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty());
}

#[test]
fn transform_fatal_split_error() {
    let result = transform("CREATE FUNCTION f() AS $tag$ unterminated");
    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("Unterminated dollar-quoted body $tag$"));
    assert_eq!(result.statements[0].status(), StatementStatus::Error);
    assert_eq!(result.transformed_count, 0);
}

#[test]
fn transform_empty_script() {
    let result = transform_ok("  -- nothing here\n");
    assert_eq!(result.statement_count, 0);
    assert_eq!(result.transformed_sql, "  -- nothing here\n");
}

#[test]
fn transform_custom_tag_and_silent_wrappers() {
    let options = TransformOptions::new()
        .with_wrapper_tag("migr")
        .unwrap()
        .without_notices();
    let transformer = Transformer::with_options(options);
    let result = transformer.transform("CREATE TYPE t AS (a int);");
    assert!(result.success);
    assert!(result.transformed_sql.starts_with("DO $migr$\n"));
    assert!(result.transformed_sql.contains("        NULL;\n"));

    let again = transformer.transform(&result.transformed_sql);
    assert_eq!(again.transformed_count, 0);
}

#[test]
fn transform_summary_counts() {
    let result = transform_ok(MIGRATION);
    let summary = result.summary();
    assert_eq!(summary.total_statements, 12);
    assert_eq!(summary.errors, 0);
    assert_eq!(summary.by_type["CREATE TABLE"], 1);

    let stats = pg_idempotent_core::stats(MIGRATION);
    assert_eq!(stats.transformable, 11);
    assert_eq!(stats.not_transformable, 1);
    assert_eq!(stats.already_idempotent, 0);
}

#[test]
fn transform_named_primary_key_wrapper() {
    let out = rewrite_one("ALTER TABLE orders ADD CONSTRAINT orders_pk PRIMARY KEY (id);");
    assert!(out.starts_with("DO $pg_idempotent$\n"));
    assert!(out.contains(
        "    WHEN duplicate_object OR duplicate_table OR invalid_table_definition THEN\n"
    ));

    let again = transform_ok(&out);
    assert_eq!(again.transformed_count, 0);
}

#[test]
fn transform_named_check_catches_duplicates_only() {
    let out = rewrite_one("ALTER TABLE orders ADD CONSTRAINT amount_positive CHECK (amount > 0);");
    assert!(out.contains("    WHEN duplicate_object OR duplicate_table THEN\n"));
    assert!(!out.contains("invalid_table_definition"));
}

#[test]
fn transform_unnamed_constraints_are_left_unchanged() {
    let sql = "ALTER TABLE orders ADD CHECK (amount > 0);\n\
               ALTER TABLE orders ADD PRIMARY KEY (id);\n\
               ALTER TABLE orders ADD UNIQUE (code);\n\
               ALTER TABLE orders ADD FOREIGN KEY (user_id) REFERENCES users(id);";
    let result = transform_ok(sql);
    assert_eq!(result.transformed_sql, sql);
    assert_eq!(result.transformed_count, 0);
    assert_eq!(result.errors.len(), 4);
    assert!(result.errors[0].starts_with("Statement 1 (ALTER TABLE ADD CONSTRAINT orders): "));
    assert!(result.errors[1].contains("a re-run would add a duplicate"));
    for statement in &result.statements {
        assert_eq!(statement.status(), StatementStatus::Error);
    }
}

#[test]
fn transform_checks_every_alter_table_action() {
    let sql = "ALTER TABLE t ADD COLUMN IF NOT EXISTS a int, ADD COLUMN b int;";
    assert!(!classify_one(sql).is_idempotent);
    let out = rewrite_one(sql);
    assert!(out.contains(&format!("\n{sql}\nEXCEPTION\n")));
    assert!(out.contains("    WHEN duplicate_column THEN\n"));

    let guarded = "ALTER TABLE t ADD COLUMN IF NOT EXISTS a int, ADD COLUMN IF NOT EXISTS b int;";
    assert_eq!(classify_one(guarded).status(), StatementStatus::AlreadyIdempotent);

    let mixed = "ALTER TABLE t ADD COLUMN a int, ADD CONSTRAINT t_a CHECK (a > 0);";
    let result = transform_ok(mixed);
    assert_eq!(result.transformed_sql, mixed);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("split it or guard each action"));
}
