#![allow(dead_code)]

use pg_idempotent_core::{Statement, StatementType, TransformationResult, split_and_classify, transform};

/// A migration exercising every rewrite strategy.
pub const MIGRATION: &str = r"-- 20240101000000_init.sql
CREATE EXTENSION pgcrypto;
CREATE SCHEMA app;

CREATE TYPE app.status AS ENUM ('active', 'disabled');

CREATE TABLE app.users (
    id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    email text NOT NULL, -- login; unique below
    status app.status NOT NULL DEFAULT 'active'
);

CREATE UNIQUE INDEX users_email_idx ON app.users (email);

ALTER TABLE app.users ADD COLUMN created_at timestamptz;
ALTER TABLE app.users ADD CONSTRAINT users_email_check CHECK (email <> '');

CREATE FUNCTION app.touch() RETURNS trigger AS $fn$
BEGIN
    NEW.created_at := now();
    RETURN NEW;
END;
$fn$ LANGUAGE plpgsql;

CREATE TRIGGER users_touch BEFORE INSERT ON app.users
    FOR EACH ROW EXECUTE FUNCTION app.touch();

CREATE VIEW app.active_users AS SELECT * FROM app.users WHERE status = 'active';

ALTER TABLE app.users ENABLE ROW LEVEL SECURITY;
CREATE POLICY users_self ON app.users USING (id = current_setting('app.user')::uuid);
";

/// Transforms `sql`, failing the test unless the pipeline succeeded.
pub fn transform_ok(sql: &str) -> TransformationResult {
    let result = transform(sql);
    assert!(
        result.success,
        "Transform failed for: {sql}\nErrors: {:?}",
        result.errors
    );
    result
}

/// Classifies a script holding exactly one statement.
pub fn classify_one(sql: &str) -> Statement {
    let mut statements = split_and_classify(sql);
    assert_eq!(statements.len(), 1, "Expected one statement in: {sql}");
    statements.remove(0)
}

pub fn types(sql: &str) -> Vec<StatementType> {
    split_and_classify(sql)
        .into_iter()
        .map(|s| s.statement_type)
        .collect()
}

/// Transformed text of a single-statement script.
pub fn rewrite_one(sql: &str) -> String {
    let result = transform_ok(sql);
    assert_eq!(result.statement_count, 1, "Expected one statement in: {sql}");
    result.transformed_sql
}
