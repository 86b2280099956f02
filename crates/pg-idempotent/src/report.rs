//! Plain-text rendering of statistics, statement tables and previews.

use pg_idempotent_core::{Statement, StatementStatus, StatisticsSummary};

const TYPE_WIDTH: usize = 28;
const OBJECT_WIDTH: usize = 32;
const STATUS_WIDTH: usize = 18;

/// Renders the aggregate counts and the per-type breakdown.
#[must_use]
pub fn render_stats(summary: &StatisticsSummary) -> String {
    let mut out = String::new();
    out.push_str("\nTransformation statistics:\n");
    out.push_str(&format!("{:-<60}\n", ""));
    for (label, count) in [
        ("Total statements", summary.total_statements),
        ("Already idempotent", summary.already_idempotent),
        ("Can transform", summary.transformable),
        ("Cannot transform", summary.not_transformable),
        ("Errors", summary.errors),
    ] {
        out.push_str(&format!(" {label:<24} {count:>6}\n"));
    }

    if !summary.by_type.is_empty() {
        out.push_str("\nBy statement type:\n");
        out.push_str(&format!("{:-<60}\n", ""));
        for (kind, count) in &summary.by_type {
            out.push_str(&format!(" {kind:<30} {count:>6}\n"));
        }
    }
    out
}

/// Renders one row per statement, up to `limit` rows.
#[must_use]
pub fn render_statements(statements: &[Statement], limit: usize) -> String {
    let mut out = String::new();
    if statements.is_empty() {
        return out;
    }
    out.push_str("\nStatement details:\n");
    out.push_str(&format!(
        " {:<4} {:<TYPE_WIDTH$} {:<OBJECT_WIDTH$} {:<STATUS_WIDTH$} Notes\n",
        "#", "Type", "Object", "Status"
    ));
    out.push_str(&format!("{:-<110}\n", ""));

    for (i, statement) in statements.iter().take(limit).enumerate() {
        let notes = match (&statement.error, statement.status()) {
            (Some(error), _) => error.to_string(),
            (None, StatementStatus::CannotTransform) if statement.statement_type.is_ddl() => {
                "cannot be wrapped in a DO block".to_string()
            }
            _ => String::new(),
        };
        out.push_str(&format!(
            " {:<4} {:<TYPE_WIDTH$} {:<OBJECT_WIDTH$} {:<STATUS_WIDTH$} {notes}\n",
            i + 1,
            statement.statement_type.as_str(),
            truncate(statement.object_name.as_deref().unwrap_or("-"), OBJECT_WIDTH),
            statement.status().to_string(),
        ));
    }

    if statements.len() > limit {
        out.push_str(&format!(
            "... and {} more statements\n",
            statements.len() - limit
        ));
    }
    out
}

/// Renders the first `lines` lines of `sql` with line numbers.
#[must_use]
pub fn render_preview(sql: &str, lines: usize) -> String {
    let total = sql.lines().count();
    let width = total.min(lines).max(1).to_string().len();
    let mut out = String::new();
    for (i, line) in sql.lines().take(lines).enumerate() {
        out.push_str(&format!("{:>width$} | {line}\n", i + 1));
    }
    if total > lines {
        out.push_str(&format!("... and {} more lines\n", total - lines));
    }
    out
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut short: String = text.chars().take(width - 3).collect();
    short.push_str("...");
    short
}
