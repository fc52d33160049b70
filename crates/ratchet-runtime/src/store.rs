use sqlx::PgPool;
use tracing::debug;

use ratchet_core::error::{RatchetError, Result};
use ratchet_core::{Migration, MigrationStore};

/// PostgreSQL target for migration steps.
///
/// Each step runs in its own transaction, so a failing step leaves no partial
/// statements behind. Earlier steps in the same run stay committed.
#[derive(Clone)]
pub struct PgMigrationStore {
    pool: PgPool,
}

impl PgMigrationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl MigrationStore for PgMigrationStore {
    async fn apply(&self, migration: &Migration) -> Result<()> {
        let statements = split_sql_statements(&migration.sql);
        debug!(
            "Migration {} has {} statement(s)",
            migration.id,
            statements.len()
        );

        let mut tx = self.pool.begin().await.map_err(|e| {
            RatchetError::Database(format!("Failed to begin transaction: {}", e))
        })?;

        for statement in &statements {
            if is_comment_only(statement) {
                continue;
            }

            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    RatchetError::Database(format!(
                        "Failed to apply migration '{}': {}",
                        migration.id, e
                    ))
                })?;
        }

        tx.commit().await.map_err(|e| {
            RatchetError::Database(format!(
                "Failed to commit migration '{}': {}",
                migration.id, e
            ))
        })?;

        Ok(())
    }
}

fn is_comment_only(statement: &str) -> bool {
    statement.lines().all(|l| {
        let l = l.trim();
        l.is_empty() || l.starts_with("--")
    })
}

/// Split SQL into individual statements, respecting dollar-quoted strings.
///
/// Semicolons inside `$$ ... $$` or `$tag$ ... $tag$` bodies do not split.
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut dollar_tag: Option<String> = None;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);

        if c == '$' {
            // Collect a potential `$tag$` delimiter
            let mut potential_tag = String::from("$");
            while let Some(&next_c) = chars.peek() {
                if next_c == '$' || next_c.is_alphanumeric() || next_c == '_' {
                    chars.next();
                    potential_tag.push(next_c);
                    current.push(next_c);
                    if next_c == '$' {
                        break;
                    }
                } else {
                    break;
                }
            }

            if potential_tag.len() >= 2 && potential_tag.ends_with('$') {
                match &dollar_tag {
                    Some(open) if *open == potential_tag => dollar_tag = None,
                    Some(_) => {}
                    None => dollar_tag = Some(potential_tag),
                }
            }
        }

        if c == ';' && dollar_tag.is_none() {
            push_statement(&mut statements, &current);
            current.clear();
        }
    }

    // Trailing statement without a semicolon
    push_statement(&mut statements, &current);

    statements
}

fn push_statement(statements: &mut Vec<String>, raw: &str) {
    let stmt = raw.trim().trim_end_matches(';').trim();
    if !stmt.is_empty() {
        statements.push(stmt.to_string());
    }
}
