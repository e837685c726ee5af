//! Database repository for CRUD operations.
//!
//! Every create/update runs in one transaction: the current row is read, derived
//! fields (slugs, version labels) are computed and the row is written before commit.
//! Entity-specific operations live in the sibling modules as `impl Repository` blocks.

use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};

use crate::errors::AppError;
use crate::models::parse_since;
use crate::slug::SlugPolicy;

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pub(super) pool: SqlitePool,
    pub(super) slug_policy: SlugPolicy,
}

impl Repository {
    pub fn new(pool: SqlitePool, slug_policy: SlugPolicy) -> Self {
        Self { pool, slug_policy }
    }

    /// Open a transaction that takes the write lock up front, so concurrent writers
    /// wait on the busy timeout instead of failing to upgrade a read lock.
    pub(super) async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin_with("BEGIN IMMEDIATE").await
    }
}

/// Append `AND instr(lower(<column>), lower(?)) > 0` for a non-blank search term.
pub(super) fn push_search(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, term: Option<&str>) {
    if let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) {
        qb.push(format!(" AND instr(lower({}), lower(", column))
            .push_bind(term.to_string())
            .push(")) > 0");
    }
}

/// Append bounds on `created_at`/`updated_at`.
pub(super) fn push_date_bounds(
    qb: &mut QueryBuilder<'_, Sqlite>,
    created_since: Option<&str>,
    updated_since: Option<&str>,
) -> Result<(), AppError> {
    if let Some(raw) = created_since {
        qb.push(" AND created_at >= ")
            .push_bind(parse_since("createdSince", raw)?);
    }
    if let Some(raw) = updated_since {
        qb.push(" AND updated_at >= ")
            .push_bind(parse_since("updatedSince", raw)?);
    }
    Ok(())
}

/// Append `AND deleted = ?` when a flag is given.
pub(super) fn push_deleted(qb: &mut QueryBuilder<'_, Sqlite>, deleted: Option<bool>) {
    if let Some(deleted) = deleted {
        qb.push(" AND deleted = ").push_bind(deleted as i32);
    }
}

pub(super) fn new_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}
