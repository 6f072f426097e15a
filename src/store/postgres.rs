//! PostgreSQL implementation of [`ClubStore`].
//!
//! Point changes run in a transaction that locks the member row with
//! `SELECT ... FOR UPDATE`, so concurrent changes to the same member are
//! serialised by the database and the total and ledger entry commit
//! together.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::ClubStore;
use super::models::{ActivityRow, MemberRoleRow, MemberRow, ReviewRow, RoleRow, parse_role};
use crate::config::ClubConfig;
use crate::domain::{
    ActivityRecord, Member, MemberId, MemberWithRole, PointChange, ProfileUpdate, Review, Role,
    RoleAssignment,
};
use crate::error::{ClubError, map_db_error};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

const MEMBER_COLUMNS: &str = "id, email, full_name, avatar_url, total_points, created_at";

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::StorageUnavailable`] if the database cannot be
    /// reached within the configured timeout.
    pub async fn connect(config: &ClubConfig) -> Result<Self, ClubError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| ClubError::StorageUnavailable(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Persistence`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), ClubError> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| ClubError::Persistence(e.to_string()))
    }
}

/// Locks the member row for the rest of the transaction. Role writes and
/// removals both take this lock first, so they serialise per member.
async fn lock_member(tx: &mut Transaction<'_, Postgres>, id: MemberId) -> Result<(), ClubError> {
    let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM members WHERE id = $1 FOR UPDATE")
        .bind(Uuid::from(id))
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_db_error)?;
    match exists {
        Some(_) => Ok(()),
        None => Err(ClubError::member_not_found(id)),
    }
}

async fn ensure_role(
    tx: &mut Transaction<'_, Postgres>,
    id: MemberId,
    expected: Role,
) -> Result<(), ClubError> {
    let stored = sqlx::query_scalar::<_, String>("SELECT role FROM user_roles WHERE member_id = $1")
        .bind(Uuid::from(id))
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_db_error)?;
    let current = stored.as_deref().map(parse_role).transpose()?.unwrap_or_default();
    if current == expected {
        Ok(())
    } else {
        Err(ClubError::role_changed(id, expected, current))
    }
}

#[async_trait]
impl ClubStore for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn insert_member(&self, member: Member) -> Result<Member, ClubError> {
        sqlx::query(
            "INSERT INTO members (id, email, full_name, avatar_url, total_points, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (email) DO NOTHING",
        )
        .bind(Uuid::from(member.id))
        .bind(&member.email)
        .bind(&member.full_name)
        .bind(&member.avatar_url)
        .bind(member.total_points)
        .bind(member.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        // Either our row or the one that won the race on this email.
        self.member_by_email(&member.email)
            .await?
            .ok_or_else(|| ClubError::Internal(format!("member vanished: {}", member.email)))
    }

    async fn member(&self, id: MemberId) -> Result<Option<Member>, ClubError> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.map(Member::from))
    }

    async fn member_by_email(&self, email: &str) -> Result<Option<Member>, ClubError> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.map(Member::from))
    }

    async fn members(&self, ids: &[MemberId]) -> Result<Vec<Member>, ClubError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = ids.iter().copied().map(Uuid::from).collect();
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(rows.into_iter().map(Member::from).collect())
    }

    async fn list_members(&self) -> Result<Vec<MemberWithRole>, ClubError> {
        let rows = sqlx::query_as::<_, MemberRoleRow>(
            "SELECT m.id, m.email, m.full_name, m.avatar_url, m.total_points, m.created_at, r.role \
             FROM members m LEFT JOIN user_roles r ON r.member_id = m.id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        rows.into_iter().map(MemberWithRole::try_from).collect()
    }

    async fn update_profile(
        &self,
        id: MemberId,
        update: &ProfileUpdate,
    ) -> Result<Member, ClubError> {
        // A `false` flag keeps the column; `true` writes the bound value,
        // which may be NULL to clear it.
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "UPDATE members SET \
             full_name = CASE WHEN $2 THEN $3 ELSE full_name END, \
             avatar_url = CASE WHEN $4 THEN $5 ELSE avatar_url END \
             WHERE id = $1 RETURNING {MEMBER_COLUMNS}"
        ))
        .bind(Uuid::from(id))
        .bind(update.full_name.is_some())
        .bind(update.full_name.clone().flatten())
        .bind(update.avatar_url.is_some())
        .bind(update.avatar_url.clone().flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        row.map(Member::from)
            .ok_or_else(|| ClubError::member_not_found(id))
    }

    async fn delete_member(&self, id: MemberId, expected_role: Role) -> Result<(), ClubError> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        let uuid = Uuid::from(id);

        lock_member(&mut tx, id).await?;
        ensure_role(&mut tx, id, expected_role).await?;

        sqlx::query("DELETE FROM reviews WHERE target_id = $1")
            .bind(uuid)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        sqlx::query("DELETE FROM user_roles WHERE member_id = $1")
            .bind(uuid)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        let deleted = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(uuid)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        if deleted.rows_affected() == 0 {
            return Err(ClubError::member_not_found(id));
        }
        tx.commit().await.map_err(map_db_error)
    }

    async fn role_assignment(&self, id: MemberId) -> Result<Option<RoleAssignment>, ClubError> {
        let row = sqlx::query_as::<_, RoleRow>(
            "SELECT member_id, role, assigned_by, assigned_at FROM user_roles WHERE member_id = $1",
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        row.map(RoleAssignment::try_from).transpose()
    }

    async fn put_role(
        &self,
        assignment: RoleAssignment,
        expected_role: Option<Role>,
    ) -> Result<(), ClubError> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        let member_id = Uuid::from(assignment.member_id);

        lock_member(&mut tx, assignment.member_id).await?;
        if let Some(expected) = expected_role {
            ensure_role(&mut tx, assignment.member_id, expected).await?;
        }

        sqlx::query(
            "INSERT INTO user_roles (member_id, role, assigned_by, assigned_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (member_id) DO UPDATE SET \
             role = EXCLUDED.role, assigned_by = EXCLUDED.assigned_by, \
             assigned_at = EXCLUDED.assigned_at",
        )
        .bind(member_id)
        .bind(assignment.role.as_str())
        .bind(assignment.assigned_by.map(Uuid::from))
        .bind(assignment.assigned_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)
    }

    async fn apply_point_change(
        &self,
        change: PointChange,
    ) -> Result<(Member, ActivityRecord), ClubError> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        let target = Uuid::from(change.target_id);

        let current = sqlx::query_scalar::<_, i64>(
            "SELECT total_points FROM members WHERE id = $1 FOR UPDATE",
        )
        .bind(target)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| ClubError::member_not_found(change.target_id))?;

        let new_total = change.apply_to(current);
        let member = sqlx::query_as::<_, MemberRow>(&format!(
            "UPDATE members SET total_points = $2 WHERE id = $1 RETURNING {MEMBER_COLUMNS}"
        ))
        .bind(target)
        .bind(new_total)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let record = change.into_record();
        sqlx::query(
            "INSERT INTO activities \
             (id, target_id, delta, action_kind, description, actor_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(Uuid::from(record.id))
        .bind(target)
        .bind(record.delta)
        .bind(record.action_kind.as_str())
        .bind(&record.description)
        .bind(record.actor_id.map(Uuid::from))
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok((member.into(), record))
    }

    async fn activities_for(&self, target: MemberId) -> Result<Vec<ActivityRecord>, ClubError> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            "SELECT id, target_id, delta, action_kind, description, actor_id, created_at \
             FROM activities WHERE target_id = $1 ORDER BY seq DESC",
        )
        .bind(Uuid::from(target))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        rows.into_iter().map(ActivityRecord::try_from).collect()
    }

    async fn insert_review(&self, review: Review) -> Result<Review, ClubError> {
        let result = sqlx::query(
            "INSERT INTO reviews (id, target_id, reviewer_id, rating, comment, created_at) \
             SELECT $1, $2, $3, $4, $5, $6 WHERE EXISTS (SELECT 1 FROM members WHERE id = $2)",
        )
        .bind(Uuid::from(review.id))
        .bind(Uuid::from(review.target_id))
        .bind(Uuid::from(review.reviewer_id))
        .bind(i16::from(review.rating))
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(ClubError::member_not_found(review.target_id));
        }
        Ok(review)
    }

    async fn reviews_for(&self, target: MemberId) -> Result<Vec<Review>, ClubError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT id, target_id, reviewer_id, rating, comment, created_at \
             FROM reviews WHERE target_id = $1 ORDER BY seq DESC",
        )
        .bind(Uuid::from(target))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        rows.into_iter().map(Review::try_from).collect()
    }
}
