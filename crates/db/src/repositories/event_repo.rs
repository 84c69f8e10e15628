//! Repository for the `events` table.

use catchlog_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::event::{CreateEvent, Event, UpdateEvent};

/// Column list for `events` queries.
const COLUMNS: &str = "\
    id, user_id, spot_id, title, starts_at, notes, \
    selected_marker_indexes, created_at, updated_at";

/// Provides data access for fishing events.
pub struct EventRepo;

impl EventRepo {
    /// List a user's events, soonest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events WHERE user_id = $1 ORDER BY starts_at, id"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_for_user(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch an event inside `tx` without locking it.
    ///
    /// The row lock is left to [`Self::update`], so a caller that share-locks
    /// the spot in between takes locks in the same order as
    /// `SpotRepo::update` (spot first, then dependent rows).
    pub async fn find_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Insert inside `tx`, so the caller's marker check on the referenced
    /// spot still holds when the row becomes visible.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        dto: &CreateEvent,
    ) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events \
                 (user_id, spot_id, title, starts_at, notes, selected_marker_indexes) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(user_id)
            .bind(dto.spot_id)
            .bind(&dto.title)
            .bind(dto.starts_at)
            .bind(&dto.notes)
            .bind(dto.selected_marker_indexes.to_wire())
            .fetch_one(&mut **tx)
            .await
    }

    /// Partially update an event. Uses `COALESCE` so only provided fields
    /// are changed. Runs inside `tx` for the same reason as [`Self::create`].
    pub async fn update(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        id: DbId,
        dto: &UpdateEvent,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "UPDATE events SET \
                 spot_id = COALESCE($3, spot_id), \
                 title = COALESCE($4, title), \
                 starts_at = COALESCE($5, starts_at), \
                 notes = COALESCE($6, notes), \
                 selected_marker_indexes = COALESCE($7, selected_marker_indexes) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(user_id)
            .bind(dto.spot_id)
            .bind(&dto.title)
            .bind(dto.starts_at)
            .bind(&dto.notes)
            .bind(dto.selected_marker_indexes.as_ref().map(|s| s.to_wire()))
            .fetch_optional(&mut **tx)
            .await
    }

    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
