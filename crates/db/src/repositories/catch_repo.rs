//! Repository for the `catches` table.

use catchlog_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::catch::{Catch, CreateCatch, UpdateCatch};

/// Column list for `catches` queries.
const COLUMNS: &str = "\
    id, user_id, spot_id, species, weight_kg, length_cm, caught_at, notes, \
    selected_marker_indexes, created_at, updated_at";

/// Provides data access for logged catches.
pub struct CatchRepo;

impl CatchRepo {
    /// List a user's catches, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Catch>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM catches WHERE user_id = $1 ORDER BY caught_at DESC, id DESC"
        );
        sqlx::query_as::<_, Catch>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_for_user(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Catch>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM catches WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Catch>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch a catch inside `tx` without locking it.
    ///
    /// The row lock is left to [`Self::update`], so a caller that share-locks
    /// the spot in between takes locks in the same order as
    /// `SpotRepo::update` (spot first, then dependent rows).
    pub async fn find_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Catch>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM catches WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Catch>(&query)
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
        dto: &CreateCatch,
    ) -> Result<Catch, sqlx::Error> {
        let query = format!(
            "INSERT INTO catches \
                 (user_id, spot_id, species, weight_kg, length_cm, caught_at, notes, \
                  selected_marker_indexes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Catch>(&query)
            .bind(user_id)
            .bind(dto.spot_id)
            .bind(&dto.species)
            .bind(dto.weight_kg)
            .bind(dto.length_cm)
            .bind(dto.caught_at)
            .bind(&dto.notes)
            .bind(dto.selected_marker_indexes.to_wire())
            .fetch_one(&mut **tx)
            .await
    }

    /// Partially update a catch. Uses `COALESCE` so only provided fields
    /// are changed. Runs inside `tx` for the same reason as [`Self::create`].
    pub async fn update(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        id: DbId,
        dto: &UpdateCatch,
    ) -> Result<Option<Catch>, sqlx::Error> {
        let query = format!(
            "UPDATE catches SET \
                 spot_id = COALESCE($3, spot_id), \
                 species = COALESCE($4, species), \
                 weight_kg = COALESCE($5, weight_kg), \
                 length_cm = COALESCE($6, length_cm), \
                 caught_at = COALESCE($7, caught_at), \
                 notes = COALESCE($8, notes), \
                 selected_marker_indexes = COALESCE($9, selected_marker_indexes) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Catch>(&query)
            .bind(id)
            .bind(user_id)
            .bind(dto.spot_id)
            .bind(&dto.species)
            .bind(dto.weight_kg)
            .bind(dto.length_cm)
            .bind(dto.caught_at)
            .bind(&dto.notes)
            .bind(dto.selected_marker_indexes.as_ref().map(|s| s.to_wire()))
            .fetch_optional(&mut **tx)
            .await
    }

    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM catches WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
