//! Repository for the `spots` table.

use catchlog_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use super::marker_refs;
use crate::models::spot::{CreateSpot, Spot, UpdateSpot, UpdatedSpot};

/// Column list for `spots` queries.
const COLUMNS: &str = "\
    id, user_id, name, latitude, longitude, coordinates, notes, \
    map_image_url, is_favorite, created_at, updated_at";

/// Provides data access for spots.
pub struct SpotRepo;

impl SpotRepo {
    /// List a user's spots, favorites first, most recently edited first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Spot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM spots WHERE user_id = $1 \
             ORDER BY is_favorite DESC, updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, Spot>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Find one of the user's spots by ID.
    ///
    /// Returns `None` both for missing spots and for spots owned by someone
    /// else.
    pub async fn find_for_user(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Spot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM spots WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Spot>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Share-lock one of the user's spots for the rest of `tx` and return its
    /// additional marker count.
    ///
    /// The lock blocks [`Self::update`] and [`Self::delete`] until `tx` ends,
    /// so marker indices validated against the count stay in range while the
    /// referencing row is written.
    pub async fn lock_marker_count(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<usize>, sqlx::Error> {
        let count: Option<i32> = sqlx::query_scalar(
            "SELECT jsonb_array_length(coordinates) FROM spots \
             WHERE id = $1 AND user_id = $2 FOR SHARE",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(count.map(|n| usize::try_from(n).unwrap_or(0)))
    }

    /// Insert a new spot owned by `user_id`.
    pub async fn create(pool: &PgPool, user_id: DbId, dto: &CreateSpot) -> Result<Spot, sqlx::Error> {
        let query = format!(
            "INSERT INTO spots \
                 (user_id, name, latitude, longitude, coordinates, notes, map_image_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Spot>(&query)
            .bind(user_id)
            .bind(&dto.name)
            .bind(dto.latitude)
            .bind(dto.longitude)
            .bind(Json(&dto.coordinates))
            .bind(&dto.notes)
            .bind(&dto.map_image)
            .fetch_one(pool)
            .await
    }

    /// Partially update a spot.
    ///
    /// Uses `COALESCE` so only provided fields are changed. When the marker
    /// sequence is replaced, event and catch references to markers that no
    /// longer exist are pruned in the same transaction.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        dto: &UpdateSpot,
    ) -> Result<Option<UpdatedSpot>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE spots SET \
                 name = COALESCE($3, name), \
                 latitude = COALESCE($4, latitude), \
                 longitude = COALESCE($5, longitude), \
                 coordinates = COALESCE($6, coordinates), \
                 notes = COALESCE($7, notes), \
                 map_image_url = COALESCE($8, map_image_url) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        );
        let spot = sqlx::query_as::<_, Spot>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&dto.name)
            .bind(dto.latitude)
            .bind(dto.longitude)
            .bind(dto.coordinates.as_ref().map(Json))
            .bind(&dto.notes)
            .bind(&dto.map_image)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(spot) = spot else {
            return Ok(None);
        };

        let pruned_references = if dto.coordinates.is_some() {
            marker_refs::prune(&mut tx, spot.id, spot.marker_count()).await?
        } else {
            0
        };

        tx.commit().await?;
        Ok(Some(UpdatedSpot {
            spot,
            pruned_references,
        }))
    }

    /// Set or clear the favorite flag.
    pub async fn set_favorite(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        is_favorite: bool,
    ) -> Result<Option<Spot>, sqlx::Error> {
        let query = format!(
            "UPDATE spots SET is_favorite = $3 \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Spot>(&query)
            .bind(id)
            .bind(user_id)
            .bind(is_favorite)
            .fetch_optional(pool)
            .await
    }

    /// Delete a spot.
    ///
    /// Events and catches keep existing but lose their spot and marker
    /// references. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let owned: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM spots WHERE id = $1 AND user_id = $2 FOR UPDATE")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if owned.is_none() {
            return Ok(false);
        }

        marker_refs::clear(&mut tx, id).await?;

        let result = sqlx::query("DELETE FROM spots WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
