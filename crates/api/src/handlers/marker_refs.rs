//! Validation of marker references carried by events and catches.

use catchlog_core::error::CoreError;
use catchlog_core::event::validate_marker_reference;
use catchlog_core::marker::MarkerSelectionSet;
use catchlog_core::types::DbId;
use catchlog_db::repositories::SpotRepo;
use sqlx::{Postgres, Transaction};

use crate::error::{AppError, AppResult};

/// Check that `spot_id` belongs to the user and that every selected marker
/// exists on that spot.
///
/// The spot stays share-locked until `tx` ends; the referencing row must be
/// written in the same transaction.
pub(crate) async fn check_marker_reference(
    tx: &mut Transaction<'_, Postgres>,
    user_id: DbId,
    spot_id: Option<DbId>,
    markers: &MarkerSelectionSet,
) -> AppResult<()> {
    validate_marker_reference(spot_id, markers)?;

    let Some(spot_id) = spot_id else {
        return Ok(());
    };

    let marker_count = SpotRepo::lock_marker_count(tx, user_id, spot_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Spot",
            id: spot_id,
        }))?;

    markers.validate_against(marker_count)?;
    Ok(())
}

/// Whether a patch touches the spot or marker reference of a row currently
/// pointing at `current_spot`.
pub(crate) fn reference_changed(
    current_spot: Option<DbId>,
    spot_id: Option<DbId>,
    markers: Option<&MarkerSelectionSet>,
) -> bool {
    markers.is_some() || spot_id.is_some_and(|id| Some(id) != current_spot)
}

/// Parse marker indices already stored on a row.
pub(crate) fn stored_markers(raw: &[i32]) -> AppResult<MarkerSelectionSet> {
    MarkerSelectionSet::from_wire(raw)
        .map_err(|e| AppError::InternalError(format!("Corrupt marker reference: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_changed() {
        let markers = MarkerSelectionSet::from_wire(&[0]).unwrap();

        assert!(!reference_changed(Some(3), None, None));
        assert!(!reference_changed(Some(3), Some(3), None));
        assert!(reference_changed(Some(3), Some(4), None));
        assert!(reference_changed(None, Some(4), None));
        assert!(reference_changed(Some(3), None, Some(&markers)));
    }
}
