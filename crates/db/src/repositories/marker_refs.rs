//! Maintenance of positional marker references held by events and catches.

use catchlog_core::marker::{MarkerIndex, MarkerSelectionSet};
use catchlog_core::types::DbId;
use sqlx::{Postgres, Transaction};

/// Tables whose rows reference a spot's markers by position.
pub(crate) const REFERENCING_TABLES: &[&str] = &["events", "catches"];

/// Drop marker indices that no longer exist after a spot's marker sequence
/// changed to `marker_count` entries.
///
/// Returns the number of rows rewritten.
pub(crate) async fn prune(
    tx: &mut Transaction<'_, Postgres>,
    spot_id: DbId,
    marker_count: usize,
) -> Result<u64, sqlx::Error> {
    let mut pruned = 0;
    for table in REFERENCING_TABLES {
        let select = format!(
            "SELECT id, selected_marker_indexes FROM {table} \
             WHERE spot_id = $1 AND cardinality(selected_marker_indexes) > 0"
        );
        let rows: Vec<(DbId, Vec<i32>)> = sqlx::query_as(&select)
            .bind(spot_id)
            .fetch_all(&mut **tx)
            .await?;

        let update = format!("UPDATE {table} SET selected_marker_indexes = $2 WHERE id = $1");
        for (id, raw) in rows {
            let mut set: MarkerSelectionSet = raw
                .iter()
                .filter_map(|&i| MarkerIndex::from_wire(i).ok())
                .collect();
            set.retain_in_range(marker_count);
            let repaired = set.to_wire();
            if repaired == raw {
                continue;
            }
            sqlx::query(&update)
                .bind(id)
                .bind(&repaired)
                .execute(&mut **tx)
                .await?;
            pruned += 1;
        }
    }
    Ok(pruned)
}

/// Clear every marker reference to a spot that is about to be deleted.
pub(crate) async fn clear(tx: &mut Transaction<'_, Postgres>, spot_id: DbId) -> Result<(), sqlx::Error> {
    for table in REFERENCING_TABLES {
        let query = format!(
            "UPDATE {table} SET selected_marker_indexes = '{{}}' \
             WHERE spot_id = $1 AND cardinality(selected_marker_indexes) > 0"
        );
        sqlx::query(&query).bind(spot_id).execute(&mut **tx).await?;
    }
    Ok(())
}
