//! Transactional writes for stat lines.
//!
//! The statistic path is the most contended one (several operators may
//! record stats for the same match), so every mutation here carries its
//! own explicit transaction. Inputs are assumed to have passed
//! [`crate::service::validate`] already.

use diesel::prelude::*;

use crate::error::{StoreError, StoreResult, ValidationError};
use crate::models::Statistic;
use crate::schema::statistics::dsl as s;

/// Inserts a validated stat line inside a transaction. Any persistence
/// failure rolls back and surfaces as [`StoreError::Transaction`]
/// wrapping the cause.
pub fn create_statistic(conn: &mut SqliteConnection, stat: &Statistic) -> StoreResult<Statistic> {
    let mut row = stat.clone();
    row.deleted = false;

    let result = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::insert_into(s::statistics).values(&row).execute(conn)?;
        Ok(())
    });

    match result {
        Ok(()) => {
            tracing::info!(stats_id = row.stats_id, "statistic committed");
            Ok(row)
        }
        Err(source) => {
            tracing::warn!(stats_id = row.stats_id, error = %source, "statistic insert rolled back");
            Err(StoreError::Transaction {
                context: format!("creating statistic {}", row.stats_id),
                source,
            }
            .into())
        }
    }
}

/// Updates the numeric counters (and minutes played) of the canonical,
/// unfiltered row inside a transaction. An unknown id is
/// [`ValidationError::MissingStatistic`]; other failures roll back and
/// propagate with their original type — update deliberately does not wrap
/// the way create does.
pub fn update_statistic(conn: &mut SqliteConnection, stat: &Statistic) -> StoreResult<Statistic> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let existing: Option<Statistic> =
            s::statistics.find(stat.stats_id).first(conn).optional()?;
        let Some(mut row) = existing else {
            return Err(ValidationError::MissingStatistic(stat.stats_id).into());
        };

        row.points = stat.points;
        row.rebounds = stat.rebounds;
        row.assists = stat.assists;
        row.steals = stat.steals;
        row.blocks = stat.blocks;
        row.turnovers = stat.turnovers;
        row.minutes_played = stat.minutes_played;

        diesel::update(s::statistics.find(row.stats_id))
            .set(&row)
            .execute(conn)?;
        Ok(row)
    })
}

/// Soft-deletes a stat line inside a transaction. Returns `false` when
/// the id is unknown in any state — nothing was started, nothing rolls
/// back.
pub fn delete_statistic(conn: &mut SqliteConnection, stats_id: i32) -> StoreResult<bool> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let existing: Option<Statistic> = s::statistics.find(stats_id).first(conn).optional()?;
        if existing.is_none() {
            return Ok(false);
        }

        diesel::update(s::statistics.find(stats_id))
            .set(s::deleted.eq(true))
            .execute(conn)?;
        Ok(true)
    })
}

/// Inserts a whole batch in one transaction: either every row commits or
/// none does. Rejects an empty batch before any transaction opens.
pub fn create_bulk(
    conn: &mut SqliteConnection,
    stats: &[Statistic],
) -> StoreResult<Vec<Statistic>> {
    if stats.is_empty() {
        return Err(ValidationError::EmptyBatch.into());
    }

    let rows: Vec<Statistic> = stats
        .iter()
        .map(|stat| {
            let mut row = stat.clone();
            row.deleted = false;
            row
        })
        .collect();

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        for row in &rows {
            diesel::insert_into(s::statistics).values(row).execute(conn)?;
        }
        tracing::info!(count = rows.len(), "statistics batch committed");
        Ok(rows)
    })
}
