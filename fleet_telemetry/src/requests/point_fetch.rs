use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{
    cancel::CancelSignal,
    errors::Error,
    models::reading::{DiagnosticId, ReadingQuery},
    providers::TelemetrySource,
    requests::{PAGE_SIZE, ReadingsByEntity},
};

/// Readings of `diagnostic` at exactly `at`, one per entity.
///
/// A single request with `from == to == at`. Duplicates resolve to the last
/// row returned. Rows beyond one page are not fetched.
pub async fn point_per_entity<S>(
    source: &S,
    diagnostic: &DiagnosticId,
    at: DateTime<Utc>,
    cancel: &CancelSignal,
) -> Result<ReadingsByEntity, Error>
where
    S: TelemetrySource + Sync + ?Sized,
{
    cancel.check()?;
    let query = ReadingQuery {
        diagnostic: diagnostic.clone(),
        from: at,
        to: at,
        sort: None,
        limit: PAGE_SIZE,
    };
    let page = source.query_readings(&query).await?;
    if page.row_count >= PAGE_SIZE {
        debug!(%diagnostic, "point fetch filled a whole page; later rows are not fetched");
    }

    let mut by_entity = ReadingsByEntity::new();
    for reading in page.readings {
        by_entity.insert(reading.entity_id.clone(), reading);
    }
    Ok(by_entity)
}
