use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use tracing::debug;

use crate::{
    cancel::CancelSignal,
    errors::Error,
    models::reading::{DiagnosticId, ReadingQuery, SortOrder},
    providers::TelemetrySource,
    requests::ReadingsByEntity,
};

/// Rows requested per page.
pub const PAGE_SIZE: usize = 50_000;

/// A scan for the latest reading per entity inside `[from, to]`.
///
/// Pages are requested in ascending time order starting at `from`; each
/// reading overwrites its entity's entry, so after the last page every entity
/// maps to its most recent in-range reading. Entities without readings are
/// absent from the result.
///
/// The scan stops on an empty page, a short page, a last row without a
/// timestamp, or when the next cursor (last timestamp truncated to the
/// millisecond, + 1 ms) would not move forward or would pass `to`.
#[derive(Debug, Clone)]
pub struct WindowScan {
    pub diagnostic: DiagnosticId,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub page_size: usize,
}

impl WindowScan {
    pub fn new(diagnostic: DiagnosticId, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            diagnostic,
            from,
            to,
            page_size: PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub async fn run<S>(&self, source: &S, cancel: &CancelSignal) -> Result<ReadingsByEntity, Error>
    where
        S: TelemetrySource + Sync + ?Sized,
    {
        let mut latest = ReadingsByEntity::new();
        let mut cursor = self.from;
        let mut pages = 0usize;

        loop {
            cancel.check()?;
            let query = ReadingQuery {
                diagnostic: self.diagnostic.clone(),
                from: cursor,
                to: self.to,
                sort: Some(SortOrder::Ascending),
                limit: self.page_size,
            };
            let page = source.query_readings(&query).await?;
            pages += 1;
            debug!(
                diagnostic = %self.diagnostic,
                page = pages,
                rows = page.row_count,
                %cursor,
                "window page"
            );

            if page.is_empty() {
                break;
            }
            for reading in page.readings {
                latest.insert(reading.entity_id.clone(), reading);
            }
            if page.row_count < self.page_size {
                break;
            }

            let Some(last) = page.last_timestamp else {
                break;
            };
            let next = last.trunc_subsecs(3) + TimeDelta::milliseconds(1);
            if next <= cursor || next > self.to {
                break;
            }
            cursor = next;
        }

        debug!(diagnostic = %self.diagnostic, pages, entities = latest.len(), "window scan done");
        Ok(latest)
    }
}

/// Latest reading per entity for `diagnostic` within `[from, to]`, with the
/// default page size.
pub async fn latest_per_entity<S>(
    source: &S,
    diagnostic: &DiagnosticId,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    cancel: &CancelSignal,
) -> Result<ReadingsByEntity, Error>
where
    S: TelemetrySource + Sync + ?Sized,
{
    WindowScan::new(diagnostic.clone(), from, to)
        .run(source, cancel)
        .await
}
