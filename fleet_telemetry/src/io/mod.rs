pub mod json_sink;
pub mod sheets;
pub mod sink;

use chrono::{DateTime, Utc};

pub use json_sink::JsonSink;
pub use sheets::{ENGINE_SHEET, ODOMETER_SHEET, Sheet, export_sheets};
pub use sink::{SinkError, TabularSink};

use crate::{errors::Error, models::row::VehicleRow};

/// Builds the report sheets for `rows` and hands them to `sink`.
pub async fn export<S>(sink: &S, rows: &[VehicleRow], now: DateTime<Utc>) -> Result<S::Output, Error>
where
    S: TabularSink + Sync + ?Sized,
{
    let sheets = export_sheets(rows, now)?;
    Ok(sink.write(&sheets).await?)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::row::{EngineSource, OdometerSource};

    #[tokio::test]
    async fn empty_report_is_a_sink_error() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();

        let result = export(&JsonSink::new(dir.path()), &[], now).await;

        assert!(matches!(result, Err(Error::Sink(SinkError::Empty { .. }))));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn rows_are_written_as_both_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let row = VehicleRow {
            vehicle: "Truck 7".into(),
            brand_model: Some("Iveco Daily".into()),
            odometer_source: OdometerSource::DeviceDiagnostic,
            odometer_km: Some(12345.0),
            odometer_timestamp: Some(now),
            odometer_age_minutes: Some(0),
            odometer_support_pct: None,
            engine_source: EngineSource::EngineDiagnostic,
            engine_hours: Some(812.5),
            engine_timestamp: Some(now),
            engine_age_minutes: Some(0),
            engine_support_pct: None,
        };

        let paths = export(&JsonSink::new(dir.path()), &[row], now).await.unwrap();

        assert_eq!(
            paths,
            vec![
                dir.path().join(format!("{ODOMETER_SHEET}.json")),
                dir.path().join(format!("{ENGINE_SHEET}.json")),
            ]
        );
    }
}
