use std::str::FromStr;

use crate::{
    models::row::{EngineSource, OdometerSource, VehicleRow},
    views::sort::{RowSortKey, SortState, apply},
};

/// Restricts a view to one source kind, or passes everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFilter<T> {
    All,
    Only(T),
}

impl<T> Default for SourceFilter<T> {
    fn default() -> Self {
        Self::All
    }
}

impl<T: PartialEq> SourceFilter<T> {
    pub fn matches(&self, source: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == source,
        }
    }
}

impl<T: FromStr> FromStr for SourceFilter<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// Free-text and source criteria of one row view, AND-composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter<T> {
    /// Case-insensitive substring of the brand/model. Blank matches all rows.
    pub query: String,
    pub source: SourceFilter<T>,
}

impl<T> Default for RowFilter<T> {
    fn default() -> Self {
        Self {
            query: String::new(),
            source: SourceFilter::All,
        }
    }
}

pub type OdometerFilter = RowFilter<OdometerSource>;
pub type EngineFilter = RowFilter<EngineSource>;

impl<T: PartialEq> RowFilter<T> {
    pub fn new(query: impl Into<String>, source: SourceFilter<T>) -> Self {
        Self {
            query: query.into(),
            source,
        }
    }

    fn matches_query(&self, brand_model: Option<&str>) -> bool {
        let query = self.query.trim().to_lowercase();
        query.is_empty()
            || brand_model
                .unwrap_or_default()
                .to_lowercase()
                .contains(&query)
    }

    pub fn matches(&self, brand_model: Option<&str>, source: &T) -> bool {
        self.matches_query(brand_model) && self.source.matches(source)
    }
}

/// Rows passing `filter` on their odometer provenance, sorted by `sort`.
pub fn odometer_view<'a>(
    rows: &'a [VehicleRow],
    filter: &OdometerFilter,
    sort: &SortState<RowSortKey>,
) -> Vec<&'a VehicleRow> {
    let mut view: Vec<&VehicleRow> = rows
        .iter()
        .filter(|r| filter.matches(r.brand_model.as_deref(), &r.odometer_source))
        .collect();
    apply(&mut view, sort);
    view
}

/// Rows passing `filter` on their engine provenance, sorted by `sort`.
pub fn engine_view<'a>(
    rows: &'a [VehicleRow],
    filter: &EngineFilter,
    sort: &SortState<RowSortKey>,
) -> Vec<&'a VehicleRow> {
    let mut view: Vec<&VehicleRow> = rows
        .iter()
        .filter(|r| filter.matches(r.brand_model.as_deref(), &r.engine_source))
        .collect();
    apply(&mut view, sort);
    view
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(vehicle: &str, brand_model: Option<&str>, odo: OdometerSource, engine: EngineSource) -> VehicleRow {
        VehicleRow {
            vehicle: vehicle.to_string(),
            brand_model: brand_model.map(str::to_string),
            odometer_source: odo,
            odometer_km: None,
            odometer_timestamp: None,
            odometer_age_minutes: None,
            odometer_support_pct: None,
            engine_source: engine,
            engine_hours: None,
            engine_timestamp: None,
            engine_age_minutes: None,
            engine_support_pct: None,
        }
    }

    fn fleet() -> Vec<VehicleRow> {
        vec![
            row("t1", Some("Ford Transit"), OdometerSource::DeviceDiagnostic, EngineSource::GpsDerived),
            row("t2", Some("Ford Ranger"), OdometerSource::GpsDerived, EngineSource::EngineDiagnostic),
            row("t3", None, OdometerSource::GpsDerived, EngineSource::GpsDerived),
            row("t4", Some("Iveco Daily"), OdometerSource::DeviceDiagnostic, EngineSource::EngineDiagnostic),
        ]
    }

    fn vehicles(view: &[&VehicleRow]) -> Vec<String> {
        view.iter().map(|r| r.vehicle.clone()).collect()
    }

    #[test]
    fn text_and_source_compose_with_and() {
        let rows = fleet();
        let sort = SortState::for_rows(RowSortKey::Vehicle);

        let all = odometer_view(&rows, &OdometerFilter::default(), &sort);
        assert_eq!(all.len(), 4);

        let ford = odometer_view(&rows, &OdometerFilter::new(" FORD ", SourceFilter::All), &sort);
        assert_eq!(vehicles(&ford), ["t1", "t2"]);

        let ford_fallback = odometer_view(
            &rows,
            &OdometerFilter::new("ford", SourceFilter::Only(OdometerSource::GpsDerived)),
            &sort,
        );
        assert_eq!(vehicles(&ford_fallback), ["t2"]);
    }

    #[test]
    fn odometer_and_engine_views_filter_independently() {
        let rows = fleet();
        let sort = SortState::for_rows(RowSortKey::Vehicle);

        let odo = odometer_view(
            &rows,
            &OdometerFilter::new("", SourceFilter::Only(OdometerSource::DeviceDiagnostic)),
            &sort,
        );
        let engine = engine_view(
            &rows,
            &EngineFilter::new("", SourceFilter::Only(EngineSource::EngineDiagnostic)),
            &sort,
        );
        assert_eq!(vehicles(&odo), ["t1", "t4"]);
        assert_eq!(vehicles(&engine), ["t2", "t4"]);
    }

    #[test]
    fn source_filter_parses_all_and_kinds() {
        assert_eq!("ALL".parse::<SourceFilter<OdometerSource>>().unwrap(), SourceFilter::All);
        assert_eq!(
            "gps_derived".parse::<SourceFilter<EngineSource>>().unwrap(),
            SourceFilter::Only(EngineSource::GpsDerived)
        );
        assert!("odometer".parse::<SourceFilter<OdometerSource>>().is_err());
    }
}
