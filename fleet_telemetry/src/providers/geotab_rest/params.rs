use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::reading::{ReadingQuery, SortOrder};

/// Result cap used for list calls that are not paged.
pub const LIST_RESULTS_LIMIT: usize = 50_000;

pub const TYPE_DEVICE: &str = "Device";
pub const TYPE_STATUS_DATA: &str = "StatusData";
pub const TYPE_DEVICE_STATUS_INFO: &str = "DeviceStatusInfo";

/// Session credentials sent with every call.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsPayload<'a> {
    pub database: &'a str,
    pub user_name: &'a str,
    pub session_id: &'a str,
}

/// Reference to another entity by id.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct IdSearch {
    pub id: String,
}

/// Search filter of a `Get` call.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Search {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic_search: Option<IdSearch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_date: Option<DateTime<Utc>>,
}

/// Server-side ordering of a `Get` call.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SortParams {
    pub sort_by: &'static str,
    pub sort_direction: &'static str,
}

impl From<SortOrder> for SortParams {
    fn from(order: SortOrder) -> Self {
        Self {
            sort_by: "date",
            sort_direction: match order {
                SortOrder::Ascending => "Ascending",
                SortOrder::Descending => "Descending",
            },
        }
    }
}

/// Parameters of a `Get` call.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GetParams<'a> {
    pub type_name: &'static str,
    pub search: Search,
    pub results_limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortParams>,
    pub credentials: CredentialsPayload<'a>,
}

/// JSON-RPC envelope.
#[derive(Serialize, Debug)]
pub struct RpcRequest<'a> {
    pub method: &'static str,
    pub params: GetParams<'a>,
}

/// Translates a reading query into the `StatusData` search and sort.
pub fn status_data_search(query: &ReadingQuery) -> (Search, Option<SortParams>) {
    let search = Search {
        diagnostic_search: Some(IdSearch {
            id: query.diagnostic.as_str().to_string(),
        }),
        from_date: Some(query.from),
        to_date: Some(query.to),
    };
    (search, query.sort.map(SortParams::from))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::models::reading::DiagnosticId;

    #[test]
    fn serializes_window_query_like_the_platform_expects() {
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let query = ReadingQuery {
            diagnostic: DiagnosticId::odometer(),
            from: at,
            to: at,
            sort: Some(SortOrder::Ascending),
            limit: 10,
        };
        let (search, sort) = status_data_search(&query);
        let request = RpcRequest {
            method: "Get",
            params: GetParams {
                type_name: TYPE_STATUS_DATA,
                search,
                results_limit: query.limit,
                sort,
                credentials: CredentialsPayload {
                    database: "db",
                    user_name: "ops@example.com",
                    session_id: "s3ss10n",
                },
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["method"], "Get");
        assert_eq!(value["params"]["typeName"], "StatusData");
        assert_eq!(
            value["params"]["search"]["diagnosticSearch"],
            json!({"id": "DiagnosticOdometerId"})
        );
        assert_eq!(value["params"]["search"]["fromDate"], "2025-01-02T03:04:05Z");
        assert_eq!(value["params"]["resultsLimit"], 10);
        assert_eq!(
            value["params"]["sort"],
            json!({"sortBy": "date", "sortDirection": "Ascending"})
        );
        assert_eq!(value["params"]["credentials"]["userName"], "ops@example.com");
    }

    #[test]
    fn point_query_omits_sort() {
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        let query = ReadingQuery {
            diagnostic: DiagnosticId::odometer_adjustment(),
            from: at,
            to: at,
            sort: None,
            limit: 50_000,
        };
        let (_, sort) = status_data_search(&query);
        assert!(sort.is_none());
    }
}
