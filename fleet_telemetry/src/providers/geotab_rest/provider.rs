use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use shared_utils::env::get_env_var;
use snafu::{ResultExt, ensure};
use tracing::debug;

use crate::{
    models::{
        device::{Device, StatusInfo},
        reading::{ReadingPage, ReadingQuery},
    },
    providers::{
        ApiSnafu, ClientBuildSnafu, DecodeSnafu, MissingEnvVarSnafu, ProviderError, ProviderInitError,
        ReqwestSnafu, TelemetrySource,
        geotab_rest::{
            params::{
                CredentialsPayload, GetParams, LIST_RESULTS_LIMIT, RpcRequest, Search, SortParams,
                TYPE_DEVICE, TYPE_DEVICE_STATUS_INFO, TYPE_STATUS_DATA, status_data_search,
            },
            response::{RpcResponse, into_devices, into_reading_page, into_status_infos},
        },
    },
};

/// An authenticated platform session.
pub struct GeotabCredentials {
    pub database: String,
    pub user_name: String,
    pub session_id: SecretString,
}

impl GeotabCredentials {
    /// Reads the session from `GEOTAB_DATABASE`, `GEOTAB_USERNAME` and
    /// `GEOTAB_SESSION_ID`.
    pub fn from_env() -> Result<Self, ProviderInitError> {
        Ok(Self {
            database: get_env_var("GEOTAB_DATABASE").context(MissingEnvVarSnafu)?,
            user_name: get_env_var("GEOTAB_USERNAME").context(MissingEnvVarSnafu)?,
            session_id: SecretString::new(
                get_env_var("GEOTAB_SESSION_ID")
                    .context(MissingEnvVarSnafu)?
                    .into(),
            ),
        })
    }
}

pub struct GeotabProvider {
    client: Client,
    endpoint: String,
    credentials: GeotabCredentials,
}

impl GeotabProvider {
    /// Creates a provider for `server` using credentials from the environment.
    pub fn new(server: &str) -> Result<Self, ProviderInitError> {
        Self::with_credentials(server, GeotabCredentials::from_env()?)
    }

    pub fn with_credentials(
        server: &str,
        credentials: GeotabCredentials,
    ) -> Result<Self, ProviderInitError> {
        let client = Client::builder().build().context(ClientBuildSnafu)?;
        Ok(Self {
            client,
            endpoint: endpoint_for(server),
            credentials,
        })
    }

    async fn get(
        &self,
        type_name: &'static str,
        search: Search,
        sort: Option<SortParams>,
        results_limit: usize,
    ) -> Result<Vec<Value>, ProviderError> {
        let request = RpcRequest {
            method: "Get",
            params: GetParams {
                type_name,
                search,
                results_limit,
                sort,
                credentials: CredentialsPayload {
                    database: &self.credentials.database,
                    user_name: &self.credentials.user_name,
                    session_id: self.credentials.session_id.expose_secret(),
                },
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return ApiSnafu {
                message: format!("{status}: {message}"),
            }
            .fail();
        }

        let body = response.text().await.context(ReqwestSnafu)?;
        let envelope: RpcResponse = serde_json::from_str(&body).map_err(|e| {
            DecodeSnafu {
                message: e.to_string(),
            }
            .build()
        })?;
        if let Some(error) = &envelope.error {
            return ApiSnafu {
                message: error.describe(),
            }
            .fail();
        }

        let rows = envelope.into_rows();
        debug!(type_name, rows = rows.len(), "Get returned");
        Ok(rows)
    }
}

/// Builds the JSON-RPC endpoint for a server name or base URL.
pub fn endpoint_for(server: &str) -> String {
    let server = server.trim().trim_end_matches('/');
    if server.starts_with("http://") || server.starts_with("https://") {
        format!("{server}/apiv1")
    } else {
        format!("https://{server}/apiv1")
    }
}

#[async_trait]
impl TelemetrySource for GeotabProvider {
    async fn list_devices(&self) -> Result<Vec<Device>, ProviderError> {
        let rows = self
            .get(TYPE_DEVICE, Search::default(), None, LIST_RESULTS_LIMIT)
            .await?;
        Ok(into_devices(rows))
    }

    async fn query_readings(&self, query: &ReadingQuery) -> Result<ReadingPage, ProviderError> {
        ensure!(
            query.limit > 0,
            ApiSnafu {
                message: "resultsLimit must be positive"
            }
        );
        let (search, sort) = status_data_search(query);
        let rows = self.get(TYPE_STATUS_DATA, search, sort, query.limit).await?;
        Ok(into_reading_page(rows))
    }

    async fn list_status_info(&self) -> Result<Vec<StatusInfo>, ProviderError> {
        let rows = self
            .get(
                TYPE_DEVICE_STATUS_INFO,
                Search::default(),
                None,
                LIST_RESULTS_LIMIT,
            )
            .await?;
        Ok(into_status_infos(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_accepts_host_or_url() {
        assert_eq!(endpoint_for("my.geotab.com"), "https://my.geotab.com/apiv1");
        assert_eq!(
            endpoint_for("http://localhost:8080/"),
            "http://localhost:8080/apiv1"
        );
    }
}
