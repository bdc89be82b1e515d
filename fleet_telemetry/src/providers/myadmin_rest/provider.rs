use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use snafu::ResultExt;
use tracing::{debug, warn};

use crate::{
    models::identifier::Vin,
    providers::{
        CapabilityError, CapabilityService, ClientBuildSnafu, ProviderInitError, StatusSnafu,
        PayloadSnafu, SupportObservation, TransportSnafu, myadmin_rest::response::observe_payload,
    },
};

pub const DEFAULT_ENDPOINT: &str = "https://myadmin.geotab.com/api/v1/MinedVehicleData/ByVins";

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ByVinsRequest<'a> {
    vins: &'a [Vin],
    region_id: u32,
}

pub struct MyAdminClient {
    client: Client,
    endpoint: String,
    limiter: DefaultDirectRateLimiter,
}

impl MyAdminClient {
    /// Creates a client for the default endpoint.
    pub fn new() -> Result<Self, ProviderInitError> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Creates a client for a custom endpoint (e.g. a staging deployment).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, ProviderInitError> {
        let client = Client::builder().build().context(ClientBuildSnafu)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            // MyAdmin throttles aggressive callers; stay well below its limit.
            limiter: RateLimiter::direct(Quota::per_second(nonzero!(4u32))),
        })
    }
}

#[async_trait]
impl CapabilityService for MyAdminClient {
    async fn lookup(
        &self,
        vins: &[Vin],
        region: u32,
        credential: &SecretString,
    ) -> Result<Vec<SupportObservation>, CapabilityError> {
        self.limiter.until_ready().await;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential.expose_secret())
            .json(&ByVinsRequest {
                vins,
                region_id: region,
            })
            .send()
            .await
            .context(TransportSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "capability lookup rejected");
            return StatusSnafu {
                status: status.as_u16(),
                body,
            }
            .fail();
        }

        let text = response.text().await.context(TransportSnafu)?;
        let payload: Value = serde_json::from_str(&text).context(PayloadSnafu)?;
        let observations = observe_payload(payload);
        debug!(
            requested = vins.len(),
            observed = observations.len(),
            "capability batch folded"
        );
        Ok(observations)
    }
}
