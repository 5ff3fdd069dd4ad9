//! Fleet API client
//!
//! Implements the login exchange and the authenticated reads on top of
//! [`HttpExchange`], so every call lands in the audit log.

use std::sync::Arc;

use async_trait::async_trait;
use ravenfleet_core::{AuthGateway, FleetApi, SessionToken};
use ravenfleet_domain::constants::REDACTED;
use ravenfleet_domain::{
    ApiEndpoints, Credentials, FleetError, Geofence, Result, VehicleDetails, VehicleSummary,
};
use serde_json::json;
use tracing::{debug, instrument};

use super::payload::{decode_list, extract_token, unwrap_object};
use crate::http::{encode_path_segment, ExchangeRequest, HttpExchange};

/// Fleet telemetry API adapter
#[derive(Debug, Clone)]
pub struct RavenApiClient {
    exchange: Arc<HttpExchange>,
    endpoints: ApiEndpoints,
}

impl RavenApiClient {
    pub fn new(exchange: Arc<HttpExchange>) -> Self {
        Self::with_endpoints(exchange, ApiEndpoints::default())
    }

    pub fn with_endpoints(exchange: Arc<HttpExchange>, endpoints: ApiEndpoints) -> Self {
        Self { exchange, endpoints }
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    fn details_path(&self, uuid: &str) -> Result<String> {
        let encoded = encode_path_segment(uuid)?;
        Ok(self.endpoints.vehicle_details_path.replace("{uuid}", &encoded))
    }
}

fn join(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

#[async_trait]
impl AuthGateway for RavenApiClient {
    #[instrument(skip_all, fields(api_url = %credentials.api_url()))]
    async fn login(&self, credentials: &Credentials) -> Result<String> {
        let url = join(credentials.api_url(), &self.endpoints.auth_path);
        let request = ExchangeRequest::post(
            url,
            json!({"api_key": credentials.api_key(), "api_secret": credentials.api_secret()}),
        )
        .audit_body(json!({"api_key": credentials.api_key(), "api_secret": REDACTED}));

        let body = match self.exchange.execute(request).await {
            Ok(body) => body,
            Err(FleetError::Http { status, status_text, .. }) => {
                let message = if status_text.is_empty() {
                    format!("login rejected with status {status}")
                } else {
                    format!("login rejected with status {status} {status_text}")
                };
                return Err(FleetError::auth(Some(status), message));
            }
            Err(err) => return Err(err),
        };

        let token = extract_token(&body)
            .ok_or_else(|| FleetError::auth(None, "login response did not contain a token"))?;
        debug!("login accepted");
        Ok(token)
    }
}

#[async_trait]
impl FleetApi for RavenApiClient {
    #[instrument(skip_all)]
    async fn list_vehicles(&self, session: &SessionToken) -> Result<Vec<VehicleSummary>> {
        let url = join(session.api_url(), &self.endpoints.vehicles_path);
        let body = self.exchange.execute(ExchangeRequest::get(url).bearer(session.token())).await?;
        decode_list(body, "vehicle")
    }

    #[instrument(skip_all)]
    async fn list_geofences(&self, session: &SessionToken) -> Result<Vec<Geofence>> {
        let url = join(session.api_url(), &self.endpoints.geofences_path);
        let body = self.exchange.execute(ExchangeRequest::get(url).bearer(session.token())).await?;
        decode_list(body, "geofence")
    }

    #[instrument(skip(self, session))]
    async fn vehicle_details(&self, session: &SessionToken, uuid: &str) -> Result<VehicleDetails> {
        let url = join(session.api_url(), &self.details_path(uuid)?);
        let body = self.exchange.execute(ExchangeRequest::get(url).bearer(session.token())).await?;
        VehicleDetails::try_from(unwrap_object(body))
    }
}
