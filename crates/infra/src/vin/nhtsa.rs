//! VIN decoding through the NHTSA vPIC service

use std::sync::Arc;

use async_trait::async_trait;
use ravenfleet_core::VinDecoder;
use ravenfleet_domain::constants::DEFAULT_VIN_BASE_URL;
use ravenfleet_domain::{FleetError, Result, VehicleInfo};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::http::{encode_path_segment, ExchangeRequest, HttpExchange};

/// Decodes VINs with `DecodeVinValues`. No credentials are sent.
#[derive(Debug, Clone)]
pub struct NhtsaVinDecoder {
    exchange: Arc<HttpExchange>,
    base_url: String,
}

impl NhtsaVinDecoder {
    pub fn new(exchange: Arc<HttpExchange>) -> Self {
        Self::with_base_url(exchange, DEFAULT_VIN_BASE_URL)
    }

    pub fn with_base_url(exchange: Arc<HttpExchange>, base_url: impl Into<String>) -> Self {
        Self { exchange, base_url: base_url.into().trim_end_matches('/').to_string() }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn decode_url(&self, vin: &str) -> Result<String> {
        let encoded = encode_path_segment(vin)?;
        Ok(format!("{}/vehicles/DecodeVinValues/{encoded}?format=json", self.base_url))
    }
}

#[async_trait]
impl VinDecoder for NhtsaVinDecoder {
    #[instrument(skip(self))]
    async fn decode(&self, vin: &str) -> Result<VehicleInfo> {
        let vin = vin.trim();
        if vin.is_empty() {
            return Err(FleetError::validation("VIN is empty"));
        }

        let body = self.exchange.execute(ExchangeRequest::get(self.decode_url(vin)?)).await?;
        let info = first_result(body)
            .ok_or_else(|| FleetError::validation(format!("VIN decode returned no results for {vin}")))?;

        debug!(make = info.make().unwrap_or_default(), "VIN decoded");
        Ok(info)
    }
}

/// First entry of `Results`, without blank values.
fn first_result(body: Value) -> Option<VehicleInfo> {
    let Value::Object(mut body) = body else {
        return None;
    };
    let Some(Value::Array(results)) = body.remove("Results") else {
        return None;
    };
    let Some(Value::Object(first)) = results.into_iter().next() else {
        return None;
    };

    let attributes: Map<String, Value> = first
        .into_iter()
        .filter(|(_, value)| match value {
            Value::Null => false,
            Value::String(text) => !text.trim().is_empty(),
            _ => true,
        })
        .collect();
    Some(VehicleInfo::new(attributes))
}

#[cfg(test)]
mod tests {
    use ravenfleet_core::AuditLog;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::http::HttpClient;

    fn decoder(server: &MockServer) -> (NhtsaVinDecoder, Arc<AuditLog>) {
        let audit = Arc::new(AuditLog::new());
        let exchange = HttpExchange::new(HttpClient::new().unwrap(), Arc::clone(&audit));
        (NhtsaVinDecoder::with_base_url(Arc::new(exchange), format!("{}/api/", server.uri())), audit)
    }

    #[tokio::test]
    async fn decodes_first_result_without_blank_values() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/vehicles/DecodeVinValues/1FTFW1ET5DFC10312"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Count": 1,
                "Message": "Results returned successfully",
                "Results": [{
                    "Make": "FORD",
                    "Model": "F-150",
                    "ModelYear": "2013",
                    "Trim": "",
                    "Series2": null,
                    "ErrorCode": "0"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (decoder, audit) = decoder(&server);
        let info = decoder.decode(" 1FTFW1ET5DFC10312 ").await.unwrap();

        assert_eq!(info.make(), Some("FORD"));
        assert_eq!(info.model(), Some("F-150"));
        assert_eq!(info.model_year(), Some("2013"));
        assert!(!info.attributes().contains_key("Trim"));
        assert!(!info.attributes().contains_key("Series2"));
        assert_eq!(audit.len(), 1);
    }

    #[tokio::test]
    async fn empty_results_are_a_validation_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Count": 0, "Results": []})))
            .mount(&server)
            .await;

        let (decoder, _) = decoder(&server);
        let err = decoder.decode("XYZ").await.unwrap_err();
        assert!(matches!(err, FleetError::Validation { .. }));
    }

    #[tokio::test]
    async fn service_errors_propagate_and_are_logged() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let (decoder, audit) = decoder(&server);
        let err = decoder.decode("XYZ").await.unwrap_err();

        assert!(matches!(err, FleetError::Http { status: 503, .. }));
        assert_eq!(audit.entries()[0].status(), 503);
    }

    #[tokio::test]
    async fn blank_vin_never_hits_the_network() {
        let server = MockServer::start().await;
        let (decoder, audit) = decoder(&server);

        assert!(decoder.decode("   ").await.is_err());
        assert!(audit.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
