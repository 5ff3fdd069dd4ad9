#![allow(dead_code)]

use std::path::Path;

use ravenfleet_domain::Config;
use ravenfleet_lib::context::AppContext;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const VIN: &str = "1FTFW1ET5DFC10312";

/// Context wired against a mock server, with the credential file kept in a
/// temporary directory that lives as long as the context.
pub struct TestContext {
    pub ctx: AppContext,
    pub server: MockServer,
    _temp_dir: TempDir,
}

pub fn test_config(server: &MockServer, store_dir: &Path) -> Config {
    let mut config = Config::default();
    config.vin.base_url = format!("{}/vpic", server.uri());
    config.storage.credentials_path =
        store_dir.join("credentials.json").to_string_lossy().to_string();
    config
}

/// Fresh context plus a mock fleet of three vehicles, the second with a VIN.
pub async fn setup_test_context() -> TestContext {
    let server = MockServer::start().await;
    mount_fleet(&server).await;

    let temp_dir = tempfile::tempdir().expect("failed to create temporary directory");
    let ctx = AppContext::new(test_config(&server, temp_dir.path()))
        .expect("failed to build application context");

    TestContext { ctx, server, _temp_dir: temp_dir }
}

/// Another context sharing the same credential file, as a second process
/// would.
pub fn reopen(test: &TestContext) -> AppContext {
    AppContext::new(test.ctx.config.clone()).expect("failed to build application context")
}

async fn mount_fleet(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok-1"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ravens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"uuid": "a", "name": "Van A", "imei": 350000000000001_u64},
            {"uuid": "b", "name": "Truck B", "imei": "350000000000002", "vehicle_vin": VIN},
            {"uuid": "c", "name": "Van C"}
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/geofences"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"items": [{"uuid": "depot"}]})),
        )
        .mount(server)
        .await;
    for uuid in ["a", "b", "c"] {
        Mock::given(method("GET"))
            .and(path(format!("/ravens/{uuid}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"uuid": uuid, "ignition": "off"}})),
            )
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(format!("/vpic/vehicles/DecodeVinValues/{VIN}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Count": 1,
            "Results": [{"Make": "FORD", "Model": "F-150", "ModelYear": "2013"}]
        })))
        .mount(server)
        .await;
}
