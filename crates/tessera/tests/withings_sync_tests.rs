//! End-to-end Withings ingestion tests
//!
//! These tests mock the vendor API with wiremock and drive the full
//! pipeline: refresh → fetch → normalize → derive → upsert.

use tessera::adapters::{GarminAdapter, WithingsAdapter};
use tessera::client::{GarminServiceClient, WithingsClient};
use tessera::crypto::XorCipher;
use tessera::error::TesseraError;
use tessera::models::{Integration, Vendor};
use tessera::store::Store;
use tessera::sync::SyncEngine;
use tessera::trends::TrendEngine;

use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine_against(mock_server: &MockServer) -> SyncEngine {
    SyncEngine::with_parts(
        Store::open_in_memory().unwrap(),
        WithingsAdapter::with_client(WithingsClient::new_with_base_url(
            &mock_server.uri(),
            "test-client-id",
            "test-client-secret",
        )),
        GarminAdapter::with_client(
            GarminServiceClient::new_with_base_url(&mock_server.uri()),
            Arc::new(XorCipher::new("test-encryption-key")),
        ),
    )
}

fn connect_withings(engine: &SyncEngine) -> Integration {
    let mut integration = Integration::new_token("u1", Vendor::Withings);
    integration.refresh_token = Some("old-refresh-token".to_string());
    engine.store().insert_integration(&integration).unwrap();
    integration
}

async fn mount_happy_path(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v2/oauth2"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(include_str!("fixtures/withings_token_refresh.json")),
        )
        .mount(mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/measure"))
        .and(body_string_contains("action=getmeas"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(include_str!("fixtures/withings_measurements.json")),
        )
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_full_sync_imports_base_and_derived_readings() {
    let mock_server = MockServer::start().await;
    mount_happy_path(&mock_server).await;

    let engine = engine_against(&mock_server);
    connect_withings(&engine);

    let outcome = engine.run("u1", Vendor::Withings, None).await.unwrap();

    // 4 base measures across two groups, plus muscle_mass_pct and
    // bone_mass_pct for the group that carries weight + masses.
    assert_eq!(outcome.imported, 6);
    assert_eq!(engine.store().count_observations().unwrap(), 6);

    let store = engine.store();
    let trends = TrendEngine::new(store);

    let weight = trends.query("muscle_mass", None, None).unwrap();
    assert_eq!(weight.len(), 1);
    assert_eq!(weight[0].value, Some(30.1));

    let derived = trends.query("muscle_mass_pct", None, None).unwrap();
    assert_eq!(derived.len(), 1);
    assert_eq!(derived[0].value, Some(42.9));
}

#[tokio::test]
async fn test_unit_exponent_conversion_stored() {
    let mock_server = MockServer::start().await;
    mount_happy_path(&mock_server).await;

    let engine = engine_against(&mock_server);
    connect_withings(&engine);
    engine.run("u1", Vendor::Withings, None).await.unwrap();

    // Second group: value 702 with exponent -2 → 7.02
    let points = TrendEngine::new(engine.store())
        .query("weight", None, None)
        .unwrap();
    let values: Vec<_> = points.iter().map(|p| p.value.unwrap()).collect();
    assert!(values.contains(&7.02));
    assert!(values.contains(&70.2));
}

#[tokio::test]
async fn test_repeat_sync_is_idempotent() {
    let mock_server = MockServer::start().await;
    mount_happy_path(&mock_server).await;

    let engine = engine_against(&mock_server);
    connect_withings(&engine);

    let first = engine.run("u1", Vendor::Withings, None).await.unwrap();
    let count_after_first = engine.store().count_observations().unwrap();

    let second = engine.run("u1", Vendor::Withings, None).await.unwrap();
    let count_after_second = engine.store().count_observations().unwrap();

    assert_eq!(first.imported, second.imported);
    assert_eq!(count_after_first, count_after_second);
}

#[tokio::test]
async fn test_refreshed_tokens_are_persisted_before_fetch() {
    let mock_server = MockServer::start().await;
    mount_happy_path(&mock_server).await;

    let engine = engine_against(&mock_server);
    connect_withings(&engine);
    engine.run("u1", Vendor::Withings, None).await.unwrap();

    let integration = engine
        .store()
        .get_integration("u1", Vendor::Withings)
        .unwrap()
        .unwrap();
    assert_eq!(integration.access_token.as_deref(), Some("fresh-access-token"));
    assert_eq!(
        integration.refresh_token.as_deref(),
        Some("fresh-refresh-token")
    );
    assert_eq!(integration.scope.as_deref(), Some("user.metrics"));
    assert!(integration.expires_at.is_some());
}

#[tokio::test]
async fn test_application_status_error_inside_http_200_fails_run() {
    let mock_server = MockServer::start().await;

    // HTTP 200, application status non-zero: the vendor rejected the
    // refresh token.
    Mock::given(method("POST"))
        .and(path("/v2/oauth2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(include_str!("fixtures/withings_token_rejected.json")),
        )
        .mount(&mock_server)
        .await;

    let engine = engine_against(&mock_server);
    connect_withings(&engine);

    let err = engine.run("u1", Vendor::Withings, None).await.unwrap_err();
    assert!(matches!(err, TesseraError::Auth(_)));
    assert_eq!(err.status(), 500);
    assert_eq!(engine.store().count_observations().unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_measure_code_aborts_without_importing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/oauth2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(include_str!("fixtures/withings_token_refresh.json")),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/measure"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{
                "status": 0,
                "body": {
                    "updatetime": 0,
                    "timezone": "UTC",
                    "measuregrps": [
                        {
                            "grpid": 1,
                            "date": 1704880800,
                            "measures": [
                                {"value": 702, "type": 1, "unit": -1},
                                {"value": 5, "type": 424242, "unit": 0}
                            ]
                        }
                    ]
                }
            }"#,
        ))
        .mount(&mock_server)
        .await;

    let engine = engine_against(&mock_server);
    connect_withings(&engine);

    let err = engine.run("u1", Vendor::Withings, None).await.unwrap_err();
    assert!(matches!(err, TesseraError::Validation(_)));
    // Normalization failed before the upsert stage.
    assert_eq!(engine.store().count_observations().unwrap(), 0);
}

#[tokio::test]
async fn test_sync_without_connection_maps_to_404() {
    let mock_server = MockServer::start().await;
    let engine = engine_against(&mock_server);

    let err = engine.run("u1", Vendor::Withings, None).await.unwrap_err();
    assert!(matches!(err, TesseraError::NotConnected(_)));
    assert_eq!(err.status(), 404);
}
