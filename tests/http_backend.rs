//! HTTP backend tests against a mock bootstrap bridge.
//!
//! These tests run the real reqwest client against wiremock and check the
//! request shape (path, bearer token, body) and the error mapping.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use marketseed::backend::requests::{
    CreateSalesChannel, CreateSalesChannelsRequest, RegisterIdentityRequest, SalesChannelFilter,
};
use marketseed::backend::{Backend, BackendError, HttpBackend};
use marketseed::core::types::{FulfillmentSetId, SellerId};
use marketseed::seed::entities::ensure_sales_channel;
use marketseed::seed::provision::create_service_zone_for_fulfillment_set;
use marketseed::seed::SeedError;

const TOKEN: &str = "test-token";

fn backend(server: &MockServer) -> HttpBackend {
    HttpBackend::new(server.uri(), Some(TOKEN.to_string())).unwrap()
}

#[tokio::test]
async fn list_posts_entity_and_filters_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/modules/sales_channel/list"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "entity": "sales_channel",
            "filters": { "name": "Default Sales Channel" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "sc_01", "name": "Default Sales Channel" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let channels = backend(&server)
        .list_sales_channels(SalesChannelFilter {
            name: "Default Sales Channel".into(),
        })
        .await
        .unwrap();
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].id.as_str(), "sc_01");
    assert!(!channels[0].is_disabled);
}

#[tokio::test]
async fn workflows_wrap_input_and_unwrap_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/workflows/create-sales-channels/run"))
        .and(body_partial_json(json!({
            "input": { "salesChannelsData": [{ "name": "Default Sales Channel" }] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{ "id": "sc_02", "name": "Default Sales Channel" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = backend(&server)
        .create_sales_channels(CreateSalesChannelsRequest {
            sales_channels_data: vec![CreateSalesChannel {
                name: "Default Sales Channel".into(),
                description: None,
            }],
        })
        .await
        .unwrap();
    assert_eq!(created[0].id.as_str(), "sc_02");
}

#[tokio::test]
async fn register_uses_provider_path_and_plain_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/emailpass/register"))
        .and(body_partial_json(json!({
            "email": "seller@mercurjs.com",
            "password": "secret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "auth_identity": { "id": "authid_01" }
        })))
        .mount(&server)
        .await;

    let identity = backend(&server)
        .register_identity(RegisterIdentityRequest {
            provider: "emailpass".into(),
            email: "seller@mercurjs.com".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();
    assert_eq!(identity.id.as_str(), "authid_01");
}

#[tokio::test]
async fn conflict_is_rejected_with_bridge_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/workflows/create-sales-channels/run"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "name already taken" })),
        )
        .mount(&server)
        .await;

    let err = backend(&server)
        .create_sales_channels(CreateSalesChannelsRequest {
            sales_channels_data: vec![CreateSalesChannel {
                name: "Default Sales Channel".into(),
                description: None,
            }],
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        BackendError::Rejected {
            status: 409,
            message: "name already taken".into()
        }
    );
}

#[tokio::test]
async fn unauthorized_maps_to_auth_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = backend(&server)
        .list_sales_channels(SalesChannelFilter {
            name: "x".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::AuthFailed(_)), "{err:?}");
}

#[tokio::test]
async fn missing_token_fails_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(server.uri(), None).unwrap();
    let err = backend
        .list_sales_channels(SalesChannelFilter {
            name: "x".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err, BackendError::AuthRequired);
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = backend(&server)
        .list_sales_channels(SalesChannelFilter {
            name: "x".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn existing_sales_channel_is_reused_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/modules/sales_channel/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "sc_existing", "name": "Default Sales Channel" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/workflows/create-sales-channels/run"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let channel = ensure_sales_channel(&backend(&server)).await.unwrap();
    assert_eq!(channel.id.as_str(), "sc_existing");
}

#[tokio::test]
async fn seed_steps_pass_backend_errors_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "database is down" })),
        )
        .mount(&server)
        .await;

    let err = ensure_sales_channel(&backend(&server)).await.unwrap_err();
    match err {
        SeedError::Backend(BackendError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert!(message.contains("database is down"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn service_zone_id_comes_from_the_follow_up_list() {
    let server = MockServer::start().await;
    // The workflow output carries no zone id.
    Mock::given(method("POST"))
        .and(path("/workflows/create-service-zones/run"))
        .and(body_partial_json(json!({
            "input": { "data": [{ "fulfillment_set_id": "fuset_1", "name": "Europe" }] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{ "name": "Europe" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/modules/fulfillment/list"))
        .and(body_partial_json(json!({
            "entity": "service_zone",
            "filters": { "fulfillment_set": { "id": "fuset_1" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "serzo_1", "name": "Europe", "fulfillment_set_id": "fuset_1" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/links"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let zone = create_service_zone_for_fulfillment_set(
        &backend(&server),
        &SellerId::new("sel_1").unwrap(),
        &FulfillmentSetId::new("fuset_1").unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(zone.id.as_str(), "serzo_1");
}
