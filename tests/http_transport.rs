// Integration tests for the reqwest-backed transport using wiremock.

use std::sync::Arc;

use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use yemeksepeti::api::{
    ApiClient, ApiContext, ApiError, HttpTransport, RestaurantQuery, StatusSink,
};
use yemeksepeti::config::Credentials;
use yemeksepeti::data::JOKER_CAMPAIGN_ID;

const LISTING_PATH: &str = "/vendors-gateway/api/v1/pandora/vendors";
const CHALLENGE_BODY: &str =
    r#"<html><head><script src="/PXlJuB4eTB/main.min.js"></script></head></html>"#;

// ── Helpers ─────────────────────────────────────────────────────────

fn credentials() -> Credentials {
    Credentials {
        auth_token: "tok".to_string(),
        user_id: "TR_1".to_string(),
        customer_hash: Some("h4sh".to_string()),
        perseus_client_id: "pc".to_string(),
        perseus_session_id: "ps".to_string(),
    }
}

async fn setup() -> (MockServer, ApiContext, ApiClient) {
    let server = MockServer::start().await;
    let transport = Arc::new(HttpTransport::with_client(reqwest::Client::new()));
    let context = ApiContext::with_transport(transport, StatusSink::silent());
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::with_base_url(credentials(), &context, base_url).unwrap();
    (server, context, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_listing_sends_headers_and_query() {
    let (server, _context, client) = setup().await;

    let body = json!({
        "data": { "items": [{ "code": "k9zz", "name": "Dürümcü", "rating": 4.5 }] }
    });

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(header("authorization", "Bearer tok"))
        .and(header("x-fp-api-key", "volo"))
        .and(header("x-disco-client-id", "web"))
        .and(header("perseus-client-id", "pc"))
        .and(header("perseus-session-id", "ps"))
        .and(query_param("latitude", "41.0082"))
        .and(query_param("longitude", "28.9784"))
        .and(query_param("customer_id", "TR_1"))
        .and(query_param("customer_hash", "h4sh"))
        .and(query_param("joker_id", JOKER_CAMPAIGN_ID))
        .and(query_param("limit", "48"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let query = RestaurantQuery::new().joker(JOKER_CAMPAIGN_ID);
    let restaurants = client
        .get_restaurants(41.0082, 28.9784, &query)
        .await
        .unwrap();

    assert_eq!(restaurants.len(), 1);
    assert_eq!(restaurants[0].code, "k9zz");
    assert_eq!(restaurants[0].rating, 4.5);
}

#[tokio::test]
async fn test_vendor_detail_request() {
    let (server, _context, client) = setup().await;

    let body = json!({
        "data": {
            "code": "x1ab",
            "name": "Pideci",
            "menus": [{ "menu_categories": [{
                "id": 1,
                "name": "Pideler",
                "products": [{
                    "id": 7,
                    "name": "Kaşarlı",
                    "product_variations": [{ "code": "v7", "price": 160 }]
                }]
            }]}]
        }
    });

    Mock::given(method("GET"))
        .and(path("/api/v5/vendors/x1ab"))
        .and(query_param("include", "menus,deals"))
        .and(query_param("language_id", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let vendor = client.get_vendor_detail("x1ab", 41.0, 29.0).await.unwrap();

    assert_eq!(vendor.name, "Pideci");
    assert_eq!(vendor.menus[0].items[0].price, 160.0);
}

// ── Error-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_keeps_status_and_body_prefix() {
    let (server, context, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v5/customers/addresses"))
        .respond_with(ResponseTemplate::new(503).set_body_string("x".repeat(300)))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.get_addresses().await.unwrap_err();

    match err {
        ApiError::Http { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body.len(), 200);
        }
        other => panic!("Expected Http error, got {:?}", other),
    }
    assert!(!context.cooldown().is_active());
}

#[tokio::test]
async fn test_plain_forbidden_is_not_retried() {
    let (server, _context, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v5/customers/addresses"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.get_addresses().await.unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert!(!err.is_challenge());
}

#[tokio::test(start_paused = true)]
async fn test_challenge_page_exhausts_retries() {
    let (server, context, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v5/customers/addresses"))
        .respond_with(ResponseTemplate::new(403).set_body_string(CHALLENGE_BODY))
        .expect(4)
        .mount(&server)
        .await;

    let err = client.get_addresses().await.unwrap_err();

    assert!(matches!(err, ApiError::ChallengeExhausted { attempts: 4 }));
    assert!(context.cooldown().is_active());
}
