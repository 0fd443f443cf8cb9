//! End-to-end view tests: login, route guard, products and settings against
//! a mock catalog API.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopadmin::api::ApiClient;
use shopadmin::app::{App, ViewError};
use shopadmin::auth::{LoginError, ManualClock, MemorySessionStore, Session, SessionStore};
use shopadmin::config::Config;
use shopadmin::models::{BrandingSettings, ProductDraft};
use shopadmin::router::{AuthState, Navigation, View};
use shopadmin::scope::ViewScope;

const T: i64 = 1_700_000_000_000;

fn app(server: &MockServer) -> (App, Arc<MemorySessionStore>, ManualClock) {
    let api = ApiClient::new(&server.uri(), None).unwrap();
    let store = Arc::new(MemorySessionStore::new());
    let clock = ManualClock::new(T);
    let app = App::with_parts(Config::default(), api, store.clone(), Arc::new(clock.clone()));
    (app, store, clock)
}

fn logged_in(server: &MockServer) -> (App, Arc<MemorySessionStore>, ManualClock) {
    let (app, store, clock) = app(server);
    store
        .write(&Session::new("tok", T + 5 * 60 * 1000, None))
        .unwrap();
    (app, store, clock)
}

fn mug_draft() -> ProductDraft {
    ProductDraft {
        product_name: "Mug".to_string(),
        description: "Ceramic".to_string(),
        price: "12.5".to_string(),
        categories: "kitchen".to_string(),
        stock: "40".to_string(),
        image_urls: vec!["https://cdn/a.png".to_string(), "https://cdn/b.png".to_string()],
    }
}

async fn mount_product_list(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "product_name": "Mug", "price": 12.5, "stock": 40,
             "categories": "kitchen", "description": "Ceramic",
             "image": "https://cdn/a.png"}
        ])))
        .mount(server)
        .await;
}

// ============================================================================
// Route guard
// ============================================================================

#[tokio::test]
async fn test_login_transitions_to_authenticated_landing_view() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc"})))
        .mount(&server)
        .await;

    let (mut app, _, _) = app(&server);
    assert_eq!(app.auth_state(), AuthState::Unauthenticated);
    assert_eq!(app.navigate(View::Settings), Navigation::Redirect { to: View::Login });

    let scope = ViewScope::new();
    app.login("admin", "secret123", &scope).await.unwrap();

    assert_eq!(app.auth_state(), AuthState::Authenticated);
    // The earlier destination is not restored.
    assert_eq!(app.current_view, View::Products);
    assert_eq!(app.config.last_username.as_deref(), Some("admin"));
}

#[tokio::test]
async fn test_protected_view_without_session_never_calls_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let (mut app, _, _) = app(&server);
    let scope = ViewScope::new();
    let err = app.load_products(&scope).await.unwrap_err();

    assert!(matches!(err, ViewError::SessionRequired));
    assert_eq!(app.current_view, View::Login);
    assert!(app.products.is_empty());
}

#[tokio::test]
async fn test_expired_session_redirects_and_clears() {
    let server = MockServer::start().await;
    mount_product_list(&server).await;

    let (mut app, store, clock) = logged_in(&server);
    let scope = ViewScope::new();
    assert_eq!(app.load_products(&scope).await.unwrap().len(), 1);

    clock.advance(Duration::minutes(5));
    assert!(matches!(
        app.load_products(&scope).await,
        Err(ViewError::SessionRequired)
    ));
    assert_eq!(store.read().unwrap(), None);
    assert_eq!(app.auth_state(), AuthState::Unauthenticated);
}

#[tokio::test]
async fn test_logout_clears_token_without_api_call() {
    let server = MockServer::start().await;
    let (mut app, store, _) = logged_in(&server);
    assert!(app.is_authenticated());

    app.logout().unwrap();

    assert_eq!(app.auth_state(), AuthState::Unauthenticated);
    assert_eq!(store.read().unwrap(), None);
    assert_eq!(app.navigate(View::Products), Navigation::Redirect { to: View::Login });
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_disposed_login_stores_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"token": "abc"}))
                .set_delay(StdDuration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let (mut app, store, _) = app(&server);
    let scope = ViewScope::new();
    let cancel = scope.handle();
    tokio::spawn(async move {
        tokio::time::sleep(StdDuration::from_millis(50)).await;
        cancel.cancel();
    });

    let err = app.login("admin", "secret123", &scope).await.unwrap_err();
    assert!(matches!(err, LoginError::Cancelled));
    assert_eq!(store.read().unwrap(), None);
    assert_eq!(app.auth_state(), AuthState::Unauthenticated);
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_list_products_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "a1", "product_name": "Cap", "imageUrl": "https://cdn/cap.png"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (mut app, _, _) = logged_in(&server);
    let scope = ViewScope::new();
    let products = app.load_products(&scope).await.unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].first_image().as_deref(), Some("https://cdn/cap.png"));
    assert!(app.find_product("a1").is_some());
}

#[tokio::test]
async fn test_create_product_posts_joined_images_then_refetches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/products"))
        .and(body_json(json!({
            "product_name": "Mug",
            "description": "Ceramic",
            "price": "12.5",
            "categories": "kitchen",
            "stock": "40",
            "image": "https://cdn/a.png https://cdn/b.png"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;
    mount_product_list(&server).await;

    let (mut app, _, _) = logged_in(&server);
    let scope = ViewScope::new();
    let products = app.create_product(&mug_draft(), &scope).await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_invalid_draft_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let (mut app, _, _) = logged_in(&server);
    let scope = ViewScope::new();
    let draft = ProductDraft {
        price: String::new(),
        ..mug_draft()
    };
    match app.create_product(&draft, &scope).await {
        Err(ViewError::Invalid(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors.get("price"), Some("Price is required"));
        }
        other => panic!("unexpected {:?}", other.map(|p| p.len())),
    }
}

#[tokio::test]
async fn test_update_and_delete_product() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/products/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/products/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    mount_product_list(&server).await;

    let (mut app, _, _) = logged_in(&server);
    let scope = ViewScope::new();
    app.update_product("1", &mug_draft(), &scope).await.unwrap();
    app.delete_product("1", &scope).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let put = requests
        .iter()
        .find(|r| r.method.as_str() == "PUT")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&put.body).unwrap();
    assert_eq!(body["id"], "1");
    assert_eq!(body["image"], "https://cdn/a.png https://cdn/b.png");
}

#[tokio::test]
async fn test_product_api_failure_uses_generic_copy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let (mut app, _, _) = logged_in(&server);
    let scope = ViewScope::new();
    let err = app.load_products(&scope).await.unwrap_err();
    assert_eq!(err.to_string(), "Error loading products");
}

// ============================================================================
// Settings
// ============================================================================

async fn mount_settings(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/titulo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"titulo": "Tienda"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/logo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"logo": "https://cdn/logo.png"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cintillo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_load_settings_defaults_missing_fields() {
    let server = MockServer::start().await;
    mount_settings(&server).await;

    let (mut app, _, _) = logged_in(&server);
    let scope = ViewScope::new();
    let settings = app.load_settings(&scope).await.unwrap().clone();

    assert_eq!(
        settings,
        BrandingSettings {
            title: "Tienda".to_string(),
            logo: "https://cdn/logo.png".to_string(),
            banner: String::new(),
        }
    );
    assert_eq!(app.settings, Some(settings));
}

#[tokio::test]
async fn test_save_settings_posts_each_value() {
    let server = MockServer::start().await;
    for (endpoint, value) in [
        ("/titulo", "Tienda Nueva"),
        ("/logo", "https://cdn/new.png"),
        ("/cintillo", "<p>Sale</p>"),
    ] {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .and(body_json(json!({"valor": value})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
    }

    let (mut app, _, _) = logged_in(&server);
    let scope = ViewScope::new();
    let settings = BrandingSettings {
        title: "Tienda Nueva".to_string(),
        logo: "https://cdn/new.png".to_string(),
        banner: "<p>Sale</p>".to_string(),
    };
    app.save_settings(settings.clone(), &scope).await.unwrap();
    assert_eq!(app.settings, Some(settings));
}

#[tokio::test]
async fn test_save_settings_fails_if_any_request_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/titulo"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/logo"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cintillo"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (mut app, _, _) = logged_in(&server);
    let scope = ViewScope::new();
    let settings = BrandingSettings {
        title: "Tienda".to_string(),
        logo: "https://cdn/logo.png".to_string(),
        banner: String::new(),
    };
    let err = app.save_settings(settings, &scope).await.unwrap_err();
    assert_eq!(err.to_string(), "Error saving settings");
    assert_eq!(app.settings, None);
}
