mod common;

use axum::http::{StatusCode, header};
use proptest::prelude::*;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tower::ServiceExt;

use common::{FailingAuthProvider, TestApp, body_string, location, set_cookies, test_config};
use warden::router::init_router;
use warden::state::AppState;
use warden_auth::{MemorySessionStore, StaticRoleResolver};
use warden_cache::{MemoryRoleCache, RoleCache};

#[tokio::test]
async fn test_admin_page_sends_anonymous_users_home() {
    let app = TestApp::new();
    let response = app.get("/admin/settings", None).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_admin_page_sends_non_admins_home() {
    let app = TestApp::new();
    let token = app.sign_in("bob", &[]).await;
    let response = app.get("/admin/settings", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_admin_page_allows_admins() {
    let app = TestApp::new();
    let token = app.sign_in("ada", &["admin"]).await;
    let response = app.get("/admin/settings", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("ada@example.com"));
}

#[tokio::test]
async fn test_dashboard_redirects_anonymous_users_with_return_path() {
    let app = TestApp::new();
    let response = app.get("/dashboard", None).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login?redirect=%2Fdashboard");
}

#[tokio::test]
async fn test_protected_redirect_is_stable_across_requests() {
    let app = TestApp::new();
    let first = app.get("/dashboard", None).await;
    let second = app.get("/dashboard", None).await;

    assert_eq!(location(&first), location(&second));
}

#[tokio::test]
async fn test_api_requires_session() {
    let app = TestApp::new();
    let response = app.get("/api/me", None).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_login_page_sends_signed_in_users_home() {
    let app = TestApp::new();
    let token = app.sign_in("carol", &[]).await;

    let response = app.get("/login", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");

    let anonymous = app.get("/login", None).await;
    assert_eq!(anonymous.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_bypass_route_skips_authentication() {
    let app = TestApp::new();
    let token = app.sign_in("dave", &["banned"]).await;

    let response = app.get("/feed.xml", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response).is_empty());
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=300"
    );
    assert_eq!(app.auth.calls(), 0);
    assert_eq!(app.sessions.count_for("dave"), 1);
}

#[tokio::test]
async fn test_banned_user_loses_every_session() {
    let app = TestApp::new();
    let token = app.sign_in("eve", &["banned"]).await;
    let _second_device = app.sign_in("eve", &["banned"]).await;
    assert_eq!(app.sessions.count_for("eve"), 2);

    let response = app.get("/dashboard", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(location(&response).starts_with("/login?error="));
    assert_eq!(
        location(&response),
        "/login?error=Account%20has%20been%20banned"
    );
    assert_eq!(app.sessions.count_for("eve"), 0);

    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("session=;")));
    assert!(cookies.iter().any(|c| c.starts_with("rolesVersion=;")));

    // The token no longer resolves to a session.
    let after = app.get("/dashboard", Some(&token)).await;
    assert_eq!(location(&after), "/login?redirect=%2Fdashboard");
}

#[tokio::test]
async fn test_ban_applies_to_unclassified_paths() {
    let app = TestApp::new();
    let token = app.sign_in("frank", &["banned"]).await;

    let response = app.get("/", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(location(&response).starts_with("/login?error="));
}

#[tokio::test]
async fn test_html_pages_are_stamped_for_signed_in_users() {
    let app = TestApp::new();
    let token = app.sign_in("grace", &[]).await;

    let response = app.get("/", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    let stamp = cookies
        .iter()
        .find(|c| c.starts_with("rolesVersion="))
        .expect("rolesVersion cookie");
    assert!(stamp.starts_with("rolesVersion=1;"));
    assert!(stamp.contains("HttpOnly"));
    assert!(stamp.contains("Secure"));
    assert!(stamp.contains("SameSite=Strict"));
    assert!(stamp.contains("Path=/"));

    let body = body_string(response).await;
    let script = body.find("<script>").unwrap();
    assert!(script < body.find("</head>").unwrap());
    assert!(body.contains("url=/?rolesVersion=1"));
}

#[tokio::test]
async fn test_anonymous_pages_are_not_stamped() {
    let app = TestApp::new();
    let response = app.get("/", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response).is_empty());
    assert!(!body_string(response).await.contains("<script>"));
}

#[tokio::test]
async fn test_json_responses_are_not_stamped() {
    let app = TestApp::new();
    let token = app.sign_in("heidi", &["contributor"]).await;

    let response = app.get("/api/me", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response).is_empty());

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["id"], "heidi");
    assert_eq!(body["roles"], serde_json::json!(["contributor", "user"]));
    assert_eq!(body["roles_version"], 1);
}

#[tokio::test]
async fn test_noscript_fallback_not_repeated_on_its_target() {
    let app = TestApp::new();
    let token = app.sign_in("ivan", &[]).await;

    let response = app.get("/?rolesVersion=1", Some(&token)).await;
    let body = body_string(response).await;
    assert!(body.contains("<script>"));
    assert!(!body.contains("<noscript>"));
}

#[tokio::test]
async fn test_role_bump_raises_stamped_version() {
    let app = TestApp::new();
    let token = app.sign_in("judy", &[]).await;

    let before = app.get("/", Some(&token)).await;
    assert!(set_cookies(&before)[0].starts_with("rolesVersion=1;"));

    app.resolver.set_roles("judy", ["admin"]);
    let version = app.roles.bump("judy").await.unwrap();
    assert!(version > 1);

    let after = app.get("/admin/settings", Some(&token)).await;
    assert_eq!(after.status(), StatusCode::OK);
    let expected = format!("rolesVersion={};", version);
    assert!(set_cookies(&after)[0].starts_with(&expected));
}

#[tokio::test]
async fn test_role_change_without_bump_waits_for_ttl() {
    let app = TestApp::with_ttl(Duration::from_secs(3600));
    let token = app.sign_in("ken", &[]).await;
    assert_eq!(app.get("/", Some(&token)).await.status(), StatusCode::OK);

    app.resolver.set_roles("ken", ["banned"]);
    assert_eq!(app.get("/", Some(&token)).await.status(), StatusCode::OK);

    app.roles.bump("ken").await.unwrap();
    let response = app.get("/", Some(&token)).await;
    assert!(location(&response).starts_with("/login?error="));
}

#[tokio::test]
async fn test_user_dependent_responses_are_not_cacheable() {
    let app = TestApp::new();
    let token = app.sign_in("leo", &[]).await;

    let page = app.get("/dashboard", Some(&token)).await;
    assert_eq!(
        page.headers()[header::CACHE_CONTROL],
        "private, no-store, no-cache"
    );

    let redirect = app.get("/dashboard", None).await;
    assert!(redirect.headers().contains_key(header::CACHE_CONTROL));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new();
    let token = app.sign_in("mallory", &[]).await;

    let response = app.get("/logout", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login");
    assert_eq!(app.sessions.count_for("mallory"), 0);
    assert!(
        set_cookies(&response)
            .iter()
            .any(|c| c.starts_with("session=;"))
    );

    let after = app.get("/api/me", Some(&token)).await;
    assert_eq!(location(&after), "/login");
}

#[tokio::test]
async fn test_logout_clears_cookies_when_sign_out_fails() {
    let app = TestApp::with_unreliable_deletes();
    let token = app.sign_in("mallory", &[]).await;

    let response = app.get("/logout", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login");
    assert_eq!(app.auth.sign_out_calls.load(Ordering::SeqCst), 1);
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("session=;")));
    assert!(cookies.iter().any(|c| c.starts_with("rolesVersion=;")));
    assert!(!body_string(response).await.contains("10.0.0.5"));
}

#[tokio::test]
async fn test_ban_redirects_when_sessions_cannot_be_deleted() {
    let app = TestApp::with_unreliable_deletes();
    let token = app.sign_in("trent", &["banned"]).await;

    let response = app.get("/dashboard", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location(&response),
        "/login?error=Account%20has%20been%20banned"
    );
    assert_eq!(app.auth.sign_out_calls.load(Ordering::SeqCst), 1);
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("session=;")));
    assert!(cookies.iter().any(|c| c.starts_with("rolesVersion=;")));
    // Nothing was deleted.
    assert_eq!(app.sessions.count_for("trent"), 1);
}

#[tokio::test]
async fn test_provider_failure_degrades_to_anonymous() {
    let resolver = Arc::new(StaticRoleResolver::new());
    let roles = Arc::new(MemoryRoleCache::new(resolver, Duration::from_secs(60)));
    let state = AppState::new(
        test_config(),
        Arc::new(FailingAuthProvider),
        Arc::new(MemorySessionStore::new()),
        roles,
    )
    .unwrap();
    let router = init_router(state);

    let request = |uri: &str| {
        axum::http::Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, "Bearer whatever")
            .body(axum::body::Body::empty())
            .unwrap()
    };

    let home = router.clone().oneshot(request("/")).await.unwrap();
    assert_eq!(home.status(), StatusCode::OK);

    let dashboard = router.oneshot(request("/dashboard")).await.unwrap();
    assert_eq!(location(&dashboard), "/login?redirect=%2Fdashboard");
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();
    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.auth.calls(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_static_paths_never_touch_auth(suffix in "[a-z0-9]{1,12}(/[a-z0-9.]{1,12}){0,3}") {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let app = TestApp::new();
            let token = app.sign_in("nia", &["banned"]).await;
            let response = app.get(&format!("/static/{}", suffix), Some(&token)).await;

            prop_assert_eq!(app.auth.calls(), 0);
            prop_assert!(set_cookies(&response).is_empty());
            prop_assert!(!response.headers().contains_key(header::CACHE_CONTROL));
            prop_assert_eq!(app.sessions.count_for("nia"), 1);
            Ok(())
        })?;
    }
}
