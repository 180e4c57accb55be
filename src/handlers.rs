//! Demo pages exercising each route class.

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use warden_observability::track_gate_failure;

use crate::middleware::stamp::escape_html;
use crate::middleware::{AuthUser, RequireAdmin, Viewer, found, removal_cookie};
use crate::state::AppState;

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body>{}</body></html>",
        escape_html(title),
        body
    ))
}

pub async fn home(Viewer(ctx): Viewer) -> Html<String> {
    let greeting = match &ctx.identity {
        Some(identity) => format!(
            "<p>Signed in as {} ({}).</p><p>Roles: {}</p>",
            escape_html(&identity.display_name),
            escape_html(&identity.email),
            escape_html(&ctx.roles.to_string())
        ),
        None => "<p>You are not signed in. <a href=\"/login\">Sign in</a></p>".to_string(),
    };

    page("Home", &greeting)
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
    pub redirect: Option<String>,
}

pub async fn login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    let mut body = String::from("<h1>Sign in</h1>");

    if let Some(error) = &query.error {
        body.push_str(&format!("<p class=\"error\">{}</p>", escape_html(error)));
    }
    if let Some(redirect) = &query.redirect {
        body.push_str(&format!(
            "<p>You will return to <code>{}</code> after signing in.</p>",
            escape_html(redirect)
        ));
    }
    body.push_str("<p>Sessions are issued with <code>warden-cli issue-session</code>.</p>");

    page("Sign in", &body)
}

/// Ends the current session and clears the session and role-version cookies.
///
/// The cookies are cleared and the redirect issued even when the provider
/// fails to end the session.
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    match state.auth.sign_out(&headers).await {
        Ok(()) => info!(user_id = %user.user_id(), "User signed out"),
        Err(e) => {
            warn!(user_id = %user.user_id(), error = %e, "Sign-out failed, clearing cookies anyway");
            track_gate_failure("sign_out");
        }
    }

    let jar = jar
        .add(removal_cookie(&state.config.jwt.cookie_name))
        .add(removal_cookie(&state.config.stamp.cookie_name));

    (jar, found(&state.config.routes.login_path)).into_response()
}

pub async fn dashboard(user: AuthUser) -> Html<String> {
    page(
        "Dashboard",
        &format!(
            "<h1>Dashboard</h1><p>Welcome back, {}.</p>",
            escape_html(&user.identity.display_name)
        ),
    )
}

pub async fn admin_settings(RequireAdmin(user): RequireAdmin) -> Html<String> {
    page(
        "Settings",
        &format!(
            "<h1>Settings</h1><p>Administrator: {}</p>",
            escape_html(user.email())
        ),
    )
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub roles: Vec<String>,
    pub roles_version: u64,
}

pub async fn me(user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        roles: user.roles.iter().map(str::to_string).collect(),
        roles_version: user.roles_version,
        id: user.identity.id,
        email: user.identity.email,
        display_name: user.identity.display_name,
    })
}

pub async fn feed() -> impl IntoResponse {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Warden</title><link>/</link><description>Public feed</description></channel></rss>"#;

    ([(header::CONTENT_TYPE, "application/rss+xml")], xml)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
