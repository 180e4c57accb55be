use axum::{Router, middleware, routing::get};

use warden_cache::{CacheControlConfig, cache_control};
use warden_observability::{logging_middleware, metrics_middleware};

use crate::handlers::{admin_settings, dashboard, feed, health, home, login_page, logout, me, metrics};
use crate::middleware::auth_pipeline;
use crate::state::AppState;

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/login", get(login_page))
        .route("/logout", get(logout).post(logout))
        .route("/dashboard", get(dashboard))
        .route("/admin/settings", get(admin_settings))
        .route("/api/me", get(me))
        .route(
            "/feed.xml",
            get(feed).route_layer(cache_control(CacheControlConfig::public(300))),
        )
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(middleware::from_fn_with_state(state.clone(), auth_pipeline))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}
