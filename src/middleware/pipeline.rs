//! The request pipeline: classify, resolve, decide, enforce, run, stamp.

use axum::{
    extract::{Request, State},
    http::header::CACHE_CONTROL,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, info};

use warden_auth::{AuthProvider, SessionStore};
use warden_cache::{CacheControlConfig, RoleCache};
use warden_config::AppConfig;
use warden_core::{RequestContext, RoutePatterns, RouteTable};
use warden_observability::track_gate_decision;

use super::ban::BanEnforcer;
use super::found;
use super::gate::{AuthorizationGate, Decision};
use super::session::SessionResolver;
use super::stamp::VersionStamper;
use crate::state::AppState;

/// Compiles the five route lists; an invalid list is a startup error.
pub fn compile_routes(config: &warden_config::RouteConfig) -> anyhow::Result<RouteTable> {
    Ok(RouteTable {
        bypass: RoutePatterns::compile(&config.bypass)?,
        admin: RoutePatterns::compile(&config.admin)?,
        protected: RoutePatterns::compile(&config.protected)?,
        protected_redirect: RoutePatterns::compile(&config.protected_redirect)?,
        redirect: RoutePatterns::compile(&config.redirect)?,
    })
}

/// Every process-wide component the middleware needs, built once at startup.
pub struct RequestPipeline {
    routes: RouteTable,
    resolver: SessionResolver,
    gate: AuthorizationGate,
    bans: BanEnforcer,
    stamper: VersionStamper,
}

impl RequestPipeline {
    pub fn new(
        config: &AppConfig,
        auth: Arc<dyn AuthProvider>,
        sessions: Arc<dyn SessionStore>,
        roles: Arc<dyn RoleCache>,
    ) -> anyhow::Result<Self> {
        let routes = compile_routes(&config.routes)?;
        let cleared_cookies = vec![config.jwt.cookie_name.clone(), config.stamp.cookie_name.clone()];

        Ok(Self {
            routes,
            resolver: SessionResolver::new(auth.clone(), roles),
            gate: AuthorizationGate::from_config(&config.routes),
            bans: BanEnforcer::new(sessions, auth, cleared_cookies),
            stamper: VersionStamper::new(&config.stamp),
        })
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub async fn handle(&self, mut req: Request, next: Next) -> Response {
        let path = req.uri().path().to_string();

        // Nothing below, not even session resolution, runs for bypass routes.
        if self.routes.is_bypass(&path) {
            track_gate_decision("bypass");
            return next.run(req).await;
        }

        let ctx = self.resolver.resolve(req.headers()).await;
        let route = self.routes.classify(&path);
        let decision = self.gate.decide(&ctx, &path, &route);
        track_gate_decision(decision.as_str());

        let mut response = match decision {
            Decision::EnforceBanThenRedirect(location) => {
                if let Some(identity) = &ctx.identity {
                    info!(user_id = %identity.id, path = %path, "Banned user denied");
                    self.bans.enforce(identity, req.headers()).await;
                }
                self.bans.redirect(&location)
            }
            Decision::Redirect(location) => {
                debug!(path = %path, location = %location, "Redirecting");
                found(&location)
            }
            Decision::Allow => {
                req.extensions_mut().insert(ctx.clone());
                self.run(req, next, &ctx, &path).await
            }
        };

        // Pages that depend on the signed-in user must never be cached.
        response
            .headers_mut()
            .entry(CACHE_CONTROL)
            .or_insert_with(|| CacheControlConfig::no_store().to_header_value());

        response
    }

    async fn run(&self, req: Request, next: Next, ctx: &RequestContext, path: &str) -> Response {
        let query = req.uri().query().map(str::to_string);
        let response = next.run(req).await;

        self.stamper
            .stamp(response, ctx.roles_version, path, query.as_deref())
            .await
    }
}

/// Axum middleware entry point.
///
/// ```ignore
/// Router::new()
///     .route("/dashboard", get(dashboard))
///     .layer(middleware::from_fn_with_state(state.clone(), auth_pipeline))
/// ```
pub async fn auth_pipeline(State(state): State<AppState>, req: Request, next: Next) -> Response {
    state.pipeline.handle(req, next).await
}
