#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, header},
    response::Response,
};
use http_body_util::BodyExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tower::ServiceExt;

use warden::router::init_router;
use warden::state::AppState;
use chrono::{DateTime, Utc};
use warden_auth::{
    AuthError, AuthProvider, JwtAuthProvider, MemorySessionStore, RoleResolver, Session,
    SessionStore, StaticRoleResolver,
};
use warden_cache::MemoryRoleCache;
use warden_config::AppConfig;
use warden_core::Identity;

/// Wraps the JWT provider and counts how often the pipeline consults it.
pub struct CountingAuthProvider {
    inner: JwtAuthProvider,
    pub get_session_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
}

impl CountingAuthProvider {
    pub fn calls(&self) -> usize {
        self.get_session_calls.load(Ordering::SeqCst) + self.sign_out_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthProvider for CountingAuthProvider {
    async fn get_session(&self, headers: &HeaderMap) -> Result<Option<Session>, AuthError> {
        self.get_session_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_session(headers).await
    }

    async fn sign_out(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.sign_out(headers).await
    }
}

/// A provider whose backend is down.
pub struct FailingAuthProvider;

#[async_trait]
impl AuthProvider for FailingAuthProvider {
    async fn get_session(&self, _headers: &HeaderMap) -> Result<Option<Session>, AuthError> {
        Err(AuthError::Store(anyhow::anyhow!("connection refused")))
    }

    async fn sign_out(&self, _headers: &HeaderMap) -> Result<(), AuthError> {
        Err(AuthError::Store(anyhow::anyhow!("connection refused")))
    }
}

/// Session store that can create and check sessions but whose deletes fail.
pub struct UnreliableDeletes(pub Arc<MemorySessionStore>);

#[async_trait]
impl SessionStore for UnreliableDeletes {
    async fn create_session(
        &self,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        self.0.create_session(user_id, expires_at).await
    }

    async fn is_active(&self, session_id: &str) -> Result<bool, AuthError> {
        self.0.is_active(session_id).await
    }

    async fn delete_session(&self, _session_id: &str) -> Result<(), AuthError> {
        Err(AuthError::Store(anyhow::anyhow!(
            "pg at 10.0.0.5:5432 refused connection"
        )))
    }

    async fn delete_all_sessions(&self, _user_id: &str) -> Result<u64, AuthError> {
        Err(AuthError::Store(anyhow::anyhow!(
            "pg at 10.0.0.5:5432 refused connection"
        )))
    }
}

pub fn test_config() -> AppConfig {
    AppConfig::from_vars(|key| match key {
        "JWT_SECRET" => Some("integration-test-secret".to_string()),
        _ => None,
    })
}

pub struct TestApp {
    pub router: Router,
    pub auth: Arc<CountingAuthProvider>,
    pub sessions: Arc<MemorySessionStore>,
    pub resolver: Arc<StaticRoleResolver>,
    pub roles: Arc<MemoryRoleCache>,
    provider: JwtAuthProvider,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(60))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        let sessions = Arc::new(MemorySessionStore::new());
        Self::build(ttl, sessions.clone(), sessions)
    }

    /// An app whose session store cannot delete sessions.
    pub fn with_unreliable_deletes() -> Self {
        let sessions = Arc::new(MemorySessionStore::new());
        let store = Arc::new(UnreliableDeletes(sessions.clone()));
        Self::build(Duration::from_secs(60), sessions, store)
    }

    fn build(
        ttl: Duration,
        sessions: Arc<MemorySessionStore>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let config = test_config();
        let resolver = Arc::new(StaticRoleResolver::new());
        let roles = Arc::new(MemoryRoleCache::new(
            resolver.clone() as Arc<dyn RoleResolver>,
            ttl,
        ));
        let provider = JwtAuthProvider::new(config.jwt.clone(), store.clone());
        let auth = Arc::new(CountingAuthProvider {
            inner: provider.clone(),
            get_session_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
        });

        let state = AppState::new(config, auth.clone(), store, roles.clone())
            .expect("default routes compile");

        Self {
            router: init_router(state),
            auth,
            sessions,
            resolver,
            roles,
            provider,
        }
    }

    /// Creates a user with the given roles and returns a bearer token for them.
    pub async fn sign_in(&self, id: &str, roles: &[&str]) -> String {
        self.resolver.set_roles(id, roles.iter().copied());
        let identity = Identity::new(id, format!("{}@example.com", id), id.to_uppercase());
        self.provider.issue_session(&identity).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        self.router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect()
}

pub async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
