//! Extractors over the [`RequestContext`] the pipeline attaches to each request.
//!
//! Route classes already keep anonymous users off protected pages; these let a
//! handler state its own requirement and read the identity without re-resolving
//! the session.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

use warden_core::{AppError, Identity, RequestContext, RoleSet};

/// The request's context; anonymous when the pipeline did not run (bypass routes).
#[derive(Debug, Clone)]
pub struct Viewer(pub RequestContext);

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Viewer(
            parts
                .extensions
                .get::<RequestContext>()
                .cloned()
                .unwrap_or_default(),
        ))
    }
}

/// An authenticated user. Rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub identity: Identity,
    pub roles: RoleSet,
    pub roles_version: u64,
}

impl AuthUser {
    pub fn user_id(&self) -> &str {
        &self.identity.id
    }

    pub fn email(&self) -> &str {
        &self.identity.email
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<RequestContext>()
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        let identity = ctx
            .identity
            .clone()
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        Ok(AuthUser {
            identity,
            roles: ctx.roles.clone(),
            roles_version: ctx.roles_version,
        })
    }
}

/// An authenticated user holding the `admin` role. 403 without it.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        if !user.roles.is_admin() {
            return Err(AppError::forbidden("Access denied. Admin role required"));
        }

        Ok(RequireAdmin(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use warden_core::RoleSnapshot;

    fn parts_with(ctx: Option<RequestContext>) -> Parts {
        let mut req = Request::builder().uri("/").body(()).unwrap();
        if let Some(ctx) = ctx {
            req.extensions_mut().insert(ctx);
        }
        req.into_parts().0
    }

    fn signed_in(roles: &[&str]) -> RequestContext {
        RequestContext::authenticated(
            Identity::new("u-1", "ada@example.com", "Ada"),
            RoleSnapshot::new(RoleSet::for_identity(roles.iter().copied()), 1),
        )
    }

    #[tokio::test]
    async fn test_viewer_defaults_to_anonymous() {
        let Viewer(ctx) = Viewer::from_request_parts(&mut parts_with(None), &())
            .await
            .unwrap();
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_auth_user_requires_identity() {
        let err = AuthUser::from_request_parts(&mut parts_with(Some(RequestContext::anonymous())), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);

        let user = AuthUser::from_request_parts(&mut parts_with(Some(signed_in(&[]))), &())
            .await
            .unwrap();
        assert_eq!(user.user_id(), "u-1");
        assert!(user.has_role("user"));
    }

    #[tokio::test]
    async fn test_require_admin() {
        let err = RequireAdmin::from_request_parts(&mut parts_with(Some(signed_in(&[]))), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let RequireAdmin(user) =
            RequireAdmin::from_request_parts(&mut parts_with(Some(signed_in(&["admin"]))), &())
                .await
                .unwrap();
        assert_eq!(user.email(), "ada@example.com");
    }
}
