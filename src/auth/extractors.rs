use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use tower_cookies::Cookies;
use tracing::warn;
use uuid::Uuid;

use crate::{
    auth::{
        claims::{Role, TokenKind},
        jwt::JwtKeys,
    },
    error::ApiError,
};

/// Cookie carrying the end-user token.
pub const USER_COOKIE: &str = "token";
/// Cookie carrying the admin token.
pub const ADMIN_COOKIE: &str = "adminToken";

/// The identity a guard attaches to the request. Claims are
/// self-contained, so no store round-trip happens here.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Guard for user-facing routes: verifies the token against the user
/// secret and yields the resolved principal.
pub struct AuthUser(pub Principal);

/// Guard for admin routes: verifies against the admin secret, then
/// requires the admin role as a second gate.
pub struct AuthAdmin(pub Principal);

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Per-kind cookie first, `Authorization: Bearer` header as fallback.
/// First match wins; the two sources are never merged.
async fn candidate_token<S: Send + Sync>(
    parts: &mut Parts,
    state: &S,
    cookie_name: &str,
) -> Option<String> {
    if let Ok(cookies) = Cookies::from_request_parts(parts, state).await {
        if let Some(cookie) = cookies.get(cookie_name) {
            return Some(cookie.value().to_string());
        }
    }
    bearer_token(&parts.headers).map(str::to_string)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = candidate_token(parts, state, USER_COOKIE)
            .await
            .ok_or_else(|| ApiError::Unauthenticated("Please log in to continue".into()))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(&token, TokenKind::User).map_err(|_| {
            warn!("invalid or expired user token");
            ApiError::Unauthenticated("Invalid or expired token".into())
        })?;

        Ok(AuthUser(Principal {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        }))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthAdmin
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = candidate_token(parts, state, ADMIN_COOKIE)
            .await
            .ok_or_else(|| {
                ApiError::Unauthenticated("Please log in as admin to access this section".into())
            })?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(&token, TokenKind::Admin).map_err(|_| {
            warn!("invalid or expired admin token");
            ApiError::Unauthenticated("Invalid token. Access denied.".into())
        })?;

        if claims.role != Role::Admin {
            return Err(ApiError::Forbidden(
                "Access denied. Admin privileges required.".into(),
            ));
        }

        Ok(AuthAdmin(Principal {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, Request, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;
    use tower_cookies::CookieManagerLayer;

    use crate::{auth::claims::Role, state::AppState};

    #[test]
    fn bearer_token_strips_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn bearer_token_rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Basic dXNlcjpwdw==".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    fn guarded_app() -> (Router, JwtKeys) {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let app = Router::new()
            .route("/user", get(|_: AuthUser| async { "ok" }))
            .route("/admin", get(|_: AuthAdmin| async { "ok" }))
            .with_state(state)
            .layer(CookieManagerLayer::new());
        (app, keys)
    }

    async fn status_for(app: Router, req: Request<Body>) -> StatusCode {
        app.oneshot(req).await.unwrap().status()
    }

    #[tokio::test]
    async fn missing_token_is_unauthenticated() {
        let (app, _) = guarded_app();
        let req = Request::builder().uri("/user").body(Body::empty()).unwrap();
        assert_eq!(status_for(app, req).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn user_cookie_passes_user_guard() {
        let (app, keys) = guarded_app();
        let (token, _) = keys
            .sign(TokenKind::User, Uuid::new_v4(), "u@example.com", Role::User)
            .unwrap();
        let req = Request::builder()
            .uri("/user")
            .header("Cookie", format!("{USER_COOKIE}={token}"))
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_for(app, req).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn bearer_fallback_passes_user_guard() {
        let (app, keys) = guarded_app();
        let (token, _) = keys
            .sign(TokenKind::User, Uuid::new_v4(), "u@example.com", Role::User)
            .unwrap();
        let req = Request::builder()
            .uri("/user")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_for(app, req).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn user_secret_token_never_passes_admin_guard() {
        let (app, keys) = guarded_app();
        // Even with an admin role claim in the payload.
        let (token, _) = keys
            .sign(TokenKind::User, Uuid::new_v4(), "u@example.com", Role::Admin)
            .unwrap();
        let req = Request::builder()
            .uri("/admin")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_for(app, req).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_token_with_user_role_is_forbidden() {
        let (app, keys) = guarded_app();
        let (token, _) = keys
            .sign(TokenKind::Admin, Uuid::new_v4(), "a@example.com", Role::User)
            .unwrap();
        let req = Request::builder()
            .uri("/admin")
            .header("Cookie", format!("{ADMIN_COOKIE}={token}"))
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_for(app, req).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_cookie_passes_admin_guard() {
        let (app, keys) = guarded_app();
        let (token, _) = keys
            .sign(TokenKind::Admin, Uuid::new_v4(), "a@example.com", Role::Admin)
            .unwrap();
        let req = Request::builder()
            .uri("/admin")
            .header("Cookie", format!("{ADMIN_COOKIE}={token}"))
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_for(app, req).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn expired_token_is_unauthenticated() {
        let (app, keys) = guarded_app();
        let token = keys.expired_token_for_tests(Uuid::new_v4());
        let req = Request::builder()
            .uri("/user")
            .header("Cookie", format!("{USER_COOKIE}={token}"))
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_for(app, req).await, StatusCode::UNAUTHORIZED);
    }
}
