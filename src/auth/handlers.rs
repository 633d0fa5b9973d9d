use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use time::Duration as TimeDuration;
use tower_cookies::{
    cookie::{Cookie, SameSite},
    Cookies,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        claims::{Role, TokenKind},
        dto::{AuthData, LoginRequest, PublicUser, RegisterRequest},
        extractors::{ADMIN_COOKIE, USER_COOKIE},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::{ApiError, ApiResult},
    response::ApiResponse,
    state::AppState,
    users::repo::User,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn admin_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/auth/login", post(admin_login))
        .route("/admin/auth/logout", post(admin_logout))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Password and activation gate shared by both login paths. The caller
/// never learns which half failed for a bad password.
fn check_credentials(user: &User, password: &str) -> Result<(), ApiError> {
    if !verify_password(password, &user.password_hash)? {
        return Err(ApiError::Unauthenticated("Invalid credentials".into()));
    }
    if !user.is_active {
        return Err(ApiError::Unauthenticated("Account is deactivated".into()));
    }
    Ok(())
}

fn session_cookie(name: &'static str, token: String, keys: &JwtKeys, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, token);
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(TimeDuration::seconds(keys.ttl.as_secs() as i64));
    cookie
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, "");
    cookie.set_path("/");
    cookie
}

#[instrument(skip(state, cookies, payload))]
pub async fn register(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(mut payload): Json<RegisterRequest>,
) -> ApiResult<Json<ApiResponse<AuthData>>> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::Validation("Password too short".into()));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, payload.name.trim(), &payload.email, &hash).await?;

    let keys = JwtKeys::from_ref(&state);
    let (token, _) = keys.sign(TokenKind::User, user.id, &user.email, user.role)?;
    cookies.add(session_cookie(
        USER_COOKIE,
        token.clone(),
        &keys,
        state.config.cookie_secure,
    ));

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(ApiResponse::data_with_message(
        AuthData {
            token,
            user: PublicUser::from(user),
        },
        "Registration successful",
    )))
}

#[instrument(skip(state, cookies, payload))]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(mut payload): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<AuthData>>> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::Unauthenticated("Invalid credentials".into())
        })?;

    if let Err(e) = check_credentials(&user, &payload.password) {
        warn!(email = %payload.email, user_id = %user.id, "login rejected");
        return Err(e);
    }

    User::touch_last_login(&state.db, user.id).await?;

    let keys = JwtKeys::from_ref(&state);
    let (token, _) = keys.sign(TokenKind::User, user.id, &user.email, user.role)?;
    cookies.add(session_cookie(
        USER_COOKIE,
        token.clone(),
        &keys,
        state.config.cookie_secure,
    ));

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(ApiResponse::data_with_message(
        AuthData {
            token,
            user: PublicUser::from(user),
        },
        "Login successful",
    )))
}

/// Clears the session cookie. A bearer-held copy of the same token stays
/// valid until it expires; there is no server-side revocation.
#[instrument(skip(cookies))]
pub async fn logout(cookies: Cookies) -> Json<ApiResponse<()>> {
    cookies.remove(removal_cookie(USER_COOKIE));
    Json(ApiResponse::message("Logged out successfully"))
}

#[instrument(skip(state, cookies, payload))]
pub async fn admin_login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(mut payload): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<AuthData>>> {
    payload.email = payload.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated("Invalid credentials".into()))?;

    if let Err(e) = check_credentials(&user, &payload.password) {
        warn!(email = %payload.email, user_id = %user.id, "admin login rejected");
        return Err(e);
    }

    if user.role != Role::Admin {
        warn!(user_id = %user.id, "admin login by non-admin");
        return Err(ApiError::Forbidden(
            "Access denied. Admin privileges required.".into(),
        ));
    }

    User::touch_last_login(&state.db, user.id).await?;

    let keys = JwtKeys::from_ref(&state);
    let (token, _) = keys.sign(TokenKind::Admin, user.id, &user.email, user.role)?;
    cookies.add(session_cookie(
        ADMIN_COOKIE,
        token.clone(),
        &keys,
        state.config.cookie_secure,
    ));

    info!(user_id = %user.id, "admin logged in");
    Ok(Json(ApiResponse::data_with_message(
        AuthData {
            token,
            user: PublicUser::from(user),
        },
        "Login successful",
    )))
}

#[instrument(skip(cookies))]
pub async fn admin_logout(cookies: Cookies) -> Json<ApiResponse<()>> {
    cookies.remove(removal_cookie(ADMIN_COOKIE));
    Json(ApiResponse::message("Logged out successfully"))
}
