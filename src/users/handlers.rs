use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tower_cookies::{cookie::Cookie, Cookies};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::PublicUser,
        extractors::{AuthUser, USER_COOKIE},
        handlers::is_valid_email,
    },
    courses::{dto::CourseSummary, repo::Course},
    error::{ApiError, ApiResult},
    response::ApiResponse,
    state::AppState,
    users::{
        dto::{BookmarkList, DashboardData, DashboardStats, UpdateProfileRequest},
        repo::{User, UserPatch},
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/dashboard", get(get_dashboard))
        .route("/user/bookmarks", get(get_bookmarks))
        .route(
            "/user/profile",
            get(get_profile).put(update_profile).delete(delete_profile),
        )
}

#[instrument(skip(state, auth), fields(user_id = %auth.0.id))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<DashboardData>>> {
    let user = User::find_by_id(&state.db, auth.0.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let dashboard_stats = DashboardStats {
        total_bookmarks: user.bookmarked_courses.len(),
        member_since: user.created_at,
        last_login: user.last_login,
    };

    Ok(Json(ApiResponse::data(DashboardData {
        user: PublicUser::from(user),
        dashboard_stats,
    })))
}

#[instrument(skip(state, auth), fields(user_id = %auth.0.id))]
pub async fn get_bookmarks(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<BookmarkList>>> {
    let user = User::find_by_id(&state.db, auth.0.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let courses = Course::list_by_ids(&state.db, &user.bookmarked_courses).await?;
    Ok(Json(ApiResponse::data(BookmarkList {
        bookmarked_courses: courses.into_iter().map(CourseSummary::from).collect(),
    })))
}

#[instrument(skip(state, auth), fields(user_id = %auth.0.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<PublicUser>>> {
    let user = User::find_by_id(&state.db, auth.0.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(ApiResponse::data(PublicUser::from(user))))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.0.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(mut payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ApiResponse<PublicUser>>> {
    if let Some(email) = &mut payload.email {
        *email = email.trim().to_lowercase();
        if !is_valid_email(email) {
            return Err(ApiError::Validation("Invalid email".into()));
        }
    }

    let user = User::update_partial(&state.db, auth.0.id, &UserPatch::from(payload))
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(ApiResponse::data(PublicUser::from(user))))
}

#[instrument(skip(state, auth, cookies), fields(user_id = %auth.0.id))]
pub async fn delete_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    cookies: Cookies,
) -> ApiResult<Json<ApiResponse<()>>> {
    let deleted = User::delete_with_cleanup(&state.db, auth.0.id).await?;
    if !deleted {
        warn!(user_id = %auth.0.id, "delete on missing account");
        return Err(ApiError::NotFound("User not found".into()));
    }

    let mut cookie = Cookie::new(USER_COOKIE, "");
    cookie.set_path("/");
    cookies.remove(cookie);

    info!(user_id = %auth.0.id, "account deleted");
    Ok(Json(ApiResponse::message("Account deleted successfully")))
}
