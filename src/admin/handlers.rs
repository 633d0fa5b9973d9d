use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    admin::{
        dto::AdminUpdateUserRequest,
        repo::{self, PlatformStats},
    },
    auth::{dto::PublicUser, extractors::AuthAdmin},
    courses::{dto::CourseSummary, repo::Course},
    error::{ApiError, ApiResult},
    response::ApiResponse,
    state::AppState,
    users::repo::{User, UserPatch},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/stats", get(get_stats))
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", axum::routing::put(update_user).delete(delete_user))
        .route("/admin/courses", get(list_courses))
        .route("/admin/courses/:id", axum::routing::delete(delete_course))
}

#[instrument(skip(state, _admin))]
pub async fn get_stats(
    State(state): State<AppState>,
    _admin: AuthAdmin,
) -> ApiResult<Json<ApiResponse<PlatformStats>>> {
    let stats = repo::stats(&state.db).await?;
    Ok(Json(ApiResponse::data(stats)))
}

#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AuthAdmin,
) -> ApiResult<Json<ApiResponse<Vec<PublicUser>>>> {
    let users = User::list_all(&state.db).await?;
    Ok(Json(ApiResponse::data(
        users.into_iter().map(PublicUser::from).collect(),
    )))
}

#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.id))]
pub async fn update_user(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> ApiResult<Json<ApiResponse<PublicUser>>> {
    let user = User::update_partial(&state.db, id, &UserPatch::from(payload))
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(admin_id = %admin.0.id, user_id = %id, "user updated by admin");
    Ok(Json(ApiResponse::data_with_message(
        PublicUser::from(user),
        "User updated successfully",
    )))
}

/// Deleting a user also pulls it from every course's inverse bookmark
/// set; the repo runs both in one transaction.
#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let deleted = User::delete_with_cleanup(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".into()));
    }
    info!(admin_id = %admin.0.id, user_id = %id, "user deleted by admin");
    Ok(Json(ApiResponse::message("User deleted successfully")))
}

#[instrument(skip(state, _admin))]
pub async fn list_courses(
    State(state): State<AppState>,
    _admin: AuthAdmin,
) -> ApiResult<Json<ApiResponse<Vec<CourseSummary>>>> {
    let courses = Course::list(&state.db, &Default::default()).await?;
    Ok(Json(ApiResponse::data(
        courses.into_iter().map(CourseSummary::from).collect(),
    )))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn delete_course(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let deleted = Course::delete_with_cleanup(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Course not found".into()));
    }
    info!(admin_id = %admin.0.id, course_id = %id, "course deleted by admin");
    Ok(Json(ApiResponse::message("Course deleted successfully")))
}
