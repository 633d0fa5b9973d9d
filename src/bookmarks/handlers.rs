use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    bookmarks::repo,
    courses::repo::Course,
    error::{ApiError, ApiResult},
    response::ApiResponse,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/user/bookmark/:course_id",
            post(toggle_bookmark).delete(remove_bookmark),
        )
        .route("/user/bookmark-status/:course_id", get(bookmark_status))
}

/// Toggle responses carry `bookmarked` at the top level of the envelope;
/// clients key off it directly.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub message: String,
    pub bookmarked: bool,
}

#[derive(Debug, Serialize)]
pub struct BookmarkStatus {
    pub bookmarked: bool,
}

#[instrument(skip(state, auth), fields(user_id = %auth.0.id))]
pub async fn toggle_bookmark(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Json<ToggleResponse>> {
    // The repo re-checks course existence under lock, so there is no
    // window for the course to vanish between check and write.
    let bookmarked = repo::toggle(&state.db, auth.0.id, course_id).await?;
    info!(user_id = %auth.0.id, %course_id, bookmarked, "bookmark toggled");

    let message = if bookmarked {
        "Course bookmarked successfully"
    } else {
        "Course removed from bookmarks"
    };
    Ok(Json(ToggleResponse {
        success: true,
        message: message.into(),
        bookmarked,
    }))
}

#[instrument(skip(state, auth), fields(user_id = %auth.0.id))]
pub async fn bookmark_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<BookmarkStatus>>> {
    let bookmarked = repo::status(&state.db, auth.0.id, course_id).await?;
    Ok(Json(ApiResponse::data(BookmarkStatus { bookmarked })))
}

#[instrument(skip(state, auth), fields(user_id = %auth.0.id))]
pub async fn remove_bookmark(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    if !Course::exists(&state.db, course_id).await? {
        return Err(ApiError::NotFound("Course not found".into()));
    }

    repo::remove(&state.db, auth.0.id, course_id).await?;
    info!(user_id = %auth.0.id, %course_id, "bookmark removed");
    Ok(Json(ApiResponse::message("Course removed from bookmarks")))
}
