use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    courses::{
        dto::CourseSummary,
        repo::{Course, CourseFilter},
    },
    error::{ApiError, ApiResult},
    response::ApiResponse,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses))
        .route("/courses/:id", get(get_course))
}

#[instrument(skip(state))]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(filter): Query<CourseFilter>,
) -> ApiResult<Json<ApiResponse<Vec<CourseSummary>>>> {
    let courses = Course::list(&state.db, &filter).await?;
    Ok(Json(ApiResponse::data(
        courses.into_iter().map(CourseSummary::from).collect(),
    )))
}

#[instrument(skip(state))]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<CourseSummary>>> {
    let course = Course::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".into()))?;
    Ok(Json(ApiResponse::data(CourseSummary::from(course))))
}
