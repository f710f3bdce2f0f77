//! Axum route handlers for the Recommendations API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::auth::Owner;
use crate::errors::AppError;
use crate::models::recommendation::RecommendationView;
use crate::recommendations::engine::{
    generate_recommendation, GenerateRecommendationRequest, RecommendationOutcome,
};
use crate::recommendations::payload::{delete_course, CourseRecommendation};
use crate::recommendations::records::{get_recommendation, list_recommendations};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RecommendationListResponse {
    pub recommendations: Vec<RecommendationView>,
}

#[derive(Debug, Serialize)]
pub struct DeleteCourseResponse {
    pub message: String,
    pub courses: Vec<CourseRecommendation>,
}

/// POST /api/v1/recommendations
///
/// 201 when a record was written, 200 for the "nothing left to recommend" case.
pub async fn handle_generate(
    State(state): State<AppState>,
    owner: Owner,
    Json(request): Json<GenerateRecommendationRequest>,
) -> Result<(StatusCode, Json<RecommendationOutcome>), AppError> {
    let outcome =
        generate_recommendation(state.store.as_ref(), &state.llm, owner.as_str(), request).await?;

    let status = if outcome.id.is_some() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome)))
}

/// GET /api/v1/recommendations
pub async fn handle_list(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<RecommendationListResponse>, AppError> {
    let recommendations = list_recommendations(state.store.as_ref(), owner.as_str()).await?;
    Ok(Json(RecommendationListResponse { recommendations }))
}

/// GET /api/v1/recommendations/:id
pub async fn handle_get(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<i64>,
) -> Result<Json<RecommendationView>, AppError> {
    let view = get_recommendation(state.store.as_ref(), owner.as_str(), id).await?;
    Ok(Json(view))
}

/// DELETE /api/v1/recommendations/:reco_id/courses/:course_id
pub async fn handle_delete_course(
    State(state): State<AppState>,
    owner: Owner,
    Path((reco_id, course_id)): Path<(i64, i64)>,
) -> Result<Json<DeleteCourseResponse>, AppError> {
    let courses = delete_course(state.store.as_ref(), owner.as_str(), reco_id, course_id).await?;
    Ok(Json(DeleteCourseResponse {
        message: "Course deleted.".to_string(),
        courses,
    }))
}
