use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{RecommendRequest, RecommendResponse},
};

use super::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Vibe Movie Recommender API Running" }))
}

pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Recommend movies for a free-text mood
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendRequest>,
) -> AppResult<Json<RecommendResponse>> {
    tracing::info!(request_id = %request_id, mood = %request.mood, "Recommendation requested");

    let response = state.recommender.recommend(&request.mood).await?;

    tracing::info!(
        request_id = %request_id,
        results = response.movies.len(),
        match_type = %response.match_type,
        generated_new = response.generated_new,
        "Recommendation served"
    );

    Ok(Json(response))
}
