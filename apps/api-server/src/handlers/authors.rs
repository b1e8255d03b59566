//! Author handlers - profile and rating recomputation.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use newsroom_core::ports::BaseRepository;
use newsroom_shared::ApiResponse;
use newsroom_shared::dto::AuthorResponse;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/authors/{id}
///
/// Returns the author with the last persisted rating. The rating is a
/// derived value; use the recompute endpoint for a fresh one.
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let author_id = path.into_inner();
    let author = state
        .authors
        .find_by_id(author_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("author with id {author_id} not found")))?;

    let user = state
        .users
        .find_by_id(author.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("author's user account not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(AuthorResponse {
        id: author.id,
        user_id: author.user_id,
        username: user.username,
        rating: author.rating,
    })))
}

/// POST /api/authors/{id}/rating/recompute
pub async fn recompute_rating(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let rating = state.rating.recompute_author_rating(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({ "rating": rating }))))
}
