//! Category handlers - view and subscribe.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use newsroom_core::ports::{BaseRepository, CategoryRepository};
use newsroom_shared::ApiResponse;
use newsroom_shared::dto::CategoryResponse;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/categories/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let category_id = path.into_inner();
    let category = state
        .categories
        .find_by_id(category_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category with id {category_id} not found")))?;

    let subscribers = state.categories.subscribers(category.id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(CategoryResponse {
        id: category.id,
        name: category.name,
        subscriber_count: subscribers.len(),
    })))
}

/// POST /api/categories/{id}/subscribe
///
/// Subscribes the caller and sends the confirmation to them only.
pub async fn subscribe(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let category_id = path.into_inner();
    state.accounts.subscribe(identity.user_id, category_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        serde_json::json!({ "subscribed": true }),
        "Subscription confirmed",
    )))
}
