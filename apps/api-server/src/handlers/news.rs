//! News handlers - the post routes with the kind pinned to News.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use newsroom_core::domain::PostKind;
use newsroom_core::ports::PostRepository;
use newsroom_shared::ApiResponse;
use newsroom_shared::dto::{CreatePostRequest, PageQuery, PostResponse, UpdatePostRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

use super::posts::{self, post_response};

const DEFAULT_PAGE_SIZE: u64 = 10;

/// GET /api/news
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(100);
    let offset = query.offset.unwrap_or(0);

    let items = state.posts.list_by_kind(PostKind::News, limit, offset).await?;
    let responses: Vec<PostResponse> = items.iter().map(post_response).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(responses)))
}

/// GET /api/news/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = posts::require_kind(&state, path.into_inner(), PostKind::News).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(&post))))
}

/// POST /api/news
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    posts::create_post(&state, &identity, PostKind::News, body.into_inner()).await
}

/// PUT /api/news/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    posts::update_post(
        &state,
        &identity,
        PostKind::News,
        path.into_inner(),
        body.into_inner(),
    )
    .await
}

/// DELETE /api/news/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    posts::delete_post(&state, &identity, PostKind::News, path.into_inner()).await
}
