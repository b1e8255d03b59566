//! Article handlers - the post routes with the kind pinned to Article.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use newsroom_core::domain::PostKind;
use newsroom_shared::dto::{CreatePostRequest, UpdatePostRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

use super::posts;

/// POST /api/articles
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    posts::create_post(&state, &identity, PostKind::Article, body.into_inner()).await
}

/// PUT /api/articles/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    posts::update_post(
        &state,
        &identity,
        PostKind::Article,
        path.into_inner(),
        body.into_inner(),
    )
    .await
}

/// DELETE /api/articles/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    posts::delete_post(&state, &identity, PostKind::Article, path.into_inner()).await
}
