//! Post handlers shared by the news and article routes, plus search,
//! likes, and comments.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use newsroom_core::domain::{Comment, Post, PostFilter, PostKind};
use newsroom_core::ports::{AuthorRepository, BaseRepository, CommentRepository, PostRepository};
use newsroom_core::services::{PostChanges, PostDraft};
use newsroom_shared::ApiResponse;
use newsroom_shared::dto::{
    CommentResponse, CreateCommentRequest, CreatePostRequest, PostResponse, SearchPostsQuery,
    UpdatePostRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

pub(crate) fn post_response(post: &Post) -> PostResponse {
    PostResponse {
        id: post.id,
        author_id: post.author_id,
        kind: post.kind.as_str().to_string(),
        title: post.title.clone(),
        content: post.content.clone(),
        preview: post.preview(),
        rating: post.rating,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn comment_response(comment: &Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        user_id: comment.user_id,
        content: comment.content.clone(),
        rating: comment.rating,
        created_at: comment.created_at,
    }
}

/// The caller's author row; publishing requires the capability.
async fn require_author(state: &AppState, identity: &Identity) -> AppResult<Uuid> {
    state
        .authors
        .find_by_user_id(identity.user_id)
        .await?
        .map(|author| author.id)
        .ok_or_else(|| AppError::Forbidden("author capability required".to_string()))
}

/// Owner check for edit/delete.
async fn require_ownership(
    state: &AppState,
    identity: &Identity,
    post_id: Uuid,
) -> AppResult<()> {
    let author_id = require_author(state, identity).await?;
    let owner = state.publishing.owner_of(post_id).await?;
    if owner != author_id {
        return Err(AppError::Forbidden(
            "only the owning author may modify this post".to_string(),
        ));
    }
    Ok(())
}

/// Shared create path; the route pins the kind.
pub(crate) async fn create_post(
    state: &AppState,
    identity: &Identity,
    kind: PostKind,
    req: CreatePostRequest,
) -> AppResult<HttpResponse> {
    let author_id = require_author(state, identity).await?;

    let post = state
        .publishing
        .publish(
            PostDraft {
                author_id,
                kind,
                title: req.title,
                content: req.content,
                category_ids: req.category_ids,
            },
            chrono::Utc::now(),
        )
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(post_response(&post))))
}

/// Shared edit path; edits never notify subscribers.
pub(crate) async fn update_post(
    state: &AppState,
    identity: &Identity,
    kind: PostKind,
    post_id: Uuid,
    req: UpdatePostRequest,
) -> AppResult<HttpResponse> {
    require_kind(state, post_id, kind).await?;
    require_ownership(state, identity, post_id).await?;

    let post = state
        .publishing
        .edit(
            post_id,
            PostChanges {
                title: req.title,
                content: req.content,
                category_ids: req.category_ids,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(&post))))
}

pub(crate) async fn delete_post(
    state: &AppState,
    identity: &Identity,
    kind: PostKind,
    post_id: Uuid,
) -> AppResult<HttpResponse> {
    require_kind(state, post_id, kind).await?;
    require_ownership(state, identity, post_id).await?;
    state.publishing.delete(post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// The news routes only see news, the article routes only see articles.
pub(crate) async fn require_kind(
    state: &AppState,
    post_id: Uuid,
    kind: PostKind,
) -> AppResult<Post> {
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .filter(|p| p.kind == kind)
        .ok_or_else(|| AppError::NotFound(format!("{} with id {} not found", kind.as_str(), post_id)))?;
    Ok(post)
}

/// GET /api/posts/search
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchPostsQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let filter = PostFilter {
        title: query.title,
        author_username: query.author,
        created_after: query.created_after,
    };

    let posts = state.posts.search(&filter).await?;
    let responses: Vec<PostResponse> = posts.iter().map(post_response).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(responses)))
}

/// POST /api/posts/{id}/like
pub async fn like(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.rating.like_post(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/posts/{id}/dislike
pub async fn dislike(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.rating.dislike_post(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/posts/{id}/comments
pub async fn list_comments(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post with id {post_id} not found")))?;

    let comments = state.comments.find_by_post(post_id).await?;
    let responses: Vec<CommentResponse> = comments.iter().map(comment_response).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(responses)))
}

/// POST /api/posts/{id}/comments
pub async fn create_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let req = body.into_inner();

    if req.content.trim().is_empty() {
        return Err(AppError::BadRequest("comment must not be empty".to_string()));
    }

    state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post with id {post_id} not found")))?;

    let comment = state
        .comments
        .save(Comment::new(post_id, identity.user_id, req.content))
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(comment_response(&comment))))
}

/// POST /api/comments/{id}/like
pub async fn like_comment(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.rating.like_comment(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/comments/{id}/dislike
pub async fn dislike_comment(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.rating.dislike_comment(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
