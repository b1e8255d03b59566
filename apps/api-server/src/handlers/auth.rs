//! Authentication and account handlers.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use newsroom_core::ports::{BaseRepository, PasswordService, TokenService, UserRepository};
use newsroom_core::services::{NewAccount, ProfileChanges};
use newsroom_shared::ApiResponse;
use newsroom_shared::dto::{
    AuthResponse, AuthorResponse, LoginRequest, RegisterUserRequest, UpdateProfileRequest,
    UserResponse,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn user_response(user: &newsroom_core::domain::User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        is_author: user.is_author,
        created_at: user.created_at,
    }
}

/// POST /api/auth/register
///
/// Creates the account and sends the one-time welcome notification.
pub async fn register(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let password_hash = password_service
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = state
        .accounts
        .register(NewAccount {
            username: req.username,
            email: req.email,
            password_hash,
        })
        .await?;

    let token = token_service
        .generate_token(user.id, &user.email, user.is_author)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Created().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    }))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = password_service
        .verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::Unauthorized);
    }

    let token = token_service
        .generate_token(user.id, &user.email, user.is_author)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    }))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(user_response(&user))))
}

/// PATCH /api/auth/me
///
/// Profile updates never re-send the welcome notification.
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .accounts
        .update_profile(
            identity.user_id,
            ProfileChanges {
                username: req.username,
                email: req.email,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(user_response(&user))))
}

/// POST /api/auth/upgrade - grant the author capability to the caller.
pub async fn upgrade(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let author = state.accounts.upgrade_to_author(identity.user_id).await?;
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    // Claims changed, so hand back a fresh token with the author flag set.
    let token = token_service
        .generate_token(user.id, &user.email, true)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        AuthorResponse {
            id: author.id,
            user_id: author.user_id,
            username: user.username,
            rating: author.rating,
        },
        format!("Bearer {token}"),
    )))
}
