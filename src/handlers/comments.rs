/// Comment handlers - HTTP endpoints for comment threads and mutations
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::{MaybeUserId, UserId};
use crate::services::CommentService;
use crate::workers::MaintenanceQueue;

fn comment_service(pool: &web::Data<PgPool>, queue: &web::Data<MaintenanceQueue>) -> CommentService {
    CommentService::new(pool.get_ref().clone(), queue.get_ref().clone())
}

/// Request body for creating a comment
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 300))]
    pub text: String,
    pub parent_comment_id: Option<i64>,
}

/// Request body for editing a comment
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = 300))]
    pub text: String,
}

/// The full comment thread for an item
pub async fn list_comments(
    pool: web::Data<PgPool>,
    queue: web::Data<MaintenanceQueue>,
    item_id: web::Path<i64>,
    user: MaybeUserId,
) -> Result<HttpResponse> {
    let service = comment_service(&pool, &queue);
    let thread = service.list_thread(*item_id, user.0).await?;

    Ok(HttpResponse::Ok().json(thread))
}

/// Create a comment or a reply
pub async fn create_comment(
    pool: web::Data<PgPool>,
    queue: web::Data<MaintenanceQueue>,
    item_id: web::Path<i64>,
    user: UserId,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    req.validate()
        .map_err(|_| AppError::BadRequest("text is invalid".to_string()))?;

    let service = comment_service(&pool, &queue);
    let comment = service
        .create_comment(*item_id, user.0, &req.text, req.parent_comment_id)
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

/// A single comment with its replies
pub async fn get_comment(
    pool: web::Data<PgPool>,
    queue: web::Data<MaintenanceQueue>,
    path: web::Path<(i64, i64)>,
    user: MaybeUserId,
) -> Result<HttpResponse> {
    let (_item_id, comment_id) = path.into_inner();
    let service = comment_service(&pool, &queue);
    let comment = service.get_comment(comment_id, user.0, true).await?;

    Ok(HttpResponse::Ok().json(comment))
}

/// The live replies under a root comment
pub async fn get_sub_comments(
    pool: web::Data<PgPool>,
    queue: web::Data<MaintenanceQueue>,
    path: web::Path<(i64, i64)>,
    user: MaybeUserId,
) -> Result<HttpResponse> {
    let (_item_id, comment_id) = path.into_inner();
    let service = comment_service(&pool, &queue);
    let replies = service.get_sub_comments(comment_id, user.0).await?;

    Ok(HttpResponse::Ok().json(replies))
}

/// Edit a comment (author only)
pub async fn update_comment(
    pool: web::Data<PgPool>,
    queue: web::Data<MaintenanceQueue>,
    path: web::Path<(i64, i64)>,
    user: UserId,
    req: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse> {
    req.validate()
        .map_err(|_| AppError::BadRequest("text is invalid".to_string()))?;

    let (_item_id, comment_id) = path.into_inner();
    let service = comment_service(&pool, &queue);
    let comment = service.update_comment(comment_id, user.0, &req.text).await?;

    Ok(HttpResponse::Ok().json(comment))
}

/// Soft-delete a comment (author only)
pub async fn delete_comment(
    pool: web::Data<PgPool>,
    queue: web::Data<MaintenanceQueue>,
    path: web::Path<(i64, i64)>,
    user: UserId,
) -> Result<HttpResponse> {
    let (_item_id, comment_id) = path.into_inner();
    let service = comment_service(&pool, &queue);
    service.delete_comment(comment_id, user.0).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Like a comment (idempotent)
pub async fn like_comment(
    pool: web::Data<PgPool>,
    queue: web::Data<MaintenanceQueue>,
    path: web::Path<(i64, i64)>,
    user: UserId,
) -> Result<HttpResponse> {
    let (_item_id, comment_id) = path.into_inner();
    let service = comment_service(&pool, &queue);
    let response = service.like_comment(comment_id, user.0).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Remove a like from a comment (idempotent)
pub async fn unlike_comment(
    pool: web::Data<PgPool>,
    queue: web::Data<MaintenanceQueue>,
    path: web::Path<(i64, i64)>,
    user: UserId,
) -> Result<HttpResponse> {
    let (_item_id, comment_id) = path.into_inner();
    let service = comment_service(&pool, &queue);
    let response = service.unlike_comment(comment_id, user.0).await?;

    Ok(HttpResponse::Ok().json(response))
}
