/// Bookmark handlers - HTTP endpoints for saved items
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::Result;
use crate::middleware::UserId;
use crate::services::bookmarks::DEFAULT_PAGE_SIZE;
use crate::services::BookmarkService;

/// Request body for creating a bookmark
#[derive(Debug, Deserialize)]
pub struct CreateBookmarkRequest {
    pub item_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListBookmarksParams {
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteBookmarkParams {
    pub item_id: i64,
}

/// Bookmark an item (idempotent)
pub async fn create_bookmark(
    pool: web::Data<PgPool>,
    user: UserId,
    req: web::Json<CreateBookmarkRequest>,
) -> Result<HttpResponse> {
    let service = BookmarkService::new(pool.get_ref().clone());
    let bookmark = service.create_bookmark(req.item_id, user.0).await?;

    Ok(HttpResponse::Created().json(bookmark))
}

/// The caller's bookmarks, newest first
pub async fn list_bookmarks(
    pool: web::Data<PgPool>,
    user: UserId,
    query: web::Query<ListBookmarksParams>,
) -> Result<HttpResponse> {
    let service = BookmarkService::new(pool.get_ref().clone());
    let page = service
        .list_bookmarks(user.0, query.cursor.as_deref(), DEFAULT_PAGE_SIZE)
        .await?;

    Ok(HttpResponse::Ok().json(page))
}

/// Remove a bookmark (idempotent)
pub async fn delete_bookmark(
    pool: web::Data<PgPool>,
    user: UserId,
    query: web::Query<DeleteBookmarkParams>,
) -> Result<HttpResponse> {
    let service = BookmarkService::new(pool.get_ref().clone());
    service.delete_bookmark(query.item_id, user.0).await?;

    Ok(HttpResponse::NoContent().finish())
}
