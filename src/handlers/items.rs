/// Item handlers - HTTP endpoints for item submission, feeds and likes
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::config::RankingConfig;
use crate::error::{AppError, Result};
use crate::middleware::{MaybeUserId, UserId};
use crate::services::items::{ListItemsQuery, ListMode, DEFAULT_PAGE_SIZE};
use crate::services::ItemService;
use crate::workers::MaintenanceQueue;

fn item_service(
    pool: &web::Data<PgPool>,
    queue: &web::Data<MaintenanceQueue>,
    ranking: &web::Data<RankingConfig>,
) -> ItemService {
    ItemService::new(
        pool.get_ref().clone(),
        queue.get_ref().clone(),
        *ranking.get_ref(),
    )
}

#[derive(Debug, Deserialize)]
pub struct ListItemsParams {
    #[serde(default)]
    pub mode: ListMode,
    pub cursor: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<i64>,
}

/// Request body for submitting an item
#[derive(Debug, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 20000))]
    pub body: String,
    #[validate(length(min = 1, max = 2048))]
    pub link: String,
    pub author: Option<String>,
}

/// Request body for editing an item
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 20000))]
    pub body: String,
}

/// List the feed in one of three modes
pub async fn list_items(
    pool: web::Data<PgPool>,
    queue: web::Data<MaintenanceQueue>,
    ranking: web::Data<RankingConfig>,
    query: web::Query<ListItemsParams>,
    user: MaybeUserId,
) -> Result<HttpResponse> {
    let service = item_service(&pool, &queue, &ranking);
    let params = query.into_inner();

    let page = service
        .list_items(
            ListItemsQuery {
                mode: params.mode,
                cursor: params.cursor,
                start_date: params.start_date,
                end_date: params.end_date,
                limit: params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            },
            user.0,
        )
        .await?;

    Ok(HttpResponse::Ok().json(page))
}

/// Submit a new item
pub async fn create_item(
    pool: web::Data<PgPool>,
    queue: web::Data<MaintenanceQueue>,
    ranking: web::Data<RankingConfig>,
    user: UserId,
    req: web::Json<CreateItemRequest>,
) -> Result<HttpResponse> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let service = item_service(&pool, &queue, &ranking);
    let item = service
        .create_item(
            user.0,
            &req.title,
            &req.body,
            &req.link,
            req.author.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Created().json(item))
}

/// Fetch a single item
pub async fn get_item(
    pool: web::Data<PgPool>,
    queue: web::Data<MaintenanceQueue>,
    ranking: web::Data<RankingConfig>,
    item_id: web::Path<i64>,
    user: MaybeUserId,
) -> Result<HttpResponse> {
    let service = item_service(&pool, &queue, &ranking);
    let item = service.get_item(*item_id, user.0).await?;

    Ok(HttpResponse::Ok().json(item))
}

/// Edit an item (owner only)
pub async fn update_item(
    pool: web::Data<PgPool>,
    queue: web::Data<MaintenanceQueue>,
    ranking: web::Data<RankingConfig>,
    item_id: web::Path<i64>,
    user: UserId,
    req: web::Json<UpdateItemRequest>,
) -> Result<HttpResponse> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let service = item_service(&pool, &queue, &ranking);
    let item = service
        .update_item(*item_id, user.0, &req.title, &req.body)
        .await?;

    Ok(HttpResponse::Ok().json(item))
}

/// Delete an item (owner only)
pub async fn delete_item(
    pool: web::Data<PgPool>,
    queue: web::Data<MaintenanceQueue>,
    ranking: web::Data<RankingConfig>,
    item_id: web::Path<i64>,
    user: UserId,
) -> Result<HttpResponse> {
    let service = item_service(&pool, &queue, &ranking);
    service.delete_item(*item_id, user.0).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Like an item (idempotent)
pub async fn like_item(
    pool: web::Data<PgPool>,
    queue: web::Data<MaintenanceQueue>,
    ranking: web::Data<RankingConfig>,
    item_id: web::Path<i64>,
    user: UserId,
) -> Result<HttpResponse> {
    let service = item_service(&pool, &queue, &ranking);
    let response = service.like_item(*item_id, user.0).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Remove a like from an item (idempotent)
pub async fn unlike_item(
    pool: web::Data<PgPool>,
    queue: web::Data<MaintenanceQueue>,
    ranking: web::Data<RankingConfig>,
    item_id: web::Path<i64>,
    user: UserId,
) -> Result<HttpResponse> {
    let service = item_service(&pool, &queue, &ranking);
    let response = service.unlike_item(*item_id, user.0).await?;

    Ok(HttpResponse::Ok().json(response))
}
