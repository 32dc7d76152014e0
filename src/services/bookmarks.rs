/// Bookmark service - save items for later, newest first
use sqlx::PgPool;
use std::collections::HashSet;

use crate::db::{bookmark_repo, item_like_repo, item_repo};
use crate::error::{AppError, Result};
use crate::models::{BookmarkResponse, ItemResponse, Page};
use crate::services::cursor::RecencyCursor;

pub const DEFAULT_PAGE_SIZE: i64 = 5;

pub struct BookmarkService {
    pool: PgPool,
}

impl BookmarkService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bookmark an item (idempotent) and return the bookmarked item
    pub async fn create_bookmark(&self, item_id: i64, user_id: i64) -> Result<BookmarkResponse> {
        item_repo::find_item_by_id(&self.pool, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("item {item_id} does not exist")))?;

        bookmark_repo::create_bookmark(&self.pool, item_id, user_id).await?;

        let record = bookmark_repo::find_record(&self.pool, item_id, user_id)
            .await?
            .ok_or_else(|| AppError::Internal("created bookmark vanished".to_string()))?;
        let is_liked = item_like_repo::check_user_liked(&self.pool, item_id, user_id).await?;

        Ok(BookmarkResponse {
            id: record.bookmark_id,
            bookmarked_at: record.bookmarked_at,
            item: ItemResponse::from_record(record.item, is_liked, true),
        })
    }

    /// Remove a bookmark. Absence is a no-op.
    pub async fn delete_bookmark(&self, item_id: i64, user_id: i64) -> Result<()> {
        bookmark_repo::delete_bookmark(&self.pool, item_id, user_id).await?;
        Ok(())
    }

    /// The caller's bookmarks, newest first, keyset on bookmark id
    pub async fn list_bookmarks(
        &self,
        user_id: i64,
        cursor: Option<&str>,
        limit: i64,
    ) -> Result<Page<BookmarkResponse>> {
        let cursor = cursor.map(RecencyCursor::decode).transpose()?;

        let (total_count, records) = tokio::try_join!(
            bookmark_repo::count_by_user(&self.pool, user_id),
            bookmark_repo::list_by_user(&self.pool, user_id, cursor.map(|c| c.id), limit),
        )?;

        let (end_cursor, has_next_page) = match records.last() {
            Some(last) => {
                let end = RecencyCursor {
                    id: last.bookmark_id,
                };
                let more = bookmark_repo::has_more(&self.pool, user_id, last.bookmark_id).await?;
                (Some(end.encode()), more)
            }
            None => (None, false),
        };

        let list = self.serialize(records, user_id).await?;
        Ok(Page::new(list, total_count, end_cursor, has_next_page))
    }

    /// Everything listed here is bookmarked by definition; only the
    /// like flag needs a lookup.
    async fn serialize(
        &self,
        records: Vec<crate::models::BookmarkRecord>,
        user_id: i64,
    ) -> Result<Vec<BookmarkResponse>> {
        let item_ids: Vec<i64> = records.iter().map(|r| r.item.id).collect();
        let liked: HashSet<i64> =
            item_like_repo::batch_check_liked(&self.pool, user_id, &item_ids).await?;

        Ok(records
            .into_iter()
            .map(|record| {
                let is_liked = liked.contains(&record.item.id);
                BookmarkResponse {
                    id: record.bookmark_id,
                    bookmarked_at: record.bookmarked_at,
                    item: ItemResponse::from_record(record.item, is_liked, true),
                }
            })
            .collect())
    }
}
