use crate::models::BookmarkRecord;
use sqlx::PgPool;
use std::collections::HashSet;

/// Create a bookmark (idempotent) and return its id. The conflict arm
/// keeps the original row so repeated bookmarking returns the same id.
pub async fn create_bookmark(
    pool: &PgPool,
    item_id: i64,
    user_id: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO bookmarks (item_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT (item_id, user_id) DO UPDATE
        SET user_id = EXCLUDED.user_id
        RETURNING id
        "#,
    )
    .bind(item_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

/// Delete a bookmark (idempotent)
pub async fn delete_bookmark(
    pool: &PgPool,
    item_id: i64,
    user_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM bookmarks WHERE item_id = $1 AND user_id = $2")
        .bind(item_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Find one bookmark row (with its item) by (item, user)
pub async fn find_record(
    pool: &PgPool,
    item_id: i64,
    user_id: i64,
) -> Result<Option<BookmarkRecord>, sqlx::Error> {
    sqlx::query_as::<_, BookmarkRecord>(
        r#"
        SELECT b.id AS bookmark_id, b.created_at AS bookmarked_at,
               i.id, i.title, i.body, i.link, i.author,
               i.user_id, u.username,
               i.publisher_id, p.domain AS publisher_domain, p.name AS publisher_name,
               p.favicon AS publisher_favicon,
               s.likes, s.comments_count, s.score,
               i.created_at, i.updated_at
        FROM bookmarks b
        JOIN items i ON i.id = b.item_id
        JOIN users u ON u.id = i.user_id
        JOIN publishers p ON p.id = i.publisher_id
        JOIN item_stats s ON s.item_id = i.id
        WHERE b.item_id = $1 AND b.user_id = $2
        "#,
    )
    .bind(item_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// A user's bookmarks, newest first, keyset on the bookmark id
pub async fn list_by_user(
    pool: &PgPool,
    user_id: i64,
    cursor_id: Option<i64>,
    limit: i64,
) -> Result<Vec<BookmarkRecord>, sqlx::Error> {
    sqlx::query_as::<_, BookmarkRecord>(
        r#"
        SELECT b.id AS bookmark_id, b.created_at AS bookmarked_at,
               i.id, i.title, i.body, i.link, i.author,
               i.user_id, u.username,
               i.publisher_id, p.domain AS publisher_domain, p.name AS publisher_name,
               p.favicon AS publisher_favicon,
               s.likes, s.comments_count, s.score,
               i.created_at, i.updated_at
        FROM bookmarks b
        JOIN items i ON i.id = b.item_id
        JOIN users u ON u.id = i.user_id
        JOIN publishers p ON p.id = i.publisher_id
        JOIN item_stats s ON s.item_id = i.id
        WHERE b.user_id = $1 AND ($2::BIGINT IS NULL OR b.id < $2)
        ORDER BY b.id DESC
        LIMIT $3
        "#,
    )
    .bind(user_id)
    .bind(cursor_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Count a user's bookmarks
pub async fn count_by_user(pool: &PgPool, user_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM bookmarks WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

/// Existence probe beyond the bookmark cursor
pub async fn has_more(pool: &PgPool, user_id: i64, last_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bookmarks WHERE user_id = $1 AND id < $2)")
        .bind(user_id)
        .bind(last_id)
        .fetch_one(pool)
        .await
}

/// Batch check which of the given items the user has bookmarked
pub async fn batch_check_bookmarked(
    pool: &PgPool,
    user_id: i64,
    item_ids: &[i64],
) -> Result<HashSet<i64>, sqlx::Error> {
    if item_ids.is_empty() {
        return Ok(HashSet::new());
    }

    let bookmarked: Vec<i64> = sqlx::query_scalar(
        "SELECT item_id FROM bookmarks WHERE user_id = $1 AND item_id = ANY($2)",
    )
    .bind(user_id)
    .bind(item_ids)
    .fetch_all(pool)
    .await?;

    Ok(bookmarked.into_iter().collect())
}

/// Check if a user has bookmarked an item
pub async fn check_user_bookmarked(
    pool: &PgPool,
    item_id: i64,
    user_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM bookmarks WHERE item_id = $1 AND user_id = $2)",
    )
    .bind(item_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}
