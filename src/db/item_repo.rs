use crate::models::{Item, ItemRecord};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Columns of the denormalized item row: item joined with author
/// username, publisher and stats.
const ITEM_RECORD_COLUMNS: &str = r#"
    i.id, i.title, i.body, i.link, i.author,
    i.user_id, u.username,
    i.publisher_id, p.domain AS publisher_domain, p.name AS publisher_name,
    p.favicon AS publisher_favicon,
    s.likes, s.comments_count, s.score,
    i.created_at, i.updated_at
"#;

fn record_query(where_and_order: &str) -> String {
    format!(
        r#"
        SELECT {ITEM_RECORD_COLUMNS}
        FROM items i
        JOIN users u ON u.id = i.user_id
        JOIN publishers p ON p.id = i.publisher_id
        JOIN item_stats s ON s.item_id = i.id
        {where_and_order}
        "#
    )
}

/// Create an item together with its stats row in one transaction.
pub async fn create_item(
    pool: &PgPool,
    user_id: i64,
    publisher_id: i64,
    title: &str,
    body: &str,
    link: &str,
    author: Option<&str>,
) -> Result<Item, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let item = sqlx::query_as::<_, Item>(
        r#"
        INSERT INTO items (title, body, link, author, user_id, publisher_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, title, body, link, author, user_id, publisher_id, created_at, updated_at
        "#,
    )
    .bind(title)
    .bind(body)
    .bind(link)
    .bind(author)
    .bind(user_id)
    .bind(publisher_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO item_stats (item_id) VALUES ($1)")
        .bind(item.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(item)
}

/// Find a denormalized item row by id
pub async fn find_record_by_id(
    pool: &PgPool,
    item_id: i64,
) -> Result<Option<ItemRecord>, sqlx::Error> {
    sqlx::query_as::<_, ItemRecord>(&record_query("WHERE i.id = $1"))
        .bind(item_id)
        .fetch_optional(pool)
        .await
}

/// Find a bare item by id
pub async fn find_item_by_id(pool: &PgPool, item_id: i64) -> Result<Option<Item>, sqlx::Error> {
    sqlx::query_as::<_, Item>(
        r#"
        SELECT id, title, body, link, author, user_id, publisher_id, created_at, updated_at
        FROM items
        WHERE id = $1
        "#,
    )
    .bind(item_id)
    .fetch_optional(pool)
    .await
}

/// Update title/body of an item
pub async fn update_item(
    pool: &PgPool,
    item_id: i64,
    title: &str,
    body: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE items
        SET title = $1, body = $2, updated_at = NOW()
        WHERE id = $3
        "#,
    )
    .bind(title)
    .bind(body)
    .bind(item_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete an item. Stats, comments, likes and bookmarks cascade.
pub async fn delete_item(pool: &PgPool, item_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM items WHERE id = $1")
        .bind(item_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Count all items
pub async fn count_items(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM items")
        .fetch_one(pool)
        .await
}

/// Count items created inside an inclusive window
pub async fn count_items_in_window(
    pool: &PgPool,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE created_at >= $1 AND created_at <= $2")
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await
}

/// Recency feed page: id descending, keyset on the last-seen id.
pub async fn list_recent(
    pool: &PgPool,
    cursor_id: Option<i64>,
    limit: i64,
) -> Result<Vec<ItemRecord>, sqlx::Error> {
    sqlx::query_as::<_, ItemRecord>(&record_query(
        r#"
        WHERE ($1::BIGINT IS NULL OR i.id < $1)
        ORDER BY i.id DESC
        LIMIT $2
        "#,
    ))
    .bind(cursor_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Existence probe: is there at least one item strictly beyond the
/// recency cursor?
pub async fn has_recent_after(pool: &PgPool, last_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM items WHERE id < $1)")
        .bind(last_id)
        .fetch_one(pool)
        .await
}

/// Trending feed page: (score DESC, id DESC) above the eligibility
/// floor. The row-wise tuple comparison keeps traversal gap-free when
/// scores are tied or drift between requests.
pub async fn list_trending(
    pool: &PgPool,
    min_score: f64,
    cursor: Option<(f64, i64)>,
    limit: i64,
) -> Result<Vec<ItemRecord>, sqlx::Error> {
    let (cursor_score, cursor_id) = match cursor {
        Some((score, id)) => (Some(score), Some(id)),
        None => (None, None),
    };

    sqlx::query_as::<_, ItemRecord>(&record_query(
        r#"
        WHERE s.score >= $1
          AND ($2::DOUBLE PRECISION IS NULL OR (s.score, s.item_id) < ($2, $3))
        ORDER BY s.score DESC, s.item_id DESC
        LIMIT $4
        "#,
    ))
    .bind(min_score)
    .bind(cursor_score)
    .bind(cursor_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Existence probe for the trending feed beyond (score, id)
pub async fn has_trending_after(
    pool: &PgPool,
    min_score: f64,
    score: f64,
    id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM item_stats
            WHERE score >= $1 AND (score, item_id) < ($2, $3)
        )
        "#,
    )
    .bind(min_score)
    .bind(score)
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Historical-window page: (likes DESC, id DESC) within the window,
/// same tuple-keyset pattern as the trending feed.
pub async fn list_past(
    pool: &PgPool,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    cursor: Option<(i64, i64)>,
    limit: i64,
) -> Result<Vec<ItemRecord>, sqlx::Error> {
    let (cursor_likes, cursor_id) = match cursor {
        Some((likes, id)) => (Some(likes), Some(id)),
        None => (None, None),
    };

    sqlx::query_as::<_, ItemRecord>(&record_query(
        r#"
        WHERE i.created_at >= $1 AND i.created_at <= $2
          AND ($3::BIGINT IS NULL OR (s.likes, i.id) < ($3, $4))
        ORDER BY s.likes DESC, i.id DESC
        LIMIT $5
        "#,
    ))
    .bind(from)
    .bind(to)
    .bind(cursor_likes)
    .bind(cursor_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Existence probe for the historical window beyond (likes, id)
pub async fn has_past_after(
    pool: &PgPool,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    likes: i64,
    id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1
            FROM items i
            JOIN item_stats s ON s.item_id = i.id
            WHERE i.created_at >= $1 AND i.created_at <= $2
              AND (s.likes, i.id) < ($3, $4)
        )
        "#,
    )
    .bind(from)
    .bind(to)
    .bind(likes)
    .bind(id)
    .fetch_one(pool)
    .await
}
