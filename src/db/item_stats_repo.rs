use crate::models::ItemStats;
use sqlx::PgPool;

/// Find the stats row for an item
pub async fn find_by_item(pool: &PgPool, item_id: i64) -> Result<Option<ItemStats>, sqlx::Error> {
    sqlx::query_as::<_, ItemStats>(
        "SELECT item_id, likes, comments_count, score FROM item_stats WHERE item_id = $1",
    )
    .bind(item_id)
    .fetch_optional(pool)
    .await
}

/// Recompute the like counter from the like rows in a single statement
/// and return the fresh value. Never applies a delta.
pub async fn recount_likes(pool: &PgPool, item_id: i64) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        UPDATE item_stats
        SET likes = (SELECT COUNT(*) FROM item_likes WHERE item_id = $1)
        WHERE item_id = $1
        RETURNING likes
        "#,
    )
    .bind(item_id)
    .fetch_optional(pool)
    .await
}

/// Recompute the comment counter from the live comment rows
pub async fn recount_comments(pool: &PgPool, item_id: i64) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        UPDATE item_stats
        SET comments_count = (
            SELECT COUNT(*) FROM comments WHERE item_id = $1 AND deleted_at IS NULL
        )
        WHERE item_id = $1
        RETURNING comments_count
        "#,
    )
    .bind(item_id)
    .fetch_optional(pool)
    .await
}

/// Store a freshly computed ranking score
pub async fn set_score(pool: &PgPool, item_id: i64, score: f64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE item_stats SET score = $1 WHERE item_id = $2")
        .bind(score)
        .bind(item_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Count items at or above the trending eligibility floor
pub async fn count_trending(pool: &PgPool, min_score: f64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM item_stats WHERE score >= $1")
        .bind(min_score)
        .fetch_one(pool)
        .await
}
