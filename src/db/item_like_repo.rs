use sqlx::PgPool;
use std::collections::HashSet;

/// Create a like (idempotent). Returns true when a new row was
/// inserted, false when the (item, user) pair already existed.
pub async fn create_like(pool: &PgPool, item_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO item_likes (item_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT (item_id, user_id) DO NOTHING
        "#,
    )
    .bind(item_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a like (idempotent). Returns true when a row was removed.
pub async fn delete_like(pool: &PgPool, item_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM item_likes WHERE item_id = $1 AND user_id = $2")
        .bind(item_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Check if a user has liked an item
pub async fn check_user_liked(
    pool: &PgPool,
    item_id: i64,
    user_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM item_likes WHERE item_id = $1 AND user_id = $2)",
    )
    .bind(item_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

/// Batch check which of the given items the user has liked
pub async fn batch_check_liked(
    pool: &PgPool,
    user_id: i64,
    item_ids: &[i64],
) -> Result<HashSet<i64>, sqlx::Error> {
    if item_ids.is_empty() {
        return Ok(HashSet::new());
    }

    let liked: Vec<i64> = sqlx::query_scalar(
        "SELECT item_id FROM item_likes WHERE user_id = $1 AND item_id = ANY($2)",
    )
    .bind(user_id)
    .bind(item_ids)
    .fetch_all(pool)
    .await?;

    Ok(liked.into_iter().collect())
}
