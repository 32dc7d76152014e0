use sqlx::PgPool;
use std::collections::HashSet;

/// Create a comment like (idempotent)
pub async fn create_like(
    pool: &PgPool,
    comment_id: i64,
    user_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO comment_likes (comment_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT (comment_id, user_id) DO NOTHING
        "#,
    )
    .bind(comment_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a comment like (idempotent)
pub async fn delete_like(
    pool: &PgPool,
    comment_id: i64,
    user_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM comment_likes WHERE comment_id = $1 AND user_id = $2")
        .bind(comment_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Check if a user has liked a comment
pub async fn check_user_liked(
    pool: &PgPool,
    comment_id: i64,
    user_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM comment_likes WHERE comment_id = $1 AND user_id = $2)",
    )
    .bind(comment_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

/// Batch check which of the given comments the user has liked — one
/// query for the whole thread, not one per comment.
pub async fn batch_check_liked(
    pool: &PgPool,
    user_id: i64,
    comment_ids: &[i64],
) -> Result<HashSet<i64>, sqlx::Error> {
    if comment_ids.is_empty() {
        return Ok(HashSet::new());
    }

    let liked: Vec<i64> = sqlx::query_scalar(
        "SELECT comment_id FROM comment_likes WHERE user_id = $1 AND comment_id = ANY($2)",
    )
    .bind(user_id)
    .bind(comment_ids)
    .fetch_all(pool)
    .await?;

    Ok(liked.into_iter().collect())
}
