use crate::models::{Comment, CommentRecord};
use sqlx::PgPool;

const COMMENT_COLUMNS: &str = r#"
    id, item_id, user_id, parent_comment_id, mention_user_id, text,
    likes, sub_comments_count, created_at, updated_at, deleted_at
"#;

const COMMENT_RECORD_COLUMNS: &str = r#"
    c.id, c.item_id, c.user_id, u.username,
    c.parent_comment_id, c.mention_user_id, mu.username AS mention_username,
    c.text, c.likes, c.sub_comments_count,
    c.created_at, c.updated_at, c.deleted_at
"#;

fn record_query(where_and_order: &str) -> String {
    format!(
        r#"
        SELECT {COMMENT_RECORD_COLUMNS}
        FROM comments c
        JOIN users u ON u.id = c.user_id
        LEFT JOIN users mu ON mu.id = c.mention_user_id
        {where_and_order}
        "#
    )
}

/// Insert a comment. The caller has already resolved the root parent
/// and the mention target.
pub async fn create_comment(
    pool: &PgPool,
    item_id: i64,
    user_id: i64,
    text: &str,
    parent_comment_id: Option<i64>,
    mention_user_id: Option<i64>,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!(
        r#"
        INSERT INTO comments (item_id, user_id, text, parent_comment_id, mention_user_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {COMMENT_COLUMNS}
        "#
    ))
    .bind(item_id)
    .bind(user_id)
    .bind(text)
    .bind(parent_comment_id)
    .bind(mention_user_id)
    .fetch_one(pool)
    .await
}

/// Find a bare comment by id (soft-deleted rows included)
pub async fn find_by_id(pool: &PgPool, comment_id: i64) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!(
        "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
    ))
    .bind(comment_id)
    .fetch_optional(pool)
    .await
}

/// Find a denormalized comment row by id (soft-deleted rows included)
pub async fn find_record_by_id(
    pool: &PgPool,
    comment_id: i64,
) -> Result<Option<CommentRecord>, sqlx::Error> {
    sqlx::query_as::<_, CommentRecord>(&record_query("WHERE c.id = $1"))
        .bind(comment_id)
        .fetch_optional(pool)
        .await
}

/// All comments for an item in id order, soft-deleted rows included —
/// the thread builder needs them for redaction and root retention.
pub async fn list_by_item(pool: &PgPool, item_id: i64) -> Result<Vec<CommentRecord>, sqlx::Error> {
    sqlx::query_as::<_, CommentRecord>(&record_query("WHERE c.item_id = $1 ORDER BY c.id ASC"))
        .bind(item_id)
        .fetch_all(pool)
        .await
}

/// Live replies under a root comment, in id order
pub async fn list_live_replies(
    pool: &PgPool,
    parent_comment_id: i64,
) -> Result<Vec<CommentRecord>, sqlx::Error> {
    sqlx::query_as::<_, CommentRecord>(&record_query(
        "WHERE c.parent_comment_id = $1 AND c.deleted_at IS NULL ORDER BY c.id ASC",
    ))
    .bind(parent_comment_id)
    .fetch_all(pool)
    .await
}

/// Update comment text
pub async fn update_text(pool: &PgPool, comment_id: i64, text: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE comments SET text = $1, updated_at = NOW() WHERE id = $2")
        .bind(text)
        .bind(comment_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Soft delete: set deleted_at, keep the row for thread integrity
pub async fn soft_delete(pool: &PgPool, comment_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE comments SET deleted_at = NOW() WHERE id = $1")
        .bind(comment_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Recompute a root's reply counter from its live child rows and
/// return the fresh value
pub async fn recount_replies(pool: &PgPool, root_id: i64) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        UPDATE comments
        SET sub_comments_count = (
            SELECT COUNT(*) FROM comments
            WHERE parent_comment_id = $1 AND deleted_at IS NULL
        )
        WHERE id = $1
        RETURNING sub_comments_count
        "#,
    )
    .bind(root_id)
    .fetch_optional(pool)
    .await
}

/// Recompute a comment's like counter from the like rows and return
/// the fresh value
pub async fn recount_likes(pool: &PgPool, comment_id: i64) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        UPDATE comments
        SET likes = (SELECT COUNT(*) FROM comment_likes WHERE comment_id = $1)
        WHERE id = $1
        RETURNING likes
        "#,
    )
    .bind(comment_id)
    .fetch_optional(pool)
    .await
}
