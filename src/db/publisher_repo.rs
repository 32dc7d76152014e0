use crate::models::Publisher;
use sqlx::PgPool;

/// Get or create a publisher keyed by domain. The no-op conflict
/// update makes RETURNING yield the existing row.
pub async fn get_or_create(
    pool: &PgPool,
    domain: &str,
    name: &str,
) -> Result<Publisher, sqlx::Error> {
    sqlx::query_as::<_, Publisher>(
        r#"
        INSERT INTO publishers (domain, name)
        VALUES ($1, $2)
        ON CONFLICT (domain) DO UPDATE
        SET domain = EXCLUDED.domain
        RETURNING id, domain, name, favicon
        "#,
    )
    .bind(domain)
    .bind(name)
    .fetch_one(pool)
    .await
}
