use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};

/// Opens the pool and creates the schema if it is missing.
///
/// `search_config` is interpolated into DDL and must already be validated as
/// a plain identifier (see `Config`).
pub async fn init_db(
    database_url: &str,
    max_connections: u32,
    search_config: &str,
) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id BIGSERIAL PRIMARY KEY,
            parent_id BIGINT NULL REFERENCES comments(id) ON DELETE CASCADE,
            text TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            search_vector TSVECTOR GENERATED ALWAYS AS (to_tsvector('{search_config}', text)) STORED
        )
        "#
    ))
    .execute(&pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_comments_parent_id_created_at ON comments (parent_id, created_at)",
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_comments_search_vector ON comments USING GIN (search_vector)",
    )
    .execute(&pool)
    .await?;

    tracing::info!(search_config, "Comment schema checked");

    Ok(pool)
}
