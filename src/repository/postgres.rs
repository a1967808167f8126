use async_trait::async_trait;
use sqlx::PgPool;

use super::{CommentStore, StoreError, StoreResult};
use crate::models::{Comment, CreatedComment};

const CLOSURE_SQL: &str = r#"
    WITH RECURSIVE comment_tree AS (
        SELECT id, parent_id, text, created_at
        FROM comments
        WHERE id = $1

        UNION ALL

        SELECT c.id, c.parent_id, c.text, c.created_at
        FROM comments c
        INNER JOIN comment_tree ct ON c.parent_id = ct.id
    )
    SELECT id, parent_id, text, created_at FROM comment_tree
"#;

// $1 NULL starts from every top-level comment.
const CLOSURE_PAGED_SQL: &str = r#"
    WITH RECURSIVE comment_tree AS (
        SELECT id, parent_id, text, created_at
        FROM comments
        WHERE ($1::BIGINT IS NULL AND parent_id IS NULL) OR id = $1

        UNION ALL

        SELECT c.id, c.parent_id, c.text, c.created_at
        FROM comments c
        INNER JOIN comment_tree ct ON c.parent_id = ct.id
    )
    SELECT id, parent_id, text, created_at FROM comment_tree
    ORDER BY created_at ASC, id ASC
    LIMIT $2 OFFSET $3
"#;

#[derive(Clone)]
pub struct PgCommentStore {
    pool: PgPool,
    search_config: String,
}

impl PgCommentStore {
    /// `search_config` is the PostgreSQL text search configuration the
    /// `search_vector` column was generated with.
    pub fn new(pool: PgPool, search_config: impl Into<String>) -> Self {
        Self {
            pool,
            search_config: search_config.into(),
        }
    }
}

#[async_trait]
impl CommentStore for PgCommentStore {
    async fn insert(&self, parent_id: Option<i64>, text: &str) -> StoreResult<CreatedComment> {
        sqlx::query_as::<_, CreatedComment>(
            "INSERT INTO comments (parent_id, text) VALUES ($1, $2) RETURNING id, parent_id, text, created_at",
        )
        .bind(parent_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let missing_parent = matches!(
                &e,
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation()
            );
            match parent_id {
                Some(parent_id) if missing_parent => StoreError::ParentNotFound(parent_id),
                _ => StoreError::Database(e),
            }
        })
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn query_closure(&self, root_id: i64) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, Comment>(CLOSURE_SQL)
            .bind(root_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn query_closure_paged(
        &self,
        root_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, Comment>(CLOSURE_PAGED_SQL)
            .bind(root_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn query_all(&self) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, Comment>(
            "SELECT id, parent_id, text, created_at FROM comments ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn query_by_search(&self, text: &str) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, parent_id, text, created_at
            FROM comments
            WHERE search_vector @@ plainto_tsquery($1::regconfig, $2)
            ORDER BY ts_rank(search_vector, plainto_tsquery($1::regconfig, $2)) DESC, id ASC
            "#,
        )
        .bind(&self.search_config)
        .bind(text)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

/// These run against a scratch database named by `DATABASE_URL`:
/// `cargo test -- --ignored`.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, tree};

    async fn store() -> PgCommentStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = db::init_db(&url, 2, "simple").await.expect("init db");
        sqlx::query("TRUNCATE comments RESTART IDENTITY")
            .execute(&pool)
            .await
            .expect("truncate comments");
        PgCommentStore::new(pool, "simple")
    }

    #[tokio::test]
    #[ignore]
    async fn insert_with_missing_parent_is_parent_not_found() {
        let store = store().await;
        let err = store.insert(Some(999), "orphan").await.unwrap_err();
        assert!(matches!(err, StoreError::ParentNotFound(999)), "{err:?}");
    }

    #[tokio::test]
    #[ignore]
    async fn delete_cascades_to_descendants() {
        let store = store().await;
        let a = store.insert(None, "a").await.unwrap();
        let b = store.insert(Some(a.id), "b").await.unwrap();
        let _c = store.insert(Some(b.id), "c").await.unwrap();
        let d = store.insert(Some(a.id), "d").await.unwrap();

        assert_eq!(store.delete_by_id(b.id).await.unwrap(), 1);

        let forest = tree::build_subtree(store.query_closure(a.id).await.unwrap(), a.id);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, a.id);
        let children: Vec<i64> = forest[0].children.iter().map(|c| c.id).collect();
        assert_eq!(children, vec![d.id]);
        assert!(forest[0].children[0].children.is_empty());
    }

    #[tokio::test]
    #[ignore]
    async fn paged_closure_is_oldest_first() {
        let store = store().await;
        let root = store.insert(None, "root").await.unwrap();
        let mut ids = vec![root.id];
        for i in 0..24 {
            ids.push(store.insert(Some(root.id), &format!("reply {i}")).await.unwrap().id);
        }

        let page = store.query_closure_paged(Some(root.id), 10, 10).await.unwrap();
        let got: Vec<i64> = page.iter().map(|c| c.id).collect();
        assert_eq!(got, ids[10..20].to_vec());
    }

    #[tokio::test]
    #[ignore]
    async fn search_matches_words() {
        let store = store().await;
        store.insert(None, "the quick brown fox").await.unwrap();
        store.insert(None, "lazy dogs sleep").await.unwrap();

        let hits = store.query_by_search("fox").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "the quick brown fox");
    }
}
