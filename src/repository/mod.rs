mod postgres;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::models::{Comment, CreatedComment};

pub use postgres::PgCommentStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("there is no parent comment with id {0}")]
    ParentNotFound(i64),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Flat-row access to the `comments` table. Every method is a single
/// statement; none of them builds trees.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn insert(&self, parent_id: Option<i64>, text: &str) -> StoreResult<CreatedComment>;

    /// Returns the number of rows removed directly (descendants removed by
    /// the cascade are not counted).
    async fn delete_by_id(&self, id: i64) -> StoreResult<u64>;

    /// The comment `root_id` and all of its descendants, unordered.
    async fn query_closure(&self, root_id: i64) -> StoreResult<Vec<Comment>>;

    /// A `limit`/`offset` window over the closure below `root_id`, or below
    /// every top-level comment when `root_id` is `None`, oldest first.
    async fn query_closure_paged(
        &self,
        root_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Comment>>;

    async fn query_all(&self) -> StoreResult<Vec<Comment>>;

    /// Full-text matches for `text`, most relevant first.
    async fn query_by_search(&self, text: &str) -> StoreResult<Vec<Comment>>;
}
