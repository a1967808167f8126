use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::{Error, Result};
use crate::models::{Comment, CreateComment, CreatedComment, Pagination};
use crate::repository::CommentStore;
use crate::tree;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommentService: Send + Sync {
    /// The comment `id` with all of its replies as a one-tree forest.
    async fn comment_tree(&self, id: i64) -> Result<Vec<Comment>>;

    /// One page of the flattened closure, turned into a forest. Rows whose
    /// parent is on another page are roots. `default_limit` replaces a zero
    /// `limit`.
    async fn comments_paginated(
        &self,
        pagination: Pagination,
        default_limit: i64,
    ) -> Result<Vec<Comment>>;

    async fn search_comments(&self, text: &str) -> Result<Vec<Comment>>;

    async fn all_comments(&self) -> Result<Vec<Comment>>;

    async fn create_comment(&self, comment: CreateComment) -> Result<CreatedComment>;

    async fn delete_comment(&self, id: i64) -> Result<()>;
}

pub struct Comments<S> {
    store: S,
}

impl<S: CommentStore> Comments<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: CommentStore> CommentService for Comments<S> {
    async fn comment_tree(&self, id: i64) -> Result<Vec<Comment>> {
        let rows = self.store.query_closure(id).await?;
        if rows.is_empty() {
            return Err(Error::NotFound(id));
        }
        tracing::debug!(id, rows = rows.len(), "fetched comment closure");
        Ok(tree::build_subtree(rows, id))
    }

    async fn comments_paginated(
        &self,
        pagination: Pagination,
        default_limit: i64,
    ) -> Result<Vec<Comment>> {
        if pagination.limit < 0 {
            return Err(Error::validation("limit must not be negative"));
        }
        let (limit, offset) = pagination.window(default_limit);
        let rows = self
            .store
            .query_closure_paged(pagination.parent_id, limit, offset)
            .await?;
        tracing::debug!(
            parent = ?pagination.parent_id,
            limit,
            offset,
            rows = rows.len(),
            "fetched comment page"
        );
        Ok(tree::build_batch(rows))
    }

    async fn search_comments(&self, text: &str) -> Result<Vec<Comment>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::validation("search text is required"));
        }
        let rows = self.store.query_by_search(text).await?;
        tracing::debug!(query = text, hits = rows.len(), "searched comments");
        Ok(tree::build_batch(rows))
    }

    async fn all_comments(&self) -> Result<Vec<Comment>> {
        Ok(tree::build_tree(self.store.query_all().await?))
    }

    async fn create_comment(&self, comment: CreateComment) -> Result<CreatedComment> {
        let text = comment.text.trim();
        if text.is_empty() {
            return Err(Error::validation("comment text is required"));
        }
        let created = self.store.insert(comment.parent_id, text).await?;
        tracing::debug!(id = created.id, parent = ?created.parent_id, "created comment");
        Ok(created)
    }

    async fn delete_comment(&self, id: i64) -> Result<()> {
        let removed = self.store.delete_by_id(id).await?;
        if removed == 0 {
            tracing::debug!(id, "delete matched no comment");
        }
        Ok(())
    }
}
