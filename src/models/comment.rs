use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A comment row, and after tree building, a node of the comment forest.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub children: Vec<Comment>,
}

// Reply chains have no depth limit, so descendants are released from a flat
// stack rather than by the nested drop glue.
impl Drop for Comment {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut child) = pending.pop() {
            pending.append(&mut child.children);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CreatedComment {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateComment {
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchText {
    pub text: String,
}
