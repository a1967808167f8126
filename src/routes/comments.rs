use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{Comment, CommentsQuery, CreateComment, Pagination, SearchText};
use crate::routes::AppState;

pub fn comments_routes() -> Router<AppState> {
    Router::new()
        .route("/comments", get(get_comments).post(create_comment))
        .route("/comments/all", get(get_all_comments))
        .route("/comments/search", post(search_comments))
        .route("/comments/{id}", delete(delete_comment))
}

/// Without `page` and `limit`, returns the whole subtree of `parent`.
/// Otherwise returns one page of the closure below `parent`, or below every
/// top-level comment when `parent` is absent.
async fn get_comments(
    State(state): State<AppState>,
    query: std::result::Result<Query<CommentsQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query.map_err(|rejection| {
        Error::validation(format!("invalid query: {}", rejection.body_text()))
    })?;
    let parent = parse_param("parent", query.parent.as_deref())?;
    let page = parse_param("page", query.page.as_deref())?;
    let limit = parse_param("limit", query.limit.as_deref())?;

    let comments = match (parent, page, limit) {
        (Some(id), None, None) => state.comments.comment_tree(id).await?,
        (parent_id, page, limit) => {
            let pagination = Pagination {
                parent_id,
                page: page.unwrap_or(1),
                limit: limit.unwrap_or(0),
            };
            state
                .comments
                .comments_paginated(pagination, state.default_page_size)
                .await?
        }
    };

    Ok(Forest(comments))
}

async fn get_all_comments(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Forest(state.comments.all_comments().await?))
}

async fn search_comments(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchText>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(search) = payload.map_err(invalid_payload)?;
    Ok(Forest(state.comments.search_comments(&search.text).await?))
}

async fn create_comment(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateComment>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(input) = payload.map_err(invalid_payload)?;
    let created = state.comments.create_comment(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn delete_comment(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse> {
    let Path(id) = id.map_err(|_| Error::validation("invalid id was provided"))?;
    state.comments.delete_comment(id).await?;
    Ok(Json(serde_json::json!({"status": "successfully deleted comment"})))
}

/// JSON body for a comment forest. Nesting follows the reply depth, which is
/// unbounded, so serialization grows its stack on the heap as it descends.
struct Forest(Vec<Comment>);

impl IntoResponse for Forest {
    fn into_response(self) -> Response {
        let mut body = Vec::new();
        let mut json = serde_json::Serializer::new(&mut body);
        match self.0.serialize(serde_stacker::Serializer::new(&mut json)) {
            Ok(()) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
            Err(err) => {
                tracing::error!(?err, "failed to serialize comment forest");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"detail": "Internal server error, see logs for details"})),
                )
                    .into_response()
            }
        }
    }
}

fn parse_param(name: &str, value: Option<&str>) -> Result<Option<i64>> {
    value
        .map(|v| {
            v.trim()
                .parse::<i64>()
                .map_err(|e| Error::validation(format!("invalid {name} was provided: {e}")))
        })
        .transpose()
}

fn invalid_payload(rejection: JsonRejection) -> Error {
    Error::validation(format!("invalid payload: {}", rejection.body_text()))
}
