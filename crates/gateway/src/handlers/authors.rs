//! Author handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use fuglelitt_common::{
    catalog::{forms::AuthorForm, views::AuthorDetail},
    db::models::Author,
    errors::Result,
};
use serde::Deserialize;

use super::{created, lookup, Created};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AuthorListParams {
    /// Display-name filter used by author pickers
    pub q: Option<String>,
}

pub async fn list_authors(
    State(state): State<AppState>,
    Query(params): Query<AuthorListParams>,
) -> Result<Json<Vec<Author>>> {
    Ok(Json(state.catalog.authors(params.q.as_deref()).await?))
}

pub async fn create_author(
    State(state): State<AppState>,
    Json(form): Json<AuthorForm>,
) -> Result<Created<Author>> {
    Ok(created(state.catalog.create_author(form).await?))
}

pub async fn get_author(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<AuthorDetail>> {
    Ok(Json(state.catalog.author_detail(&lookup(&key)).await?))
}

pub async fn update_author(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(form): Json<AuthorForm>,
) -> Result<Json<Author>> {
    Ok(Json(state.catalog.update_author(&lookup(&key), form).await?))
}

/// Issues edited by the author lose their redactor
pub async fn delete_author(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode> {
    state.catalog.delete_author(&lookup(&key)).await?;
    Ok(StatusCode::NO_CONTENT)
}
