//! Article handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use fuglelitt_common::{
    catalog::{forms::ArticleForm, views::ArticleFilter, ArticleRecord},
    errors::Result,
};

use super::lookup;
use crate::AppState;

/// Filter keys: `name`, `authors`*, `tags`*, `journal`, `issue`
pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<ArticleRecord>>> {
    let filter = ArticleFilter::from_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    Ok(Json(state.catalog.filter_articles(&filter).await?))
}

pub async fn get_article(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ArticleRecord>> {
    Ok(Json(state.catalog.article(&lookup(&key)).await?))
}

/// Omitting `images` keeps the stored images
pub async fn update_article(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(form): Json<ArticleForm>,
) -> Result<Json<ArticleRecord>> {
    Ok(Json(state.catalog.update_article(&lookup(&key), form).await?))
}

pub async fn delete_article(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode> {
    state.catalog.delete_article(&lookup(&key)).await?;
    Ok(StatusCode::NO_CONTENT)
}
