use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use fuglelitt_common::{catalog::forms::PostForm, db::models::Post, errors::Result};
use uuid::Uuid;

use super::{created, Created};
use crate::AppState;

pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>> {
    Ok(Json(state.catalog.posts().await?))
}

pub async fn create_post(
    State(state): State<AppState>,
    Json(form): Json<PostForm>,
) -> Result<Created<Post>> {
    Ok(created(state.catalog.create_post(form).await?))
}

pub async fn get_post(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Post>> {
    Ok(Json(state.catalog.post(id).await?))
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<PostForm>,
) -> Result<Json<Post>> {
    Ok(Json(state.catalog.update_post(id, form).await?))
}

pub async fn delete_post(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    state.catalog.delete_post(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
