use axum::{extract::State, Json};
use fuglelitt_common::{catalog::views::HomePage, errors::Result};

use crate::AppState;

/// Latest articles, posts and issues
pub async fn home(State(state): State<AppState>) -> Result<Json<HomePage>> {
    Ok(Json(state.catalog.home().await?))
}
