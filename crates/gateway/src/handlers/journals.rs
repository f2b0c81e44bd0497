//! Journal handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use fuglelitt_common::{
    auth::ActingUser,
    catalog::{forms::JournalForm, views::JournalDetail},
    db::models::Journal,
    errors::Result,
};
use fuglelitt_search::{JournalManager, SearchManager};
use serde::Deserialize;

use super::{created, lookup, Created};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct JournalListParams {
    /// Keyword for the journal manager
    pub q: Option<String>,
    /// Only journals the acting user edits
    #[serde(default)]
    pub editable: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct JournalDetailParams {
    /// Case-insensitive filter on issue names
    pub name: Option<String>,
}

pub async fn list_journals(
    State(state): State<AppState>,
    acting: ActingUser,
    Query(params): Query<JournalListParams>,
) -> Result<Json<Vec<Journal>>> {
    let journals = if params.editable {
        state.catalog.journals_edited_by(acting.require()?).await?
    } else {
        state.catalog.journals().await?
    };
    Ok(Json(JournalManager.search(journals, params.q.as_deref())))
}

pub async fn create_journal(
    State(state): State<AppState>,
    Json(form): Json<JournalForm>,
) -> Result<Created<Journal>> {
    Ok(created(state.catalog.create_journal(form).await?))
}

pub async fn get_journal(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<JournalDetailParams>,
) -> Result<Json<JournalDetail>> {
    let detail = state
        .catalog
        .journal_detail(&lookup(&key), params.name.as_deref())
        .await?;
    Ok(Json(detail))
}

pub async fn update_journal(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(form): Json<JournalForm>,
) -> Result<Json<Journal>> {
    Ok(Json(state.catalog.update_journal(&lookup(&key), form).await?))
}

/// Deletes the journal together with its issues and their articles
pub async fn delete_journal(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode> {
    state.catalog.delete_journal(&lookup(&key)).await?;
    Ok(StatusCode::NO_CONTENT)
}
