//! Issue handlers, including filing articles under an issue

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use fuglelitt_common::{
    auth::ActingUser,
    catalog::{
        forms::{ArticleForm, IssueForm},
        views::IssueDetail,
        ArticleRecord,
    },
    db::models::Issue,
    errors::Result,
};
use fuglelitt_search::{IssueManager, SearchManager};
use serde::Deserialize;

use super::{created, lookup, Created};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct IssueListParams {
    pub q: Option<String>,
}

pub async fn list_issues(
    State(state): State<AppState>,
    Query(params): Query<IssueListParams>,
) -> Result<Json<Vec<Issue>>> {
    let issues = state.catalog.issues().await?;
    Ok(Json(IssueManager.search(issues, params.q.as_deref())))
}

/// The acting user must edit the issue's journal
pub async fn create_issue(
    State(state): State<AppState>,
    acting: ActingUser,
    Json(form): Json<IssueForm>,
) -> Result<Created<Issue>> {
    Ok(created(state.catalog.create_issue(acting.user_id, form).await?))
}

pub async fn get_issue(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<IssueDetail>> {
    Ok(Json(state.catalog.issue_detail(&lookup(&key)).await?))
}

pub async fn update_issue(
    State(state): State<AppState>,
    acting: ActingUser,
    Path(key): Path<String>,
    Json(form): Json<IssueForm>,
) -> Result<Json<Issue>> {
    let issue = state
        .catalog
        .update_issue(acting.user_id, &lookup(&key), form)
        .await?;
    Ok(Json(issue))
}

pub async fn delete_issue(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode> {
    state.catalog.delete_issue(&lookup(&key)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /issues/{key}/articles
pub async fn create_article(
    State(state): State<AppState>,
    acting: ActingUser,
    Path(key): Path<String>,
    Json(form): Json<ArticleForm>,
) -> Result<Created<ArticleRecord>> {
    let article = state
        .catalog
        .create_article(acting.user_id, &lookup(&key), form)
        .await?;
    Ok(created(article))
}
