//! Book handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use fuglelitt_common::{
    auth::ActingUser,
    catalog::{forms::BookForm, BookRecord},
    errors::Result,
};
use fuglelitt_search::{Page, Paginator};
use serde::Deserialize;

use super::{created, lookup, Created};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BookListParams {
    pub page: Option<String>,
}

pub async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<BookListParams>,
) -> Result<Json<Page<BookRecord>>> {
    let books = state.catalog.book_records().await?;
    let paginator = Paginator::new(state.catalog.config().book_page_size);
    Ok(Json(paginator.page(books, params.page.as_deref())))
}

pub async fn create_book(
    State(state): State<AppState>,
    acting: ActingUser,
    Json(form): Json<BookForm>,
) -> Result<Created<BookRecord>> {
    Ok(created(state.catalog.create_book(acting.user_id, form).await?))
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<BookRecord>> {
    Ok(Json(state.catalog.book(&lookup(&key)).await?))
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(form): Json<BookForm>,
) -> Result<Json<BookRecord>> {
    Ok(Json(state.catalog.update_book(&lookup(&key), form).await?))
}

pub async fn delete_book(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode> {
    state.catalog.delete_book(&lookup(&key)).await?;
    Ok(StatusCode::NO_CONTENT)
}
