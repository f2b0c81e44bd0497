//! API handlers module

pub mod accounts;
pub mod articles;
pub mod authors;
pub mod books;
pub mod health;
pub mod home;
pub mod issues;
pub mod journals;
pub mod places;
pub mod posts;
pub mod search;

use axum::{http::StatusCode, Json};
use fuglelitt_common::catalog::Lookup;

/// 201 with the created resource
pub type Created<T> = (StatusCode, Json<T>);

pub fn created<T>(value: T) -> Created<T> {
    (StatusCode::CREATED, Json(value))
}

/// Resolve a `{key}` path segment
pub fn lookup(key: &str) -> Lookup {
    Lookup::parse(key)
}
