//! Organizations, cities and counties

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use fuglelitt_common::{
    catalog::forms::{OrganizationForm, PlaceForm},
    db::models::{City, County, Organization},
    errors::Result,
};
use uuid::Uuid;

use super::{created, Created};
use crate::AppState;

pub async fn list_organizations(State(state): State<AppState>) -> Result<Json<Vec<Organization>>> {
    Ok(Json(state.catalog.organizations().await?))
}

pub async fn create_organization(
    State(state): State<AppState>,
    Json(form): Json<OrganizationForm>,
) -> Result<Created<Organization>> {
    Ok(created(state.catalog.create_organization(form).await?))
}

/// Authors and journals referencing the organization keep existing
pub async fn delete_organization(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.catalog.delete_organization(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_cities(State(state): State<AppState>) -> Result<Json<Vec<City>>> {
    Ok(Json(state.catalog.cities().await?))
}

pub async fn create_city(
    State(state): State<AppState>,
    Json(form): Json<PlaceForm>,
) -> Result<Created<City>> {
    Ok(created(state.catalog.create_city(form).await?))
}

pub async fn delete_city(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    state.catalog.delete_city(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_counties(State(state): State<AppState>) -> Result<Json<Vec<County>>> {
    Ok(Json(state.catalog.counties().await?))
}

pub async fn create_county(
    State(state): State<AppState>,
    Json(form): Json<PlaceForm>,
) -> Result<Created<County>> {
    Ok(created(state.catalog.create_county(form).await?))
}

pub async fn delete_county(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    state.catalog.delete_county(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
