//! Registration and profiles

use axum::{
    extract::{Path, State},
    Json,
};
use fuglelitt_common::{
    catalog::{
        forms::{ProfileForm, RegistrationForm},
        views::ProfileUpdate,
    },
    db::models::{Profile, User},
    errors::Result,
};
use serde::Serialize;
use uuid::Uuid;

use super::{created, Created};
use crate::AppState;

#[derive(Serialize)]
pub struct RegistrationResponse {
    pub user: User,
    pub profile: Profile,
}

/// Creates the user, then runs the profile hook
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegistrationForm>,
) -> Result<Created<RegistrationResponse>> {
    let (user, profile) = state.catalog.register_user(form).await?;
    Ok(created(RegistrationResponse { user, profile }))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Profile>> {
    Ok(Json(state.catalog.profile(user_id).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(form): Json<ProfileForm>,
) -> Result<Json<ProfileUpdate>> {
    Ok(Json(state.catalog.update_profile(user_id, form).await?))
}
