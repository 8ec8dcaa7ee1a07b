use axum::{extract::State, response::Json};
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::{
    database::Database,
    error::AppError,
    hooks,
    middleware::{is_allowed, Action, Resource},
    models::Profile,
};

use super::require_user;

#[derive(Deserialize)]
pub struct UpdateProfile {
    pub full_name: String,
}

pub async fn get_profile(
    cookies: Cookies,
    State(db): State<Database>,
) -> Result<Json<Profile>, AppError> {
    let user = require_user(&cookies, &db).await?;

    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(user.id)
        .fetch_one(&db)
        .await?;

    Ok(Json(profile))
}

pub async fn update_profile(
    cookies: Cookies,
    State(db): State<Database>,
    Json(req): Json<UpdateProfile>,
) -> Result<Json<Profile>, AppError> {
    let user = require_user(&cookies, &db).await?;

    if !is_allowed(&user, Action::Update, Resource::Profile { owner: user.id }) {
        return Err(AppError::Forbidden);
    }

    let profile = sqlx::query_as::<_, Profile>(
        "UPDATE profiles SET full_name = $2, updated_at = $3 WHERE id = $1 RETURNING *",
    )
    .bind(user.id)
    .bind(&req.full_name)
    .bind(hooks::updated_at())
    .fetch_one(&db)
    .await?;

    Ok(Json(profile))
}
