use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use tower_cookies::{Cookie, Cookies};

use crate::{
    database::Database,
    error::AppError,
    hooks,
    middleware::CurrentUser,
    models::{AppRole, Profile, User},
    utils::{create_token, hash_password, verify_password},
};

use super::require_user;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Creates an identity, its profile, and (for the very first identity) the
/// bootstrap admin role assignment, all in one transaction.
pub async fn register(
    State(db): State<Database>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Profile>), AppError> {
    if req.email.trim().is_empty() {
        return Err(AppError::Validation("email is required".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }

    let password_hash =
        hash_password(&req.password).map_err(|e| AppError::Internal(e.to_string()))?;

    let mut tx = db.begin().await?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING *",
    )
    .bind(req.email.trim())
    .bind(&password_hash)
    .fetch_one(&mut *tx)
    .await?;

    // Identity-created hook: a failure here rolls the identity back too.
    hooks::provision_profile(&mut tx, user.id, &user.email, req.full_name.as_deref()).await?;

    let user_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&mut *tx)
        .await?;
    if user_count == 1 {
        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
            .bind(user.id)
            .bind(AppRole::Admin)
            .execute(&mut *tx)
            .await?;
        log::info!("granted bootstrap admin role to {}", user.email);
    }

    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn login(
    State(db): State<Database>,
    cookies: Cookies,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Profile>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&req.email)
        .fetch_optional(&db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&req.password, &user.password_hash).unwrap_or(false) {
        return Err(AppError::Unauthorized);
    }

    let token = create_token(user.id, user.email.clone())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let cookie = Cookie::build(("auth_token", token))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::hours(24))
        .build();
    cookies.add(cookie);

    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(user.id)
        .fetch_one(&db)
        .await?;

    Ok(Json(profile))
}

pub async fn logout(cookies: Cookies) -> StatusCode {
    cookies.remove(Cookie::from("auth_token"));
    StatusCode::NO_CONTENT
}

pub async fn me(
    cookies: Cookies,
    State(db): State<Database>,
) -> Result<Json<CurrentUser>, AppError> {
    let user = require_user(&cookies, &db).await?;
    Ok(Json(user))
}
