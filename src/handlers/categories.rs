use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    database::Database,
    error::AppError,
    hooks,
    middleware::{is_allowed, Action, Resource},
    models::Category,
};

use super::require_user;

#[derive(Deserialize)]
pub struct CategoryPayload {
    pub name: String,
    pub description: Option<String>,
}

pub async fn list_categories(
    cookies: Cookies,
    State(db): State<Database>,
) -> Result<Json<Vec<Category>>, AppError> {
    require_user(&cookies, &db).await?;

    let categories =
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY created_at DESC")
            .fetch_all(&db)
            .await?;

    Ok(Json(categories))
}

pub async fn create_category(
    cookies: Cookies,
    State(db): State<Database>,
    Json(req): Json<CategoryPayload>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let user = require_user(&cookies, &db).await?;

    if !is_allowed(&user, Action::Create, Resource::Category) {
        return Err(AppError::Forbidden);
    }

    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING *",
    )
    .bind(&req.name)
    .bind(&req.description)
    .fetch_one(&db)
    .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    cookies: Cookies,
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(req): Json<CategoryPayload>,
) -> Result<Json<Category>, AppError> {
    let user = require_user(&cookies, &db).await?;

    if !is_allowed(&user, Action::Update, Resource::Category) {
        return Err(AppError::Forbidden);
    }

    let category = sqlx::query_as::<_, Category>(
        r#"
        UPDATE categories
        SET name = $2, description = $3, updated_at = $4
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.description)
    .bind(hooks::updated_at())
    .fetch_optional(&db)
    .await?
    .ok_or_else(|| AppError::NotFound("category not found".to_string()))?;

    Ok(Json(category))
}

/// Products referencing the category keep existing with a NULL category
/// (ON DELETE SET NULL); nothing cascades.
pub async fn delete_category(
    cookies: Cookies,
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let user = require_user(&cookies, &db).await?;

    if !is_allowed(&user, Action::Delete, Resource::Category) {
        return Err(AppError::Forbidden);
    }

    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("category not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
