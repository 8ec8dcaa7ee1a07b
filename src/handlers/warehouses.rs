use axum::{
    extract::{Path, Query, State},
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
    models::Warehouse,
};

use super::require_user;

#[derive(Deserialize)]
pub struct WarehouseFilter {
    pub active: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateWarehouse {
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Deserialize)]
pub struct UpdateWarehouse {
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

pub async fn list_warehouses(
    cookies: Cookies,
    State(db): State<Database>,
    Query(filter): Query<WarehouseFilter>,
) -> Result<Json<Vec<Warehouse>>, AppError> {
    require_user(&cookies, &db).await?;

    let warehouses = sqlx::query_as::<_, Warehouse>(
        "SELECT * FROM warehouses WHERE ($1::boolean IS NULL OR is_active = $1) ORDER BY created_at DESC",
    )
    .bind(filter.active)
    .fetch_all(&db)
    .await?;

    Ok(Json(warehouses))
}

pub async fn create_warehouse(
    cookies: Cookies,
    State(db): State<Database>,
    Json(req): Json<CreateWarehouse>,
) -> Result<(StatusCode, Json<Warehouse>), AppError> {
    let user = require_user(&cookies, &db).await?;

    if !is_allowed(&user, Action::Create, Resource::Warehouse) {
        return Err(AppError::Forbidden);
    }

    let warehouse = sqlx::query_as::<_, Warehouse>(
        r#"
        INSERT INTO warehouses (name, code, address, is_active)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&req.name)
    .bind(&req.code)
    .bind(&req.address)
    .bind(req.is_active)
    .fetch_one(&db)
    .await?;

    Ok((StatusCode::CREATED, Json(warehouse)))
}

pub async fn update_warehouse(
    cookies: Cookies,
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateWarehouse>,
) -> Result<Json<Warehouse>, AppError> {
    let user = require_user(&cookies, &db).await?;

    if !is_allowed(&user, Action::Update, Resource::Warehouse) {
        return Err(AppError::Forbidden);
    }

    let warehouse = sqlx::query_as::<_, Warehouse>(
        r#"
        UPDATE warehouses
        SET name = $2, code = $3, address = $4, is_active = $5, updated_at = $6
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.code)
    .bind(&req.address)
    .bind(req.is_active)
    .bind(hooks::updated_at())
    .fetch_optional(&db)
    .await?
    .ok_or_else(|| AppError::NotFound("warehouse not found".to_string()))?;

    Ok(Json(warehouse))
}

/// Fails with a constraint violation if any movement or document still
/// references the warehouse.
pub async fn delete_warehouse(
    cookies: Cookies,
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let user = require_user(&cookies, &db).await?;

    if !is_allowed(&user, Action::Delete, Resource::Warehouse) {
        return Err(AppError::Forbidden);
    }

    let result = sqlx::query("DELETE FROM warehouses WHERE id = $1")
        .bind(id)
        .execute(&db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("warehouse not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
