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
    models::Product,
};

use super::require_user;

#[derive(Deserialize)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub active: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub sku: String,
    pub category_id: Option<Uuid>,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub reorder_level: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Deserialize)]
pub struct UpdateProduct {
    pub name: String,
    pub sku: String,
    pub category_id: Option<Uuid>,
    pub unit: String,
    pub reorder_level: i32,
    pub is_active: bool,
}

fn default_unit() -> String {
    "unit".to_string()
}

fn default_true() -> bool {
    true
}

pub async fn list_products(
    cookies: Cookies,
    State(db): State<Database>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>, AppError> {
    require_user(&cookies, &db).await?;

    let products = sqlx::query_as::<_, Product>(
        r#"
        SELECT * FROM products
        WHERE ($1::uuid IS NULL OR category_id = $1)
          AND ($2::boolean IS NULL OR is_active = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(filter.category_id)
    .bind(filter.active)
    .fetch_all(&db)
    .await?;

    Ok(Json(products))
}

pub async fn create_product(
    cookies: Cookies,
    State(db): State<Database>,
    Json(req): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let user = require_user(&cookies, &db).await?;

    if !is_allowed(&user, Action::Create, Resource::Product) {
        return Err(AppError::Forbidden);
    }

    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (name, sku, category_id, unit, reorder_level, is_active)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&req.name)
    .bind(&req.sku)
    .bind(req.category_id)
    .bind(&req.unit)
    .bind(req.reorder_level)
    .bind(req.is_active)
    .fetch_one(&db)
    .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    cookies: Cookies,
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProduct>,
) -> Result<Json<Product>, AppError> {
    let user = require_user(&cookies, &db).await?;

    if !is_allowed(&user, Action::Update, Resource::Product) {
        return Err(AppError::Forbidden);
    }

    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET name = $2, sku = $3, category_id = $4, unit = $5,
            reorder_level = $6, is_active = $7, updated_at = $8
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.sku)
    .bind(req.category_id)
    .bind(&req.unit)
    .bind(req.reorder_level)
    .bind(req.is_active)
    .bind(hooks::updated_at())
    .fetch_optional(&db)
    .await?
    .ok_or_else(|| AppError::NotFound("product not found".to_string()))?;

    Ok(Json(product))
}

/// Rejected with a constraint violation while any stock movement or
/// document line still references the product.
pub async fn delete_product(
    cookies: Cookies,
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let user = require_user(&cookies, &db).await?;

    if !is_allowed(&user, Action::Delete, Resource::Product) {
        return Err(AppError::Forbidden);
    }

    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("product not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
