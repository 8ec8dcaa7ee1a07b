pub mod auth;
pub mod categories;
pub mod deliveries;
pub mod products;
pub mod profile;
pub mod receipts;
pub mod roles;
pub mod stock;
pub mod warehouses;

use axum::{extract::State, response::Json};
use serde::Serialize;
use tower_cookies::Cookies;

use crate::{
    database::Database,
    error::AppError,
    middleware::{get_current_user, CurrentUser},
};

/// Resolves the caller or fails the request: 401 when unauthenticated,
/// 500 when the lookup itself failed.
pub(crate) async fn require_user(
    cookies: &Cookies,
    db: &Database,
) -> Result<CurrentUser, AppError> {
    get_current_user(cookies, db)
        .await?
        .ok_or(AppError::Unauthorized)
}

#[derive(Serialize)]
pub struct DashboardSummary {
    pub product_count: i64,
    pub warehouse_count: i64,
    pub receipt_count: i64,
    pub delivery_count: i64,
    pub movement_count: i64,
}

pub async fn dashboard(
    cookies: Cookies,
    State(db): State<Database>,
) -> Result<Json<DashboardSummary>, AppError> {
    require_user(&cookies, &db).await?;

    let product_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
        .fetch_one(&db)
        .await?;
    let warehouse_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM warehouses")
        .fetch_one(&db)
        .await?;
    let receipt_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM receipts")
        .fetch_one(&db)
        .await?;
    let delivery_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM deliveries")
        .fetch_one(&db)
        .await?;
    let movement_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stock_movements")
        .fetch_one(&db)
        .await?;

    Ok(Json(DashboardSummary {
        product_count,
        warehouse_count,
        receipt_count,
        delivery_count,
        movement_count,
    }))
}
