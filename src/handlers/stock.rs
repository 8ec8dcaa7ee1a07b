use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    database::Database,
    error::AppError,
    middleware::{is_allowed, Action, Resource},
    models::{MovementType, StockBalance, StockMovement},
};

use super::require_user;

#[derive(Deserialize)]
pub struct StockFilter {
    pub product_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct CreateMovement {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub reference_id: Option<Uuid>,
}

/// Reads the `stock_balances` view. Balances are recomputed from the
/// ledger on every call; there is no cached quantity to go stale.
pub async fn list_balances(
    cookies: Cookies,
    State(db): State<Database>,
    Query(filter): Query<StockFilter>,
) -> Result<Json<Vec<StockBalance>>, AppError> {
    require_user(&cookies, &db).await?;

    let balances = sqlx::query_as::<_, StockBalance>(
        r#"
        SELECT * FROM stock_balances
        WHERE ($1::uuid IS NULL OR product_id = $1)
          AND ($2::uuid IS NULL OR warehouse_id = $2)
        ORDER BY product_id, warehouse_id
        "#,
    )
    .bind(filter.product_id)
    .bind(filter.warehouse_id)
    .fetch_all(&db)
    .await?;

    Ok(Json(balances))
}

pub async fn list_movements(
    cookies: Cookies,
    State(db): State<Database>,
    Query(filter): Query<StockFilter>,
) -> Result<Json<Vec<StockMovement>>, AppError> {
    require_user(&cookies, &db).await?;

    let movements = sqlx::query_as::<_, StockMovement>(
        r#"
        SELECT * FROM stock_movements
        WHERE ($1::uuid IS NULL OR product_id = $1)
          AND ($2::uuid IS NULL OR warehouse_id = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(filter.product_id)
    .bind(filter.warehouse_id)
    .fetch_all(&db)
    .await?;

    Ok(Json(movements))
}

/// Appends one ledger entry. `balance_after` is a snapshot computed in the
/// insert statement itself (sum-so-far plus this quantity); the
/// `stock_balances` view, not the snapshot, is the source of truth.
pub async fn create_movement(
    cookies: Cookies,
    State(db): State<Database>,
    Json(req): Json<CreateMovement>,
) -> Result<(StatusCode, Json<StockMovement>), AppError> {
    let user = require_user(&cookies, &db).await?;

    if !is_allowed(&user, Action::Create, Resource::StockMovement) {
        return Err(AppError::Forbidden);
    }

    if req.quantity == 0 {
        return Err(AppError::Validation(
            "quantity must be non-zero".to_string(),
        ));
    }

    let movement = sqlx::query_as::<_, StockMovement>(
        r#"
        INSERT INTO stock_movements
            (product_id, warehouse_id, movement_type, reference_id, quantity, balance_after, created_by)
        VALUES ($1, $2, $3, $4, $5,
            COALESCE((SELECT SUM(quantity) FROM stock_movements
                      WHERE product_id = $1 AND warehouse_id = $2), 0)::INTEGER + $5,
            $6)
        RETURNING *
        "#,
    )
    .bind(req.product_id)
    .bind(req.warehouse_id)
    .bind(req.movement_type)
    .bind(req.reference_id)
    .bind(req.quantity)
    .bind(user.id)
    .fetch_one(&db)
    .await?;

    Ok((StatusCode::CREATED, Json(movement)))
}
