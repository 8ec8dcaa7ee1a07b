use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "movement_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    Receipt,
    Delivery,
    Transfer,
    Adjustment,
}

/// One ledger entry. Rows are append-only: the application exposes no
/// update or delete path, so the sum over this table is always the true
/// on-hand quantity.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub movement_type: MovementType,
    pub reference_id: Option<Uuid>,
    pub quantity: i32,
    pub balance_after: i32,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Row of the `stock_balances` view: SUM(quantity) per (product, warehouse),
/// recomputed on every read.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct StockBalance {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub quantity: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_type_wire_format() {
        assert_eq!(
            serde_json::to_string(&MovementType::Receipt).unwrap(),
            "\"receipt\""
        );
        assert_eq!(
            serde_json::to_string(&MovementType::Adjustment).unwrap(),
            "\"adjustment\""
        );
        let mt: MovementType = serde_json::from_str("\"transfer\"").unwrap();
        assert_eq!(mt, MovementType::Transfer);
    }
}
