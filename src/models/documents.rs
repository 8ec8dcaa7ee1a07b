use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Shared lifecycle for receipts and deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Draft,
    Waiting,
    Ready,
    Done,
    Canceled,
}

/// Inbound document: goods arriving from a supplier into a warehouse.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Receipt {
    pub id: Uuid,
    pub reference: String,
    pub warehouse_id: Uuid,
    pub supplier_name: String,
    pub status: DocumentStatus,
    pub scheduled_date: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ReceiptLine {
    pub id: Uuid,
    pub receipt_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub received_quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// Outbound document: goods leaving a warehouse for a customer.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Delivery {
    pub id: Uuid,
    pub reference: String,
    pub warehouse_id: Uuid,
    pub customer_name: String,
    pub status: DocumentStatus,
    pub scheduled_date: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct DeliveryLine {
    pub id: Uuid,
    pub delivery_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub delivered_quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_format_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&DocumentStatus::Draft).unwrap(),
            "\"draft\""
        );
        assert_eq!(
            serde_json::to_string(&DocumentStatus::Canceled).unwrap(),
            "\"canceled\""
        );
        let status: DocumentStatus = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(status, DocumentStatus::Done);
    }
}
