pub mod documents;
pub mod inventory;
pub mod stock;
pub mod user;

// Re-export only the types we actually use
pub use documents::{
    Delivery, DeliveryLine, DocumentStatus, Receipt, ReceiptLine,
};
pub use inventory::{Category, Product, Warehouse};
pub use stock::{MovementType, StockBalance, StockMovement};
pub use user::{AppRole, Profile, User, UserRole};
