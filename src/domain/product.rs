use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

/// A product that passed validation and is ready to be stored.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
}
