use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by a caller when creating a customer.
#[derive(Debug, Clone)]
pub struct CustomerInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl CustomerInput {
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: Option<&str>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.map(str::to_string),
        }
    }
}

/// Result of one entry of an atomic bulk insert.
#[derive(Debug)]
pub enum BatchEntry {
    Created(Customer),
    Rejected {
        email: String,
        reason: super::errors::DomainError,
    },
}

#[derive(Debug, Default)]
pub struct BulkCreateOutcome {
    pub created: Vec<Customer>,
    pub errors: Vec<String>,
}
