use thiserror::Error;

/// Failures produced by the CRM use cases.
///
/// The `Display` text of every variant except `Internal` is the message shown
/// to API callers.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Email already exists")]
    DuplicateEmail(String),
    #[error("Invalid phone format")]
    InvalidPhone,
    #[error("Invalid price '{0}'")]
    InvalidPrice(String),
    #[error("Price must be positive")]
    NonPositivePrice,
    #[error("Price cannot have more than 2 decimal places")]
    PriceTooPrecise,
    #[error("Price must be less than 100000000")]
    PriceTooLarge,
    #[error("Stock cannot be negative")]
    NegativeStock,
    #[error("Invalid customer ID")]
    CustomerNotFound,
    #[error("No valid products selected")]
    NoValidProducts,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn is_internal(&self) -> bool {
        matches!(self, DomainError::Internal(_))
    }

    /// Message safe to hand back to an API caller.
    pub fn public_message(&self) -> String {
        match self {
            DomainError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Per-entry message used by bulk customer creation.
    pub fn bulk_entry_message(&self, email: &str) -> String {
        match self {
            DomainError::DuplicateEmail(_) => format!("{email} already exists"),
            other => format!("{email}: {}", other.public_message()),
        }
    }
}
