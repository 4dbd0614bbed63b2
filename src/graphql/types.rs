use async_graphql::{OutputType, SimpleObject, ID};
use chrono::{DateTime, Utc};

use crate::domain::customer::{BulkCreateOutcome, Customer};
use crate::domain::errors::DomainError;
use crate::domain::order::OrderView;
use crate::domain::product::Product;
use crate::domain::query::Page;

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Customer")]
pub struct CustomerType {
    pub id: ID,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Customer> for CustomerType {
    fn from(c: Customer) -> Self {
        Self {
            id: ID(c.id.to_string()),
            name: c.name,
            email: c.email,
            phone: c.phone,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Product")]
pub struct ProductType {
    pub id: ID,
    pub name: String,
    /// Decimal price as a string, e.g. "9.99".
    pub price: String,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductType {
    fn from(p: Product) -> Self {
        Self {
            id: ID(p.id.to_string()),
            name: p.name,
            price: p.price.to_string(),
            stock: p.stock,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Order")]
pub struct OrderType {
    pub id: ID,
    pub customer: CustomerType,
    pub products: Vec<ProductType>,
    pub order_date: DateTime<Utc>,
    /// Sum of the product prices when the order was placed.
    pub total_amount: String,
    pub created_at: DateTime<Utc>,
}

impl From<OrderView> for OrderType {
    fn from(o: OrderView) -> Self {
        Self {
            id: ID(o.id.to_string()),
            customer: o.customer.into(),
            products: o.products.into_iter().map(ProductType::from).collect(),
            order_date: o.order_date,
            total_amount: o.total_amount.to_string(),
            created_at: o.created_at,
        }
    }
}

// ── Collections ──────────────────────────────────────────────────────────────

#[derive(Debug, SimpleObject)]
#[graphql(
    concrete(name = "CustomerConnection", params(CustomerType)),
    concrete(name = "ProductConnection", params(ProductType)),
    concrete(name = "OrderConnection", params(OrderType))
)]
pub struct Connection<T: OutputType> {
    pub items: Vec<T>,
    /// Number of rows matching the filter, across all pages.
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl<S, T: OutputType + From<S>> From<Page<S>> for Connection<T> {
    fn from(page: Page<S>) -> Self {
        Self {
            items: page.items.into_iter().map(T::from).collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
        }
    }
}

// ── Mutation payloads ────────────────────────────────────────────────────────

/// Splits a use-case result into the `(entity, success, message)` triple every
/// single-entity payload carries.
fn payload_parts<S, T: From<S>>(
    result: Result<S, DomainError>,
    ok_message: &str,
) -> (Option<T>, bool, String) {
    match result {
        Ok(entity) => (Some(entity.into()), true, ok_message.to_string()),
        Err(e) => {
            if e.is_internal() {
                log::error!("mutation failed: {e}");
            } else {
                log::debug!("mutation rejected: {e}");
            }
            (None, false, e.public_message())
        }
    }
}

#[derive(Debug, SimpleObject)]
pub struct CreateCustomerPayload {
    pub customer: Option<CustomerType>,
    pub success: bool,
    pub message: String,
}

impl From<Result<Customer, DomainError>> for CreateCustomerPayload {
    fn from(result: Result<Customer, DomainError>) -> Self {
        let (customer, success, message) =
            payload_parts(result, "Customer created successfully");
        Self {
            customer,
            success,
            message,
        }
    }
}

#[derive(Debug, SimpleObject)]
pub struct BulkCreateCustomersPayload {
    pub created_customers: Vec<CustomerType>,
    pub errors: Vec<String>,
}

impl From<Result<BulkCreateOutcome, DomainError>> for BulkCreateCustomersPayload {
    fn from(result: Result<BulkCreateOutcome, DomainError>) -> Self {
        match result {
            Ok(outcome) => Self {
                created_customers: outcome.created.into_iter().map(CustomerType::from).collect(),
                errors: outcome.errors,
            },
            Err(e) => {
                log::error!("bulk customer creation rolled back: {e}");
                Self {
                    created_customers: vec![],
                    errors: vec![format!("Bulk insert rolled back: {}", e.public_message())],
                }
            }
        }
    }
}

#[derive(Debug, SimpleObject)]
pub struct CreateProductPayload {
    pub product: Option<ProductType>,
    pub success: bool,
    pub message: String,
}

impl From<Result<Product, DomainError>> for CreateProductPayload {
    fn from(result: Result<Product, DomainError>) -> Self {
        let (product, success, message) = payload_parts(result, "Product created successfully");
        Self {
            product,
            success,
            message,
        }
    }
}

#[derive(Debug, SimpleObject)]
pub struct CreateOrderPayload {
    pub order: Option<OrderType>,
    pub success: bool,
    pub message: String,
}

impl From<Result<OrderView, DomainError>> for CreateOrderPayload {
    fn from(result: Result<OrderView, DomainError>) -> Self {
        let (order, success, message) = payload_parts(result, "Order created successfully");
        Self {
            order,
            success,
            message,
        }
    }
}
