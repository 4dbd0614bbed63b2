//! GraphQL surface: schema wiring plus the query and mutation roots.

mod inputs;
mod mutation;
mod query;
mod types;

use actix_web::web;
use async_graphql::{Context, EmptySubscription, Schema};

use crate::application::crm_service::CrmService;
use crate::domain::errors::DomainError;

pub use inputs::{
    CustomerFilterInput, CustomerInputObject, CustomerOrdering, OrderFilterInput, OrderOrdering,
    ProductFilterInput, ProductOrdering,
};
pub use mutation::MutationRoot;
pub use query::QueryRoot;
pub use types::{
    BulkCreateCustomersPayload, Connection, CreateCustomerPayload, CreateOrderPayload,
    CreateProductPayload, CustomerType, OrderType, ProductType,
};

pub type CrmSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(service: CrmService) -> CrmSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(service)
        .finish()
}

/// Runs a use case on the blocking pool; diesel connections are synchronous.
async fn run_blocking<T, F>(ctx: &Context<'_>, f: F) -> Result<T, DomainError>
where
    F: FnOnce(&CrmService) -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    let service = ctx
        .data::<CrmService>()
        .map_err(|e| DomainError::Internal(e.message))?
        .clone();
    web::block(move || f(&service))
        .await
        .map_err(|e| DomainError::Internal(e.to_string()))?
}
