use async_graphql::{Context, Object, ID};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::inputs::CustomerInputObject;
use super::run_blocking;
use super::types::{
    BulkCreateCustomersPayload, CreateCustomerPayload, CreateOrderPayload, CreateProductPayload,
};
use crate::domain::customer::CustomerInput;
use crate::domain::errors::DomainError;
use crate::domain::order::{OrderInput, OrderView};
use crate::domain::product::{Product, ProductInput};
use crate::domain::validation::parse_price;

/// Every mutation reports failure through its payload, never as a GraphQL error.
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_customer(
        &self,
        ctx: &Context<'_>,
        name: String,
        email: String,
        phone: Option<String>,
    ) -> CreateCustomerPayload {
        let input = CustomerInput { name, email, phone };
        run_blocking(ctx, move |svc| svc.create_customer(input))
            .await
            .into()
    }

    /// Valid entries are created in one transaction; rejected ones are listed in `errors`.
    async fn bulk_create_customers(
        &self,
        ctx: &Context<'_>,
        customers: Vec<CustomerInputObject>,
    ) -> BulkCreateCustomersPayload {
        let inputs: Vec<CustomerInput> = customers.into_iter().map(Into::into).collect();
        run_blocking(ctx, move |svc| svc.bulk_create_customers(inputs))
            .await
            .into()
    }

    async fn create_product(
        &self,
        ctx: &Context<'_>,
        name: String,
        #[graphql(desc = "Decimal price as a string, e.g. \"9.99\"")] price: String,
        #[graphql(default = 0)] stock: i32,
    ) -> CreateProductPayload {
        let price = match parse_price(&price) {
            Ok(price) => price,
            Err(e) => return Err::<Product, _>(e).into(),
        };
        let input = ProductInput { name, price, stock };
        run_blocking(ctx, move |svc| svc.create_product(input))
            .await
            .into()
    }

    /// Unknown or malformed product ids are ignored as long as one product matches.
    async fn create_order(
        &self,
        ctx: &Context<'_>,
        customer_id: ID,
        product_ids: Vec<ID>,
        order_date: Option<DateTime<Utc>>,
    ) -> CreateOrderPayload {
        let Ok(customer_id) = Uuid::parse_str(customer_id.as_str()) else {
            return Err::<OrderView, _>(DomainError::CustomerNotFound).into();
        };
        let product_ids = product_ids
            .iter()
            .filter_map(|id| Uuid::parse_str(id.as_str()).ok())
            .collect();
        let input = OrderInput {
            customer_id,
            product_ids,
            order_date,
        };
        run_blocking(ctx, move |svc| svc.create_order(input))
            .await
            .into()
    }
}
