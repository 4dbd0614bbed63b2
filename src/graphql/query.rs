use async_graphql::{Context, ErrorExtensions, Object, Result, ID};
use uuid::Uuid;

use super::inputs::{
    CustomerFilterInput, CustomerOrdering, OrderFilterInput, OrderOrdering, ProductFilterInput,
    ProductOrdering,
};
use super::run_blocking;
use super::types::{Connection, CustomerType, OrderType, ProductType};
use crate::domain::errors::DomainError;
use crate::domain::query::{
    CustomerFilter, CustomerSort, OrderFilter, OrderSort, PageRequest, ProductFilter, ProductSort,
};
use crate::errors::AppError;

fn graphql_error(e: DomainError) -> async_graphql::Error {
    AppError::from(e).extend()
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn hello(&self) -> &'static str {
        "Hello, GraphQL!"
    }

    /// Customers matching `filter`, newest first unless `orderBy` says otherwise.
    async fn all_customers(
        &self,
        ctx: &Context<'_>,
        filter: Option<CustomerFilterInput>,
        order_by: Option<CustomerOrdering>,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Connection<CustomerType>> {
        let filter = CustomerFilter::from(filter.unwrap_or_default());
        let sort: CustomerSort = order_by.map(Into::into).unwrap_or_default();
        let page = PageRequest::new(page, limit);

        let result = run_blocking(ctx, move |svc| svc.list_customers(&filter, sort, page))
            .await
            .map_err(graphql_error)?;
        Ok(result.into())
    }

    async fn all_products(
        &self,
        ctx: &Context<'_>,
        filter: Option<ProductFilterInput>,
        order_by: Option<ProductOrdering>,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Connection<ProductType>> {
        let filter = ProductFilter::try_from(filter.unwrap_or_default()).map_err(graphql_error)?;
        let sort: ProductSort = order_by.map(Into::into).unwrap_or_default();
        let page = PageRequest::new(page, limit);

        let result = run_blocking(ctx, move |svc| svc.list_products(&filter, sort, page))
            .await
            .map_err(graphql_error)?;
        Ok(result.into())
    }

    async fn all_orders(
        &self,
        ctx: &Context<'_>,
        filter: Option<OrderFilterInput>,
        order_by: Option<OrderOrdering>,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Connection<OrderType>> {
        let filter = OrderFilter::try_from(filter.unwrap_or_default()).map_err(graphql_error)?;
        let sort: OrderSort = order_by.map(Into::into).unwrap_or_default();
        let page = PageRequest::new(page, limit);

        let result = run_blocking(ctx, move |svc| svc.list_orders(&filter, sort, page))
            .await
            .map_err(graphql_error)?;
        Ok(result.into())
    }

    /// `null` when no order has this id.
    async fn order(&self, ctx: &Context<'_>, id: ID) -> Result<Option<OrderType>> {
        let Ok(id) = Uuid::parse_str(id.as_str()) else {
            return Ok(None);
        };
        let order = run_blocking(ctx, move |svc| svc.get_order(id))
            .await
            .map_err(graphql_error)?;
        Ok(order.map(OrderType::from))
    }
}
