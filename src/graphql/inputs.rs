use async_graphql::{Enum, InputObject, ID};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::customer::CustomerInput;
use crate::domain::errors::DomainError;
use crate::domain::query::{
    CustomerFilter, CustomerSort, OrderFilter, OrderSort, ProductFilter, ProductSort,
};
use crate::domain::validation::parse_price;

#[derive(Debug, Clone, InputObject)]
#[graphql(name = "CustomerInput")]
pub struct CustomerInputObject {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<CustomerInputObject> for CustomerInput {
    fn from(input: CustomerInputObject) -> Self {
        CustomerInput {
            name: input.name,
            email: input.email,
            phone: input.phone,
        }
    }
}

fn parse_decimal(raw: Option<String>) -> Result<Option<BigDecimal>, DomainError> {
    raw.map(|value| parse_price(&value)).transpose()
}

fn parse_id(raw: Option<ID>) -> Result<Option<Uuid>, DomainError> {
    raw.map(|id| {
        Uuid::parse_str(id.as_str())
            .map_err(|_| DomainError::InvalidInput(format!("invalid id '{}'", id.as_str())))
    })
    .transpose()
}

#[derive(Debug, Clone, Default, InputObject)]
pub struct CustomerFilterInput {
    pub name_icontains: Option<String>,
    pub email_icontains: Option<String>,
    pub created_at_gte: Option<DateTime<Utc>>,
    pub created_at_lte: Option<DateTime<Utc>>,
    /// Phone prefix, e.g. "+1".
    pub phone_pattern: Option<String>,
}

impl From<CustomerFilterInput> for CustomerFilter {
    fn from(input: CustomerFilterInput) -> Self {
        CustomerFilter {
            name_icontains: input.name_icontains,
            email_icontains: input.email_icontains,
            created_at_gte: input.created_at_gte,
            created_at_lte: input.created_at_lte,
            phone_pattern: input.phone_pattern,
        }
    }
}

#[derive(Debug, Clone, Default, InputObject)]
pub struct ProductFilterInput {
    pub name_icontains: Option<String>,
    /// Decimal string.
    pub price_gte: Option<String>,
    /// Decimal string.
    pub price_lte: Option<String>,
    pub stock_gte: Option<i32>,
    pub stock_lte: Option<i32>,
    /// `true` keeps products with fewer than 10 units in stock.
    pub low_stock: Option<bool>,
}

impl TryFrom<ProductFilterInput> for ProductFilter {
    type Error = DomainError;

    fn try_from(input: ProductFilterInput) -> Result<Self, Self::Error> {
        Ok(ProductFilter {
            name_icontains: input.name_icontains,
            price_gte: parse_decimal(input.price_gte)?,
            price_lte: parse_decimal(input.price_lte)?,
            stock_gte: input.stock_gte,
            stock_lte: input.stock_lte,
            low_stock: input.low_stock,
        })
    }
}

#[derive(Debug, Clone, Default, InputObject)]
pub struct OrderFilterInput {
    /// Decimal string.
    pub total_amount_gte: Option<String>,
    /// Decimal string.
    pub total_amount_lte: Option<String>,
    pub order_date_gte: Option<DateTime<Utc>>,
    pub order_date_lte: Option<DateTime<Utc>>,
    pub customer_name_icontains: Option<String>,
    pub product_name_icontains: Option<String>,
    /// Orders containing this product.
    pub product_id: Option<ID>,
}

impl TryFrom<OrderFilterInput> for OrderFilter {
    type Error = DomainError;

    fn try_from(input: OrderFilterInput) -> Result<Self, Self::Error> {
        Ok(OrderFilter {
            total_amount_gte: parse_decimal(input.total_amount_gte)?,
            total_amount_lte: parse_decimal(input.total_amount_lte)?,
            order_date_gte: input.order_date_gte,
            order_date_lte: input.order_date_lte,
            customer_name_icontains: input.customer_name_icontains,
            product_name_icontains: input.product_name_icontains,
            product_id: parse_id(input.product_id)?,
        })
    }
}

// ── Ordering ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum CustomerOrdering {
    NameAsc,
    NameDesc,
    EmailAsc,
    EmailDesc,
    CreatedAtAsc,
    CreatedAtDesc,
}

impl From<CustomerOrdering> for CustomerSort {
    fn from(ordering: CustomerOrdering) -> Self {
        match ordering {
            CustomerOrdering::NameAsc => CustomerSort::NameAsc,
            CustomerOrdering::NameDesc => CustomerSort::NameDesc,
            CustomerOrdering::EmailAsc => CustomerSort::EmailAsc,
            CustomerOrdering::EmailDesc => CustomerSort::EmailDesc,
            CustomerOrdering::CreatedAtAsc => CustomerSort::CreatedAtAsc,
            CustomerOrdering::CreatedAtDesc => CustomerSort::CreatedAtDesc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum ProductOrdering {
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    StockAsc,
    StockDesc,
    CreatedAtAsc,
    CreatedAtDesc,
}

impl From<ProductOrdering> for ProductSort {
    fn from(ordering: ProductOrdering) -> Self {
        match ordering {
            ProductOrdering::NameAsc => ProductSort::NameAsc,
            ProductOrdering::NameDesc => ProductSort::NameDesc,
            ProductOrdering::PriceAsc => ProductSort::PriceAsc,
            ProductOrdering::PriceDesc => ProductSort::PriceDesc,
            ProductOrdering::StockAsc => ProductSort::StockAsc,
            ProductOrdering::StockDesc => ProductSort::StockDesc,
            ProductOrdering::CreatedAtAsc => ProductSort::CreatedAtAsc,
            ProductOrdering::CreatedAtDesc => ProductSort::CreatedAtDesc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum OrderOrdering {
    OrderDateAsc,
    OrderDateDesc,
    TotalAmountAsc,
    TotalAmountDesc,
}

impl From<OrderOrdering> for OrderSort {
    fn from(ordering: OrderOrdering) -> Self {
        match ordering {
            OrderOrdering::OrderDateAsc => OrderSort::OrderDateAsc,
            OrderOrdering::OrderDateDesc => OrderSort::OrderDateDesc,
            OrderOrdering::TotalAmountAsc => OrderSort::TotalAmountAsc,
            OrderOrdering::TotalAmountDesc => OrderSort::TotalAmountDesc,
        }
    }
}
