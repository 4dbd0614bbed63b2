//! Filter, ordering and pagination value types for the collection queries.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Products with fewer units than this count as low on stock.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Builds a request with `page` forced to at least 1 and `limit` clamped
    /// to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    pub name_icontains: Option<String>,
    pub email_icontains: Option<String>,
    pub created_at_gte: Option<DateTime<Utc>>,
    pub created_at_lte: Option<DateTime<Utc>>,
    /// Phone prefix, e.g. `+1`.
    pub phone_pattern: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub name_icontains: Option<String>,
    pub price_gte: Option<BigDecimal>,
    pub price_lte: Option<BigDecimal>,
    pub stock_gte: Option<i32>,
    pub stock_lte: Option<i32>,
    pub low_stock: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub total_amount_gte: Option<BigDecimal>,
    pub total_amount_lte: Option<BigDecimal>,
    pub order_date_gte: Option<DateTime<Utc>>,
    pub order_date_lte: Option<DateTime<Utc>>,
    pub customer_name_icontains: Option<String>,
    pub product_name_icontains: Option<String>,
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CustomerSort {
    NameAsc,
    NameDesc,
    EmailAsc,
    EmailDesc,
    CreatedAtAsc,
    #[default]
    CreatedAtDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    StockAsc,
    StockDesc,
    CreatedAtAsc,
    #[default]
    CreatedAtDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSort {
    OrderDateAsc,
    #[default]
    OrderDateDesc,
    TotalAmountAsc,
    TotalAmountDesc,
}

/// Case-insensitive substring match, the in-process counterpart of `ILIKE '%needle%'`.
pub fn icontains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Escapes `%`, `_` and `\` so user input is matched literally inside a LIKE pattern.
pub fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Like [`like_pattern`] but anchored at the start of the value.
pub fn prefix_pattern(prefix: &str) -> String {
    let mut pattern = like_pattern(prefix);
    pattern.remove(0);
    pattern
}
