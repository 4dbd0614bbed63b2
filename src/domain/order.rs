use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::customer::Customer;
use super::product::Product;

#[derive(Debug, Clone)]
pub struct OrderInput {
    pub customer_id: Uuid,
    pub product_ids: Vec<Uuid>,
    pub order_date: Option<DateTime<Utc>>,
}

/// Everything needed to persist an order once products have been resolved.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: Uuid,
    pub product_ids: Vec<Uuid>,
    pub order_date: DateTime<Utc>,
    pub total_amount: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub customer: Customer,
    pub products: Vec<Product>,
    pub order_date: DateTime<Utc>,
    pub total_amount: BigDecimal,
    pub created_at: DateTime<Utc>,
}

/// Sum of the product prices, captured when the order is placed.
pub fn order_total(products: &[Product]) -> BigDecimal {
    products
        .iter()
        .fold(BigDecimal::from(0), |acc, p| acc + &p.price)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn product(price: &str) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "item".to_string(),
            price: BigDecimal::from_str(price).unwrap(),
            stock: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn total_of_no_products_is_zero() {
        assert_eq!(order_total(&[]), BigDecimal::from(0));
    }

    #[test]
    fn total_sums_exact_decimals() {
        let total = order_total(&[product("999.99"), product("499.99")]);
        assert_eq!(total, BigDecimal::from_str("1499.98").unwrap());
    }

    #[test]
    fn total_does_not_accumulate_float_error() {
        let products: Vec<Product> = (0..10).map(|_| product("0.10")).collect();
        assert_eq!(order_total(&products), BigDecimal::from(1));
    }
}
