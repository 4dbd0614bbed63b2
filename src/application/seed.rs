//! Demo data for local development.
//!
//! Customers are keyed by email and products by name, so running the seed
//! again leaves existing rows untouched. A demo order is placed only for
//! customers created by the current run.

use std::str::FromStr;

use bigdecimal::BigDecimal;

use super::crm_service::CrmService;
use crate::domain::customer::CustomerInput;
use crate::domain::errors::DomainError;
use crate::domain::order::OrderInput;
use crate::domain::product::ProductInput;

const DEMO_CUSTOMERS: [(&str, &str, &str); 3] = [
    ("Alice", "alice@example.com", "+1234567890"),
    ("Bob", "bob@example.com", "123-456-7890"),
    ("Carol", "carol@example.com", "+1987654321"),
];

const DEMO_PRODUCTS: [(&str, &str, i32); 3] = [
    ("Laptop", "999.99", 10),
    ("Phone", "499.99", 20),
    ("Keyboard", "79.99", 50),
];

/// Number of seeded products placed in each demo order.
const PRODUCTS_PER_ORDER: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub customers: usize,
    pub customers_created: usize,
    pub products: usize,
    pub products_created: usize,
    pub orders_created: usize,
}

pub fn seed_database(service: &CrmService) -> Result<SeedReport, DomainError> {
    let mut report = SeedReport::default();

    let mut customers = Vec::with_capacity(DEMO_CUSTOMERS.len());
    for (name, email, phone) in DEMO_CUSTOMERS {
        let (customer, created) =
            service.get_or_create_customer(CustomerInput::new(name, email, Some(phone)))?;
        if created {
            report.customers_created += 1;
        }
        customers.push((customer, created));
    }
    report.customers = customers.len();
    log::info!(
        "seeded {} customers ({} new)",
        report.customers,
        report.customers_created
    );

    let mut products = Vec::with_capacity(DEMO_PRODUCTS.len());
    for (name, price, stock) in DEMO_PRODUCTS {
        let price = BigDecimal::from_str(price)
            .map_err(|e| DomainError::Internal(format!("bad seed price for {name}: {e}")))?;
        let (product, created) = service.get_or_create_product(ProductInput {
            name: name.to_string(),
            price,
            stock,
        })?;
        if created {
            report.products_created += 1;
        }
        products.push(product);
    }
    report.products = products.len();
    log::info!(
        "seeded {} products ({} new)",
        report.products,
        report.products_created
    );

    let order_products: Vec<_> = products
        .iter()
        .take(PRODUCTS_PER_ORDER)
        .map(|p| p.id)
        .collect();
    for (customer, created) in &customers {
        if !created {
            continue;
        }
        service.create_order(OrderInput {
            customer_id: customer.id,
            product_ids: order_products.clone(),
            order_date: None,
        })?;
        report.orders_created += 1;
    }
    log::info!("seeded {} orders", report.orders_created);

    Ok(report)
}
