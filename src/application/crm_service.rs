use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::customer::{BatchEntry, BulkCreateOutcome, Customer, CustomerInput};
use crate::domain::errors::DomainError;
use crate::domain::order::{order_total, NewOrder, OrderInput, OrderView};
use crate::domain::ports::{CustomerRepository, OrderRepository, ProductRepository};
use crate::domain::product::{Product, ProductInput};
use crate::domain::query::{
    CustomerFilter, CustomerSort, OrderFilter, OrderSort, Page, PageRequest, ProductFilter,
    ProductSort,
};
use crate::domain::validation::{
    validate_customer_fields, validate_order_total, validate_phone, validate_product,
    validate_product_name, PRICE_SCALE,
};

/// Use cases behind the GraphQL API and the seeding command.
#[derive(Clone)]
pub struct CrmService {
    customers: Arc<dyn CustomerRepository>,
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl CrmService {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
    ) -> Self {
        Self {
            customers,
            products,
            orders,
        }
    }

    /// Wires all three ports to one store implementing them together.
    pub fn from_store<S>(store: S) -> Self
    where
        S: CustomerRepository + ProductRepository + OrderRepository + Clone,
    {
        Self::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
        )
    }

    pub fn create_customer(&self, input: CustomerInput) -> Result<Customer, DomainError> {
        let input = normalize_customer(input);
        if self.customers.email_exists(&input.email)? {
            log::debug!("rejecting customer {}: email already exists", input.email);
            return Err(DomainError::DuplicateEmail(input.email));
        }
        validate_customer_fields(&input)?;
        validate_phone(input.phone.as_deref())?;

        let customer = self.customers.create(input)?;
        log::info!("created customer {} <{}>", customer.id, customer.email);
        Ok(customer)
    }

    /// Creates every valid entry inside one transaction and records a message
    /// for each rejected one, in input order. A persistence failure aborts the
    /// whole batch and is returned as the error.
    pub fn bulk_create_customers(
        &self,
        inputs: Vec<CustomerInput>,
    ) -> Result<BulkCreateOutcome, DomainError> {
        let requested = inputs.len();
        let inputs = inputs.into_iter().map(normalize_customer).collect();
        let check = |input: &CustomerInput| {
            validate_customer_fields(input)?;
            validate_phone(input.phone.as_deref())
        };
        let entries = self.customers.create_batch(inputs, &check)?;

        let mut outcome = BulkCreateOutcome::default();
        for entry in entries {
            match entry {
                BatchEntry::Created(customer) => outcome.created.push(customer),
                BatchEntry::Rejected { email, reason } => {
                    outcome.errors.push(reason.bulk_entry_message(&email))
                }
            }
        }
        log::info!(
            "bulk customer creation: {} requested, {} created, {} rejected",
            requested,
            outcome.created.len(),
            outcome.errors.len()
        );
        Ok(outcome)
    }

    pub fn create_product(&self, input: ProductInput) -> Result<Product, DomainError> {
        validate_product(&input.price, input.stock)?;
        validate_product_name(&input.name)?;
        let product = self.products.create(normalize_product(input))?;
        log::info!("created product {} ({})", product.id, product.name);
        Ok(product)
    }

    /// Unknown product ids are dropped as long as at least one product matches.
    pub fn create_order(&self, input: OrderInput) -> Result<OrderView, DomainError> {
        let customer = self
            .customers
            .find_by_id(input.customer_id)?
            .ok_or(DomainError::CustomerNotFound)?;

        let mut seen = HashSet::new();
        let requested: Vec<Uuid> = input
            .product_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();
        if requested.is_empty() {
            return Err(DomainError::NoValidProducts);
        }

        let products = self.products.find_by_ids(&requested)?;
        if products.is_empty() {
            return Err(DomainError::NoValidProducts);
        }
        if products.len() < requested.len() {
            log::debug!(
                "order for customer {}: dropped {} unknown product id(s)",
                customer.id,
                requested.len() - products.len()
            );
        }

        let total_amount = order_total(&products);
        validate_order_total(&total_amount)?;

        let order = self.orders.create(NewOrder {
            customer_id: customer.id,
            product_ids: products.iter().map(|p| p.id).collect(),
            order_date: input.order_date.unwrap_or_else(Utc::now),
            total_amount,
        })?;
        log::info!(
            "created order {} for customer {} (total {})",
            order.id,
            customer.id,
            order.total_amount
        );
        Ok(order)
    }

    pub fn get_order(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        self.orders.find_by_id(id)
    }

    pub fn get_or_create_customer(
        &self,
        input: CustomerInput,
    ) -> Result<(Customer, bool), DomainError> {
        self.customers.get_or_create(normalize_customer(input))
    }

    pub fn get_or_create_product(
        &self,
        input: ProductInput,
    ) -> Result<(Product, bool), DomainError> {
        self.products.get_or_create(normalize_product(input))
    }

    pub fn list_customers(
        &self,
        filter: &CustomerFilter,
        sort: CustomerSort,
        page: PageRequest,
    ) -> Result<Page<Customer>, DomainError> {
        self.customers.list(filter, sort, page)
    }

    pub fn list_products(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        page: PageRequest,
    ) -> Result<Page<Product>, DomainError> {
        self.products.list(filter, sort, page)
    }

    pub fn list_orders(
        &self,
        filter: &OrderFilter,
        sort: OrderSort,
        page: PageRequest,
    ) -> Result<Page<OrderView>, DomainError> {
        self.orders.list(filter, sort, page)
    }
}

/// Prices carry the stored scale, so every backend returns "9.90" for "9.9".
fn normalize_product(mut input: ProductInput) -> ProductInput {
    input.price = input.price.with_scale(PRICE_SCALE);
    input
}

/// An empty phone is stored as no phone.
fn normalize_customer(mut input: CustomerInput) -> CustomerInput {
    input.phone = input.phone.filter(|p| !p.is_empty());
    input
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::TimeZone;

    use super::*;
    use crate::infrastructure::memory_store::InMemoryStore;

    fn service() -> CrmService {
        CrmService::from_store(InMemoryStore::new())
    }

    fn product_input(name: &str, price: &str, stock: i32) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            price: BigDecimal::from_str(price).unwrap(),
            stock,
        }
    }

    fn all_customers(svc: &CrmService) -> Vec<Customer> {
        svc.list_customers(
            &CustomerFilter::default(),
            CustomerSort::NameAsc,
            PageRequest::new(None, Some(100)),
        )
        .unwrap()
        .items
    }

    #[test]
    fn create_customer_persists_and_returns_entity() {
        let svc = service();
        let customer = svc
            .create_customer(CustomerInput::new("Alice", "alice@example.com", Some("+1234567890")))
            .unwrap();

        assert_eq!(customer.name, "Alice");
        assert_eq!(customer.phone.as_deref(), Some("+1234567890"));
        assert_eq!(all_customers(&svc), vec![customer]);
    }

    #[test]
    fn duplicate_email_is_rejected_without_new_row() {
        let svc = service();
        svc.create_customer(CustomerInput::new("Alice", "alice@example.com", None))
            .unwrap();

        let err = svc
            .create_customer(CustomerInput::new("Alice 2", "alice@example.com", None))
            .unwrap_err();

        assert!(matches!(err, DomainError::DuplicateEmail(_)));
        assert!(err.to_string().contains("already exists"));
        assert_eq!(all_customers(&svc).len(), 1);
    }

    #[test]
    fn invalid_phone_is_rejected() {
        let svc = service();
        let err = svc
            .create_customer(CustomerInput::new("Bob", "bob@example.com", Some("555")))
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidPhone));
        assert!(all_customers(&svc).is_empty());
    }

    #[test]
    fn duplicate_check_runs_before_phone_check() {
        let svc = service();
        svc.create_customer(CustomerInput::new("Bob", "bob@example.com", None))
            .unwrap();

        let err = svc
            .create_customer(CustomerInput::new("Bob", "bob@example.com", Some("bad")))
            .unwrap_err();

        assert!(matches!(err, DomainError::DuplicateEmail(_)));
    }

    #[test]
    fn empty_phone_is_stored_as_none() {
        let svc = service();
        let customer = svc
            .create_customer(CustomerInput::new("Carol", "carol@example.com", Some("")))
            .unwrap();
        assert_eq!(customer.phone, None);
    }

    #[test]
    fn bulk_create_skips_duplicates_and_records_errors() {
        let svc = service();
        svc.create_customer(CustomerInput::new("Existing", "dup@example.com", None))
            .unwrap();

        let outcome = svc
            .bulk_create_customers(vec![
                CustomerInput::new("A", "a@example.com", None),
                CustomerInput::new("Dup", "dup@example.com", None),
                CustomerInput::new("B", "b@example.com", Some("123-456-7890")),
                CustomerInput::new("A again", "a@example.com", None),
            ])
            .unwrap();

        assert_eq!(outcome.created.len(), 2);
        assert_eq!(
            outcome.errors,
            vec![
                "dup@example.com already exists".to_string(),
                "a@example.com already exists".to_string(),
            ]
        );
        assert_eq!(all_customers(&svc).len(), 3);
    }

    #[test]
    fn bulk_create_reports_invalid_phone_with_email_prefix() {
        let svc = service();
        let outcome = svc
            .bulk_create_customers(vec![
                CustomerInput::new("Bad", "bad@example.com", Some("12")),
                CustomerInput::new("Good", "good@example.com", Some("+1987654321")),
            ])
            .unwrap();

        assert_eq!(outcome.created.len(), 1);
        assert_eq!(outcome.created[0].email, "good@example.com");
        assert_eq!(outcome.errors, vec!["bad@example.com: Invalid phone format"]);
    }

    #[test]
    fn bulk_create_of_n_with_k_duplicates_creates_n_minus_k() {
        let svc = service();
        for i in 0..3 {
            svc.create_customer(CustomerInput::new("seed", format!("user{i}@example.com"), None))
                .unwrap();
        }

        let inputs: Vec<CustomerInput> = (0..8)
            .map(|i| CustomerInput::new("batch", format!("user{i}@example.com"), None))
            .collect();
        let outcome = svc.bulk_create_customers(inputs).unwrap();

        assert_eq!(outcome.created.len(), 5);
        assert_eq!(outcome.errors.len(), 3);
    }

    #[test]
    fn create_product_validates_price_then_stock() {
        let svc = service();

        let err = svc.create_product(product_input("Free", "0", 1)).unwrap_err();
        assert!(matches!(err, DomainError::NonPositivePrice));

        let err = svc.create_product(product_input("Oops", "5.00", -2)).unwrap_err();
        assert!(matches!(err, DomainError::NegativeStock));

        let product = svc.create_product(product_input("Mouse", "19.90", 0)).unwrap();
        assert_eq!(product.stock, 0);
        assert_eq!(product.price, BigDecimal::from_str("19.90").unwrap());
    }

    #[test]
    fn create_product_rejects_prices_the_column_cannot_hold() {
        let svc = service();

        let err = svc.create_product(product_input("Dust", "0.001", 1)).unwrap_err();
        assert!(matches!(err, DomainError::PriceTooPrecise));
        let err = svc.create_product(product_input("Gum", "1.999", 1)).unwrap_err();
        assert!(matches!(err, DomainError::PriceTooPrecise));
        let err = svc.create_product(product_input("Yacht", "1e8", 1)).unwrap_err();
        assert!(matches!(err, DomainError::PriceTooLarge));

        let products = svc
            .list_products(&ProductFilter::default(), ProductSort::default(), PageRequest::default())
            .unwrap();
        assert_eq!(products.total, 0);
    }

    #[test]
    fn create_product_stores_price_with_two_decimals() {
        let svc = service();
        let product = svc.create_product(product_input("Cable", "9.9", 1)).unwrap();
        assert_eq!(product.price.to_string(), "9.90");
    }

    #[test]
    fn create_product_rejects_overlong_name() {
        let svc = service();
        let name = "x".repeat(256);
        let err = svc.create_product(product_input(&name, "1.00", 1)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn create_customer_rejects_overlong_name() {
        let svc = service();
        let err = svc
            .create_customer(CustomerInput::new("x".repeat(256), "long@example.com", None))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(all_customers(&svc).is_empty());
    }

    #[test]
    fn bulk_create_skips_overlong_entries_and_keeps_the_rest() {
        let svc = service();
        let outcome = svc
            .bulk_create_customers(vec![
                CustomerInput::new("Ok", "ok@example.com", None),
                CustomerInput::new("x".repeat(256), "long@example.com", None),
                CustomerInput::new("Also ok", "also@example.com", None),
            ])
            .unwrap();

        assert_eq!(outcome.created.len(), 2);
        assert_eq!(
            outcome.errors,
            vec!["long@example.com: Invalid input: name must be at most 255 characters"]
        );
    }

    #[test]
    fn create_order_rejects_total_beyond_the_column() {
        let svc = service();
        let customer = svc
            .create_customer(CustomerInput::new("Alice", "alice@example.com", None))
            .unwrap();
        let ids: Vec<Uuid> = (0..101)
            .map(|i| {
                svc.create_product(product_input(&format!("Jet {i}"), "99999999.99", 1))
                    .unwrap()
                    .id
            })
            .collect();

        let err = svc
            .create_order(OrderInput {
                customer_id: customer.id,
                product_ids: ids,
                order_date: None,
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn create_order_sums_matched_product_prices() {
        let svc = service();
        let customer = svc
            .create_customer(CustomerInput::new("Alice", "alice@example.com", None))
            .unwrap();
        let laptop = svc.create_product(product_input("Laptop", "999.99", 10)).unwrap();
        let phone = svc.create_product(product_input("Phone", "499.99", 20)).unwrap();

        let order = svc
            .create_order(OrderInput {
                customer_id: customer.id,
                product_ids: vec![laptop.id, phone.id],
                order_date: None,
            })
            .unwrap();

        assert_eq!(order.total_amount, BigDecimal::from_str("1499.98").unwrap());
        assert_eq!(order.customer.id, customer.id);
        assert_eq!(order.products.len(), 2);
    }

    #[test]
    fn create_order_drops_unknown_and_repeated_product_ids() {
        let svc = service();
        let customer = svc
            .create_customer(CustomerInput::new("Alice", "alice@example.com", None))
            .unwrap();
        let keyboard = svc.create_product(product_input("Keyboard", "79.99", 50)).unwrap();

        let order = svc
            .create_order(OrderInput {
                customer_id: customer.id,
                product_ids: vec![keyboard.id, Uuid::new_v4(), keyboard.id],
                order_date: None,
            })
            .unwrap();

        assert_eq!(order.products.len(), 1);
        assert_eq!(order.total_amount, BigDecimal::from_str("79.99").unwrap());
    }

    #[test]
    fn create_order_keeps_explicit_order_date() {
        let svc = service();
        let customer = svc
            .create_customer(CustomerInput::new("Alice", "alice@example.com", None))
            .unwrap();
        let keyboard = svc.create_product(product_input("Keyboard", "79.99", 50)).unwrap();
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let order = svc
            .create_order(OrderInput {
                customer_id: customer.id,
                product_ids: vec![keyboard.id],
                order_date: Some(date),
            })
            .unwrap();

        assert_eq!(order.order_date, date);
    }

    #[test]
    fn create_order_for_unknown_customer_fails() {
        let svc = service();
        let keyboard = svc.create_product(product_input("Keyboard", "79.99", 50)).unwrap();

        let err = svc
            .create_order(OrderInput {
                customer_id: Uuid::new_v4(),
                product_ids: vec![keyboard.id],
                order_date: None,
            })
            .unwrap_err();

        assert!(matches!(err, DomainError::CustomerNotFound));
    }

    #[test]
    fn create_order_without_matching_products_fails() {
        let svc = service();
        let customer = svc
            .create_customer(CustomerInput::new("Alice", "alice@example.com", None))
            .unwrap();

        for product_ids in [vec![], vec![Uuid::new_v4()]] {
            let err = svc
                .create_order(OrderInput {
                    customer_id: customer.id,
                    product_ids,
                    order_date: None,
                })
                .unwrap_err();
            assert!(matches!(err, DomainError::NoValidProducts));
        }
    }

    #[test]
    fn order_total_is_a_snapshot() {
        let svc = service();
        let customer = svc
            .create_customer(CustomerInput::new("Alice", "alice@example.com", None))
            .unwrap();
        let phone = svc.create_product(product_input("Phone", "499.99", 20)).unwrap();
        let order = svc
            .create_order(OrderInput {
                customer_id: customer.id,
                product_ids: vec![phone.id],
                order_date: None,
            })
            .unwrap();

        let reloaded = svc.get_order(order.id).unwrap().expect("order exists");
        assert_eq!(reloaded.total_amount, order.total_amount);
        assert_eq!(reloaded.products[0].id, phone.id);
    }
}
