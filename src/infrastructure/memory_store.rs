//! Non-persistent store implementing every repository port.
//!
//! Test double for the unit and GraphQL API tests; the binaries always use
//! Postgres. Mirrors the Postgres behaviour that matters to callers: unique
//! emails, all-or-nothing batches and newest-first default ordering.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::customer::{BatchEntry, Customer, CustomerInput};
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, OrderView};
use crate::domain::ports::{CustomerRepository, EntryCheck, OrderRepository, ProductRepository};
use crate::domain::product::{Product, ProductInput};
use crate::domain::query::{
    icontains, CustomerFilter, CustomerSort, OrderFilter, OrderSort, Page, PageRequest,
    ProductFilter, ProductSort, LOW_STOCK_THRESHOLD,
};

#[derive(Debug, Clone)]
struct StoredOrder {
    id: Uuid,
    customer_id: Uuid,
    product_ids: Vec<Uuid>,
    order_date: DateTime<Utc>,
    total_amount: BigDecimal,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct State {
    customers: Vec<Customer>,
    products: Vec<Product>,
    orders: Vec<StoredOrder>,
}

impl State {
    fn email_taken(&self, email: &str) -> bool {
        self.customers.iter().any(|c| c.email == email)
    }

    fn insert_customer(&mut self, input: CustomerInput) -> Customer {
        let customer = Customer {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            created_at: Utc::now(),
        };
        self.customers.push(customer.clone());
        customer
    }

    fn insert_product(&mut self, input: ProductInput) -> Product {
        let product = Product {
            id: Uuid::new_v4(),
            name: input.name,
            price: input.price,
            stock: input.stock,
            created_at: Utc::now(),
        };
        self.products.push(product.clone());
        product
    }

    fn customer(&self, id: Uuid) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    fn view(&self, order: &StoredOrder) -> Result<OrderView, DomainError> {
        let customer = self.customer(order.customer_id).cloned().ok_or_else(|| {
            DomainError::Internal(format!(
                "customer {} of order {} is missing",
                order.customer_id, order.id
            ))
        })?;
        let mut products: Vec<Product> = self
            .products
            .iter()
            .filter(|p| order.product_ids.contains(&p.id))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(OrderView {
            id: order.id,
            customer,
            products,
            order_date: order.order_date,
            total_amount: order.total_amount.clone(),
            created_at: order.created_at,
        })
    }

    fn order_matches(&self, order: &StoredOrder, filter: &OrderFilter) -> bool {
        let products = || {
            self.products
                .iter()
                .filter(|p| order.product_ids.contains(&p.id))
        };
        filter
            .total_amount_gte
            .as_ref()
            .map_or(true, |min| order.total_amount >= *min)
            && filter
                .total_amount_lte
                .as_ref()
                .map_or(true, |max| order.total_amount <= *max)
            && filter.order_date_gte.map_or(true, |from| order.order_date >= from)
            && filter.order_date_lte.map_or(true, |to| order.order_date <= to)
            && filter.customer_name_icontains.as_ref().map_or(true, |name| {
                self.customer(order.customer_id)
                    .is_some_and(|c| icontains(&c.name, name))
            })
            && filter
                .product_name_icontains
                .as_ref()
                .map_or(true, |name| products().any(|p| icontains(&p.name, name)))
            && filter
                .product_id
                .map_or(true, |id| order.product_ids.contains(&id))
    }
}

fn customer_matches(customer: &Customer, filter: &CustomerFilter) -> bool {
    filter
        .name_icontains
        .as_ref()
        .map_or(true, |name| icontains(&customer.name, name))
        && filter
            .email_icontains
            .as_ref()
            .map_or(true, |email| icontains(&customer.email, email))
        && filter.created_at_gte.map_or(true, |from| customer.created_at >= from)
        && filter.created_at_lte.map_or(true, |to| customer.created_at <= to)
        && filter.phone_pattern.as_ref().map_or(true, |prefix| {
            customer
                .phone
                .as_deref()
                .is_some_and(|phone| phone.starts_with(prefix.as_str()))
        })
}

fn product_matches(product: &Product, filter: &ProductFilter) -> bool {
    filter
        .name_icontains
        .as_ref()
        .map_or(true, |name| icontains(&product.name, name))
        && filter
            .price_gte
            .as_ref()
            .map_or(true, |min| product.price >= *min)
        && filter
            .price_lte
            .as_ref()
            .map_or(true, |max| product.price <= *max)
        && filter.stock_gte.map_or(true, |min| product.stock >= min)
        && filter.stock_lte.map_or(true, |max| product.stock <= max)
        && filter
            .low_stock
            .map_or(true, |low| (product.stock < LOW_STOCK_THRESHOLD) == low)
}

fn paginate<T>(mut items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as i64;
    let start = usize::try_from(page.offset()).unwrap_or(usize::MAX).min(items.len());
    let end = start.saturating_add(page.limit as usize).min(items.len());
    let items = items.drain(start..end).collect();
    Page {
        items,
        total,
        page: page.page,
        limit: page.limit,
    }
}

fn directed(ordering: Ordering, descending: bool) -> Ordering {
    if descending {
        ordering.reverse()
    } else {
        ordering
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::Internal("in-memory store lock poisoned".to_string()))
    }
}

impl CustomerRepository for InMemoryStore {
    fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.lock()?.email_taken(email))
    }

    fn create(&self, input: CustomerInput) -> Result<Customer, DomainError> {
        let mut state = self.lock()?;
        if state.email_taken(&input.email) {
            return Err(DomainError::DuplicateEmail(input.email));
        }
        Ok(state.insert_customer(input))
    }

    fn create_batch(
        &self,
        inputs: Vec<CustomerInput>,
        check: EntryCheck<'_>,
    ) -> Result<Vec<BatchEntry>, DomainError> {
        let mut state = self.lock()?;
        // Work on a copy and swap it in at the end, like a committed transaction.
        let mut draft = state.clone();
        let mut entries = Vec::with_capacity(inputs.len());
        for input in inputs {
            if draft.email_taken(&input.email) {
                let email = input.email;
                entries.push(BatchEntry::Rejected {
                    reason: DomainError::DuplicateEmail(email.clone()),
                    email,
                });
                continue;
            }
            if let Err(reason) = check(&input) {
                entries.push(BatchEntry::Rejected {
                    email: input.email,
                    reason,
                });
                continue;
            }
            entries.push(BatchEntry::Created(draft.insert_customer(input)));
        }
        *state = draft;
        Ok(entries)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, DomainError> {
        Ok(self.lock()?.customer(id).cloned())
    }

    fn get_or_create(&self, input: CustomerInput) -> Result<(Customer, bool), DomainError> {
        let mut state = self.lock()?;
        if let Some(existing) = state.customers.iter().find(|c| c.email == input.email) {
            return Ok((existing.clone(), false));
        }
        Ok((state.insert_customer(input), true))
    }

    fn list(
        &self,
        filter: &CustomerFilter,
        sort: CustomerSort,
        page: PageRequest,
    ) -> Result<Page<Customer>, DomainError> {
        let state = self.lock()?;
        let mut items: Vec<Customer> = state
            .customers
            .iter()
            .filter(|c| customer_matches(c, filter))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            let ordering = match sort {
                CustomerSort::NameAsc | CustomerSort::NameDesc => a.name.cmp(&b.name),
                CustomerSort::EmailAsc | CustomerSort::EmailDesc => a.email.cmp(&b.email),
                CustomerSort::CreatedAtAsc | CustomerSort::CreatedAtDesc => {
                    a.created_at.cmp(&b.created_at)
                }
            };
            let descending = matches!(
                sort,
                CustomerSort::NameDesc | CustomerSort::EmailDesc | CustomerSort::CreatedAtDesc
            );
            directed(ordering, descending).then_with(|| a.id.cmp(&b.id))
        });
        Ok(paginate(items, page))
    }
}

impl ProductRepository for InMemoryStore {
    fn create(&self, input: ProductInput) -> Result<Product, DomainError> {
        Ok(self.lock()?.insert_product(input))
    }

    fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        let wanted: HashSet<&Uuid> = ids.iter().collect();
        let mut found: Vec<Product> = self
            .lock()?
            .products
            .iter()
            .filter(|p| wanted.contains(&p.id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    fn get_or_create(&self, input: ProductInput) -> Result<(Product, bool), DomainError> {
        let mut state = self.lock()?;
        if let Some(existing) = state.products.iter().find(|p| p.name == input.name) {
            return Ok((existing.clone(), false));
        }
        Ok((state.insert_product(input), true))
    }

    fn list(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        page: PageRequest,
    ) -> Result<Page<Product>, DomainError> {
        let state = self.lock()?;
        let mut items: Vec<Product> = state
            .products
            .iter()
            .filter(|p| product_matches(p, filter))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            let ordering = match sort {
                ProductSort::NameAsc | ProductSort::NameDesc => a.name.cmp(&b.name),
                ProductSort::PriceAsc | ProductSort::PriceDesc => a.price.cmp(&b.price),
                ProductSort::StockAsc | ProductSort::StockDesc => a.stock.cmp(&b.stock),
                ProductSort::CreatedAtAsc | ProductSort::CreatedAtDesc => {
                    a.created_at.cmp(&b.created_at)
                }
            };
            let descending = matches!(
                sort,
                ProductSort::NameDesc
                    | ProductSort::PriceDesc
                    | ProductSort::StockDesc
                    | ProductSort::CreatedAtDesc
            );
            directed(ordering, descending).then_with(|| a.id.cmp(&b.id))
        });
        Ok(paginate(items, page))
    }
}

impl OrderRepository for InMemoryStore {
    fn create(&self, order: NewOrder) -> Result<OrderView, DomainError> {
        let mut state = self.lock()?;
        if state.customer(order.customer_id).is_none() {
            return Err(DomainError::Internal(format!(
                "foreign key violation: customer {}",
                order.customer_id
            )));
        }
        if let Some(missing) = order
            .product_ids
            .iter()
            .find(|id| !state.products.iter().any(|p| p.id == **id))
        {
            return Err(DomainError::Internal(format!(
                "foreign key violation: product {missing}"
            )));
        }

        let stored = StoredOrder {
            id: Uuid::new_v4(),
            customer_id: order.customer_id,
            product_ids: order.product_ids,
            order_date: order.order_date,
            total_amount: order.total_amount,
            created_at: Utc::now(),
        };
        let view = state.view(&stored)?;
        state.orders.push(stored);
        Ok(view)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let state = self.lock()?;
        state
            .orders
            .iter()
            .find(|o| o.id == id)
            .map(|o| state.view(o))
            .transpose()
    }

    fn list(
        &self,
        filter: &OrderFilter,
        sort: OrderSort,
        page: PageRequest,
    ) -> Result<Page<OrderView>, DomainError> {
        let state = self.lock()?;
        let mut matching: Vec<&StoredOrder> = state
            .orders
            .iter()
            .filter(|o| state.order_matches(o, filter))
            .collect();
        matching.sort_by(|a, b| {
            let ordering = match sort {
                OrderSort::OrderDateAsc | OrderSort::OrderDateDesc => {
                    a.order_date.cmp(&b.order_date)
                }
                OrderSort::TotalAmountAsc | OrderSort::TotalAmountDesc => {
                    a.total_amount.cmp(&b.total_amount)
                }
            };
            let descending = matches!(sort, OrderSort::OrderDateDesc | OrderSort::TotalAmountDesc);
            directed(ordering, descending).then_with(|| a.id.cmp(&b.id))
        });

        let page = paginate(matching, page);
        Ok(Page {
            items: page
                .items
                .into_iter()
                .map(|o| state.view(o))
                .collect::<Result<_, _>>()?,
            total: page.total,
            page: page.page,
            limit: page.limit,
        })
    }
}
