use uuid::Uuid;

use super::customer::{BatchEntry, Customer, CustomerInput};
use super::errors::DomainError;
use super::order::{NewOrder, OrderView};
use super::product::{Product, ProductInput};
use super::query::{
    CustomerFilter, CustomerSort, OrderFilter, OrderSort, Page, PageRequest, ProductFilter,
    ProductSort,
};

/// Validation applied to each bulk entry after its email passed the uniqueness check.
pub type EntryCheck<'a> = &'a (dyn Fn(&CustomerInput) -> Result<(), DomainError> + Sync);

pub trait CustomerRepository: Send + Sync + 'static {
    fn email_exists(&self, email: &str) -> Result<bool, DomainError>;
    fn create(&self, input: CustomerInput) -> Result<Customer, DomainError>;
    /// Inserts the batch inside one transaction. Entries with a taken email
    /// (including one taken earlier in the same batch) or failing `check` are
    /// rejected; any persistence error rolls back the whole batch.
    ///
    /// Unlike [`create`](Self::create), which reports a concurrent insert of
    /// the same email as `DuplicateEmail`, a unique violation that slips in
    /// between the email check and the insert aborts the batch with
    /// `Internal`.
    fn create_batch(
        &self,
        inputs: Vec<CustomerInput>,
        check: EntryCheck<'_>,
    ) -> Result<Vec<BatchEntry>, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, DomainError>;
    /// Returns the customer with this email, creating it from `input` when absent.
    /// The flag is `true` when a row was inserted.
    fn get_or_create(&self, input: CustomerInput) -> Result<(Customer, bool), DomainError>;
    fn list(
        &self,
        filter: &CustomerFilter,
        sort: CustomerSort,
        page: PageRequest,
    ) -> Result<Page<Customer>, DomainError>;
}

pub trait ProductRepository: Send + Sync + 'static {
    fn create(&self, input: ProductInput) -> Result<Product, DomainError>;
    fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError>;
    /// Keyed by product name.
    fn get_or_create(&self, input: ProductInput) -> Result<(Product, bool), DomainError>;
    fn list(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        page: PageRequest,
    ) -> Result<Page<Product>, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Writes the order row and its product links in one transaction.
    fn create(&self, order: NewOrder) -> Result<OrderView, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    fn list(
        &self,
        filter: &OrderFilter,
        sort: OrderSort,
        page: PageRequest,
    ) -> Result<Page<OrderView>, DomainError>;
}
