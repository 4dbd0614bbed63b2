use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::customer::{BatchEntry, Customer, CustomerInput};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CustomerRepository, EntryCheck};
use crate::domain::query::{
    like_pattern, prefix_pattern, CustomerFilter, CustomerSort, Page, PageRequest,
};
use crate::schema::customers;

use super::models::{CustomerRow, NewCustomerRow};

pub struct DieselCustomerRepository {
    pool: DbPool,
}

impl DieselCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn email_taken(conn: &mut PgConnection, email: &str) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(
        customers::table.filter(customers::email.eq(email)),
    ))
    .get_result(conn)
}

fn insert(conn: &mut PgConnection, input: CustomerInput) -> QueryResult<CustomerRow> {
    diesel::insert_into(customers::table)
        .values(&NewCustomerRow {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            phone: input.phone,
        })
        .returning(CustomerRow::as_returning())
        .get_result(conn)
}

fn filtered(filter: &CustomerFilter) -> customers::BoxedQuery<'static, Pg> {
    let mut query = customers::table.into_boxed();
    if let Some(name) = &filter.name_icontains {
        query = query.filter(customers::name.ilike(like_pattern(name)));
    }
    if let Some(email) = &filter.email_icontains {
        query = query.filter(customers::email.ilike(like_pattern(email)));
    }
    if let Some(from) = filter.created_at_gte {
        query = query.filter(customers::created_at.ge(from));
    }
    if let Some(to) = filter.created_at_lte {
        query = query.filter(customers::created_at.le(to));
    }
    if let Some(prefix) = &filter.phone_pattern {
        query = query.filter(customers::phone.like(prefix_pattern(prefix)));
    }
    query
}

impl CustomerRepository for DieselCustomerRepository {
    fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(email_taken(&mut conn, email)?)
    }

    fn create(&self, input: CustomerInput) -> Result<Customer, DomainError> {
        let mut conn = self.pool.get()?;
        let email = input.email.clone();
        match insert(&mut conn, input) {
            Ok(row) => Ok(row.into()),
            // Lost a race against another insert of the same email.
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(DomainError::DuplicateEmail(email))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn create_batch(
        &self,
        inputs: Vec<CustomerInput>,
        check: EntryCheck<'_>,
    ) -> Result<Vec<BatchEntry>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let mut entries = Vec::with_capacity(inputs.len());
            for input in inputs {
                if email_taken(conn, &input.email)? {
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
                let row = insert(conn, input)?;
                entries.push(BatchEntry::Created(row.into()));
            }
            Ok(entries)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = customers::table
            .filter(customers::id.eq(id))
            .select(CustomerRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Customer::from))
    }

    fn get_or_create(&self, input: CustomerInput) -> Result<(Customer, bool), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let email = input.email.clone();
            let inserted = diesel::insert_into(customers::table)
                .values(&NewCustomerRow {
                    id: Uuid::new_v4(),
                    name: input.name,
                    email: input.email,
                    phone: input.phone,
                })
                .on_conflict(customers::email)
                .do_nothing()
                .returning(CustomerRow::as_returning())
                .get_result(conn)
                .optional()?;

            if let Some(row) = inserted {
                return Ok((row.into(), true));
            }
            let existing = customers::table
                .filter(customers::email.eq(email))
                .select(CustomerRow::as_select())
                .first(conn)?;
            Ok((existing.into(), false))
        })
    }

    fn list(
        &self,
        filter: &CustomerFilter,
        sort: CustomerSort,
        page: PageRequest,
    ) -> Result<Page<Customer>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = filtered(filter).count().get_result(conn)?;

            let query = filtered(filter);
            let query = match sort {
                CustomerSort::NameAsc => query.order(customers::name.asc()),
                CustomerSort::NameDesc => query.order(customers::name.desc()),
                CustomerSort::EmailAsc => query.order(customers::email.asc()),
                CustomerSort::EmailDesc => query.order(customers::email.desc()),
                CustomerSort::CreatedAtAsc => query.order(customers::created_at.asc()),
                CustomerSort::CreatedAtDesc => query.order(customers::created_at.desc()),
            };
            let rows = query
                .then_order_by(customers::id.asc())
                .select(CustomerRow::as_select())
                .limit(page.limit)
                .offset(page.offset())
                .load(conn)?;

            Ok(Page {
                items: rows.into_iter().map(Customer::from).collect(),
                total,
                page: page.page,
                limit: page.limit,
            })
        })
    }
}
