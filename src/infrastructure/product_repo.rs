use diesel::pg::Pg;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{Product, ProductInput};
use crate::domain::query::{
    like_pattern, Page, PageRequest, ProductFilter, ProductSort, LOW_STOCK_THRESHOLD,
};
use crate::schema::products;

use super::models::{NewProductRow, ProductRow};

pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn insert(conn: &mut PgConnection, input: ProductInput) -> QueryResult<ProductRow> {
    diesel::insert_into(products::table)
        .values(&NewProductRow {
            id: Uuid::new_v4(),
            name: input.name,
            price: input.price,
            stock: input.stock,
        })
        .returning(ProductRow::as_returning())
        .get_result(conn)
}

fn filtered(filter: &ProductFilter) -> products::BoxedQuery<'static, Pg> {
    let mut query = products::table.into_boxed();
    if let Some(name) = &filter.name_icontains {
        query = query.filter(products::name.ilike(like_pattern(name)));
    }
    if let Some(min) = &filter.price_gte {
        query = query.filter(products::price.ge(min.clone()));
    }
    if let Some(max) = &filter.price_lte {
        query = query.filter(products::price.le(max.clone()));
    }
    if let Some(min) = filter.stock_gte {
        query = query.filter(products::stock.ge(min));
    }
    if let Some(max) = filter.stock_lte {
        query = query.filter(products::stock.le(max));
    }
    match filter.low_stock {
        Some(true) => query = query.filter(products::stock.lt(LOW_STOCK_THRESHOLD)),
        Some(false) => query = query.filter(products::stock.ge(LOW_STOCK_THRESHOLD)),
        None => {}
    }
    query
}

impl ProductRepository for DieselProductRepository {
    fn create(&self, input: ProductInput) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(insert(&mut conn, input)?.into())
    }

    fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = products::table
            .filter(products::id.eq_any(ids))
            .select(ProductRow::as_select())
            .order(products::name.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn get_or_create(&self, input: ProductInput) -> Result<(Product, bool), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let existing = products::table
                .filter(products::name.eq(&input.name))
                .select(ProductRow::as_select())
                .order(products::created_at.asc())
                .first(conn)
                .optional()?;
            match existing {
                Some(row) => Ok((row.into(), false)),
                None => Ok((insert(conn, input)?.into(), true)),
            }
        })
    }

    fn list(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        page: PageRequest,
    ) -> Result<Page<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = filtered(filter).count().get_result(conn)?;

            let query = filtered(filter);
            let query = match sort {
                ProductSort::NameAsc => query.order(products::name.asc()),
                ProductSort::NameDesc => query.order(products::name.desc()),
                ProductSort::PriceAsc => query.order(products::price.asc()),
                ProductSort::PriceDesc => query.order(products::price.desc()),
                ProductSort::StockAsc => query.order(products::stock.asc()),
                ProductSort::StockDesc => query.order(products::stock.desc()),
                ProductSort::CreatedAtAsc => query.order(products::created_at.asc()),
                ProductSort::CreatedAtDesc => query.order(products::created_at.desc()),
            };
            let rows = query
                .then_order_by(products::id.asc())
                .select(ProductRow::as_select())
                .limit(page.limit)
                .offset(page.offset())
                .load(conn)?;

            Ok(Page {
                items: rows.into_iter().map(Product::from).collect(),
                total,
                page: page.page,
                limit: page.limit,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::DieselProductRepository;
    use crate::domain::ports::ProductRepository;
    use crate::domain::product::ProductInput;
    use crate::domain::query::{PageRequest, ProductFilter, ProductSort};
    use crate::infrastructure::testing::setup_db;

    fn input(name: &str, price: &str, stock: i32) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            price: BigDecimal::from_str(price).expect("valid decimal"),
            stock,
        }
    }

    #[tokio::test]
    async fn create_keeps_exact_price() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);

        let product = repo.create(input("Laptop", "999.99", 10)).expect("create failed");

        let found = repo.find_by_ids(&[product.id]).expect("find failed");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].price, BigDecimal::from_str("999.99").unwrap());
        assert_eq!(found[0].stock, 10);
    }

    #[tokio::test]
    async fn get_or_create_is_keyed_by_name() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);

        let (first, created) = repo.get_or_create(input("Phone", "499.99", 20)).unwrap();
        assert!(created);
        let (second, created) = repo.get_or_create(input("Phone", "1.00", 1)).unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);
        assert_eq!(second.price, BigDecimal::from_str("499.99").unwrap());
    }

    #[tokio::test]
    async fn list_filters_by_price_range_and_low_stock() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);
        for (name, price, stock) in [
            ("Laptop", "999.99", 3),
            ("Phone", "499.99", 20),
            ("Keyboard", "79.99", 5),
        ] {
            repo.create(input(name, price, stock)).expect("create failed");
        }

        let mid = repo
            .list(
                &ProductFilter {
                    price_gte: Some(BigDecimal::from(100)),
                    price_lte: Some(BigDecimal::from(1000)),
                    ..Default::default()
                },
                ProductSort::PriceAsc,
                PageRequest::default(),
            )
            .unwrap();
        assert_eq!(mid.total, 2);
        assert_eq!(mid.items[0].name, "Phone");

        let low = repo
            .list(
                &ProductFilter {
                    low_stock: Some(true),
                    ..Default::default()
                },
                ProductSort::StockAsc,
                PageRequest::default(),
            )
            .unwrap();
        assert_eq!(low.total, 2);
        assert_eq!(low.items[0].name, "Laptop");
    }

    #[tokio::test]
    async fn prices_reach_postgres_only_when_the_column_can_hold_them() {
        let (_container, pool) = setup_db().await;
        let svc = crate::postgres_service(&pool);

        for (raw, expected) in [
            ("0.001", "Price cannot have more than 2 decimal places"),
            ("1.999", "Price cannot have more than 2 decimal places"),
            ("100000000", "Price must be less than 100000000"),
        ] {
            let err = svc.create_product(input("Odd", raw, 1)).unwrap_err();
            assert!(!err.is_internal(), "{raw} hit the database: {err}");
            assert_eq!(err.public_message(), expected);
        }

        let cable = svc.create_product(input("Cable", "9.9", 1)).expect("create failed");
        assert_eq!(cable.price.to_string(), "9.90");
        let top = svc
            .create_product(input("Top", "99999999.99", 1))
            .expect("largest price fits");
        assert_eq!(top.price.to_string(), "99999999.99");

        let stored = DieselProductRepository::new(pool)
            .find_by_ids(&[cable.id])
            .expect("find failed");
        assert_eq!(stored[0].price.to_string(), "9.90");
    }
}
