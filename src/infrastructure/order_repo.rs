use std::collections::HashMap;

use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::customer::Customer;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, OrderView};
use crate::domain::ports::OrderRepository;
use crate::domain::product::Product;
use crate::domain::query::{like_pattern, OrderFilter, OrderSort, Page, PageRequest};
use crate::schema::{customers, order_products, orders, products};

use super::models::{CustomerRow, NewOrderRow, OrderProductRow, OrderRow, ProductRow};

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn filtered(filter: &OrderFilter) -> orders::BoxedQuery<'static, Pg> {
    let mut query = orders::table.into_boxed();
    if let Some(min) = &filter.total_amount_gte {
        query = query.filter(orders::total_amount.ge(min.clone()));
    }
    if let Some(max) = &filter.total_amount_lte {
        query = query.filter(orders::total_amount.le(max.clone()));
    }
    if let Some(from) = filter.order_date_gte {
        query = query.filter(orders::order_date.ge(from));
    }
    if let Some(to) = filter.order_date_lte {
        query = query.filter(orders::order_date.le(to));
    }
    if let Some(name) = &filter.customer_name_icontains {
        query = query.filter(
            orders::customer_id.eq_any(
                customers::table
                    .filter(customers::name.ilike(like_pattern(name)))
                    .select(customers::id),
            ),
        );
    }
    if let Some(name) = &filter.product_name_icontains {
        query = query.filter(
            orders::id.eq_any(
                order_products::table
                    .inner_join(products::table)
                    .filter(products::name.ilike(like_pattern(name)))
                    .select(order_products::order_id),
            ),
        );
    }
    if let Some(product_id) = filter.product_id {
        query = query.filter(
            orders::id.eq_any(
                order_products::table
                    .filter(order_products::product_id.eq(product_id))
                    .select(order_products::order_id),
            ),
        );
    }
    query
}

/// Attaches customers and products to the given order rows, keeping their order.
fn load_views(conn: &mut PgConnection, rows: Vec<OrderRow>) -> Result<Vec<OrderView>, DomainError> {
    if rows.is_empty() {
        return Ok(vec![]);
    }

    let order_ids: Vec<Uuid> = rows.iter().map(|o| o.id).collect();
    let links: Vec<(OrderProductRow, ProductRow)> = order_products::table
        .inner_join(products::table)
        .filter(order_products::order_id.eq_any(&order_ids))
        .select((OrderProductRow::as_select(), ProductRow::as_select()))
        .order(products::name.asc())
        .load(conn)?;
    let mut products_by_order: HashMap<Uuid, Vec<Product>> = HashMap::new();
    for (link, product) in links {
        products_by_order
            .entry(link.order_id)
            .or_default()
            .push(product.into());
    }

    let customer_ids: Vec<Uuid> = rows.iter().map(|o| o.customer_id).collect();
    let customers_by_id: HashMap<Uuid, Customer> = customers::table
        .filter(customers::id.eq_any(&customer_ids))
        .select(CustomerRow::as_select())
        .load(conn)?
        .into_iter()
        .map(|c| (c.id, Customer::from(c)))
        .collect();

    rows.into_iter()
        .map(|order| {
            let customer = customers_by_id
                .get(&order.customer_id)
                .cloned()
                .ok_or_else(|| {
                    DomainError::Internal(format!(
                        "customer {} of order {} is missing",
                        order.customer_id, order.id
                    ))
                })?;
            Ok(OrderView {
                id: order.id,
                customer,
                products: products_by_order.remove(&order.id).unwrap_or_default(),
                order_date: order.order_date,
                total_amount: order.total_amount,
                created_at: order.created_at,
            })
        })
        .collect()
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: NewOrder) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Insert the order
            let row = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: Uuid::new_v4(),
                    customer_id: order.customer_id,
                    order_date: order.order_date,
                    total_amount: order.total_amount,
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            // 2. Link the products
            let links: Vec<OrderProductRow> = order
                .product_ids
                .iter()
                .map(|product_id| OrderProductRow {
                    order_id: row.id,
                    product_id: *product_id,
                })
                .collect();
            diesel::insert_into(order_products::table)
                .values(&links)
                .execute(conn)?;

            let mut views = load_views(conn, vec![row])?;
            views
                .pop()
                .ok_or_else(|| DomainError::Internal("inserted order vanished".to_string()))
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        Ok(load_views(&mut conn, vec![order])?.pop())
    }

    fn list(
        &self,
        filter: &OrderFilter,
        sort: OrderSort,
        page: PageRequest,
    ) -> Result<Page<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = filtered(filter).count().get_result(conn)?;

            let query = filtered(filter);
            let query = match sort {
                OrderSort::OrderDateAsc => query.order(orders::order_date.asc()),
                OrderSort::OrderDateDesc => query.order(orders::order_date.desc()),
                OrderSort::TotalAmountAsc => query.order(orders::total_amount.asc()),
                OrderSort::TotalAmountDesc => query.order(orders::total_amount.desc()),
            };
            let rows = query
                .then_order_by(orders::id.asc())
                .select(OrderRow::as_select())
                .limit(page.limit)
                .offset(page.offset())
                .load(conn)?;

            Ok(Page {
                items: load_views(conn, rows)?,
                total,
                page: page.page,
                limit: page.limit,
            })
        })
    }
}
