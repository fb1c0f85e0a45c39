//! Order workflow and order CRUD.
//!
//! Order creation is the one multi-step transaction in the system: header
//! insert, a loop of line inserts with price snapshots, then the recomputed
//! total written back onto the header. Lines come from a `LineSource` so the
//! transaction logic is independent of the interactive prompts; tests replay
//! scripted lines through the same code path.

use bigdecimal::BigDecimal;
use diesel::{
    Connection, ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, RunQueryDsl,
    SelectableHelper,
};
use tracing::warn;

use crate::error::{AppError, Result};
use crate::models::{
    CreateOrderEntity, CreateOrderLineEntity, DishEntity, OrderEntity, OrderLineEntity,
};
use crate::money;
use crate::repo::{customers, dishes};
use crate::schema::{order_lines, orders};

/// One requested line item: which dish, how many.
#[derive(Debug, Clone, Copy)]
pub struct LineRequest {
    pub dish_id: i32,
    pub quantity: i32,
}

/// Supplies line items one at a time. `Ok(None)` ends the order; an error
/// (typically `AppError::Cancelled`) aborts it with a full rollback. The
/// current dish listing is passed in so interactive sources can display it
/// with fresh prices.
pub trait LineSource {
    fn next_line(&mut self, menu: &[DishEntity]) -> Result<Option<LineRequest>>;
}

/// Create an order for `customer_id`, pulling lines from `source`.
///
/// Either the header and all its lines commit together with a correct total,
/// or nothing beyond the soft-abort cleanup persists: an order that ends up
/// with zero lines has its header deleted and that cleanup *committed*, then
/// surfaces as `AppError::EmptyOrder`. Every unit price is snapshotted from
/// the dish's current price inside the transaction.
pub fn create(
    conn: &mut PgConnection,
    customer_id: i32,
    source: &mut dyn LineSource,
) -> Result<OrderEntity> {
    if !customers::exists(conn, customer_id)? {
        return Err(AppError::NotFound("customer"));
    }

    let created = conn.transaction::<_, AppError, _>(|conn| {
        let order: OrderEntity = diesel::insert_into(orders::table)
            .values(CreateOrderEntity { customer_id })
            .returning(OrderEntity::as_returning())
            .get_result(conn)?;

        let mut total = BigDecimal::from(0);
        let mut lines_added = 0usize;

        loop {
            let menu = dishes::list(conn)?;
            let Some(request) = source.next_line(&menu)? else {
                break;
            };

            let Some(unit_price) = dishes::current_price(conn, request.dish_id)? else {
                warn!(dish_id = request.dish_id, "dish does not exist, skipping line");
                continue;
            };

            diesel::insert_into(order_lines::table)
                .values(CreateOrderLineEntity {
                    order_id: order.id,
                    dish_id: request.dish_id,
                    quantity: request.quantity,
                    unit_price: unit_price.clone(),
                })
                .execute(conn)?;

            total += unit_price * BigDecimal::from(request.quantity);
            lines_added += 1;
        }

        if lines_added == 0 {
            // Soft-abort: remove the empty header and let the transaction
            // commit the cleanup instead of rolling back.
            diesel::delete(orders::table.find(order.id)).execute(conn)?;
            return Ok(None);
        }

        let order = diesel::update(orders::table.find(order.id))
            .set(orders::total.eq(money::round2(&total)))
            .returning(OrderEntity::as_returning())
            .get_result(conn)?;

        Ok(Some(order))
    })?;

    created.ok_or(AppError::EmptyOrder)
}

pub fn find(conn: &mut PgConnection, id: i32) -> Result<Option<OrderEntity>> {
    Ok(orders::table
        .find(id)
        .select(OrderEntity::as_select())
        .first(conn)
        .optional()?)
}

pub fn exists(conn: &mut PgConnection, id: i32) -> Result<bool> {
    Ok(find(conn, id)?.is_some())
}

/// Delete an order and, via cascade, its lines.
pub fn delete(conn: &mut PgConnection, id: i32) -> Result<()> {
    let rows = diesel::delete(orders::table.find(id)).execute(conn)?;
    if rows == 0 {
        return Err(AppError::NotFound("order"));
    }
    Ok(())
}

/// The lines currently persisted for an order, in insertion order.
pub fn lines(conn: &mut PgConnection, order_id: i32) -> Result<Vec<OrderLineEntity>> {
    Ok(order_lines::table
        .filter(order_lines::order_id.eq(order_id))
        .order(order_lines::id.asc())
        .select(OrderLineEntity::as_select())
        .load(conn)?)
}
