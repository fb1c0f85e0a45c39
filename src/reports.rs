//! Read-only reporting queries and their preformatted text rendering.
//!
//! Queries stay simple diesel joins/aggregations; ranking sorts (best-sellers,
//! busiest customers) happen in Rust after loading. Formatting is separated
//! from querying so it can be unit-tested without a database.

use std::fmt::Write;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::dsl::{count, sum};
use diesel::prelude::Queryable;
use diesel::{
    ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, RunQueryDsl, SelectableHelper,
};

use crate::error::Result;
use crate::models::OrderEntity;
use crate::money;
use crate::schema::{customers, dishes, order_lines, orders};

const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

// Order listings

#[derive(Queryable, Debug)]
pub struct OrderSummaryRow {
    pub id: i32,
    pub placed_at: DateTime<Utc>,
    pub customer: String,
    pub total: BigDecimal,
}

/// All orders with customer name and stored total, newest first.
pub fn orders_by_date(conn: &mut PgConnection) -> Result<Vec<OrderSummaryRow>> {
    Ok(orders::table
        .inner_join(customers::table)
        .select((orders::id, orders::placed_at, customers::name, orders::total))
        .order(orders::placed_at.desc())
        .load(conn)?)
}

/// All orders with customer name, largest total first.
pub fn orders_by_total(conn: &mut PgConnection) -> Result<Vec<OrderSummaryRow>> {
    Ok(orders::table
        .inner_join(customers::table)
        .select((orders::id, orders::placed_at, customers::name, orders::total))
        .order(orders::total.desc())
        .load(conn)?)
}

pub fn format_order_summaries(title: &str, rows: &[OrderSummaryRow]) -> String {
    let mut out = format!("===== {title} =====\n");
    for row in rows {
        let _ = writeln!(
            out,
            "Order #{} | Date: {} | Customer: {} | Total: ${}",
            row.id,
            row.placed_at.format(DATE_FORMAT),
            row.customer,
            money::format_money(&row.total),
        );
    }
    out
}

// Order detail

#[derive(Debug)]
pub struct OrderDetailLine {
    pub dish: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl OrderDetailLine {
    pub fn subtotal(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug)]
pub struct OrderDetail {
    pub order: OrderEntity,
    pub customer: String,
    pub lines: Vec<OrderDetailLine>,
}

/// Header, line items and stored total for one order, or `None` if it does
/// not exist.
pub fn order_detail(conn: &mut PgConnection, order_id: i32) -> Result<Option<OrderDetail>> {
    let header: Option<(OrderEntity, String)> = orders::table
        .inner_join(customers::table)
        .filter(orders::id.eq(order_id))
        .select((OrderEntity::as_select(), customers::name))
        .first(conn)
        .optional()?;
    let Some((order, customer)) = header else {
        return Ok(None);
    };

    let lines = order_lines::table
        .inner_join(dishes::table)
        .filter(order_lines::order_id.eq(order_id))
        .order(order_lines::id.asc())
        .select((dishes::name, order_lines::quantity, order_lines::unit_price))
        .load::<(String, i32, BigDecimal)>(conn)?
        .into_iter()
        .map(|(dish, quantity, unit_price)| OrderDetailLine {
            dish,
            quantity,
            unit_price,
        })
        .collect();

    Ok(Some(OrderDetail {
        order,
        customer,
        lines,
    }))
}

pub fn format_order_detail(detail: &OrderDetail) -> String {
    let mut out = format!("===== ORDER #{} DETAIL =====\n", detail.order.id);
    let _ = writeln!(out, "Date: {}", detail.order.placed_at.format(DATE_FORMAT));
    let _ = writeln!(out, "Customer: {}", detail.customer);
    out.push_str("\n--- ITEMS ---\n");
    for line in &detail.lines {
        let _ = writeln!(
            out,
            "{} - {} x ${} = ${}",
            line.dish,
            line.quantity,
            money::format_money(&line.unit_price),
            money::format_money(&line.subtotal()),
        );
    }
    let _ = write!(out, "\nTOTAL: ${}", money::format_money(&detail.order.total));
    out
}

// Per-customer history

#[derive(Queryable, Debug)]
pub struct CustomerHistoryRow {
    pub order_id: i32,
    pub placed_at: DateTime<Utc>,
    pub line_count: i64,
    pub total: BigDecimal,
}

/// One customer's orders with line counts and totals, newest first.
pub fn customer_history(
    conn: &mut PgConnection,
    customer_id: i32,
) -> Result<Vec<CustomerHistoryRow>> {
    let mut rows: Vec<CustomerHistoryRow> = orders::table
        .inner_join(order_lines::table)
        .filter(orders::customer_id.eq(customer_id))
        .group_by(orders::id)
        .select((
            orders::id,
            orders::placed_at,
            count(order_lines::id),
            orders::total,
        ))
        .load(conn)?;
    rows.sort_by(|a, b| b.placed_at.cmp(&a.placed_at).then(b.order_id.cmp(&a.order_id)));
    Ok(rows)
}

pub fn format_customer_history(customer: &str, rows: &[CustomerHistoryRow]) -> String {
    let mut out = format!("===== ORDERS FOR CUSTOMER: {customer} =====\n");
    for row in rows {
        let _ = writeln!(
            out,
            "Order #{} | Date: {} | Items: {} | Total: ${}",
            row.order_id,
            row.placed_at.format(DATE_FORMAT),
            row.line_count,
            money::format_money(&row.total),
        );
    }
    out
}

// Aggregates

#[derive(Debug, PartialEq, Eq)]
pub struct CustomerOrderCountRow {
    pub customer: String,
    pub orders: i64,
}

/// Number of orders per customer, busiest first.
pub fn orders_per_customer(conn: &mut PgConnection) -> Result<Vec<CustomerOrderCountRow>> {
    let mut rows: Vec<CustomerOrderCountRow> = customers::table
        .inner_join(orders::table)
        .group_by(customers::id)
        .select((customers::name, count(orders::id)))
        .load::<(String, i64)>(conn)?
        .into_iter()
        .map(|(customer, orders)| CustomerOrderCountRow { customer, orders })
        .collect();
    rows.sort_by(|a, b| b.orders.cmp(&a.orders).then_with(|| a.customer.cmp(&b.customer)));
    Ok(rows)
}

pub fn format_orders_per_customer(rows: &[CustomerOrderCountRow]) -> String {
    let mut out = String::from("===== ORDERS PER CUSTOMER =====\n");
    for row in rows {
        let _ = writeln!(out, "{} | Orders: {}", row.customer, row.orders);
    }
    out
}

#[derive(Debug, PartialEq, Eq)]
pub struct DishSalesRow {
    pub dish: String,
    pub quantity_sold: i64,
}

/// Total quantities sold per dish, best-seller first.
pub fn dish_sales(conn: &mut PgConnection) -> Result<Vec<DishSalesRow>> {
    let mut rows: Vec<DishSalesRow> = dishes::table
        .inner_join(order_lines::table)
        .group_by(dishes::id)
        .select((dishes::name, sum(order_lines::quantity)))
        .load::<(String, Option<i64>)>(conn)?
        .into_iter()
        .map(|(dish, sold)| DishSalesRow {
            dish,
            quantity_sold: sold.unwrap_or(0),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.quantity_sold
            .cmp(&a.quantity_sold)
            .then_with(|| a.dish.cmp(&b.dish))
    });
    Ok(rows)
}

pub fn format_dish_sales(rows: &[DishSalesRow]) -> String {
    let mut out = String::from("===== BEST-SELLING DISHES =====\n");
    for row in rows {
        let _ = writeln!(out, "{} | Sold: {}", row.dish, row.quantity_sold);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn placed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 20, 13, 5, 0).unwrap()
    }

    #[test]
    fn renders_order_summaries() {
        let rows = vec![OrderSummaryRow {
            id: 7,
            placed_at: placed_at(),
            customer: "Ana".into(),
            total: dec("120"),
        }];
        let text = format_order_summaries("REPORT: TOTAL PER ORDER", &rows);
        assert!(text.starts_with("===== REPORT: TOTAL PER ORDER =====\n"));
        assert!(text.contains("Order #7 | Date: 20/08/2025 13:05 | Customer: Ana | Total: $120.00"));
    }

    #[test]
    fn renders_order_detail_with_subtotals() {
        let detail = OrderDetail {
            order: OrderEntity {
                id: 3,
                customer_id: 1,
                placed_at: placed_at(),
                total: dec("120.00"),
            },
            customer: "Ana".into(),
            lines: vec![
                OrderDetailLine {
                    dish: "Tacos".into(),
                    quantity: 2,
                    unit_price: dec("50.00"),
                },
                OrderDetailLine {
                    dish: "Agua".into(),
                    quantity: 1,
                    unit_price: dec("20.00"),
                },
            ],
        };
        let text = format_order_detail(&detail);
        assert!(text.contains("Tacos - 2 x $50.00 = $100.00"));
        assert!(text.contains("Agua - 1 x $20.00 = $20.00"));
        assert!(text.ends_with("TOTAL: $120.00"));
    }

    #[test]
    fn renders_customer_history() {
        let rows = vec![CustomerHistoryRow {
            order_id: 9,
            placed_at: placed_at(),
            line_count: 2,
            total: dec("75.50"),
        }];
        let text = format_customer_history("Ana", &rows);
        assert!(text.contains("ORDERS FOR CUSTOMER: Ana"));
        assert!(text.contains("Order #9 | Date: 20/08/2025 13:05 | Items: 2 | Total: $75.50"));
    }

    #[test]
    fn renders_aggregates() {
        let per_customer = vec![CustomerOrderCountRow {
            customer: "Ana".into(),
            orders: 4,
        }];
        assert!(format_orders_per_customer(&per_customer).contains("Ana | Orders: 4"));

        let sales = vec![DishSalesRow {
            dish: "Tacos".into(),
            quantity_sold: 12,
        }];
        assert!(format_dish_sales(&sales).contains("Tacos | Sold: 12"));
    }
}
