//! Menu controller: routes user selections to repositories and reports.
//!
//! Every action is a thin prompt-to-repository wire. Recoverable errors
//! (cancellation, duplicates, not-found, database failures) are converted to
//! user-facing messages here so the session keeps running.

use diesel::PgConnection;
use tracing::error;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::DishEntity;
use crate::money;
use crate::prompt;
use crate::repo::orders::{LineRequest, LineSource};
use crate::repo::{customers, dishes, orders};
use crate::reports;

/// Main menu loop. Returns when the user exits.
pub fn run(db: &mut Database) -> Result<()> {
    loop {
        let Some(choice) = prompt::select(
            "Delicias Gourmet restaurant manager",
            vec![
                "Manage customers",
                "Manage dishes",
                "Manage orders",
                "Reports",
                "Exit",
            ],
        )?
        else {
            break;
        };
        if choice == "Exit" {
            break;
        }
        let result = match choice {
            "Manage customers" => customers_menu(db),
            "Manage dishes" => dishes_menu(db),
            "Manage orders" => orders_menu(db),
            "Reports" => reports_menu(db),
            _ => Ok(()),
        };
        report_outcome(result);
    }
    println!("Thanks for using Delicias Gourmet!");
    Ok(())
}

/// Turn a finished action into a user-facing message. Only `Ok` is silent.
fn report_outcome(result: Result<()>) {
    match result {
        Ok(()) => {}
        Err(AppError::Cancelled) => println!("Operation cancelled."),
        Err(AppError::EmptyOrder) => {
            println!("An order must contain at least one item. Order discarded.");
        }
        Err(AppError::NotFound(entity)) => println!("The {entity} does not exist."),
        Err(AppError::Duplicate(message)) => println!("Rejected: {message}."),
        Err(AppError::Database(err)) => {
            error!("database error: {err}");
            println!("Database error: {err}");
        }
        Err(err) => {
            error!("unexpected error: {err}");
            println!("Unexpected error: {err}");
        }
    }
}

// Customers

fn customers_menu(db: &mut Database) -> Result<()> {
    loop {
        let Some(choice) = prompt::select(
            "Customer management",
            vec![
                "Register customer",
                "View customers",
                "Edit customer",
                "Delete customer",
                "Back",
            ],
        )?
        else {
            return Ok(());
        };
        if choice == "Back" {
            return Ok(());
        }
        let conn = db.conn()?;
        let result = match choice {
            "Register customer" => register_customer(conn),
            "View customers" => view_customers(conn),
            "Edit customer" => edit_customer(conn),
            "Delete customer" => delete_customer(conn),
            _ => Ok(()),
        };
        report_outcome(result);
    }
}

fn register_customer(conn: &mut PgConnection) -> Result<()> {
    let Some(name) = prompt::read_non_empty("Customer name:")? else {
        return Ok(());
    };
    let Some(email) = prompt::read_email("Email address:")? else {
        return Ok(());
    };
    let customer = customers::create(conn, &name, &email)?;
    println!("Customer #{} registered.", customer.id);
    Ok(())
}

fn view_customers(conn: &mut PgConnection) -> Result<()> {
    let all = customers::list(conn)?;
    if all.is_empty() {
        println!("No customers registered.");
        return Ok(());
    }
    println!("===== CUSTOMERS =====");
    for customer in &all {
        println!(
            "ID: {} | Name: {} | Email: {}",
            customer.id, customer.name, customer.email
        );
    }
    Ok(())
}

fn edit_customer(conn: &mut PgConnection) -> Result<()> {
    let Some(id) = prompt::read_int("ID of the customer to edit:", 1)? else {
        return Ok(());
    };
    if !customers::exists(conn, id)? {
        println!("The customer does not exist.");
        return Ok(());
    }
    let Some(name) = prompt::read_non_empty("New name:")? else {
        return Ok(());
    };
    let Some(email) = prompt::read_email("New email address:")? else {
        return Ok(());
    };
    customers::update(conn, id, &name, &email)?;
    println!("Customer updated.");
    Ok(())
}

fn delete_customer(conn: &mut PgConnection) -> Result<()> {
    let Some(id) = prompt::read_int("ID of the customer to delete:", 1)? else {
        return Ok(());
    };
    if !customers::exists(conn, id)? {
        println!("The customer does not exist.");
        return Ok(());
    }
    if customers::order_count(conn, id)? > 0
        && !prompt::confirm("This customer has orders; they will be deleted too. Continue?")?
    {
        return Ok(());
    }
    customers::delete(conn, id)?;
    println!("Customer deleted.");
    Ok(())
}

// Dishes

fn dishes_menu(db: &mut Database) -> Result<()> {
    loop {
        let Some(choice) = prompt::select(
            "Dish management",
            vec![
                "Register dish",
                "View dishes",
                "Edit dish",
                "Delete dish",
                "Back",
            ],
        )?
        else {
            return Ok(());
        };
        if choice == "Back" {
            return Ok(());
        }
        let conn = db.conn()?;
        let result = match choice {
            "Register dish" => register_dish(conn),
            "View dishes" => view_dishes(conn),
            "Edit dish" => edit_dish(conn),
            "Delete dish" => delete_dish(conn),
            _ => Ok(()),
        };
        report_outcome(result);
    }
}

fn register_dish(conn: &mut PgConnection) -> Result<()> {
    let Some(name) = prompt::read_non_empty("Dish name:")? else {
        return Ok(());
    };
    if dishes::name_taken(conn, &name, None)? {
        println!("A dish with that name already exists.");
        return Ok(());
    }
    let Some(price) = prompt::read_money("Dish price:")? else {
        return Ok(());
    };
    let dish = dishes::create(conn, &name, price)?;
    println!("Dish #{} registered.", dish.id);
    Ok(())
}

fn view_dishes(conn: &mut PgConnection) -> Result<()> {
    let all = dishes::list(conn)?;
    if all.is_empty() {
        println!("No dishes registered.");
        return Ok(());
    }
    println!("===== DISHES =====");
    for dish in &all {
        println!(
            "ID: {} | {} | ${}",
            dish.id,
            dish.name,
            money::format_money(&dish.price)
        );
    }
    Ok(())
}

fn edit_dish(conn: &mut PgConnection) -> Result<()> {
    let Some(id) = prompt::read_int("ID of the dish to edit:", 1)? else {
        return Ok(());
    };
    if !dishes::exists(conn, id)? {
        println!("The dish does not exist.");
        return Ok(());
    }
    let Some(name) = prompt::read_non_empty("New name:")? else {
        return Ok(());
    };
    if dishes::name_taken(conn, &name, Some(id))? {
        println!("Another dish with that name already exists.");
        return Ok(());
    }
    let Some(price) = prompt::read_money("New price:")? else {
        return Ok(());
    };
    dishes::update(conn, id, &name, price)?;
    println!("Dish updated.");
    Ok(())
}

fn delete_dish(conn: &mut PgConnection) -> Result<()> {
    let Some(id) = prompt::read_int("ID of the dish to delete:", 1)? else {
        return Ok(());
    };
    if !dishes::exists(conn, id)? {
        println!("The dish does not exist.");
        return Ok(());
    }
    if dishes::line_count(conn, id)? > 0
        && !prompt::confirm("This dish appears in orders; it will be removed from them. Continue?")?
    {
        return Ok(());
    }
    dishes::delete(conn, id)?;
    println!("Dish deleted.");
    Ok(())
}

// Orders

fn orders_menu(db: &mut Database) -> Result<()> {
    loop {
        let Some(choice) = prompt::select(
            "Order management",
            vec![
                "Create order",
                "View orders",
                "View order detail",
                "Delete order",
                "Back",
            ],
        )?
        else {
            return Ok(());
        };
        if choice == "Back" {
            return Ok(());
        }
        let conn = db.conn()?;
        let result = match choice {
            "Create order" => create_order(conn),
            "View orders" => view_orders(conn),
            "View order detail" => view_order_detail(conn),
            "Delete order" => delete_order(conn),
            _ => Ok(()),
        };
        report_outcome(result);
    }
}

/// Interactive line picker used by order creation: shows the dish listing
/// (fresh prices each round), validates the selected id against it, and
/// treats a cancelled prompt as an abort of the whole order.
#[derive(Default)]
struct InteractiveLineSource {
    added: Vec<i32>,
}

impl LineSource for InteractiveLineSource {
    fn next_line(&mut self, menu: &[DishEntity]) -> Result<Option<LineRequest>> {
        loop {
            println!("Available dishes:");
            for dish in menu {
                println!(
                    "{}. {} - ${}",
                    dish.id,
                    dish.name,
                    money::format_money(&dish.price)
                );
            }
            if !self.added.is_empty() {
                println!("Added so far: {:?}", self.added);
            }
            let Some(dish_id) = prompt::read_int("Dish ID (0 to finish):", 0)? else {
                return Err(AppError::Cancelled);
            };
            if dish_id == 0 {
                return Ok(None);
            }
            if !menu.iter().any(|dish| dish.id == dish_id) {
                println!("The dish does not exist.");
                continue;
            }
            let Some(quantity) = prompt::read_int("Quantity:", 1)? else {
                return Err(AppError::Cancelled);
            };
            self.added.push(dish_id);
            return Ok(Some(LineRequest { dish_id, quantity }));
        }
    }
}

fn create_order(conn: &mut PgConnection) -> Result<()> {
    if customers::count(conn)? == 0 {
        println!("No customers yet. Register one first.");
        return Ok(());
    }
    if dishes::count(conn)? == 0 {
        println!("No dishes yet. Register one first.");
        return Ok(());
    }

    println!("Available customers:");
    for customer in &customers::list(conn)? {
        println!("{}. {}", customer.id, customer.name);
    }
    let Some(customer_id) = prompt::read_int("Customer ID:", 1)? else {
        return Ok(());
    };

    let mut source = InteractiveLineSource::default();
    let order = orders::create(conn, customer_id, &mut source)?;
    println!(
        "Order #{} created. Total: ${}",
        order.id,
        money::format_money(&order.total)
    );
    Ok(())
}

fn view_orders(conn: &mut PgConnection) -> Result<()> {
    let rows = reports::orders_by_date(conn)?;
    if rows.is_empty() {
        println!("No orders registered.");
        return Ok(());
    }
    println!("{}", reports::format_order_summaries("ORDERS", &rows));
    Ok(())
}

fn view_order_detail(conn: &mut PgConnection) -> Result<()> {
    let Some(order_id) = prompt::read_int("Order ID:", 1)? else {
        return Ok(());
    };
    let Some(detail) = reports::order_detail(conn, order_id)? else {
        println!("The order does not exist.");
        return Ok(());
    };
    println!("{}", reports::format_order_detail(&detail));
    Ok(())
}

fn delete_order(conn: &mut PgConnection) -> Result<()> {
    let Some(order_id) = prompt::read_int("ID of the order to delete:", 1)? else {
        return Ok(());
    };
    if !orders::exists(conn, order_id)? {
        println!("The order does not exist.");
        return Ok(());
    }
    if !prompt::confirm(&format!("Really delete order #{order_id}?"))? {
        return Ok(());
    }
    orders::delete(conn, order_id)?;
    println!("Order deleted.");
    Ok(())
}

// Reports

fn reports_menu(db: &mut Database) -> Result<()> {
    loop {
        let Some(choice) = prompt::select(
            "Reports",
            vec![
                "Totals per order",
                "Orders by customer",
                "Order count per customer",
                "Best-selling dishes",
                "Back",
            ],
        )?
        else {
            return Ok(());
        };
        if choice == "Back" {
            return Ok(());
        }
        let conn = db.conn()?;
        let result = match choice {
            "Totals per order" => report_order_totals(conn),
            "Orders by customer" => report_customer_history(conn),
            "Order count per customer" => report_orders_per_customer(conn),
            "Best-selling dishes" => report_dish_sales(conn),
            _ => Ok(()),
        };
        report_outcome(result);
    }
}

fn report_order_totals(conn: &mut PgConnection) -> Result<()> {
    let rows = reports::orders_by_total(conn)?;
    if rows.is_empty() {
        println!("No orders registered.");
        return Ok(());
    }
    println!(
        "{}",
        reports::format_order_summaries("REPORT: TOTAL PER ORDER", &rows)
    );
    Ok(())
}

fn report_customer_history(conn: &mut PgConnection) -> Result<()> {
    let all = customers::list(conn)?;
    if all.is_empty() {
        println!("No customers registered.");
        return Ok(());
    }
    println!("Available customers:");
    for customer in &all {
        println!("{}. {}", customer.id, customer.name);
    }
    let Some(customer_id) = prompt::read_int("Customer ID:", 1)? else {
        return Ok(());
    };
    let Some(customer) = customers::find(conn, customer_id)? else {
        println!("The customer does not exist.");
        return Ok(());
    };
    let rows = reports::customer_history(conn, customer_id)?;
    if rows.is_empty() {
        println!("This customer has no orders.");
        return Ok(());
    }
    println!("{}", reports::format_customer_history(&customer.name, &rows));
    Ok(())
}

fn report_orders_per_customer(conn: &mut PgConnection) -> Result<()> {
    let rows = reports::orders_per_customer(conn)?;
    if rows.is_empty() {
        println!("No orders registered.");
        return Ok(());
    }
    println!("{}", reports::format_orders_per_customer(&rows));
    Ok(())
}

fn report_dish_sales(conn: &mut PgConnection) -> Result<()> {
    let rows = reports::dish_sales(conn)?;
    if rows.is_empty() {
        println!("No sales registered.");
        return Ok(());
    }
    println!("{}", reports::format_dish_sales(&rows));
    Ok(())
}
