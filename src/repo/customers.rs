//! Customer repository. Emails are stored lowercased; together with the
//! `UNIQUE` constraint this makes uniqueness case-insensitive. Duplicates are
//! reported as a recoverable outcome, whether caught by the pre-check or by
//! the database itself.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::{
    ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, RunQueryDsl, SelectableHelper,
};

use crate::error::{AppError, Result};
use crate::models::{CreateCustomerEntity, CustomerEntity};
use crate::schema::{customers, orders};

fn duplicate_email() -> AppError {
    AppError::Duplicate("a customer with that email already exists".into())
}

pub fn list(conn: &mut PgConnection) -> Result<Vec<CustomerEntity>> {
    Ok(customers::table
        .order(customers::id.asc())
        .select(CustomerEntity::as_select())
        .load(conn)?)
}

pub fn find(conn: &mut PgConnection, id: i32) -> Result<Option<CustomerEntity>> {
    Ok(customers::table
        .find(id)
        .select(CustomerEntity::as_select())
        .first(conn)
        .optional()?)
}

pub fn exists(conn: &mut PgConnection, id: i32) -> Result<bool> {
    Ok(find(conn, id)?.is_some())
}

pub fn count(conn: &mut PgConnection) -> Result<i64> {
    Ok(customers::table.count().get_result(conn)?)
}

/// Is `email` already used by a customer other than `exclude_id`?
pub fn email_taken(conn: &mut PgConnection, email: &str, exclude_id: Option<i32>) -> Result<bool> {
    let email = email.trim().to_lowercase();
    let query = customers::table
        .filter(customers::email.eq(email))
        .select(customers::id)
        .into_boxed();
    let query = match exclude_id {
        Some(id) => query.filter(customers::id.ne(id)),
        None => query,
    };
    Ok(query.first::<i32>(conn).optional()?.is_some())
}

pub fn create(conn: &mut PgConnection, name: &str, email: &str) -> Result<CustomerEntity> {
    let email = email.trim().to_lowercase();
    if email_taken(conn, &email, None)? {
        return Err(duplicate_email());
    }

    let result = diesel::insert_into(customers::table)
        .values(CreateCustomerEntity {
            name: name.trim().to_string(),
            email,
        })
        .returning(CustomerEntity::as_returning())
        .get_result(conn);

    match result {
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            Err(duplicate_email())
        }
        other => Ok(other?),
    }
}

pub fn update(conn: &mut PgConnection, id: i32, name: &str, email: &str) -> Result<CustomerEntity> {
    let email = email.trim().to_lowercase();
    if email_taken(conn, &email, Some(id))? {
        return Err(duplicate_email());
    }

    let result = diesel::update(customers::table.find(id))
        .set((
            customers::name.eq(name.trim()),
            customers::email.eq(&email),
        ))
        .returning(CustomerEntity::as_returning())
        .get_result(conn);

    match result {
        Err(DieselError::NotFound) => Err(AppError::NotFound("customer")),
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            Err(duplicate_email())
        }
        other => Ok(other?),
    }
}

/// Delete a customer; orders and their lines go with it (`ON DELETE CASCADE`).
pub fn delete(conn: &mut PgConnection, id: i32) -> Result<()> {
    let rows = diesel::delete(customers::table.find(id)).execute(conn)?;
    if rows == 0 {
        return Err(AppError::NotFound("customer"));
    }
    Ok(())
}

/// How many orders reference this customer (used by the delete confirmation).
pub fn order_count(conn: &mut PgConnection, id: i32) -> Result<i64> {
    Ok(orders::table
        .filter(orders::customer_id.eq(id))
        .count()
        .get_result(conn)?)
}
