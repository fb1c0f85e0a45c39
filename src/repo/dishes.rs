//! Dish repository. Name uniqueness is case-insensitive: the pre-check runs
//! through `lower()` on both sides, mirroring the `LOWER(name) = LOWER($1)`
//! comparison the schema cannot express with a plain `UNIQUE` constraint.

use bigdecimal::BigDecimal;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::{
    ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, RunQueryDsl, SelectableHelper,
};

use crate::error::{AppError, Result};
use crate::models::{CreateDishEntity, DishEntity};
use crate::schema::{dishes, order_lines};

diesel::define_sql_function! {
    fn lower(value: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

fn duplicate_name() -> AppError {
    AppError::Duplicate("a dish with that name already exists".into())
}

pub fn list(conn: &mut PgConnection) -> Result<Vec<DishEntity>> {
    Ok(dishes::table
        .order(dishes::id.asc())
        .select(DishEntity::as_select())
        .load(conn)?)
}

pub fn find(conn: &mut PgConnection, id: i32) -> Result<Option<DishEntity>> {
    Ok(dishes::table
        .find(id)
        .select(DishEntity::as_select())
        .first(conn)
        .optional()?)
}

pub fn exists(conn: &mut PgConnection, id: i32) -> Result<bool> {
    Ok(find(conn, id)?.is_some())
}

pub fn count(conn: &mut PgConnection) -> Result<i64> {
    Ok(dishes::table.count().get_result(conn)?)
}

/// The dish's current price, or `None` when the dish no longer exists.
pub fn current_price(conn: &mut PgConnection, id: i32) -> Result<Option<BigDecimal>> {
    Ok(dishes::table
        .find(id)
        .select(dishes::price)
        .first(conn)
        .optional()?)
}

/// Does another dish (excluding `exclude_id`) already use this name, ignoring case?
pub fn name_taken(conn: &mut PgConnection, name: &str, exclude_id: Option<i32>) -> Result<bool> {
    let needle = name.trim().to_lowercase();
    let query = dishes::table
        .filter(lower(dishes::name).eq(needle))
        .select(dishes::id)
        .into_boxed();
    let query = match exclude_id {
        Some(id) => query.filter(dishes::id.ne(id)),
        None => query,
    };
    Ok(query.first::<i32>(conn).optional()?.is_some())
}

pub fn create(conn: &mut PgConnection, name: &str, price: BigDecimal) -> Result<DishEntity> {
    if name_taken(conn, name, None)? {
        return Err(duplicate_name());
    }

    let result = diesel::insert_into(dishes::table)
        .values(CreateDishEntity {
            name: name.trim().to_string(),
            price,
        })
        .returning(DishEntity::as_returning())
        .get_result(conn);

    match result {
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            Err(duplicate_name())
        }
        other => Ok(other?),
    }
}

pub fn update(
    conn: &mut PgConnection,
    id: i32,
    name: &str,
    price: BigDecimal,
) -> Result<DishEntity> {
    if name_taken(conn, name, Some(id))? {
        return Err(duplicate_name());
    }

    let result = diesel::update(dishes::table.find(id))
        .set((dishes::name.eq(name.trim()), dishes::price.eq(price)))
        .returning(DishEntity::as_returning())
        .get_result(conn);

    match result {
        Err(DieselError::NotFound) => Err(AppError::NotFound("dish")),
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            Err(duplicate_name())
        }
        other => Ok(other?),
    }
}

/// Delete a dish; order lines referencing it go with it (`ON DELETE CASCADE`).
/// Stored order totals are left as charged at order time.
pub fn delete(conn: &mut PgConnection, id: i32) -> Result<()> {
    let rows = diesel::delete(dishes::table.find(id)).execute(conn)?;
    if rows == 0 {
        return Err(AppError::NotFound("dish"));
    }
    Ok(())
}

/// How many order lines reference this dish (used by the delete confirmation).
pub fn line_count(conn: &mut PgConnection, id: i32) -> Result<i64> {
    Ok(order_lines::table
        .filter(order_lines::dish_id.eq(id))
        .count()
        .get_result(conn)?)
}
