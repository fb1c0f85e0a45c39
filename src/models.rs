use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::{
    Selectable,
    prelude::{Identifiable, Insertable, Queryable},
};

// Customers

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::customers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CustomerEntity {
    pub id: i32,
    pub name: String,
    pub email: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::customers)]
pub struct CreateCustomerEntity {
    pub name: String,
    pub email: String,
}

// Dishes

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::dishes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DishEntity {
    pub id: i32,
    pub name: String,
    pub price: BigDecimal,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::dishes)]
pub struct CreateDishEntity {
    pub name: String,
    pub price: BigDecimal,
}

// Orders

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderEntity {
    pub id: i32,
    pub customer_id: i32,
    pub placed_at: DateTime<Utc>,
    pub total: BigDecimal,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::orders)]
pub struct CreateOrderEntity {
    pub customer_id: i32,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::order_lines)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderLineEntity {
    pub id: i32,
    pub order_id: i32,
    pub dish_id: i32,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::order_lines)]
pub struct CreateOrderLineEntity {
    pub order_id: i32,
    pub dish_id: i32,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}
