pub mod customers;
pub mod dishes;
pub mod orders;
