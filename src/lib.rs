pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod menu;
pub mod models;
pub mod money;
pub mod prompt;
pub mod repo;
pub mod reports;
pub mod schema;
