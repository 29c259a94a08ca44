//! Database module: models, schema and Postgres storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: versioned SQL DDL applied at startup
//! - `postgres.rs`: pooled storage handle and queries

pub mod models;
pub mod postgres;
pub mod schema;

pub use models::{NewUser, RoleRecord, UserChanges, UserRecord};
pub use postgres::{PgPool, UserStorage};
pub use schema::MIGRATIONS;
