//! `db` crate — pure persistence layer.
//!
//! Provides a connection pool, typed row structs, and ownership-scoped
//! repository functions for every table in the servicetrack schema.
//! No HTTP or token handling lives here.

pub mod error;
pub mod pool;
pub mod models;
pub mod repository;

pub use pool::DbPool;
pub use error::DbError;
