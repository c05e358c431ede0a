//! # pgdesc
//!
//! Declarative SELECT / INSERT descriptors executed over a pooled PostgreSQL client.
//!
//! ## Features
//!
//! - **Descriptors, not strings**: describe columns, tables and predicates; get SQL text back
//! - **Bound values**: INSERT values always travel as `$n` parameters
//! - **Leased connections**: every call acquires a connection and releases it exactly once
//! - **Injected client**: the pool (or any [`ConnectionSource`]) is handed to a [`Db`]
//! - **Loose input**: descriptors deserialize from JSON objects of strings and arrays
//!
//! Identifiers, table names and predicate text are **not** escaped. Only pass trusted
//! strings there.
//!
//! ## Example
//!
//! ```ignore
//! use pgdesc::{Db, InsertQuery, SelectQuery};
//!
//! let db = Db::new(pgdesc::create_pool(&database_url)?);
//!
//! db.insert(
//!     &InsertQuery::new("users")
//!         .value("username", "alice")
//!         .value("email", "alice@example.com"),
//! )
//! .await?;
//!
//! let rows = db
//!     .select(
//!         &SelectQuery::from("users")
//!             .columns(["id", "username"])
//!             .filter("username = 'alice'"),
//!     )
//!     .await?
//!     .unwrap_or_default();
//! ```

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod qb;

pub use client::{Connection, ConnectionSource, Lease, RowOf};
pub use config::{PoolConfig, Recycling};
pub use db::Db;
pub use error::{BoxError, DbError, DbResult};
pub use qb::{
    Columns, InsertQuery, JsonParam, Param, ParamList, Predicate, SelectQuery, Tables,
    build_insert, build_select,
};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};
