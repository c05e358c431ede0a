//! SQL text from declarative descriptors.
//!
//! Two statement shapes are supported:
//!
//! - `SELECT <cols> FROM <tables>[ WHERE <predicate>];`
//! - `INSERT INTO <table> (<cols>) VALUES ($1,...,$N);`
//!
//! Values are always bound as parameters. Identifiers and predicate text are **not**
//! quoted or escaped and must come from trusted code.
//!
//! # Usage
//!
//! ```ignore
//! use pgdesc::qb::{self, InsertQuery, SelectQuery};
//!
//! let sql = qb::build_select(&SelectQuery::from("users").columns(["id", "name"]));
//! assert_eq!(sql, "SELECT id,name FROM users;");
//!
//! let sql = qb::build_insert(&InsertQuery::new("users").value("name", "alice"));
//! assert_eq!(sql, "INSERT INTO users (name) VALUES ($1);");
//! ```

mod insert;
mod json;
mod param;
mod select;

pub use insert::InsertQuery;
pub use json::JsonParam;
pub use param::{Param, ParamList};
pub use select::{Columns, Predicate, SelectQuery, Tables};

/// Render a SELECT descriptor.
pub fn build_select(query: &SelectQuery) -> String {
    query.to_sql()
}

/// Render an INSERT descriptor. Values are not part of the text.
pub fn build_insert(query: &InsertQuery) -> String {
    query.to_sql()
}
