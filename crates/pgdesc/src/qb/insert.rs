//! INSERT descriptors.

use crate::qb::param::{Param, ParamList};
use crate::qb::select::join_columns;
use serde::Deserialize;
use tokio_postgres::types::ToSql;

/// A declarative INSERT of one row.
///
/// Values are bound as `$1..$N`; the table and column names are emitted verbatim.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub struct InsertQuery {
    pub into: String,
    pub columns: Vec<String>,
    pub values: ParamList,
}

impl InsertQuery {
    /// Start an INSERT into `table` with no columns yet.
    pub fn new(table: &str) -> Self {
        Self {
            into: table.to_string(),
            columns: Vec::new(),
            values: ParamList::new(),
        }
    }

    /// Build from parallel column/value lists.
    ///
    /// The lists are not checked against each other; a length mismatch is left for the
    /// database to reject.
    pub fn with_columns<C, V>(table: &str, columns: C, values: V) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        V: Into<ParamList>,
    {
        Self {
            into: table.to_string(),
            columns: columns.into_iter().map(Into::into).collect(),
            values: values.into(),
        }
    }

    /// Append a column together with its value.
    pub fn value<T: ToSql + Send + Sync + 'static>(mut self, column: &str, value: T) -> Self {
        self.columns.push(column.to_string());
        self.values.push(value);
        self
    }

    /// Append a column together with a pre-wrapped value.
    pub fn param(mut self, column: &str, param: Param) -> Self {
        self.columns.push(column.to_string());
        self.values.push_param(param);
        self
    }

    /// Render `INSERT INTO <table> (<cols>) VALUES ($1,...,$N);`.
    pub fn to_sql(&self) -> String {
        format!(
            "INSERT INTO {} ({}) VALUES ({});",
            self.into,
            join_columns(&self.columns),
            placeholders(self.values.len())
        )
    }

    /// Bound values in placeholder order.
    pub fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values.as_refs()
    }
}

/// `$1,$2,...,$n`; empty for `n == 0`.
fn placeholders(n: usize) -> String {
    (1..=n)
        .map(|idx| format!("${idx}"))
        .collect::<Vec<_>>()
        .join(",")
}
