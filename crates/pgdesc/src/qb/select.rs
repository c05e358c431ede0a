//! SELECT descriptors.

use serde::Deserialize;

/// Column list of a descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Columns {
    /// `*`
    #[default]
    All,
    /// Explicit names, emitted verbatim.
    List(Vec<String>),
}

impl Columns {
    /// Render the column list: `*` or the names joined by `,`.
    pub fn to_sql(&self) -> String {
        match self {
            Columns::All => "*".to_string(),
            Columns::List(cols) => join_columns(cols),
        }
    }
}

impl From<&str> for Columns {
    fn from(value: &str) -> Self {
        if value.is_empty() || value == "*" {
            Columns::All
        } else {
            Columns::List(vec![value.to_string()])
        }
    }
}

impl From<Vec<String>> for Columns {
    fn from(value: Vec<String>) -> Self {
        Columns::List(value)
    }
}

impl From<Vec<&str>> for Columns {
    fn from(value: Vec<&str>) -> Self {
        Columns::List(value.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Columns {
    fn from(value: &[&str]) -> Self {
        Columns::List(value.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Columns {
    fn from(value: [&str; N]) -> Self {
        Columns::List(value.iter().map(|s| s.to_string()).collect())
    }
}

/// FROM list: a single table or several, comma-joined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tables {
    One(String),
    Many(Vec<String>),
}

impl Tables {
    /// Render the FROM list. A single table renders like a one-element list.
    pub fn to_sql(&self) -> String {
        match self {
            Tables::One(table) => table.clone(),
            Tables::Many(tables) => tables.join(","),
        }
    }
}

impl From<&str> for Tables {
    fn from(value: &str) -> Self {
        Tables::One(value.to_string())
    }
}

impl From<String> for Tables {
    fn from(value: String) -> Self {
        Tables::One(value)
    }
}

impl From<Vec<String>> for Tables {
    fn from(value: Vec<String>) -> Self {
        Tables::Many(value)
    }
}

impl From<Vec<&str>> for Tables {
    fn from(value: Vec<&str>) -> Self {
        Tables::Many(value.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Tables {
    fn from(value: [&str; N]) -> Self {
        Tables::Many(value.iter().map(|s| s.to_string()).collect())
    }
}

/// WHERE predicate text.
///
/// Parts are joined with a single space and nothing else: boolean connectors
/// (`AND`, `OR`) must be part of the parts themselves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    /// Inlined verbatim.
    Raw(String),
    /// Space-joined.
    Parts(Vec<String>),
}

impl Predicate {
    /// Render the clause including its leading `" WHERE "`.
    pub fn to_sql(&self) -> String {
        match self {
            Predicate::Raw(text) => format!(" WHERE {text}"),
            Predicate::Parts(parts) => format!(" WHERE {}", parts.join(" ")),
        }
    }
}

impl From<&str> for Predicate {
    fn from(value: &str) -> Self {
        Predicate::Raw(value.to_string())
    }
}

impl From<String> for Predicate {
    fn from(value: String) -> Self {
        Predicate::Raw(value)
    }
}

impl From<Vec<String>> for Predicate {
    fn from(value: Vec<String>) -> Self {
        Predicate::Parts(value)
    }
}

impl From<Vec<&str>> for Predicate {
    fn from(value: Vec<&str>) -> Self {
        Predicate::Parts(value.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Predicate {
    fn from(value: [&str; N]) -> Self {
        Predicate::Parts(value.iter().map(|s| s.to_string()).collect())
    }
}

/// A declarative SELECT.
///
/// Identifiers and predicate text are emitted without quoting or escaping. Never
/// build one from untrusted input.
///
/// # Example
/// ```ignore
/// let q = SelectQuery::from(["table1", "table2"])
///     .columns(["column1", "column2"])
///     .filter("table1.column1 = table2.column1");
/// assert_eq!(
///     q.to_sql(),
///     "SELECT column1,column2 FROM table1,table2 WHERE table1.column1 = table2.column1;"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub struct SelectQuery {
    pub columns: Columns,
    pub from: Tables,
    pub filter: Option<Predicate>,
}

impl SelectQuery {
    /// Start a `SELECT *` from the given table(s).
    pub fn from(tables: impl Into<Tables>) -> Self {
        Self {
            columns: Columns::All,
            from: tables.into(),
            filter: None,
        }
    }

    /// Set the column list.
    pub fn columns(mut self, columns: impl Into<Columns>) -> Self {
        self.columns = columns.into();
        self
    }

    /// Select every column.
    pub fn all_columns(mut self) -> Self {
        self.columns = Columns::All;
        self
    }

    /// Set the WHERE predicate.
    pub fn filter(mut self, predicate: impl Into<Predicate>) -> Self {
        self.filter = Some(predicate.into());
        self
    }

    /// Drop the WHERE predicate.
    pub fn no_filter(mut self) -> Self {
        self.filter = None;
        self
    }

    /// Render `SELECT <cols> FROM <tables><where>;`.
    pub fn to_sql(&self) -> String {
        let mut sql = String::from("SELECT ");
        sql.push_str(&self.columns.to_sql());
        sql.push_str(" FROM ");
        sql.push_str(&self.from.to_sql());
        if let Some(filter) = &self.filter {
            sql.push_str(&filter.to_sql());
        }
        sql.push(';');
        sql
    }
}

/// Comma-join without spacing, shared by SELECT and INSERT.
pub(crate) fn join_columns(cols: &[String]) -> String {
    cols.join(",")
}
