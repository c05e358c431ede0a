//! Bound values for INSERT descriptors.

use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// A clone-friendly bound value.
///
/// Values never reach the SQL text; they travel next to it and are handed to the
/// driver as positional parameters.
#[derive(Clone)]
pub struct Param(Arc<dyn ToSql + Send + Sync>);

impl Param {
    /// Wrap any `ToSql` value.
    pub fn new<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Param(Arc::new(value))
    }

    /// Borrow the value in the shape tokio-postgres expects.
    pub fn as_sql(&self) -> &(dyn ToSql + Sync) {
        &*self.0 as &(dyn ToSql + Sync)
    }
}

impl std::fmt::Debug for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // ToSql: Debug, so the bound value itself is printable.
        f.debug_tuple("Param").field(&self.0).finish()
    }
}

/// Ordered bound values. Position `i` (0-based) binds to placeholder `$i+1`.
#[derive(Clone, Debug, Default)]
pub struct ParamList {
    params: Vec<Param>,
}

impl ParamList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a value and return its 1-based placeholder index.
    pub fn push<T: ToSql + Send + Sync + 'static>(&mut self, value: T) -> usize {
        self.push_param(Param::new(value))
    }

    /// Add a pre-wrapped value and return its 1-based placeholder index.
    pub fn push_param(&mut self, param: Param) -> usize {
        self.params.push(param);
        self.params.len()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// All values as references for tokio-postgres.
    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(Param::as_sql).collect()
    }
}

impl FromIterator<Param> for ParamList {
    fn from_iter<I: IntoIterator<Item = Param>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

impl<T: ToSql + Send + Sync + 'static> From<Vec<T>> for ParamList {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().map(Param::new).collect()
    }
}
