//! Descriptor execution.
//!
//! Every call follows the same lifecycle:
//!
//! ```text
//! connect ──fail──> Connection error (nothing to release)
//!    │
//!    └──> query ──> release ──> rows | Execution error
//! ```
//!
//! The lease is released exactly once, after the query returns and before the result is
//! handed back. A query that panics or is cancelled still releases through the lease's
//! drop.
//!
//! [`Db`] keeps the client handle; the free [`select`] / [`insert`] functions run
//! against a borrowed source for one-off use.

use crate::client::{Connection, ConnectionSource, RowOf};
use crate::error::{DbError, DbResult};
use crate::qb::{InsertQuery, SelectQuery, build_insert, build_select};
use std::sync::{Arc, PoisonError, RwLock};
use tokio_postgres::types::ToSql;

/// Executes descriptors against a replaceable client handle.
///
/// Configure once, call many:
///
/// ```ignore
/// let db = Db::new(pgdesc::create_pool(&url)?);
/// let rows = db.select(&SelectQuery::from("users").filter("active")).await?;
/// ```
///
/// [`Db::set_client`] swaps the handle for calls that start afterwards; calls already
/// running keep the handle they started with.
pub struct Db<S> {
    client: RwLock<Arc<S>>,
}

impl<S: ConnectionSource> Db<S> {
    /// Create an executor over `client`.
    pub fn new(client: S) -> Self {
        Self::from_arc(Arc::new(client))
    }

    /// Create an executor over a shared client handle.
    pub fn from_arc(client: Arc<S>) -> Self {
        Self {
            client: RwLock::new(client),
        }
    }

    /// Replace the client handle. Last write wins.
    pub fn set_client(&self, client: S) {
        self.set_client_arc(Arc::new(client));
    }

    /// Replace the client handle with a shared one.
    pub fn set_client_arc(&self, client: Arc<S>) {
        *self.client.write().unwrap_or_else(PoisonError::into_inner) = client;
    }

    /// The current client handle.
    pub fn client(&self) -> Arc<S> {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run a SELECT descriptor and return its rows.
    ///
    /// `Ok(None)` means the driver reported no row data.
    pub async fn select(&self, query: &SelectQuery) -> DbResult<Option<Vec<RowOf<S>>>> {
        let client = self.client();
        select(&*client, query).await
    }

    /// Run an INSERT descriptor with its values bound as parameters.
    pub async fn insert(&self, query: &InsertQuery) -> DbResult<Option<Vec<RowOf<S>>>> {
        let client = self.client();
        insert(&*client, query).await
    }
}

impl<S> std::fmt::Debug for Db<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("client", &std::any::type_name::<S>())
            .finish()
    }
}

/// Run a SELECT descriptor against `source`.
pub async fn select<S: ConnectionSource>(
    source: &S,
    query: &SelectQuery,
) -> DbResult<Option<Vec<RowOf<S>>>> {
    execute(source, build_select(query), &[]).await
}

/// Run an INSERT descriptor against `source`.
pub async fn insert<S: ConnectionSource>(
    source: &S,
    query: &InsertQuery,
) -> DbResult<Option<Vec<RowOf<S>>>> {
    let params = query.params();
    execute(source, build_insert(query), &params).await
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
async fn execute<S: ConnectionSource>(
    source: &S,
    sql: String,
    params: &[&(dyn ToSql + Sync)],
) -> DbResult<Option<Vec<RowOf<S>>>> {
    let lease = match source.connect().await {
        Ok(lease) => lease,
        Err(err) => {
            #[cfg(feature = "tracing")]
            tracing::error!(target: "pgdesc.sql", error = %err, "connection error");
            return Err(DbError::connection(err));
        }
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(target: "pgdesc.sql", "connection acquired");

    #[cfg(feature = "tracing")]
    tracing::debug!(target: "pgdesc.sql", sql = %sql, param_count = params.len(), "executing");

    let result = {
        let conn = lease.connection();
        conn.query(&sql, params).await
    };
    lease.release();

    #[cfg(feature = "tracing")]
    tracing::debug!(target: "pgdesc.sql", "connection released");

    match result {
        Ok(rows) => Ok(rows),
        Err(err) => {
            #[cfg(feature = "tracing")]
            tracing::error!(target: "pgdesc.sql", sql = %sql, error = %err, "query failed");
            Err(DbError::execution(sql))
        }
    }
}
