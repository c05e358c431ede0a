//! Connection capabilities the executor runs against.
//!
//! A [`ConnectionSource`] hands out [`Lease`]s; a lease derefs to a [`Connection`] that
//! can run SQL with bound parameters. The real driver wiring lives in `pool`; tests
//! plug in their own implementations.

use std::future::Future;
use std::ops::Deref;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// Row type produced by a source's connections.
pub type RowOf<S> = <<S as ConnectionSource>::Conn as Connection>::Row;

/// An active connection that can execute SQL.
pub trait Connection: Send + Sync {
    /// One result row.
    type Row: Send;
    /// Driver error. The executor logs it and reports only the SQL text.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Execute `sql` with positional parameters.
    ///
    /// `Ok(None)` means the driver produced no row data at all, as opposed to
    /// `Ok(Some(vec![]))` for an empty result set.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Option<Vec<Self::Row>>, Self::Error>> + Send;
}

/// A client handle that can lease connections.
pub trait ConnectionSource: Send + Sync {
    type Conn: Connection;
    /// Connect failure, surfaced as [`crate::DbError::Connection`].
    type Error: std::error::Error + Send + Sync + 'static;

    /// Acquire a connection. The caller releases the returned lease exactly once.
    fn connect(&self) -> impl Future<Output = Result<Lease<Self::Conn>, Self::Error>> + Send;
}

/// A leased connection plus the callback that gives it back.
///
/// The callback runs exactly once: on [`Lease::release`], or on drop if the lease was
/// never released explicitly (a panicking or cancelled query). The connection itself is
/// dropped right after the callback.
#[must_use = "a lease holds a connection until it is released or dropped"]
pub struct Lease<C> {
    conn: C,
    on_release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl<C> Lease<C> {
    /// Lease whose release is just dropping the connection (pooled objects return
    /// themselves to their pool on drop).
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            on_release: None,
        }
    }

    /// Lease with an explicit release callback.
    pub fn with_release(conn: C, on_release: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            conn,
            on_release: Some(Box::new(on_release)),
        }
    }

    /// The leased connection.
    pub fn connection(&self) -> &C {
        &self.conn
    }

    /// Give the connection back.
    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(on_release) = self.on_release.take() {
            on_release();
        }
    }
}

impl<C> Deref for Lease<C> {
    type Target = C;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl<C> Drop for Lease<C> {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl<C: std::fmt::Debug> std::fmt::Debug for Lease<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lease")
            .field("conn", &self.conn)
            .field("pending_release", &self.on_release.is_some())
            .finish()
    }
}

// ===== Shared handles =====

impl<S: ConnectionSource> ConnectionSource for Arc<S> {
    type Conn = S::Conn;
    type Error = S::Error;

    fn connect(&self) -> impl Future<Output = Result<Lease<Self::Conn>, Self::Error>> + Send {
        (**self).connect()
    }
}

impl<S: ConnectionSource> ConnectionSource for &S {
    type Conn = S::Conn;
    type Error = S::Error;

    fn connect(&self) -> impl Future<Output = Result<Lease<Self::Conn>, Self::Error>> + Send {
        (**self).connect()
    }
}
