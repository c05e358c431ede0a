//! Error types for pgdesc

use thiserror::Error;

/// Boxed low-level cause carried by [`DbError::Connection`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for pgdesc operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for descriptor execution
#[derive(Debug, Error)]
pub enum DbError {
    /// Acquiring a connection from the client failed. Nothing was queried or released.
    #[error("Connection error: {0}")]
    Connection(#[source] BoxError),

    /// The query itself failed. Only the SQL text survives; the driver error is logged
    /// and dropped.
    #[error("Error executing {sql} query!")]
    Execution { sql: String },

    /// Pool construction error
    #[error("Pool error: {0}")]
    Pool(String),

    /// Configuration error (bad URL, bad environment value)
    #[error("Config error: {0}")]
    Config(String),

    /// A loosely-typed descriptor could not be mapped onto a typed one
    #[error("Descriptor error: {0}")]
    Descriptor(String),
}

impl DbError {
    /// Wrap a connect failure.
    pub fn connection(err: impl Into<BoxError>) -> Self {
        Self::Connection(err.into())
    }

    /// Create an execution error for the given SQL text.
    pub fn execution(sql: impl Into<String>) -> Self {
        Self::Execution { sql: sql.into() }
    }

    /// Create a descriptor error.
    pub fn descriptor(message: impl Into<String>) -> Self {
        Self::Descriptor(message.into())
    }

    /// Check if this is a connection error
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Check if this is an execution error
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution { .. })
    }

    /// The SQL text of a failed execution, if any.
    pub fn failed_sql(&self) -> Option<&str> {
        match self {
            Self::Execution { sql } => Some(sql),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        Self::Descriptor(err.to_string())
    }
}

