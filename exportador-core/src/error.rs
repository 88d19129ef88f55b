//! Error types with credential sanitization.
//!
//! Every variant's `Display` is the human-readable failure text the export
//! pipeline surfaces to the operator. Passwords and raw connection strings
//! never reach these messages.

use thiserror::Error;

/// Main error type for export operations.
///
/// # Security
/// Error messages never carry passwords. Driver strings that may embed a
/// password must pass through [`redact_connection_string`] first.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Missing or invalid input: connection parameters, selection, settings
    #[error("{message}")]
    Configuration { message: String },

    /// Database connection failed (credentials sanitized)
    #[error("Database connection failed: {context}")]
    Connection {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Export views could not be provisioned
    #[error("{message}")]
    SchemaSetup { message: String },

    /// Query execution failure
    #[error("Query execution failed: {context}")]
    QueryExecution { context: String },

    /// ZIP archive creation failed
    #[error("Failed to create ZIP archive: {context}")]
    Archive { context: String },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A step or collaborator panicked
    #[error("An unexpected error occurred: {message}")]
    Unexpected { message: String },

    /// Another export run holds the use case
    #[error("An export is already in progress.")]
    ExportInProgress,
}

/// Convenience type alias for Results with ExportError
pub type Result<T> = std::result::Result<T, ExportError>;

/// Masks the `Password=`/`Pwd=` segment of an ADO-style connection string.
///
/// Keys are matched case-insensitively; every other segment is kept as-is.
///
/// # Example
///
/// ```rust
/// use exportador_core::error::redact_connection_string;
///
/// let sanitized = redact_connection_string("Server=db;User Id=sa;Password=secret;");
/// assert_eq!(sanitized, "Server=db;User Id=sa;Password=****;");
/// assert!(!sanitized.contains("secret"));
/// ```
pub fn redact_connection_string(connection_string: &str) -> String {
    connection_string
        .split(';')
        .map(|segment| match segment.split_once('=') {
            Some((key, _)) if is_password_key(key) => format!("{key}=****"),
            _ => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn is_password_key(key: &str) -> bool {
    let key = key.trim();
    key.eq_ignore_ascii_case("password") || key.eq_ignore_ascii_case("pwd")
}

impl ExportError {
    /// Creates a connection error with sanitized context
    pub fn connection_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a view provisioning error
    pub fn schema_setup(message: impl Into<String>) -> Self {
        Self::SchemaSetup {
            message: message.into(),
        }
    }

    /// Creates a query execution error
    pub fn query_failed(context: impl Into<String>) -> Self {
        Self::QueryExecution {
            context: context.into(),
        }
    }

    /// Creates an archive error
    pub fn archive(context: impl Into<String>) -> Self {
        Self::Archive {
            context: context.into(),
        }
    }

    /// Creates an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Creates an error from a caught panic payload
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic with a non-string payload".to_string());
        Self::Unexpected { message }
    }

    /// Creates a serialization error with context
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }
}
