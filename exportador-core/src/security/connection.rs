//! Validated connection parameters.
//!
//! # Security
//! - The password is moved into a [`SecretPassword`] immediately
//! - `Display` and `Debug` never render the password
//! - Equality and hashing look at password presence only

use super::credentials::SecretPassword;
use crate::error::ExportError;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Server, database, user and password for one SQL Server login.
///
/// Instances only exist in a valid state: every field is non-blank.
///
/// # Example
///
/// ```rust
/// use exportador_core::security::ConnectionParameters;
///
/// let params = ConnectionParameters::new("db01\\SQLEXPRESS", "erp", "sa", "secret")?;
/// assert_eq!(params.to_string(), "db01\\SQLEXPRESS/erp (sa)");
/// # Ok::<(), exportador_core::ExportError>(())
/// ```
#[derive(Clone)]
pub struct ConnectionParameters {
    server: String,
    database: String,
    user: String,
    password: SecretPassword,
}

impl ConnectionParameters {
    /// Validates the inputs and builds the parameters.
    ///
    /// # Errors
    /// Returns a configuration error naming the first blank field. Server,
    /// database and user are blank when empty or whitespace only; the
    /// password is rejected only when empty.
    pub fn new(
        server: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> crate::Result<Self> {
        let server = server.into();
        let database = database.into();
        let user = user.into();
        let password = SecretPassword::new(password);

        if server.trim().is_empty() {
            return Err(ExportError::configuration("Server name cannot be empty."));
        }
        if database.trim().is_empty() {
            return Err(ExportError::configuration("Database name cannot be empty."));
        }
        if user.trim().is_empty() {
            return Err(ExportError::configuration("User name cannot be empty."));
        }
        if !password.is_set() {
            return Err(ExportError::configuration("Password cannot be empty."));
        }

        Ok(Self {
            server,
            database,
            user,
            password,
        })
    }

    /// Server name, optionally `host\instance` or `host,port`.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Database (catalog) name.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// SQL Server login name.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Password container; call `expose()` only to build the driver config.
    pub fn password(&self) -> &SecretPassword {
        &self.password
    }

    /// Checks if a password is present without exposing it.
    pub fn has_password(&self) -> bool {
        self.password.is_set()
    }
}

impl PartialEq for ConnectionParameters {
    fn eq(&self, other: &Self) -> bool {
        self.server == other.server
            && self.database == other.database
            && self.user == other.user
            && self.has_password() == other.has_password()
    }
}

impl Eq for ConnectionParameters {}

impl Hash for ConnectionParameters {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.server.hash(state);
        self.database.hash(state);
        self.user.hash(state);
        self.has_password().hash(state);
    }
}

impl fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParameters")
            .field("server", &self.server)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password)
            .finish()
    }
}

impl fmt::Display for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.server, self.database, self.user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn validation_message(result: crate::Result<ConnectionParameters>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn test_valid_parameters() {
        let params = ConnectionParameters::new("localhost", "erp", "sa", "pw").unwrap();
        assert_eq!(params.server(), "localhost");
        assert_eq!(params.database(), "erp");
        assert_eq!(params.user(), "sa");
        assert!(params.has_password());
    }

    #[test]
    fn test_blank_server_rejected() {
        assert_eq!(
            validation_message(ConnectionParameters::new("   ", "erp", "sa", "pw")),
            "Server name cannot be empty."
        );
    }

    #[test]
    fn test_blank_database_rejected() {
        assert_eq!(
            validation_message(ConnectionParameters::new("srv", "", "sa", "pw")),
            "Database name cannot be empty."
        );
    }

    #[test]
    fn test_blank_user_rejected() {
        assert_eq!(
            validation_message(ConnectionParameters::new("srv", "erp", "\t", "pw")),
            "User name cannot be empty."
        );
    }

    #[test]
    fn test_empty_password_rejected() {
        assert_eq!(
            validation_message(ConnectionParameters::new("srv", "erp", "sa", "")),
            "Password cannot be empty."
        );
    }

    #[test]
    fn test_whitespace_password_accepted() {
        let params = ConnectionParameters::new("srv", "erp", "sa", " ").unwrap();
        assert!(params.has_password());
    }

    #[test]
    fn test_equality_ignores_password_content() {
        let first = ConnectionParameters::new("srv", "erp", "sa", "one").unwrap();
        let second = ConnectionParameters::new("srv", "erp", "sa", "two").unwrap();
        let other_db = ConnectionParameters::new("srv", "crm", "sa", "one").unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other_db);

        let set: HashSet<_> = [first, second, other_db].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_display_hides_password() {
        let params = ConnectionParameters::new("srv", "erp", "sa", "topsecret").unwrap();
        assert_eq!(params.to_string(), "srv/erp (sa)");
        let debug = format!("{params:?}");
        assert!(debug.contains("****"));
        assert!(!debug.contains("topsecret"));
    }
}
