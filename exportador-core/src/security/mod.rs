//! Credential protection for database access.
//!
//! # Security Guarantees
//! - Passwords are stored in `Zeroizing` containers for automatic memory clearing
//! - Passwords never appear in `Debug`, `Display`, logs or error messages
//! - Connection parameters compare password presence, never password content
//!
//! # Module Structure
//! - `credentials`: zeroizing password container
//! - `connection`: validated server/database/user/password bundle

mod connection;
mod credentials;

// Re-export public types
pub use connection::ConnectionParameters;
pub use credentials::SecretPassword;
