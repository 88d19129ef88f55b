//! Database adapters implementing the database-facing collaborator traits.
//!
//! Only SQL Server is supported; the adapter is compiled in with the `mssql`
//! feature (on by default).
//!
//! # Security Guarantees
//! - Passwords reach the driver configuration and nothing else
//! - Connection failures name server and database, never the password

#[cfg(feature = "mssql")]
pub mod mssql;

#[cfg(feature = "mssql")]
pub use mssql::SqlServerAdapter;
