//! Zeroizing password container.
//!
//! # Security
//! - The password is stored in a `Zeroizing<String>`
//! - Memory is cleared when the value goes out of scope
//! - `Debug` prints a mask; the raw value needs an explicit `expose()`

use std::fmt;
use zeroize::Zeroizing;

/// Database password that wipes its memory on drop.
///
/// # Example
///
/// ```rust
/// use exportador_core::security::SecretPassword;
///
/// let password = SecretPassword::new("secret");
/// assert!(password.is_set());
/// assert_eq!(format!("{password:?}"), "****");
/// // Password is automatically zeroed when `password` is dropped
/// ```
#[derive(Clone)]
pub struct SecretPassword(Zeroizing<String>);

impl SecretPassword {
    /// Moves the password into a zeroizing container.
    pub fn new(password: impl Into<String>) -> Self {
        Self(Zeroizing::new(password.into()))
    }

    /// Returns the raw password.
    ///
    /// Only the driver configuration should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Checks if a non-empty password is present without exposing it.
    pub fn is_set(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Debug for SecretPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_password_expose() {
        let password = SecretPassword::new("testpass");
        assert_eq!(password.expose(), "testpass");
        assert!(password.is_set());
    }

    #[test]
    fn test_secret_password_empty() {
        let password = SecretPassword::new(String::new());
        assert!(!password.is_set());
    }

    #[test]
    fn test_secret_password_debug_masked() {
        let password = SecretPassword::new("hunter2");
        let debug = format!("{password:?}");
        assert_eq!(debug, "****");
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_secret_password_clone() {
        let first = SecretPassword::new("pass");
        let second = first.clone();
        assert_eq!(first.expose(), second.expose());
    }
}
