//! Credential values held in memory
//!
//! Resolved profile credentials live in a [`SecretString`]: the buffer is
//! zeroed when the profile is dropped and `Debug` output is redacted, so a
//! logged profile never shows its credentials.
//!
//! ```rust
//! use harbor::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let token = secret_string("my-token".to_string());
//! assert_eq!(token.expose_secret().as_str(), "my-token");
//! assert!(!format!("{token:?}").contains("my-token"));
//! ```

use secrecy::{DebugSecret, Secret};
use zeroize::Zeroize;

/// Credential text, zeroed on drop
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl DebugSecret for SecretValue {}

impl SecretValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

// Redacted so a failed assertion never prints the credential.
impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretValue([REDACTED])")
    }
}

/// Resolved credentials of a profile
pub type SecretString = Secret<SecretValue>;

/// Wraps credential text read from a file or the environment
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}
