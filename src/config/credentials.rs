//! Login credentials.
//!
//! The password is wrapped so it never shows up in logs or debug output.

use std::fmt;

/// A secret that formats as a mask.
///
/// `expose()` is the only way to read it back.
#[derive(Clone)]
pub struct SecureString(String);

impl SecureString {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

const MASK: &str = "••••••••";

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecureString").field(&format_args!("{MASK}")).finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

/// Mobile number + password pair used by `/user/login`.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub mobile: String,
    pub password: SecureString,
}

impl Credentials {
    pub fn new(mobile: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            mobile: mobile.into(),
            password: SecureString::new(password),
        }
    }

    /// JSON body for the login endpoint.
    pub fn to_body(&self) -> serde_json::Value {
        serde_json::json!({
            "mobile": self.mobile,
            "password": self.password.expose(),
        })
    }
}
