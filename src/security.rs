//! Security hygiene warnings.
//!
//! Warnings are logged through the `log` facade under [`TARGET`] every time
//! the unsafe condition is hit.

use std::fmt;

/// Log target for all security warnings.
pub const TARGET: &str = "tokens::security";

/// An unsafe but permitted configuration was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityWarning {
    /// An HMAC token signed or verified with the built-in salt.
    DefaultSalt,
    /// An HMAC token was redeemed without a validity hook.
    NotSingleUse { token: &'static str },
}

impl fmt::Display for SecurityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityWarning::DefaultSalt => {
                f.write_str("Leaving the HmacToken salt as the default value is a security risk.")
            }
            SecurityWarning::NotSingleUse { token } => write!(
                f,
                "'check_validity' method not overridden for {}. Tokens will not be single use.",
                token
            ),
        }
    }
}

/// Emit a warning.
pub fn warn(warning: SecurityWarning) {
    log::warn!(target: TARGET, "{}", warning);
}
