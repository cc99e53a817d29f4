//! Device identity: the static token this node presents to the server.
//!
//! The token is sent as `unique_address` in every outbound frame and forms
//! the last path segment of the server URI, so it is restricted to
//! URL-safe characters.

use core::fmt;

/// Maximum identity length in bytes.
pub const MAX_IDENTITY_LEN: usize = 32;

/// Immutable identity token, validated once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity(heapless::String<MAX_IDENTITY_LEN>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityError {
    Empty,
    TooLong,
    /// Byte offset of the first disallowed character.
    InvalidChar(usize),
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "identity is empty"),
            Self::TooLong => write!(f, "identity longer than {} bytes", MAX_IDENTITY_LEN),
            Self::InvalidChar(at) => write!(f, "identity has a disallowed character at {}", at),
        }
    }
}

impl DeviceIdentity {
    pub fn new(token: &str) -> Result<Self, IdentityError> {
        if token.is_empty() {
            return Err(IdentityError::Empty);
        }
        if let Some(at) = token
            .bytes()
            .position(|b| !(b.is_ascii_alphanumeric() || b == b'_' || b == b'-'))
        {
            return Err(IdentityError::InvalidChar(at));
        }
        heapless::String::try_from(token)
            .map(Self)
            .map_err(|_| IdentityError::TooLong)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_factory_identity() {
        let id = DeviceIdentity::new("ESP32_001").unwrap();
        assert_eq!(id.as_str(), "ESP32_001");
        assert_eq!(id.to_string(), "ESP32_001");
    }

    #[test]
    fn rejects_empty_and_oversized() {
        assert_eq!(DeviceIdentity::new(""), Err(IdentityError::Empty));
        let long = "A".repeat(MAX_IDENTITY_LEN + 1);
        assert_eq!(DeviceIdentity::new(&long), Err(IdentityError::TooLong));
        assert!(DeviceIdentity::new(&"A".repeat(MAX_IDENTITY_LEN)).is_ok());
    }

    #[test]
    fn rejects_path_and_quote_characters() {
        assert_eq!(DeviceIdentity::new("tank/1"), Err(IdentityError::InvalidChar(4)));
        assert_eq!(DeviceIdentity::new("a\"b"), Err(IdentityError::InvalidChar(1)));
        assert_eq!(DeviceIdentity::new("tank 1"), Err(IdentityError::InvalidChar(4)));
    }
}
