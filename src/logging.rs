//! Log-safe rendering of secrets.
//!
//! API keys and storage tokens never reach logs or `config show` output in
//! full; only a short prefix is kept.

use std::fmt;

/// Masked view of a secret: the first 8 characters followed by `***`
#[derive(Clone, Debug)]
pub struct SensitiveApiKey<'a> {
    inner: &'a str,
}

impl<'a> SensitiveApiKey<'a> {
    pub fn new(key: &'a str) -> Self {
        Self { inner: key }
    }
}

impl<'a> fmt::Display for SensitiveApiKey<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible_len = 8;
        match self.inner.get(..visible_len) {
            Some(prefix) if self.inner.len() > visible_len => write!(f, "{}***", prefix),
            // Too short (or not on a char boundary): mask everything
            _ => write!(f, "***"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_api_key_display() {
        let sanitized = SensitiveApiKey::new("sk-proj-abcdef123456");
        assert_eq!(format!("{}", sanitized), "sk-proj-***");
    }

    #[test]
    fn test_sensitive_api_key_short() {
        assert_eq!(SensitiveApiKey::new("sk-abc").to_string(), "***");
        assert_eq!(SensitiveApiKey::new("").to_string(), "***");
    }
}
