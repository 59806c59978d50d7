use std::fmt;

/// Long-lived aggregator credential for one item.
///
/// `Debug` is redacted so the token cannot leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self(access_token.into())
    }

    pub fn get(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_does_not_print_the_token() {
        let token = AccessToken::new("access-sandbox-secret");
        let printed = format!("{token:?}");
        assert!(!printed.contains("secret"));
        assert_eq!(token.get(), "access-sandbox-secret");
    }
}
