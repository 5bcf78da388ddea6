use secrecy::SecretString;

/// Process-wide configuration handed to every action. The signing secret is
/// read-only after startup and never logged or serialized.
#[derive(Clone)]
pub struct GlobalArgs {
    pub token_secret: SecretString,
    pub token_ttl_seconds: u64,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(token_secret: SecretString, token_ttl_seconds: u64) -> Self {
        Self {
            token_secret,
            token_ttl_seconds,
        }
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("token_secret", &"***")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(SecretString::from("hush".to_string()), 3600);
        assert_eq!(args.token_secret.expose_secret(), "hush");
        assert_eq!(args.token_ttl_seconds, 3600);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let args = GlobalArgs::new(SecretString::from("hush".to_string()), 3600);
        let debug = format!("{args:?}");
        assert!(debug.contains("***"));
        assert!(!debug.contains("hush"));
    }
}
