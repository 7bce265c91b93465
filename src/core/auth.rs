use secstr::SecStr;

/// Shared administrative secret pair
///
/// Secrets live in `SecStr` buffers, which are zeroed on drop, print as
/// redacted, and compare in constant time. Without configured secrets every
/// check fails.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    secrets: Option<(SecStr, SecStr)>,
}

impl AdminCredentials {
    pub fn new(user: impl Into<String>, pass: impl Into<String>) -> Self {
        let user = user.into();
        let pass = pass.into();
        Self {
            secrets: Some((SecStr::from(user), SecStr::from(pass))),
        }
    }

    /// Build from optional configuration values; both must be present and non-empty
    pub fn from_config(user: Option<&str>, pass: Option<&str>) -> Self {
        match (user, pass) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                Self::new(user, pass)
            }
            _ => Self::disabled(),
        }
    }

    /// Credentials that reject every request
    pub fn disabled() -> Self {
        Self { secrets: None }
    }

    pub fn is_configured(&self) -> bool {
        self.secrets.is_some()
    }

    /// Compare caller-supplied values against the configured secrets
    pub fn verify(&self, admin: &str, pass: &str) -> bool {
        let Some((user_secret, pass_secret)) = &self.secrets else {
            return false;
        };

        let admin = SecStr::from(admin);
        let pass = SecStr::from(pass);

        // Non-short-circuit so both comparisons always run
        (admin == *user_secret) & (pass == *pass_secret)
    }
}

/// Which mutating routes require administrative credentials
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthPolicy {
    /// Also guard `PUT /users` and `PUT /messages`, not only deletes
    pub require_admin_for_updates: bool,
}
