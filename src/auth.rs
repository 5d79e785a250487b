//! Authentication seam
//!
//! The locker only needs a yes/no answer for a submitted password; the
//! actual backend (PAM on most systems) lives behind this trait so the
//! frame pipeline never touches credentials handling.

use anyhow::Result;
use tracing::warn;

/// Verifies a submitted password
pub trait Authenticator {
    fn authenticate(&mut self, password: &str) -> Result<bool>;
}

/// Development stand-in: accepts the password given in the
/// `SHADE_DEV_PASSWORD` environment variable. With the variable unset every
/// attempt is rejected, which is the safe direction for a locker.
pub struct DevAuthenticator {
    secret: Option<String>,
}

impl DevAuthenticator {
    pub fn from_env() -> Self {
        Self {
            secret: std::env::var("SHADE_DEV_PASSWORD").ok(),
        }
    }
}

impl Authenticator for DevAuthenticator {
    fn authenticate(&mut self, password: &str) -> Result<bool> {
        match &self.secret {
            Some(secret) => Ok(!password.is_empty() && password == secret),
            None => {
                warn!("SHADE_DEV_PASSWORD is not set; rejecting unlock attempt");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_password_unlocks() {
        let mut auth = DevAuthenticator { secret: Some("hunter2".into()) };
        assert!(auth.authenticate("hunter2").unwrap());
        assert!(!auth.authenticate("hunter3").unwrap());
    }

    #[test]
    fn test_empty_password_never_unlocks() {
        let mut auth = DevAuthenticator { secret: Some("".into()) };
        assert!(!auth.authenticate("").unwrap());
    }

    #[test]
    fn test_missing_secret_rejects() {
        let mut auth = DevAuthenticator { secret: None };
        assert!(!auth.authenticate("anything").unwrap());
    }
}
