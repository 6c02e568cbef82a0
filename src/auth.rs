//! Operator authentication.
//!
//! There is exactly one operator role and no permission tiers. The
//! credential check is a trait so deployments can swap in something better;
//! the default implementation compares against the configured shared
//! username/password pair, which is a known weakness carried over from the
//! original deployment.

use actix_session::Session;

pub const ADMIN_SESSION_KEY: &str = "admin";

/// A pluggable credential check.
pub trait Credentials: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Credential check against the `[admin]` section of the app configuration.
#[derive(Debug, Clone)]
pub struct ConfigCredentials {
    username: String,
    password: String,
}

impl ConfigCredentials {
    pub fn from_app_config() -> Self {
        let admin = crate::app_config::admin();
        Self {
            username: admin.username,
            password: admin.password,
        }
    }

    #[cfg(test)]
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

impl Credentials for ConfigCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

/// Mark the caller's session as an authenticated operator.
pub fn set_admin(session: &Session) -> Result<(), actix_web::Error> {
    session
        .insert(ADMIN_SESSION_KEY, true)
        .map_err(|_| actix_web::error::ErrorInternalServerError("session error"))
}

/// Drop the operator flag from the session.
pub fn clear_admin(session: &Session) {
    session.remove(ADMIN_SESSION_KEY);
}

/// Whether the caller's session carries the operator flag.
pub fn is_admin(session: &Session) -> bool {
    matches!(session.get::<bool>(ADMIN_SESSION_KEY), Ok(Some(true)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_session::SessionExt;
    use actix_web::test::TestRequest;

    #[test]
    fn test_config_credentials() {
        let creds = ConfigCredentials::new("operator", "hunter2");
        assert!(creds.verify("operator", "hunter2"));
        assert!(!creds.verify("operator", "wrong"));
        assert!(!creds.verify("someone", "hunter2"));
        assert!(!creds.verify("", ""));
    }

    #[actix_rt::test]
    async fn test_admin_session_flag() {
        let session = TestRequest::default().to_http_request().get_session();

        assert!(!is_admin(&session));
        set_admin(&session).unwrap();
        assert!(is_admin(&session));
        clear_admin(&session);
        assert!(!is_admin(&session));
    }
}
