//! Lazily established, memoized platform session.
//!
//! The state mutex is held across the login handshake, so concurrent first
//! calls coalesce onto a single login and all observe its outcome.

use crate::platform::{Credentials, DeviceFingerprint, PlatformClient, PlatformError};
use std::time::Duration;
use tokio::sync::Mutex;

/// Default bound on a single login handshake.
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Login failures. The session stays unauthenticated and a later call retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Platform(#[from] PlatformError),
    #[error("login timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

#[derive(Debug, Default)]
struct SessionState {
    authenticated: bool,
    device: Option<DeviceFingerprint>,
}

/// Owns the platform client and the authenticated flag.
pub struct SessionManager<P: PlatformClient> {
    client: P,
    credentials: Credentials,
    login_timeout: Duration,
    state: Mutex<SessionState>,
}

impl<P: PlatformClient> SessionManager<P> {
    pub fn new(client: P, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    /// Log in unless a session already exists.
    pub async fn ensure_authenticated(&self) -> Result<(), AuthError> {
        let mut state = self.state.lock().await;
        if state.authenticated {
            return Ok(());
        }

        let device = DeviceFingerprint::derive(&self.credentials.username);
        log::info!(
            target: "auth",
            "Logging in as '{}' (device {})",
            self.credentials.username,
            device.device_id
        );

        let outcome =
            tokio::time::timeout(self.login_timeout, self.client.login(&device, &self.credentials))
                .await;
        match outcome {
            Ok(Ok(())) => {
                log::info!(target: "auth", "Logged in as '{}'", self.credentials.username);
                state.authenticated = true;
                state.device = Some(device);
                Ok(())
            }
            Ok(Err(e)) => {
                log::error!(target: "error", "Login failed for '{}': {}", self.credentials.username, e);
                Err(AuthError::Platform(e))
            }
            Err(_) => {
                log::error!(
                    target: "error",
                    "Login for '{}' timed out after {:?}",
                    self.credentials.username,
                    self.login_timeout
                );
                Err(AuthError::Timeout(self.login_timeout))
            }
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.lock().await.authenticated
    }

    /// Device the current session logged in with, if any.
    pub async fn device(&self) -> Option<DeviceFingerprint> {
        self.state.lock().await.device.clone()
    }

    pub fn client(&self) -> &P {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockPlatform;
    use std::sync::Arc;

    fn creds() -> Credentials {
        Credentials {
            username: "brand_x".to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_second_call_does_not_login_again() {
        let session = SessionManager::new(MockPlatform::new(), creds());
        assert!(!session.is_authenticated().await);
        session.ensure_authenticated().await.unwrap();
        session.ensure_authenticated().await.unwrap();
        assert_eq!(session.client().login_count(), 1);
        assert!(session.is_authenticated().await);
        assert_eq!(
            session.device().await,
            Some(DeviceFingerprint::derive("brand_x"))
        );
    }

    #[tokio::test]
    async fn test_failed_login_is_retried_later() {
        let mock = MockPlatform::with_outcomes(vec![Err(PlatformError::BadCredentials)]);
        let session = SessionManager::new(mock, creds());

        let err = session.ensure_authenticated().await.unwrap_err();
        assert_eq!(err, AuthError::Platform(PlatformError::BadCredentials));
        assert!(!session.is_authenticated().await);
        assert!(session.device().await.is_none());

        session.ensure_authenticated().await.unwrap();
        assert_eq!(session.client().login_count(), 2);
        assert!(session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_share_one_login() {
        let mock = MockPlatform::new().with_delay(Duration::from_millis(50));
        let session = Arc::new(SessionManager::new(mock, creds()));

        let (a, b, c) = tokio::join!(
            session.ensure_authenticated(),
            session.ensure_authenticated(),
            session.ensure_authenticated()
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(session.client().login_count(), 1);
    }

    #[tokio::test]
    async fn test_login_timeout() {
        let mock = MockPlatform::new().with_delay(Duration::from_millis(200));
        let session = SessionManager::new(mock, creds())
            .with_login_timeout(Duration::from_millis(20));

        let err = session.ensure_authenticated().await.unwrap_err();
        assert_eq!(err, AuthError::Timeout(Duration::from_millis(20)));
        assert!(!session.is_authenticated().await);
    }

    #[test]
    fn test_auth_error_display() {
        let err = AuthError::Platform(PlatformError::RateLimited);
        assert_eq!(err.to_string(), "Rate limited by Instagram, try again later");
        assert_eq!(
            AuthError::Timeout(Duration::from_secs(30)).to_string(),
            "login timed out after 30s"
        );
    }
}
