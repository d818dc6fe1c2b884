//! Clean layer boundary between the session manager and the Instagram API.
//!
//! The session manager calls [`PlatformClient`] instead of an HTTP client
//! directly, which makes it testable with the mock implementation below.

use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Errors from platform operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("Bad credentials: username or password rejected")]
    BadCredentials,
    #[error("Challenge required: confirm the login from the Instagram app")]
    ChallengeRequired,
    #[error("Two-factor authentication required")]
    TwoFactorRequired,
    #[error("Rate limited by Instagram, try again later")]
    RateLimited,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Account credentials supplied at startup.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

const DEVICE_NAMESPACE: Uuid = Uuid::from_u128(0x6f1d_3c2a_8b4e_4f7a_9c1d_2e3f_4a5b_6c7d);
const GUID_NAMESPACE: Uuid = Uuid::from_u128(0x1a2b_3c4d_5e6f_4a1b_8c2d_3e4f_5a6b_7c8d);
const PHONE_NAMESPACE: Uuid = Uuid::from_u128(0x9e8d_7c6b_5a49_4c3b_a2d1_e0f9_8a7b_6c5d);

/// Stable device identity presented to the platform for one account.
///
/// Derived deterministically from the account identifier so repeated logins
/// look like the same device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFingerprint {
    pub device_id: String,
    pub uuid: String,
    pub phone_id: String,
}

impl DeviceFingerprint {
    pub fn derive(account: &str) -> Self {
        let seed = Uuid::new_v5(&DEVICE_NAMESPACE, account.as_bytes());
        Self {
            device_id: format!("android-{}", hex::encode(&seed.as_bytes()[..8])),
            uuid: Uuid::new_v5(&GUID_NAMESPACE, account.as_bytes()).to_string(),
            phone_id: Uuid::new_v5(&PHONE_NAMESPACE, account.as_bytes()).to_string(),
        }
    }
}

/// Abstraction over the external social network.
///
/// Only login exists today; paginated fetches of comments, followers and
/// profiles belong here once a real analytics backend needs them.
pub trait PlatformClient: Send + Sync + 'static {
    fn login(
        &self,
        device: &DeviceFingerprint,
        credentials: &Credentials,
    ) -> impl std::future::Future<Output = PlatformResult<()>> + Send;
}

// ── InstagramClient: real implementation over HTTP ───────────────────────

/// Default private API base URL.
pub const DEFAULT_API_URL: &str = "https://i.instagram.com/api/v1";

const USER_AGENT: &str =
    "Instagram 222.0.0.13.114 Android (29/10; 420dpi; 1080x2131; samsung; SM-G973F; beyond1; exynos9820; en_US; 350696709)";

/// Platform client backed by the Instagram private API.
pub struct InstagramClient {
    http: reqwest::Client,
    base_url: String,
}

impl InstagramClient {
    pub fn new(base_url: impl Into<String>) -> PlatformResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PlatformError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn login_url(&self) -> String {
        format!("{}/accounts/login/", self.base_url.trim_end_matches('/'))
    }
}

impl PlatformClient for InstagramClient {
    async fn login(
        &self,
        device: &DeviceFingerprint,
        credentials: &Credentials,
    ) -> PlatformResult<()> {
        let payload = json!({
            "username": credentials.username,
            "enc_password": format!(
                "#PWD_INSTAGRAM:0:{}:{}",
                chrono::Utc::now().timestamp(),
                credentials.password
            ),
            "device_id": device.device_id,
            "guid": device.uuid,
            "phone_id": device.phone_id,
            "adid": Uuid::new_v4().to_string(),
            "login_attempt_count": "0",
        });
        let form = [("signed_body", format!("SIGNATURE.{}", payload))];

        let response = self
            .http
            .post(self.login_url())
            .form(&form)
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;
        let body = serde_json::from_str::<LoginResponse>(&text).ok();
        classify_login_response(status, body.as_ref())
    }
}

/// Fields of the login response that decide the outcome.
#[derive(Debug, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub two_factor_required: Option<bool>,
    #[serde(default)]
    pub challenge: Option<serde_json::Value>,
    #[serde(default)]
    pub spam: Option<bool>,
}

/// Map an HTTP status and (maybe) parsed body to a login outcome.
pub fn classify_login_response(status: u16, body: Option<&LoginResponse>) -> PlatformResult<()> {
    if status == 429 {
        return Err(PlatformError::RateLimited);
    }
    let Some(body) = body else {
        return Err(PlatformError::UnexpectedResponse(format!(
            "HTTP {} with a non-JSON body",
            status
        )));
    };
    if (200..300).contains(&status) && body.status == "ok" {
        return Ok(());
    }
    if body.two_factor_required == Some(true) {
        return Err(PlatformError::TwoFactorRequired);
    }
    let error_type = body.error_type.as_deref().unwrap_or_default();
    let message = body.message.as_deref().unwrap_or_default();
    match error_type {
        "bad_password" | "invalid_user" | "bad_credentials" => {
            return Err(PlatformError::BadCredentials)
        }
        "checkpoint_challenge_required" => return Err(PlatformError::ChallengeRequired),
        "rate_limit_error" => return Err(PlatformError::RateLimited),
        _ => {}
    }
    if message == "challenge_required" || body.challenge.is_some() {
        return Err(PlatformError::ChallengeRequired);
    }
    if body.spam == Some(true) || message.contains("wait a few minutes") {
        return Err(PlatformError::RateLimited);
    }
    Err(PlatformError::UnexpectedResponse(if message.is_empty() {
        format!("HTTP {} (status '{}')", status, body.status)
    } else {
        format!("HTTP {}: {}", status, message)
    }))
}

// ── MockPlatform for testing ─────────────────────────────────────────────

#[cfg(any(test, feature = "test-harness"))]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted platform: pops queued login outcomes, succeeding once the
    /// queue is empty.
    #[derive(Default)]
    pub struct MockPlatform {
        pub outcomes: Mutex<VecDeque<PlatformResult<()>>>,
        pub login_calls: AtomicUsize,
        pub delay: Option<Duration>,
    }

    impl MockPlatform {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue outcomes for the next logins, in order.
        pub fn with_outcomes(outcomes: Vec<PlatformResult<()>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                ..Self::default()
            }
        }

        /// Delay every login by `delay`.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn login_count(&self) -> usize {
            self.login_calls.load(Ordering::SeqCst)
        }
    }

    impl PlatformClient for MockPlatform {
        async fn login(
            &self,
            _device: &DeviceFingerprint,
            _credentials: &Credentials,
        ) -> PlatformResult<()> {
            self.login_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()))
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::mock::MockPlatform;
    use super::*;

    fn creds() -> Credentials {
        Credentials {
            username: "brand_x".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[test]
    fn test_fingerprint_is_stable_per_account() {
        let a = DeviceFingerprint::derive("brand_x");
        let b = DeviceFingerprint::derive("brand_x");
        let c = DeviceFingerprint::derive("brand_y");
        assert_eq!(a, b);
        assert_ne!(a.device_id, c.device_id);
        assert!(a.device_id.starts_with("android-"));
        assert_eq!(a.device_id.len(), "android-".len() + 16);
        assert_ne!(a.uuid, a.phone_id);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let out = format!("{:?}", creds());
        assert!(out.contains("brand_x"));
        assert!(!out.contains("hunter2"));
    }

    #[test]
    fn test_classify_ok() {
        let body = LoginResponse {
            status: "ok".to_string(),
            ..Default::default()
        };
        assert_eq!(classify_login_response(200, Some(&body)), Ok(()));
    }

    #[test]
    fn test_classify_rate_limited() {
        assert_eq!(
            classify_login_response(429, None),
            Err(PlatformError::RateLimited)
        );
        let body = LoginResponse {
            status: "fail".to_string(),
            message: Some("Please wait a few minutes before you try again.".to_string()),
            ..Default::default()
        };
        assert_eq!(
            classify_login_response(400, Some(&body)),
            Err(PlatformError::RateLimited)
        );
    }

    #[test]
    fn test_classify_bad_password() {
        let body = LoginResponse {
            status: "fail".to_string(),
            error_type: Some("bad_password".to_string()),
            ..Default::default()
        };
        assert_eq!(
            classify_login_response(400, Some(&body)),
            Err(PlatformError::BadCredentials)
        );
    }

    #[test]
    fn test_classify_challenge_and_two_factor() {
        let challenge = LoginResponse {
            status: "fail".to_string(),
            message: Some("challenge_required".to_string()),
            ..Default::default()
        };
        assert_eq!(
            classify_login_response(400, Some(&challenge)),
            Err(PlatformError::ChallengeRequired)
        );
        let two_factor = LoginResponse {
            status: "fail".to_string(),
            two_factor_required: Some(true),
            ..Default::default()
        };
        assert_eq!(
            classify_login_response(400, Some(&two_factor)),
            Err(PlatformError::TwoFactorRequired)
        );
    }

    #[test]
    fn test_classify_unexpected() {
        assert!(matches!(
            classify_login_response(502, None),
            Err(PlatformError::UnexpectedResponse(_))
        ));
        let body = LoginResponse {
            status: "fail".to_string(),
            message: Some("something odd".to_string()),
            ..Default::default()
        };
        let err = classify_login_response(400, Some(&body)).unwrap_err();
        assert_eq!(err.to_string(), "Unexpected response: HTTP 400: something odd");
    }

    #[test]
    fn test_login_response_parses_partial_json() {
        let body: LoginResponse =
            serde_json::from_str(r#"{"status":"fail","error_type":"invalid_user"}"#).unwrap();
        assert_eq!(
            classify_login_response(400, Some(&body)),
            Err(PlatformError::BadCredentials)
        );
    }

    #[test]
    fn test_login_url_trims_trailing_slash() {
        let client = InstagramClient::new("https://example.test/api/v1/").unwrap();
        assert_eq!(client.login_url(), "https://example.test/api/v1/accounts/login/");
    }

    #[tokio::test]
    async fn test_mock_pops_outcomes_then_succeeds() {
        let mock = MockPlatform::with_outcomes(vec![Err(PlatformError::BadCredentials)]);
        let device = DeviceFingerprint::derive("brand_x");
        assert_eq!(
            mock.login(&device, &creds()).await,
            Err(PlatformError::BadCredentials)
        );
        assert_eq!(mock.login(&device, &creds()).await, Ok(()));
        assert_eq!(mock.login_count(), 2);
    }
}
