pub mod cookies;

use std::fmt;
use std::sync::Arc;
use url::Url;

use explab_constants::{CSRF_COOKIE, USER_AGENT};
use explab_error::{ExperimentError, Result};

pub use cookies::{CookieFile, CookieSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    Put,
    Delete,
}

impl ApiMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Put => "put",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a remote call that produced an HTTP response at all.
/// Transport-level failures surface as `ExperimentError::Network` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiOutcome {
    pub status: u16,
    pub ok: bool,
}

impl ApiOutcome {
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        Self {
            status,
            ok: status < 400,
        }
    }
}

/// Terminal non-error statuses for installation sync.
/// 200 = put success, 410 = delete success, 404 = delete redundant.
/// The service historically returns 404/410 for redundant puts as well, so
/// both methods share the rule.
#[must_use]
pub const fn idempotent_ok(_method: ApiMethod, status: u16) -> bool {
    status >= 200 && status < 300 || status == 404 || status == 410
}

/// Assemble the headers for an authenticated catalog-service request.
///
/// The API origin is used as Referer to make CSRF checking happy on SSL,
/// the session cookies scoped to the service hostname are sent manually,
/// and a `csrftoken` cookie is mirrored into `X-CSRFToken`.
pub fn build_headers(url: &Url, cookies: &[(String, String)]) -> Vec<(String, String)> {
    let mut headers = vec![
        ("Referer".to_string(), url.origin().ascii_serialization()),
        ("Accept".to_string(), "application/json".to_string()),
    ];

    let mut jar = String::new();
    let mut csrf = None;
    for (name, value) in cookies {
        jar.push_str(name);
        jar.push('=');
        jar.push_str(value);
        jar.push(';');
        if name == CSRF_COOKIE {
            csrf = Some(value.clone());
        }
    }
    headers.push(("Cookie".to_string(), jar));
    if let Some(token) = csrf {
        headers.push(("X-CSRFToken".to_string(), token));
    }

    headers
}

/// The single path by which the agent talks to the remote catalog service.
pub trait ApiTransport: Send + Sync {
    fn call(
        &self,
        method: ApiMethod,
        url: &str,
        extra_headers: &[(String, String)],
    ) -> impl Future<Output = Result<ApiOutcome>> + Send;
}

/// reqwest-backed transport authenticating with the user's existing session
/// cookies rather than separate credentials.
pub struct RemoteClient {
    client: reqwest::Client,
    hostname: String,
    cookies: Arc<dyn CookieSource + Send + Sync>,
}

impl RemoteClient {
    #[must_use]
    pub fn new(hostname: impl Into<String>, cookies: Arc<dyn CookieSource + Send + Sync>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .pool_max_idle_per_host(25)
                .pool_idle_timeout(std::time::Duration::from_secs(90))
                .timeout(std::time::Duration::from_secs(45))
                .connect_timeout(std::time::Duration::from_secs(20))
                .tcp_keepalive(Some(std::time::Duration::from_secs(60)))
                .tcp_nodelay(true)
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            hostname: hostname.into(),
            cookies,
        }
    }
}

impl ApiTransport for RemoteClient {
    async fn call(
        &self,
        method: ApiMethod,
        url: &str,
        extra_headers: &[(String, String)],
    ) -> Result<ApiOutcome> {
        let parsed = Url::parse(url)
            .map_err(|err| ExperimentError::Network(format!("invalid url {url}: {err}")))?;

        let mut request = match method {
            ApiMethod::Put => self.client.put(url),
            ApiMethod::Delete => self.client.delete(url),
        };
        request = request.header("Content-Type", "application/json");

        let pairs = self.cookies.cookies_for_host(&self.hostname);
        for (name, value) in build_headers(&parsed, &pairs) {
            request = request.header(&name, &value);
        }
        for (name, value) in extra_headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|err| ExperimentError::Network(err.to_string()))?;
        Ok(ApiOutcome::from_status(response.status().as_u16()))
    }
}
