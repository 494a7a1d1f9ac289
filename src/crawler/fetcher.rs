//! HTTP fetcher: client construction, retries, and block-signal handling
//!
//! The fetcher owns the client session. On a block signal (HTTP 403/429 or
//! a body matching the block patterns) it retires the session by rebuilding
//! the client with a fresh cookie jar, then lets the retry budget decide
//! whether the item survives. Everything past the retry budget is a
//! terminal failure for that work item, never for the run.

use crate::config::{HttpConfig, ALL_JOBS_URL};
use crate::crawler::frontier::Role;
use crate::{HarvestError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::REFERER;
use reqwest::{Client, Proxy, StatusCode};
use std::sync::RwLock;
use std::time::Duration;
use url::Url;

/// Desktop browser profile; header synthesis beyond this is out of scope
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const MAX_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Body patterns indicating the site throttled or blocked the session
static BLOCK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)forbidden|blocked|captcha").unwrap());

/// Referer sent with each request, keyed by the role of the page fetched
pub fn referer_for(role: Role) -> &'static str {
    match role {
        Role::Detail => ALL_JOBS_URL,
        Role::List { .. } => "https://careerviet.vn/",
    }
}

pub struct Fetcher {
    client: RwLock<Client>,
    proxy_url: Option<String>,
}

impl Fetcher {
    pub fn new(http: &HttpConfig) -> Result<Self> {
        let client = build_client(http.proxy_url.as_deref())?;
        Ok(Self {
            client: RwLock::new(client),
            proxy_url: http.proxy_url.clone(),
        })
    }

    /// Fetches a page body with the retry budget applied.
    ///
    /// Transient failures (network errors, 5xx) are retried with a short
    /// backoff; block signals rotate the session first. Other 4xx statuses
    /// fail immediately.
    pub async fn fetch(&self, url: &Url, role: Role) -> Result<String> {
        let mut last_err: Option<HarvestError> = None;

        for attempt in 1..=MAX_ATTEMPTS {
            if attempt > 1 {
                tokio::time::sleep(RETRY_BACKOFF * (attempt - 1)).await;
            }

            match self.attempt(url, role).await {
                Ok(body) => return Ok(body),
                Err(e @ HarvestError::Status { .. }) => return Err(e),
                Err(e) => {
                    tracing::debug!(url = %url, attempt, error = %e, "fetch attempt failed");
                    if matches!(e, HarvestError::Blocked { .. }) {
                        self.rotate_session();
                    }
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or(HarvestError::Timeout {
            url: url.to_string(),
        }))
    }

    async fn attempt(&self, url: &Url, role: Role) -> Result<String> {
        let client = self.client.read().unwrap().clone();
        let response = client
            .get(url.clone())
            .header(REFERER, referer_for(role))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HarvestError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    HarvestError::Http {
                        url: url.to_string(),
                        source: e,
                    }
                }
            })?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(HarvestError::Blocked {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        if let Err(e) = response.error_for_status_ref() {
            if status.is_server_error() {
                return Err(HarvestError::Http {
                    url: url.to_string(),
                    source: e,
                });
            }
        }
        if !status.is_success() {
            return Err(HarvestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| HarvestError::Http {
            url: url.to_string(),
            source: e,
        })?;

        if looks_blocked(&body) {
            return Err(HarvestError::Blocked {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(body)
    }

    /// Retires the current session: new client, new cookie jar
    pub fn rotate_session(&self) {
        match build_client(self.proxy_url.as_deref()) {
            Ok(fresh) => {
                *self.client.write().unwrap() = fresh;
                tracing::info!("session rotated after block signal");
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to rotate session, keeping old client");
            }
        }
    }
}

fn build_client(proxy_url: Option<&str>) -> Result<Client> {
    let mut builder = Client::builder()
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .timeout(Duration::from_secs(45))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = proxy_url {
        builder = builder.proxy(Proxy::all(proxy)?);
    }

    Ok(builder.build()?)
}

/// Heuristic block-page detection on a short body.
///
/// Real pages are long; block/captcha interstitials are short and carry one
/// of the marker words. Scanning only short bodies avoids false positives
/// from job descriptions that happen to mention these words.
fn looks_blocked(body: &str) -> bool {
    body.len() < 4096 && BLOCK_PATTERN.is_match(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referer_by_role() {
        assert_eq!(referer_for(Role::Detail), ALL_JOBS_URL);
        assert_eq!(referer_for(Role::List { page: 1 }), "https://careerviet.vn/");
    }

    #[test]
    fn test_block_pattern_detection() {
        assert!(looks_blocked("<html>Access Forbidden</html>"));
        assert!(looks_blocked("you have been blocked"));
        assert!(looks_blocked("please solve this CAPTCHA"));
        assert!(!looks_blocked("<html>normal listing page</html>"));
    }

    #[test]
    fn test_long_body_not_treated_as_blocked() {
        let mut body = "x".repeat(5000);
        body.push_str("captcha");
        assert!(!looks_blocked(&body));
    }

    #[test]
    fn test_build_client() {
        assert!(build_client(None).is_ok());
        assert!(build_client(Some("http://127.0.0.1:8080")).is_ok());
        assert!(build_client(Some("not a proxy")).is_err());
    }

    #[tokio::test]
    async fn test_fetch_success() {
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("referer", "https://careerviet.vn/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>listing</html>"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&HttpConfig::default()).unwrap();
        let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
        let body = fetcher.fetch(&url, Role::List { page: 1 }).await.unwrap();
        assert_eq!(body, "<html>listing</html>");
    }

    #[tokio::test]
    async fn test_fetch_blocked_status_is_terminal_after_retries() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&HttpConfig::default()).unwrap();
        let url = Url::parse(&server.uri()).unwrap();
        let err = fetcher.fetch(&url, Role::Detail).await.unwrap_err();
        assert!(matches!(err, HarvestError::Blocked { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_fetch_404_fails_immediately() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&HttpConfig::default()).unwrap();
        let url = Url::parse(&server.uri()).unwrap();
        let err = fetcher.fetch(&url, Role::Detail).await.unwrap_err();
        assert!(matches!(err, HarvestError::Status { status: 404, .. }));
    }
}
