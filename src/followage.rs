//! Follow-age lookup against an external HTTP service.
//!
//! The service answers `GET {base}/{channel}/{user}?precision=N` with a plain
//! text body: either a human-readable duration or the sentinel
//! `Follow not found`.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Body returned by the service when the user doesn't follow the channel.
pub const NOT_FOLLOWING: &str = "Follow not found";

/// Outcome of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowAge {
    /// The user follows the channel; the duration as reported by the service.
    Following(String),
    NotFollowing,
}

impl FollowAge {
    /// Interpret a raw response body.
    pub fn from_body(body: &str) -> Self {
        let body = body.trim();
        if body == NOT_FOLLOWING {
            Self::NotFollowing
        } else {
            Self::Following(body.to_string())
        }
    }
}

/// Follow-age lookup errors.
#[derive(Debug, Error)]
pub enum FollowAgeError {
    #[error("follow-age request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Anything that can answer "how long has `user` followed `channel`".
#[async_trait]
pub trait FollowAgeLookup: Send + Sync {
    async fn follow_age(&self, channel: &str, user: &str) -> Result<FollowAge, FollowAgeError>;
}

/// [`FollowAgeLookup`] backed by the HTTP service.
pub struct HttpFollowAge {
    http_client: reqwest::Client,
    base_url: String,
    precision: u8,
}

impl HttpFollowAge {
    /// Create a client. `timeout` of `None` waits for the service indefinitely.
    pub fn new(base_url: &str, precision: u8, timeout: Option<Duration>) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            precision,
        }
    }

    fn url(&self, channel: &str, user: &str) -> String {
        format!(
            "{}/{}/{}?precision={}",
            self.base_url, channel, user, self.precision
        )
    }
}

#[async_trait]
impl FollowAgeLookup for HttpFollowAge {
    async fn follow_age(&self, channel: &str, user: &str) -> Result<FollowAge, FollowAgeError> {
        let url = self.url(channel, user);
        debug!(url = %url, "Looking up follow age");

        let body = self
            .http_client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(FollowAge::from_body(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve a single HTTP response and hand back the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            request
        });

        (format!("http://{}", addr), handle)
    }

    #[test]
    fn test_from_body() {
        assert_eq!(FollowAge::from_body("Follow not found"), FollowAge::NotFollowing);
        assert_eq!(
            FollowAge::from_body("1 year, 2 months\n"),
            FollowAge::Following("1 year, 2 months".to_string())
        );
    }

    #[tokio::test]
    async fn test_lookup_following() {
        let (base, server) = serve_once("200 OK", "2 years, 3 months, 1 week, 4 days").await;
        let lookup = HttpFollowAge::new(&base, 4, Some(Duration::from_secs(5)));

        let result = lookup.follow_age("curi", "bob").await.unwrap();
        assert_eq!(
            result,
            FollowAge::Following("2 years, 3 months, 1 week, 4 days".to_string())
        );

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /curi/bob?precision=4 "));
    }

    #[tokio::test]
    async fn test_lookup_not_following() {
        let (base, server) = serve_once("200 OK", "Follow not found").await;
        let lookup = HttpFollowAge::new(&format!("{}/", base), 4, None);

        let result = lookup.follow_age("curi", "alice").await.unwrap();
        assert_eq!(result, FollowAge::NotFollowing);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_lookup_server_error() {
        let (base, server) = serve_once("500 Internal Server Error", "boom").await;
        let lookup = HttpFollowAge::new(&base, 4, None);

        assert!(lookup.follow_age("curi", "alice").await.is_err());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_lookup_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let lookup = HttpFollowAge::new(&format!("http://{}", addr), 4, None);
        assert!(lookup.follow_age("curi", "alice").await.is_err());
    }
}
