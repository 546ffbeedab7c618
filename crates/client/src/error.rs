// crates/client/src/error.rs
use thiserror::Error;

/// Why a session fetch failed.
///
/// HTTP status failures are kept apart from transport failures so a
/// caller can tell a rejecting server from an unreachable one. Both
/// kinds are retried the same way by the feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The server answered with a non-success status code.
    #[error("server returned HTTP {status}")]
    Http { status: u16 },

    /// The request never produced a usable response (connect, timeout,
    /// or body decode failure).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl FeedError {
    /// True for connect and timeout failures, the usual offline signature.
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect() || e.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_failure_is_not_offline() {
        let err = FeedError::Http { status: 500 };
        assert!(!err.is_offline());
        assert_eq!(err.to_string(), "server returned HTTP 500");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_offline() {
        // Nothing listens on the discard port; refused or timed out,
        // both count as offline.
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:9/")
            .timeout(std::time::Duration::from_millis(200))
            .send()
            .await
            .unwrap_err();
        assert!(FeedError::from(err).is_offline());
    }
}
