//! Integration tests for the Greengrocer API.
//!
//! The tests in `tests/` drive a running server over HTTP and are marked
//! `#[ignore]` so `cargo test` stays hermetic.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and the API server, then:
//! GREENGROCER_API_URL=http://127.0.0.1:3000 cargo test -p greengrocer-integration-tests -- --ignored
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

/// Shared context for driving the API over HTTP.
pub struct TestContext {
    pub client: reqwest::Client,
    pub base_url: String,
}

impl TestContext {
    /// Build a context pointing at the server under test.
    ///
    /// Reads `GREENGROCER_API_URL`, defaulting to `http://127.0.0.1:3000`.
    #[must_use]
    pub fn new() -> Self {
        let base_url = std::env::var("GREENGROCER_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());

        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A suffix unique to this process instant, for emails/usernames that must
/// not collide across test runs against a shared database.
#[must_use]
pub fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    format!("{nanos:x}")
}
