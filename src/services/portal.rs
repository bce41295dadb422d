use std::time::Duration;

use reqwest::{redirect, Client};

use crate::config::PortalConfig;

/// Desktop Chrome user agent the portal expects to see on every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/137.0.0.0 Safari/537.36";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Redirect hops allowed when fetching portal pages.
const MAX_PAGE_REDIRECTS: usize = 10;

/// HTTP clients bound to one portal.
///
/// The login client never follows redirects: the session cookie is only
/// exposed on the 302 response itself. The page client follows them like a
/// browser would. Neither keeps a cookie store, so nothing leaks between
/// requests that share them.
#[derive(Debug, Clone)]
pub struct PortalClient {
    login_http: Client,
    page_http: Client,
    config: PortalConfig,
}

impl PortalClient {
    pub fn new(config: PortalConfig) -> Result<Self, reqwest::Error> {
        let login_http = build_client(&config, redirect::Policy::none())?;
        let page_http = build_client(&config, redirect::Policy::limited(MAX_PAGE_REDIRECTS))?;

        Ok(Self {
            login_http,
            page_http,
            config,
        })
    }

    /// Client for the login form post. Redirects are returned, not followed.
    pub fn login_http(&self) -> &Client {
        &self.login_http
    }

    /// Client for authenticated page fetches. Redirects are followed.
    pub fn page_http(&self) -> &Client {
        &self.page_http
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }
}

fn build_client(config: &PortalConfig, policy: redirect::Policy) -> Result<Client, reqwest::Error> {
    Client::builder()
        .redirect(policy)
        .timeout(config.timeout())
        .connect_timeout(CONNECT_TIMEOUT.min(config.timeout()))
        .build()
}
