use reqwest::{
    header::{HeaderMap, ORIGIN, REFERER, SET_COOKIE, USER_AGENT},
    StatusCode,
};
use secrecy::ExposeSecret;

use crate::models::credentials::{Credentials, SessionToken};
use crate::services::portal::{PortalClient, BROWSER_USER_AGENT};

/// Value of the login form's submit button.
const SUBMIT_MARKER: &str = "Entrar";

#[derive(thiserror::Error, Debug)]
pub enum AuthenticatorError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Portal rejected the login: HTTP {0}")]
    Rejected(StatusCode),

    #[error("Portal redirected without issuing a session cookie")]
    SessionCookieMissing,

    #[error("Portal unavailable: HTTP {0}")]
    UpstreamStatus(StatusCode),
}

/// Logs in to the portal and returns the session cookie it issues.
///
/// Success requires both a `302 Found` and a `Set-Cookie` header on that
/// same response. Any other status below 500 means the credentials were
/// refused.
#[tracing::instrument(skip_all)]
pub async fn authenticate(
    portal: &PortalClient,
    credentials: &Credentials,
) -> Result<SessionToken, AuthenticatorError> {
    let config = portal.config();

    tracing::debug!(url = %config.login_url(), "Submitting portal login");

    let form = [
        ("user", credentials.username.as_str()),
        ("password", credentials.password.expose_secret().as_str()),
        ("submit", SUBMIT_MARKER),
    ];

    let response = portal
        .login_http()
        .post(config.login_url())
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .header(REFERER, config.landing_url())
        .header(ORIGIN, config.origin())
        .form(&form)
        .send()
        .await?;

    check_login_status(response.status())?;

    let cookie = session_cookie(response.headers()).ok_or_else(|| {
        tracing::error!("Portal redirected without a Set-Cookie header");
        AuthenticatorError::SessionCookieMissing
    })?;

    tracing::info!("Portal login succeeded");

    Ok(SessionToken::new(cookie))
}

/// Anything from 500 up, nonstandard codes included, is the portal failing.
fn check_login_status(status: StatusCode) -> Result<(), AuthenticatorError> {
    if status.as_u16() >= 500 {
        tracing::error!(status = %status, "Portal login endpoint failed");
        return Err(AuthenticatorError::UpstreamStatus(status));
    }

    if status != StatusCode::FOUND {
        tracing::warn!(status = %status, "Portal login rejected");
        return Err(AuthenticatorError::Rejected(status));
    }

    Ok(())
}

/// Returns the `name=value` pair of the first `Set-Cookie` header, dropping
/// attributes such as `path` or `HttpOnly`.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(SET_COOKIE)?.to_str().ok()?;
    let pair = raw.split(';').next()?.trim();

    match pair.split_once('=') {
        Some((name, _)) if !name.trim().is_empty() => Some(pair.to_string()),
        _ => None,
    }
}
