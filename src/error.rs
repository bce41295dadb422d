use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::{authenticator::AuthenticatorError, card_extractor::CardExtractorError};

pub const MSG_INVALID_INPUT: &str = "Usuário e senha são obrigatórios.";
pub const MSG_AUTHENTICATION_FAILED: &str = "Login falhou. Usuário ou senha inválidos.";
pub const MSG_SESSION_COOKIE_MISSING: &str = "Não foi possível obter o cookie de sessão.";
pub const MSG_INTERNAL: &str = "Ocorreu um erro interno ao processar a solicitação.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Session cookie missing")]
    SessionCookieMissing,

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Unexpected failure: {0}")]
    UnexpectedFailure(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            AppError::SessionCookieMissing
            | AppError::UpstreamUnavailable(_)
            | AppError::UnexpectedFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the caller. Internal detail stays in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => MSG_INVALID_INPUT,
            AppError::AuthenticationFailed => MSG_AUTHENTICATION_FAILED,
            AppError::SessionCookieMissing => MSG_SESSION_COOKIE_MISSING,
            AppError::UpstreamUnavailable(_) | AppError::UnexpectedFailure(_) => MSG_INTERNAL,
        }
    }
}

impl From<AuthenticatorError> for AppError {
    fn from(err: AuthenticatorError) -> Self {
        match err {
            AuthenticatorError::Rejected(_) => AppError::AuthenticationFailed,
            AuthenticatorError::SessionCookieMissing => AppError::SessionCookieMissing,
            AuthenticatorError::HttpError(_) | AuthenticatorError::UpstreamStatus(_) => {
                AppError::UpstreamUnavailable(err.to_string())
            }
        }
    }
}

impl From<CardExtractorError> for AppError {
    fn from(err: CardExtractorError) -> Self {
        match err {
            CardExtractorError::HttpError(_) => AppError::UpstreamUnavailable(err.to_string()),
            CardExtractorError::UpstreamStatus(_) => AppError::UnexpectedFailure(err.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let body = Json(json!({
            "error": self.public_message(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::InvalidInput("user".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::AuthenticationFailed.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::SessionCookieMissing.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::UpstreamUnavailable("timeout".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_authenticator_errors_map_to_taxonomy() {
        assert!(matches!(
            AppError::from(AuthenticatorError::Rejected(reqwest::StatusCode::FORBIDDEN)),
            AppError::AuthenticationFailed
        ));
        assert!(matches!(
            AppError::from(AuthenticatorError::SessionCookieMissing),
            AppError::SessionCookieMissing
        ));
        assert!(matches!(
            AppError::from(AuthenticatorError::UpstreamStatus(reqwest::StatusCode::BAD_GATEWAY)),
            AppError::UpstreamUnavailable(_)
        ));
    }

    #[test]
    fn test_card_page_status_is_unexpected_failure() {
        let err = AppError::from(CardExtractorError::UpstreamStatus(reqwest::StatusCode::FOUND));
        assert!(matches!(err, AppError::UnexpectedFailure(_)));
        assert_eq!(err.public_message(), MSG_INTERNAL);
    }
}
