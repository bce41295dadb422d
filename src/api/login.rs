use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::api::state::AppState;
use crate::error::{AppError, Result};
use crate::models::{card::CardRecord, credentials::Credentials};
use crate::services::{authenticator, card_extractor};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<Secret<String>>,
}

impl LoginRequest {
    /// Both fields must be present and non-empty.
    pub fn into_credentials(self) -> Result<Credentials> {
        let username = self.user.filter(|user| !user.is_empty());
        let password = self
            .password
            .filter(|password| !password.expose_secret().is_empty());

        match (username, password) {
            (Some(username), Some(password)) => Ok(Credentials { username, password }),
            (None, _) => Err(AppError::InvalidInput("user is required".to_string())),
            (_, None) => Err(AppError::InvalidInput("password is required".to_string())),
        }
    }
}

/// Logs in to the portal on the caller's behalf and returns their card.
async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<CardRecord>> {
    let Json(request) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let credentials = request.into_credentials()?;

    let token = authenticator::authenticate(&state.portal, &credentials).await?;
    let card = card_extractor::extract(&state.portal, &token).await?;

    tracing::info!("Card retrieved");

    Ok(Json(card))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/login", post(login))
}
