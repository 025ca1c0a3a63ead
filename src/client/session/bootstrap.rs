//! Login pipeline run off the UI thread.
//!
//! login → save tokens → fetch user detail. Each step reports back over
//! the attempt's own channel; the attempt ends after exactly one terminal
//! event (`UserLoaded`, `LoginFailed` or `UserDetailFailed`). A cancelled
//! attempt's receiver is dropped, so nothing it sends afterwards arrives.

use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::client::api::ApiClient;
use crate::client::error::ApiError;
use crate::shared::{Credentials, UserRecord};

/// Progress of one login attempt
#[derive(Debug, Clone)]
pub enum BootstrapEvent {
    /// Login succeeded and the token save has been issued
    TokensIssued { user_id: String, username: String },
    UserLoaded { user: UserRecord },
    LoginFailed { error: ApiError },
    UserDetailFailed { error: ApiError },
}

impl BootstrapEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::TokensIssued { .. })
    }
}

/// Runs the login pipeline for one attempt
#[derive(Debug, Clone)]
pub struct Bootstrapper {
    api: ApiClient,
}

impl Bootstrapper {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Run to completion, reporting progress on `events`
    ///
    /// A closed channel means the attempt was abandoned; remaining events
    /// are dropped silently.
    pub async fn run(self, attempt: Uuid, credentials: Credentials, events: UnboundedSender<BootstrapEvent>) {
        let response = match self.api.login(&credentials).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!("[AUTH] Login attempt {} failed: {}", attempt, error);
                let _ = events.send(BootstrapEvent::LoginFailed { error });
                return;
            }
        };

        self.api.tokens().save(&response.tokens());
        let _ = events.send(BootstrapEvent::TokensIssued {
            user_id: response.user_id.clone(),
            username: response.username.clone(),
        });

        let event = match self.api.fetch_user_detail(&response.user_id).await {
            Ok(user) => BootstrapEvent::UserLoaded { user },
            Err(error) => {
                tracing::warn!(
                    "[AUTH] Fetching details for '{}' failed: {}",
                    response.user_id,
                    error
                );
                BootstrapEvent::UserDetailFailed { error }
            }
        };
        let _ = events.send(event);
    }
}
