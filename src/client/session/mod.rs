//! # Session
//!
//! Owns everything the UI needs to know about who is logged in and which
//! screen to show. The UI thread calls into [`Session`]; network work runs on
//! spawned tokio tasks and reports back through a channel that the UI drains
//! with [`Session::poll`] (or awaits with [`Session::next_outcome`]).
//!
//! ## Login
//!
//! 1. [`Session::submit_login`] refuses a second attempt while one is in
//!    flight, then spawns the [`bootstrap`] pipeline.
//! 2. The pipeline logs in, saves the token pair, and fetches the user.
//! 3. Each event moves the [`state`] machine; the terminal one is returned
//!    from `poll` exactly once as a [`LoginOutcome`].
//!
//! Cancelling (explicitly, or by navigating anywhere but the login screen)
//! aborts the task and drops its channel, so a late result is never applied.
//!
//! ## Notices
//!
//! Every user-visible success or failure is queued as a [`Notice`]; the UI
//! shows them as toasts after calling [`Session::take_notices`].

pub mod bootstrap;
pub mod notice;
pub mod screen;
pub mod state;

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::client::api::ApiClient;
use crate::client::error::{ApiError, BootstrapError, SessionError};
use crate::shared::{Credentials, Recommendation, SessionTokens, SharedError, SignupRequest, UserRecord};

use bootstrap::{BootstrapEvent, Bootstrapper};
pub use notice::{Notice, NoticeLevel, NoticeLog};
pub use screen::{resolve, Screen, UnknownScreen};
pub use state::{SessionEvent, SessionState, TransitionError};

/// How a login attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn(UserRecord),
    Failed(BootstrapError),
}

#[derive(Debug)]
struct LoginAttempt {
    id: Uuid,
    events: UnboundedReceiver<BootstrapEvent>,
    handle: JoinHandle<()>,
}

/// Session state shared across the UI
#[derive(Debug)]
pub struct Session {
    api: ApiClient,
    state: SessionState,
    requested: Screen,
    pending: Option<LoginAttempt>,
    notices: NoticeLog,
}

impl Session {
    /// A logged-out session on the login screen
    ///
    /// Nothing is restored from the token store: a previous run's tokens
    /// stay on disk but do not log anyone in.
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: SessionState::LoggedOut,
            requested: Screen::Login,
            pending: None,
            notices: NoticeLog::default(),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_user(&self) -> Option<&UserRecord> {
        self.state.current_user()
    }

    pub fn requested_screen(&self) -> &Screen {
        &self.requested
    }

    /// The screen the UI should render now
    pub fn current_screen(&self) -> Screen {
        resolve(&self.state, &self.requested)
    }

    pub fn is_login_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn stored_tokens(&self) -> Option<SessionTokens> {
        self.api.tokens().load()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// Start a login attempt in the background
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit_login(&mut self, credentials: Credentials) -> Result<Uuid, SessionError> {
        if self.pending.is_some() {
            return Err(SessionError::LoginInFlight);
        }
        if self.state != SessionState::LoggedOut {
            return Err(SessionError::AlreadyLoggedIn);
        }
        if let Err(e) = credentials.validate() {
            self.notices.error(e.user_message());
            return Err(e.into());
        }

        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        let bootstrapper = Bootstrapper::new(self.api.clone());
        let handle = tokio::spawn(bootstrapper.run(id, credentials, tx));

        tracing::info!("[SESSION] Login attempt {} started", id);
        self.pending = Some(LoginAttempt {
            id,
            events: rx,
            handle,
        });
        Ok(id)
    }

    /// Apply whatever the login task has reported so far without waiting
    ///
    /// Returns the outcome once, when the attempt finishes.
    pub fn poll(&mut self) -> Option<LoginOutcome> {
        loop {
            let attempt = self.pending.as_mut()?;
            match attempt.events.try_recv() {
                Ok(event) => {
                    if let Some(outcome) = self.handle_event(event) {
                        return Some(outcome);
                    }
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => return Some(self.interrupted()),
            }
        }
    }

    /// Wait for the pending attempt to finish; `None` if nothing is pending
    pub async fn next_outcome(&mut self) -> Option<LoginOutcome> {
        loop {
            let attempt = self.pending.as_mut()?;
            match attempt.events.recv().await {
                Some(event) => {
                    if let Some(outcome) = self.handle_event(event) {
                        return Some(outcome);
                    }
                }
                None => return Some(self.interrupted()),
            }
        }
    }

    /// Submit and wait: the whole bootstrap as one call
    pub async fn login(&mut self, credentials: Credentials) -> Result<UserRecord, SessionError> {
        self.submit_login(credentials)?;
        match self.next_outcome().await {
            Some(LoginOutcome::LoggedIn(user)) => Ok(user),
            Some(LoginOutcome::Failed(e)) => Err(e.into()),
            None => Err(BootstrapError::Interrupted.into()),
        }
    }

    /// Abandon the in-flight attempt; anything it reports later is ignored
    pub fn cancel_login(&mut self) -> Result<(), SessionError> {
        let attempt = self.pending.take().ok_or(SessionError::NoLoginPending)?;
        attempt.handle.abort();
        tracing::info!("[SESSION] Login attempt {} cancelled", attempt.id);

        if matches!(self.state, SessionState::AwaitingUserDetail { .. }) {
            self.state.apply(SessionEvent::UserDetailFailed)?;
        }
        Ok(())
    }

    /// Ask for a screen; leaving the login screen abandons a pending login
    pub fn navigate(&mut self, screen: Screen) {
        if self.pending.is_some() && screen != Screen::Login {
            tracing::info!("[SESSION] Navigated to '{}' during login, abandoning attempt", screen);
            let _ = self.cancel_login();
        }
        if screen.requires_auth() && !self.state.is_authenticated() {
            self.notices.error("Please log in to continue");
        }
        self.requested = screen;
    }

    /// Forget the current user and return to the login screen
    ///
    /// Stored tokens are left in place.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        if !self.state.is_authenticated() {
            return Err(SessionError::NotLoggedIn);
        }
        self.state.apply(SessionEvent::LoggedOut)?;
        self.requested = Screen::Login;
        tracing::info!("[SESSION] Logged out");
        Ok(())
    }

    pub async fn sign_up(&mut self, form: SignupRequest) -> Result<UserRecord, SessionError> {
        if let Err(e) = form.validate() {
            self.notices.error(e.user_message());
            return Err(e.into());
        }

        match self.api.sign_up(&form).await {
            Ok(user) => {
                self.notices.info("User registered successfully!");
                self.requested = Screen::Login;
                Ok(user)
            }
            Err(error) => {
                let message = match &error {
                    ApiError::EmptyResponseBody => "Unexpected error: No user returned".to_string(),
                    ApiError::HttpError { status, message } => {
                        format!("Registration failed: {} - {}", status, message)
                    }
                    ApiError::NetworkError { message } => format!("Network error: {}", message),
                };
                self.notices.error(message);
                Err(error.into())
            }
        }
    }

    pub async fn send_forgot_password(&mut self, email: &str) -> Result<(), SessionError> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            let e = SharedError::validation("email", "Please enter a valid email address");
            self.notices.error(e.user_message());
            return Err(e.into());
        }

        match self.api.forgot_password(email).await {
            Ok(()) => {
                self.notices.info("Password reset email sent.");
                self.requested = Screen::Login;
                Ok(())
            }
            Err(error) => {
                self.notices.error("Failed to send reset email. Please try again.");
                Err(error.into())
            }
        }
    }

    /// Reload the logged-in user from `/auth/profile`
    pub async fn refresh_profile(&mut self) -> Result<UserRecord, SessionError> {
        if !self.state.is_authenticated() {
            return Err(SessionError::NotLoggedIn);
        }
        let user = match self.api.profile().await {
            Ok(user) => user,
            Err(error) => {
                self.notices.error(format!("Failed to load profile: {}", error));
                return Err(error.into());
            }
        };
        self.state.apply(SessionEvent::ProfileUpdated(user.clone()))?;
        Ok(user)
    }

    /// Replace the logged-in user after a local edit, then show the profile
    pub fn update_current_user(&mut self, user: UserRecord) -> Result<(), SessionError> {
        if !self.state.is_authenticated() {
            return Err(SessionError::NotLoggedIn);
        }
        self.state.apply(SessionEvent::ProfileUpdated(user))?;
        self.requested = Screen::Profile;
        Ok(())
    }

    /// Recommendations for the home screen
    pub async fn home_feed(&mut self) -> Result<Vec<Recommendation>, SessionError> {
        if !self.state.is_authenticated() {
            return Err(SessionError::NotLoggedIn);
        }
        self.api.recommendations().await.map_err(|error| {
            self.notices.error("Failed to load recommendations.");
            error.into()
        })
    }

    fn handle_event(&mut self, event: BootstrapEvent) -> Option<LoginOutcome> {
        if event.is_terminal() {
            self.pending = None;
        }

        match event {
            BootstrapEvent::TokensIssued { user_id, username } => {
                tracing::info!("[SESSION] Tokens issued for '{}'", username);
                self.notices.info("Login Successful!");
                if let Err(e) = self.state.apply(SessionEvent::LoginSucceeded { user_id }) {
                    tracing::error!("[SESSION] {}", e);
                }
                None
            }
            BootstrapEvent::UserLoaded { user } => {
                match self.state.apply(SessionEvent::UserDetailLoaded(user.clone())) {
                    Ok(()) => {
                        self.notices.info(format!("Welcome {}!", user.username));
                        self.requested = Screen::Home;
                        Some(LoginOutcome::LoggedIn(user))
                    }
                    Err(e) => {
                        tracing::error!("[SESSION] {}", e);
                        self.notices.error("Login failed");
                        Some(LoginOutcome::Failed(BootstrapError::Interrupted))
                    }
                }
            }
            BootstrapEvent::LoginFailed { error } => {
                self.notices.error(login_failure_message(&error));
                Some(LoginOutcome::Failed(BootstrapError::Login(error)))
            }
            BootstrapEvent::UserDetailFailed { error } => {
                if let Err(e) = self.state.apply(SessionEvent::UserDetailFailed) {
                    tracing::error!("[SESSION] {}", e);
                }
                self.notices.error("Failed to fetch user details");
                self.requested = Screen::Login;
                Some(LoginOutcome::Failed(BootstrapError::UserDetail(error)))
            }
        }
    }

    /// The login task went away without a terminal event
    fn interrupted(&mut self) -> LoginOutcome {
        self.pending = None;
        if matches!(self.state, SessionState::AwaitingUserDetail { .. }) {
            let _ = self.state.apply(SessionEvent::UserDetailFailed);
        }
        tracing::error!("[SESSION] Login task ended without an outcome");
        self.notices.error("Login failed");
        LoginOutcome::Failed(BootstrapError::Interrupted)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(attempt) = self.pending.take() {
            attempt.handle.abort();
        }
    }
}

fn login_failure_message(error: &ApiError) -> String {
    match error {
        ApiError::EmptyResponseBody => "Login response is empty".to_string(),
        ApiError::HttpError { message, .. } => format!("Login Failed: {}", message),
        ApiError::NetworkError { message } => format!("Error: {}", message),
    }
}
