//! Session state machine.
//!
//! ```text
//! LoggedOut --LoginSucceeded--> AwaitingUserDetail --UserDetailLoaded--> LoggedIn
//!                               AwaitingUserDetail --UserDetailFailed--> LoggedOut
//! LoggedIn  --ProfileUpdated--> LoggedIn
//! LoggedIn  --LoggedOut-------> LoggedOut
//! ```
//!
//! Anything else is rejected and leaves the state untouched.

use thiserror::Error;

use crate::shared::UserRecord;

/// Where the session is in the bootstrap sequence
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    LoggedOut,
    /// Tokens were issued; the user record has not arrived yet
    AwaitingUserDetail { user_id: String },
    LoggedIn(UserRecord),
}

/// Inputs to the session state machine
#[derive(Debug, Clone)]
pub enum SessionEvent {
    LoginSucceeded { user_id: String },
    UserDetailLoaded(UserRecord),
    UserDetailFailed,
    /// Replace the logged-in record with a newer copy of the same user
    ProfileUpdated(UserRecord),
    LoggedOut,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoginSucceeded { .. } => "login_succeeded",
            Self::UserDetailLoaded(_) => "user_detail_loaded",
            Self::UserDetailFailed => "user_detail_failed",
            Self::ProfileUpdated(_) => "profile_updated",
            Self::LoggedOut => "logged_out",
        }
    }
}

/// An event that is not valid in the current state
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot apply '{event}' while {state}")]
pub struct TransitionError {
    pub state: &'static str,
    pub event: &'static str,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoggedOut => "logged_out",
            Self::AwaitingUserDetail { .. } => "awaiting_user_detail",
            Self::LoggedIn(_) => "logged_in",
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::LoggedIn(_))
    }

    pub fn current_user(&self) -> Option<&UserRecord> {
        match self {
            Self::LoggedIn(user) => Some(user),
            _ => None,
        }
    }

    /// Apply `event`, or leave the state unchanged and report why not
    pub fn apply(&mut self, event: SessionEvent) -> Result<(), TransitionError> {
        let rejected = TransitionError {
            state: self.name(),
            event: event.name(),
        };

        let next = match (&*self, event) {
            (Self::LoggedOut, SessionEvent::LoginSucceeded { user_id }) => {
                Self::AwaitingUserDetail { user_id }
            }
            (Self::AwaitingUserDetail { user_id }, SessionEvent::UserDetailLoaded(user)) => {
                if &user.id != user_id {
                    tracing::warn!(
                        "[SESSION] Login reported user '{}' but details are for '{}'",
                        user_id,
                        user.id
                    );
                }
                Self::LoggedIn(user)
            }
            (Self::AwaitingUserDetail { .. }, SessionEvent::UserDetailFailed) => Self::LoggedOut,
            (Self::LoggedIn(current), SessionEvent::ProfileUpdated(user)) if current.id == user.id => {
                Self::LoggedIn(user)
            }
            (Self::LoggedIn(_), SessionEvent::LoggedOut) => Self::LoggedOut,
            _ => return Err(rejected),
        };

        tracing::debug!("[SESSION] {} -> {}", self.name(), next.name());
        *self = next;
        Ok(())
    }
}
