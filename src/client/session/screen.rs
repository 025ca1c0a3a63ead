/**
 * Screens
 *
 * The screens the UI can show, keyed by the string ids the UI layer uses
 * ("login", "home", "conversation_<id>", ...). Which screen is actually
 * shown is decided by [`resolve`] from the session state and the screen the
 * user asked for.
 */

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::client::session::state::SessionState;

const CONVERSATION_PREFIX: &str = "conversation_";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,
    Register,
    ForgotPassword,
    Home,
    Profile,
    EditProfile,
    Camera,
    Chat,
    /// One chat thread, keyed by the other participant's id
    Conversation(String),
    Notification,
    Calendar,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown screen '{0}'")]
pub struct UnknownScreen(pub String);

impl Screen {
    pub fn id(&self) -> String {
        match self {
            Self::Conversation(peer) => format!("{}{}", CONVERSATION_PREFIX, peer),
            other => other.static_id().to_string(),
        }
    }

    fn static_id(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::ForgotPassword => "forgot_password",
            Self::Home => "home",
            Self::Profile => "profile",
            Self::EditProfile => "edit_profile",
            Self::Camera => "camera",
            Self::Chat => "chat",
            Self::Conversation(_) => "conversation",
            Self::Notification => "notification",
            Self::Calendar => "calendar",
        }
    }

    /// Screens reachable before logging in
    pub fn is_auth_flow(&self) -> bool {
        matches!(self, Self::Login | Self::Register | Self::ForgotPassword)
    }

    pub fn requires_auth(&self) -> bool {
        !self.is_auth_flow()
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

impl FromStr for Screen {
    type Err = UnknownScreen;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let screen = match s {
            "login" => Self::Login,
            "register" => Self::Register,
            "forgot_password" => Self::ForgotPassword,
            "home" => Self::Home,
            "profile" => Self::Profile,
            "edit_profile" => Self::EditProfile,
            "camera" => Self::Camera,
            "chat" => Self::Chat,
            "notification" => Self::Notification,
            "calendar" => Self::Calendar,
            other => match other.strip_prefix(CONVERSATION_PREFIX) {
                Some(peer) if !peer.is_empty() => Self::Conversation(peer.to_string()),
                _ => return Err(UnknownScreen(other.to_string())),
            },
        };
        Ok(screen)
    }
}

/// The screen to show for `state` when the user asked for `requested`
///
/// Authentication is decided by `state` alone: protected screens fall back
/// to `Login` unless logged in, and the auth flow is skipped once logged in.
pub fn resolve(state: &SessionState, requested: &Screen) -> Screen {
    match (state.is_authenticated(), requested.requires_auth()) {
        (false, true) => Screen::Login,
        (true, false) => Screen::Home,
        _ => requested.clone(),
    }
}
