/**
 * Authentication Types
 *
 * Request and response bodies for the `/auth` endpoints, plus the token
 * pair the client keeps between launches.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::error::SharedError;

/// Username/password pair typed into the login screen
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identifier: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    /// Both fields must be non-blank before a login can be submitted
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.identifier.trim().is_empty() || self.secret.trim().is_empty() {
            return Err(SharedError::validation(
                "credentials",
                "Username and password are required",
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Login request body
#[derive(Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl From<&Credentials> for LoginRequest {
    fn from(credentials: &Credentials) -> Self {
        Self {
            username: credentials.identifier.clone(),
            password: credentials.secret.clone(),
        }
    }
}

/// Login response body
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: String,
    pub username: String,
}

impl LoginResponse {
    pub fn tokens(&self) -> SessionTokens {
        SessionTokens {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

/// Access/refresh token pair issued by `/auth/login`
///
/// The refresh token is stored but never used: there is no renewal
/// path for an expired access token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl SessionTokens {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Sign up request body
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignupRequest {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub password: String,
    /// The backend expects the confirmation under this exact key
    #[serde(rename = "confirmpasSsingup")]
    pub confirm_password: String,
}

impl SignupRequest {
    /// Checks the registration form the same way the register screen does
    /// before anything is sent.
    pub fn validate(&self) -> Result<(), SharedError> {
        let required = [
            ("firstname", &self.firstname, "First name is required"),
            ("lastname", &self.lastname, "Last name is required"),
            ("username", &self.username, "Username is required"),
        ];
        for (field, value, message) in required {
            if value.trim().is_empty() {
                return Err(SharedError::validation(field, message));
            }
        }

        if self.email.is_empty() || self.password.is_empty() {
            return Err(SharedError::validation("email", "Email and password are required"));
        }

        if !self.email.contains('@') || !self.email.contains('.') {
            return Err(SharedError::validation("email", "Please enter a valid email address"));
        }

        if self.password != self.confirm_password {
            return Err(SharedError::validation("password", "Passwords do not match"));
        }

        Ok(())
    }
}

/// Forgot-password request body
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ForgotPasswordRequest {
    pub email: String,
}
