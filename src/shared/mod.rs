//! Shared Module
//!
//! Data types exchanged with the backend and the configuration/error types
//! every other module builds on. Nothing in here performs I/O apart from
//! reading a configuration file.

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Login, signup and token types
pub mod auth;

/// User record
pub mod user;

/// Home feed recommendations
pub mod recommendation;

/// Re-export commonly used types for convenience
pub use auth::{Credentials, ForgotPasswordRequest, LoginRequest, LoginResponse, SessionTokens, SignupRequest};
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::SharedError;
pub use recommendation::{CreateRecommendation, Recommendation};
pub use user::UserRecord;
