//! Client Module
//!
//! Everything the app needs to talk to the backend and track who is
//! logged in. Rendering is left to the UI layer, which only sees
//! [`Screen`]s and [`Notice`]s.
//!
//! # Architecture
//!
//! - **`config`** - server URL, timeout, data directory
//! - **`api`** - REST client with bearer-token decoration
//! - **`token_store`** - durable access/refresh token storage
//! - **`session`** - session state machine, login pipeline, navigation
//! - **`error`** - error taxonomy for all of the above
//! - **`main`** - headless driver binary
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use projet_client::client::{ApiClient, Config, Session, SqlitePreferences, TokenStore};
//! use projet_client::shared::Credentials;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let prefs = Arc::new(SqlitePreferences::open_auth(&config).await?);
//! let api = ApiClient::new(config, TokenStore::new(prefs.clone()))?;
//!
//! let mut session = Session::new(api);
//! let user = session.login(Credentials::new("alice", "secret1")).await?;
//! println!("Welcome {}!", user.username);
//! prefs.flush().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod token_store;

// Re-export commonly used types
pub use api::ApiClient;
pub use config::Config;
pub use error::{ApiError, BootstrapError, SessionError, StoreError};
pub use session::{LoginOutcome, Notice, NoticeLevel, Screen, Session, SessionState};
pub use token_store::{MemoryPreferences, Preferences, SqlitePreferences, TokenStore};
