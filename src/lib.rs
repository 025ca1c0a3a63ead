//! projet-client - Session Bootstrap Library
//!
//! Client-side core of the projet mobile app: logging in against the REST
//! backend, keeping the issued tokens on disk, loading the user, and
//! deciding which screen the UI should show.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire types and configuration
//!   - Login/signup request and response bodies, user record, feed items
//!   - Application configuration and shared error types
//!
//! - **`client`** - Everything that performs I/O
//!   - REST client with bearer-token decoration
//!   - SQLite-backed token store
//!   - Session state machine and login pipeline
//!
//! # Session Bootstrap
//!
//! ```text
//! credentials ──POST /auth/login──▶ tokens ──save──▶ token store
//!                                      │
//!                                      └──GET /auth/{id}──▶ user ──▶ LoggedIn
//! ```
//!
//! A failure at either request leaves the session logged out with a notice
//! for the user. Nothing is retried. The access token is never refreshed.
//!
//! # Thread Safety
//!
//! - `Session` is owned by the UI thread and mutated only through `&mut self`
//! - Login work runs on a spawned tokio task and reports back over a channel
//! - `TokenStore` is `Clone + Send + Sync`; disk writes go through a single writer task
//!
//! # Error Handling
//!
//! - `shared::SharedError` for validation and (de)serialization
//! - `client::ApiError` for REST failures: empty body, HTTP status, transport
//! - `client::SessionError` for everything the session can refuse

/// Wire types, configuration and shared errors
pub mod shared;

/// REST client, token storage and session
pub mod client;
