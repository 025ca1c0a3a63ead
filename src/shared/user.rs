//! User record as returned by the `/auth` endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Full user record
///
/// Field names on the wire follow the backend's document store
/// (`_id`, `__v`, and the stored password hash under `password`).
/// Two records are equal when their ids are equal.
#[derive(Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    #[serde(rename = "password", default)]
    pub secret_hash: String,
    #[serde(rename = "__v", default)]
    pub version: i64,
}

impl UserRecord {
    /// "Firstname Lastname", falling back to the username when both are blank
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.firstname.trim(), self.lastname.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

impl PartialEq for UserRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for UserRecord {}

impl Hash for UserRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("firstname", &self.firstname)
            .field("lastname", &self.lastname)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("secret_hash", &"<redacted>")
            .field("version", &self.version)
            .finish()
    }
}
