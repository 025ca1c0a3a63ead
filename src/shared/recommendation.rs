//! Home feed recommendations.

use serde::{Deserialize, Serialize};

/// A recommendation shown on the home feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub name: String,
    pub recommendation: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Body for `POST /recommendations`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecommendation {
    pub name: String,
    pub recommendation: String,
    pub image: Option<String>,
}
