use serde::{Deserialize, Serialize};

/// The provider taking the bookings, shown on every step and named on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Master {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}
