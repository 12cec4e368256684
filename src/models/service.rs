use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Whole currency units.
    pub price: i64,
    pub duration_minutes: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_popular: bool,
}

fn default_true() -> bool {
    true
}

/// Drops inactive services and orders the rest popular-first, then by name.
pub fn arrange_catalog(services: Vec<Service>) -> Vec<Service> {
    let mut active: Vec<Service> = services.into_iter().filter(|s| s.is_active).collect();
    active.sort_by(|a, b| {
        b.is_popular
            .cmp(&a.is_popular)
            .then_with(|| a.name.cmp(&b.name))
    });
    active
}
