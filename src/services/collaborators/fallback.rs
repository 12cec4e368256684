use async_trait::async_trait;
use chrono::NaiveDate;

use super::{BusySlotSource, ServiceCatalog};
use crate::models::{BusySet, Master, Service};
use crate::services::availability::placeholder_busy;

/// Two demo services shown when the real catalog cannot be loaded.
pub fn default_services() -> Vec<Service> {
    vec![
        Service {
            id: "1".to_string(),
            name: "Classic manicure".to_string(),
            description: Some("Nail shaping, cuticle care and a regular polish".to_string()),
            price: 1500,
            duration_minutes: 60,
            is_active: true,
            is_popular: false,
        },
        Service {
            id: "2".to_string(),
            name: "Gel polish".to_string(),
            description: Some("Long-lasting gel coating".to_string()),
            price: 2200,
            duration_minutes: 90,
            is_active: true,
            is_popular: true,
        },
    ]
}

/// Shown whenever the catalog has no provider profile to offer.
pub fn default_master() -> Master {
    Master {
        name: "Anna Smirnova".to_string(),
        description: Some("Manicure master".to_string()),
    }
}

/// Demo catalog for running without any service table.
pub struct DefaultCatalog;

#[async_trait]
impl ServiceCatalog for DefaultCatalog {
    async fn active_services(&self) -> anyhow::Result<Vec<Service>> {
        Ok(default_services())
    }

    async fn master(&self) -> anyhow::Result<Option<Master>> {
        Ok(Some(default_master()))
    }
}

/// Deterministic fake busy slots for demos without a booking store.
pub struct PlaceholderBusySource;

#[async_trait]
impl BusySlotSource for PlaceholderBusySource {
    async fn busy_slots(&self, date: NaiveDate) -> anyhow::Result<BusySet> {
        Ok(placeholder_busy(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::arrange_catalog;

    #[test]
    fn test_default_services_popular_first() {
        let arranged = arrange_catalog(default_services());
        assert_eq!(arranged[0].name, "Gel polish");
        assert_eq!(arranged[1].name, "Classic manicure");
    }

    #[tokio::test]
    async fn test_default_catalog_is_read_only() {
        let catalog = DefaultCatalog;
        assert_eq!(catalog.active_services().await.unwrap().len(), 2);
        assert!(catalog.replace_services(&[]).await.is_err());
        assert_eq!(catalog.master().await.unwrap(), Some(default_master()));
    }

    #[tokio::test]
    async fn test_placeholder_source_matches_placeholder_busy() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 3).unwrap();
        let busy = PlaceholderBusySource.busy_slots(date).await.unwrap();
        assert_eq!(busy, placeholder_busy(date));
    }
}
