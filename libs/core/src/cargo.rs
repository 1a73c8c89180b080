use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// One tracked shipment, serialized with the admin API field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub goods_id: String,
    pub location: String,
    pub status: String,
    pub estimated_arrival: String,
}

impl ShipmentRecord {
    pub fn new(
        goods_id: impl Into<String>,
        location: impl Into<String>,
        status: impl Into<String>,
        estimated_arrival: impl Into<String>,
    ) -> Self {
        Self {
            goods_id: goods_id.into(),
            location: location.into(),
            status: status.into(),
            estimated_arrival: estimated_arrival.into(),
        }
    }
}

/// Partial edit; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentUpdate {
    #[serde(default)]
    pub goods_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_arrival: Option<String>,
}

/// Record state before and after an applied update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentChange {
    pub before: ShipmentRecord,
    pub after: ShipmentRecord,
}

impl ShipmentChange {
    pub fn location_changed(&self) -> bool {
        self.before.location != self.after.location
    }

    pub fn status_changed(&self) -> bool {
        self.before.status != self.after.status
    }

    /// Subscribers hear about location and status moves only.
    pub fn notifies_subscribers(&self) -> bool {
        self.location_changed() || self.status_changed()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid seed file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate goods_id in seed data: {0}")]
    Duplicate(String),
}

/// Shipments loaded at start-up, kept in seed order. Records are edited in
/// place and never removed.
#[derive(Debug)]
pub struct CargoRegistry {
    records: RwLock<Vec<ShipmentRecord>>,
}

impl Default for CargoRegistry {
    fn default() -> Self {
        Self {
            records: RwLock::new(default_seed()),
        }
    }
}

impl CargoRegistry {
    pub fn new(records: Vec<ShipmentRecord>) -> Result<Self, SeedError> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.goods_id.as_str()) {
                return Err(SeedError::Duplicate(record.goods_id.clone()));
            }
        }
        Ok(Self {
            records: RwLock::new(records),
        })
    }

    /// Loads a JSON array of shipment records.
    pub fn from_seed_file(path: &Path) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let records: Vec<ShipmentRecord> =
            serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::new(records)
    }

    pub async fn list(&self) -> Vec<ShipmentRecord> {
        self.records.read().await.clone()
    }

    /// Exact match on the trimmed id.
    pub async fn find(&self, goods_id: &str) -> Option<ShipmentRecord> {
        let goods_id = goods_id.trim();
        self.records
            .read()
            .await
            .iter()
            .find(|record| record.goods_id == goods_id)
            .cloned()
    }

    /// Applies the provided fields; `None` when the id is unknown.
    pub async fn apply(&self, update: &ShipmentUpdate) -> Option<ShipmentChange> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|record| record.goods_id == update.goods_id)?;
        let before = record.clone();
        if let Some(location) = &update.location {
            record.location = location.clone();
        }
        if let Some(status) = &update.status {
            record.status = status.clone();
        }
        if let Some(eta) = &update.estimated_arrival {
            record.estimated_arrival = eta.clone();
        }
        Some(ShipmentChange {
            before,
            after: record.clone(),
        })
    }
}

/// Built-in demo shipments used when no seed file is configured.
pub fn default_seed() -> Vec<ShipmentRecord> {
    vec![
        ShipmentRecord::new("12345", "Эрээн агуулах", "Ачигдсан", "2024-07-05"),
        ShipmentRecord::new("23456", "Замын-Үүд", "Гааль дээр", "2024-07-03"),
        ShipmentRecord::new("34567", "Улаанбаатар", "Замд яваа", "2024-07-02"),
        ShipmentRecord::new("45678", "Эрдэнэт салбар", "Ирсэн", "2024-06-30"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_trims_the_key() {
        let registry = CargoRegistry::default();
        let found = registry.find(" 12345\n").await.expect("seeded record");
        assert_eq!(found.goods_id, "12345");
        assert!(registry.find("99999").await.is_none());
    }

    #[tokio::test]
    async fn apply_only_touches_provided_fields() {
        let registry = CargoRegistry::default();
        let change = registry
            .apply(&ShipmentUpdate {
                goods_id: "12345".into(),
                status: Some("Замд яваа".into()),
                ..Default::default()
            })
            .await
            .expect("known id");
        assert!(change.status_changed());
        assert!(!change.location_changed());
        assert!(change.notifies_subscribers());
        assert_eq!(change.after.location, change.before.location);
        assert_eq!(
            registry.find("12345").await.unwrap().status,
            "Замд яваа"
        );
    }

    #[tokio::test]
    async fn eta_only_change_is_silent() {
        let registry = CargoRegistry::default();
        let change = registry
            .apply(&ShipmentUpdate {
                goods_id: "23456".into(),
                estimated_arrival: Some("2024-08-01".into()),
                status: Some("Гааль дээр".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(!change.notifies_subscribers());
        assert_eq!(change.after.estimated_arrival, "2024-08-01");
    }

    #[tokio::test]
    async fn unknown_id_is_none() {
        let registry = CargoRegistry::default();
        let update = ShipmentUpdate {
            goods_id: "nope".into(),
            ..Default::default()
        };
        assert!(registry.apply(&update).await.is_none());
    }

    #[tokio::test]
    async fn list_keeps_seed_order() {
        let registry = CargoRegistry::default();
        let ids: Vec<_> = registry
            .list()
            .await
            .into_iter()
            .map(|r| r.goods_id)
            .collect();
        assert_eq!(ids, vec!["12345", "23456", "34567", "45678"]);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = CargoRegistry::new(vec![
            ShipmentRecord::new("1", "a", "b", "c"),
            ShipmentRecord::new("1", "d", "e", "f"),
        ])
        .unwrap_err();
        assert!(matches!(err, SeedError::Duplicate(id) if id == "1"));
    }

    #[tokio::test]
    async fn loads_seed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(
            &path,
            r#"[{"goods_id":"777","location":"Эрээн","status":"Бэлэн","estimated_arrival":"2024-09-01"}]"#,
        )
        .unwrap();
        let registry = CargoRegistry::from_seed_file(&path).unwrap();
        assert_eq!(registry.list().await.len(), 1);
        assert_eq!(registry.find("777").await.unwrap().location, "Эрээн");

        let missing = CargoRegistry::from_seed_file(&dir.path().join("absent.json"));
        assert!(matches!(missing, Err(SeedError::Io { .. })));
    }
}
