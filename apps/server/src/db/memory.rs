//! In-memory `ResourceStore` implementation.
//!
//! Keeps every version of every resource in a process-local map. Suitable for
//! single-node deployments and tests; the trait boundary leaves room for a
//! database-backed store later.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;

use crate::{db::traits::ResourceStore, models::Resource, Error, Result};

type VersionLog = Vec<Resource>;

#[derive(Clone, Default)]
pub struct MemoryResourceStore {
    inner: Arc<RwLock<HashMap<(String, String), VersionLog>>>,
}

impl MemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a `Resource` row from the JSON the service layer prepared.
    /// The service populates id and meta before the store is called.
    fn row_from_json(resource_type: &str, resource: JsonValue) -> Result<Resource> {
        let id = resource
            .get("id")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::Internal("resource JSON is missing id".to_string()))?
            .to_string();

        let meta = resource.get("meta");
        let version_id = meta
            .and_then(|m| m.get("versionId"))
            .and_then(JsonValue::as_str)
            .and_then(|v| v.parse::<i32>().ok())
            .ok_or_else(|| Error::Internal("resource JSON is missing meta.versionId".to_string()))?;
        let last_updated = meta
            .and_then(|m| m.get("lastUpdated"))
            .and_then(JsonValue::as_str)
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Ok(Resource {
            id,
            resource_type: resource_type.to_string(),
            version_id,
            resource,
            last_updated,
            deleted: false,
        })
    }
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn create(&self, resource_type: &str, resource: JsonValue) -> Result<Resource> {
        let row = Self::row_from_json(resource_type, resource)?;
        let key = (resource_type.to_string(), row.id.clone());

        let mut map = self.inner.write().await;
        if map.contains_key(&key) {
            return Err(Error::Internal(format!(
                "duplicate create for {}/{}",
                resource_type, row.id
            )));
        }
        map.insert(key, vec![row.clone()]);
        Ok(row)
    }

    async fn read(&self, resource_type: &str, id: &str) -> Result<Option<Resource>> {
        let map = self.inner.read().await;
        Ok(map
            .get(&(resource_type.to_string(), id.to_string()))
            .and_then(|versions| versions.last())
            .cloned())
    }

    async fn vread(&self, resource_type: &str, id: &str, version_id: i32) -> Result<Resource> {
        let map = self.inner.read().await;
        map.get(&(resource_type.to_string(), id.to_string()))
            .and_then(|versions| versions.iter().find(|r| r.version_id == version_id))
            .cloned()
            .ok_or_else(|| Error::VersionNotFound {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
                version_id,
            })
    }

    async fn upsert(
        &self,
        resource_type: &str,
        id: &str,
        resource: JsonValue,
    ) -> Result<Resource> {
        let row = Self::row_from_json(resource_type, resource)?;
        if row.id != id {
            return Err(Error::Internal(format!(
                "upsert id mismatch: JSON carries '{}', caller passed '{}'",
                row.id, id
            )));
        }

        let mut map = self.inner.write().await;
        map.entry((resource_type.to_string(), id.to_string()))
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn delete(&self, resource_type: &str, id: &str) -> Result<i32> {
        let mut map = self.inner.write().await;
        let versions = map
            .get_mut(&(resource_type.to_string(), id.to_string()))
            .ok_or_else(|| Error::ResourceNotFound {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
            })?;

        // Safe: a version log is never empty once the key exists.
        let current_version = versions.last().map(|r| r.version_id).unwrap_or(0);
        let new_version = current_version + 1;
        let now = Utc::now();

        versions.push(Resource {
            id: id.to_string(),
            resource_type: resource_type.to_string(),
            version_id: new_version,
            resource: serde_json::json!({
                "resourceType": resource_type,
                "id": id,
                "meta": {
                    "versionId": new_version.to_string(),
                    "lastUpdated": now.to_rfc3339(),
                }
            }),
            last_updated: now,
            deleted: true,
        });

        Ok(new_version)
    }

    async fn history(&self, resource_type: &str, id: &str) -> Result<Vec<Resource>> {
        let map = self.inner.read().await;
        let mut versions = map
            .get(&(resource_type.to_string(), id.to_string()))
            .cloned()
            .ok_or_else(|| Error::ResourceNotFound {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
            })?;

        versions.sort_by(|a, b| b.version_id.cmp(&a.version_id));
        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient_json(id: &str, version: i32) -> JsonValue {
        serde_json::json!({
            "resourceType": "Patient",
            "id": id,
            "meta": { "versionId": version.to_string(), "lastUpdated": Utc::now().to_rfc3339() }
        })
    }

    #[tokio::test]
    async fn create_then_read_returns_current_version() {
        let store = MemoryResourceStore::new();
        store.create("Patient", patient_json("p1", 1)).await.unwrap();

        let current = store.read("Patient", "p1").await.unwrap().unwrap();
        assert_eq!(current.version_id, 1);
        assert!(!current.deleted);
    }

    #[tokio::test]
    async fn upsert_appends_versions_and_history_is_newest_first() {
        let store = MemoryResourceStore::new();
        store.create("Patient", patient_json("p1", 1)).await.unwrap();
        store
            .upsert("Patient", "p1", patient_json("p1", 2))
            .await
            .unwrap();

        let history = store.history("Patient", "p1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].version_id, 2);
        assert_eq!(history[1].version_id, 1);

        let v1 = store.vread("Patient", "p1", 1).await.unwrap();
        assert_eq!(v1.version_id, 1);
    }

    #[tokio::test]
    async fn delete_appends_tombstone() {
        let store = MemoryResourceStore::new();
        store.create("Patient", patient_json("p1", 1)).await.unwrap();

        let version = store.delete("Patient", "p1").await.unwrap();
        assert_eq!(version, 2);

        let current = store.read("Patient", "p1").await.unwrap().unwrap();
        assert!(current.deleted);
        assert_eq!(current.version_id, 2);
    }

    #[tokio::test]
    async fn vread_of_missing_version_fails() {
        let store = MemoryResourceStore::new();
        store.create("Patient", patient_json("p1", 1)).await.unwrap();

        let err = store.vread("Patient", "p1", 9).await.unwrap_err();
        assert!(matches!(err, Error::VersionNotFound { version_id: 9, .. }));
    }
}
