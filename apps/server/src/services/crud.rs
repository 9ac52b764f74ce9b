//! Versioned CRUD over the resource store, applying FHIR REST rules.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::{
    db::ResourceStore,
    models::{
        is_known_resource_type, HistoryEntry, HistoryMethod, HistoryResult, Resource,
        ResourceOperation, ResourceResult, UpdateParams,
    },
    Error, Result,
};

pub struct CrudService {
    store: Arc<dyn ResourceStore>,
    allow_update_create: bool,
}

impl CrudService {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self::new_with_policy(store, true)
    }

    /// `allow_update_create = false` turns PUT-to-missing-id into
    /// 405 Method Not Allowed instead of create-via-update.
    pub fn new_with_policy(store: Arc<dyn ResourceStore>, allow_update_create: bool) -> Self {
        Self {
            store,
            allow_update_create,
        }
    }

    /// Create a resource with a server-assigned id at version 1.
    pub async fn create_resource(
        &self,
        resource_type: &str,
        mut resource: JsonValue,
    ) -> Result<ResourceResult> {
        self.ensure_known_type(resource_type)?;
        ensure_declared_type(&resource, resource_type)?;

        let id = Uuid::new_v4().to_string();
        stamp_meta(&mut resource, &id, 1, Utc::now());

        let created = self.store.create(resource_type, resource).await?;

        Ok(ResourceResult {
            resource: created,
            operation: ResourceOperation::Created,
        })
    }

    /// Read the current version. Deleted resources read as 410 Gone,
    /// never-existing ones as 404.
    pub async fn read_resource(&self, resource_type: &str, id: &str) -> Result<Resource> {
        self.ensure_known_type(resource_type)?;

        let current = self.store.read(resource_type, id).await?.ok_or_else(|| {
            Error::ResourceNotFound {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
            }
        })?;

        if current.deleted {
            return Err(Error::ResourceDeleted {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
                version_id: Some(current.version_id),
            });
        }

        Ok(current)
    }

    /// Update a resource, appending a new version.
    ///
    /// An `If-Match` version that does not match the current version is a
    /// 409 conflict. A PUT to an id that never existed either creates
    /// version 1 (update-as-create) or is refused, depending on policy.
    pub async fn update_resource(
        &self,
        resource_type: &str,
        id: &str,
        mut resource: JsonValue,
        params: Option<UpdateParams>,
    ) -> Result<ResourceResult> {
        self.ensure_known_type(resource_type)?;
        ensure_url_id_match(&resource, id)?;
        ensure_declared_type(&resource, resource_type)?;

        let current = self.store.read(resource_type, id).await?;

        if let Some(expected) = params.and_then(|p| p.if_match) {
            let current = current.as_ref().ok_or_else(|| Error::ResourceNotFound {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
            })?;
            if current.version_id != expected {
                return Err(Error::VersionConflict {
                    expected,
                    actual: current.version_id,
                });
            }
        }

        let operation = match &current {
            Some(existing) => {
                stamp_meta(&mut resource, id, existing.version_id + 1, Utc::now());
                ResourceOperation::Updated
            }
            None => {
                if !self.allow_update_create {
                    return Err(Error::MethodNotAllowed(
                        "Server does not allow client-defined resource ids. \
                        Use POST to create resources with server-assigned ids."
                            .to_string(),
                    ));
                }
                stamp_meta(&mut resource, id, 1, Utc::now());
                ResourceOperation::Created
            }
        };

        let updated = self.store.upsert(resource_type, id, resource).await?;

        Ok(ResourceResult {
            resource: updated,
            operation,
        })
    }

    /// Soft-delete a resource. Idempotent: deleting a missing or already
    /// deleted resource succeeds. Returns the tombstone version for the
    /// ETag, when one exists.
    pub async fn delete_resource(&self, resource_type: &str, id: &str) -> Result<Option<i32>> {
        self.ensure_known_type(resource_type)?;

        let Some(current) = self.store.read(resource_type, id).await? else {
            return Ok(None);
        };

        if current.deleted {
            return Ok(Some(current.version_id));
        }

        let tombstone_version = self.store.delete(resource_type, id).await?;
        Ok(Some(tombstone_version))
    }

    /// Read one specific version. A tombstone version reads as 410 Gone.
    pub async fn vread_resource(
        &self,
        resource_type: &str,
        id: &str,
        version_id: i32,
    ) -> Result<Resource> {
        self.ensure_known_type(resource_type)?;

        let resource = self.store.vread(resource_type, id, version_id).await?;

        if resource.deleted {
            return Err(Error::ResourceDeleted {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
                version_id: Some(resource.version_id),
            });
        }

        Ok(resource)
    }

    /// All versions of a resource, newest first, tombstones included.
    /// The method recorded per entry is derived from the version itself.
    pub async fn resource_history(&self, resource_type: &str, id: &str) -> Result<HistoryResult> {
        self.ensure_known_type(resource_type)?;

        let entries: Vec<HistoryEntry> = self
            .store
            .history(resource_type, id)
            .await?
            .into_iter()
            .map(|resource| HistoryEntry {
                method: method_for(&resource),
                resource,
            })
            .collect();

        let total = entries.len() as i64;
        Ok(HistoryResult {
            entries,
            total: Some(total),
        })
    }

    fn ensure_known_type(&self, resource_type: &str) -> Result<()> {
        if !is_known_resource_type(resource_type) {
            return Err(Error::Validation(format!(
                "Invalid resource type: {}",
                resource_type
            )));
        }
        Ok(())
    }
}

fn method_for(resource: &Resource) -> HistoryMethod {
    if resource.deleted {
        HistoryMethod::Delete
    } else if resource.version_id == 1 {
        HistoryMethod::Post
    } else {
        HistoryMethod::Put
    }
}

/// The `resourceType` field must be present and match the endpoint.
fn ensure_declared_type(resource: &JsonValue, expected: &str) -> Result<()> {
    let declared = resource
        .get("resourceType")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Error::InvalidResource("Missing resourceType field".to_string()))?;

    if declared != expected {
        return Err(Error::InvalidResource(format!(
            "Resource type mismatch: expected {}, got {}",
            expected, declared
        )));
    }
    Ok(())
}

/// If the body carries an id it must equal the URL id. A body without an id
/// is fine; the server stamps it.
fn ensure_url_id_match(resource: &JsonValue, url_id: &str) -> Result<()> {
    let Some(id_value) = resource.get("id") else {
        return Ok(());
    };

    match id_value.as_str() {
        Some(body_id) if body_id == url_id => Ok(()),
        Some(body_id) => Err(Error::InvalidResource(format!(
            "Resource id '{}' does not match URL id '{}'",
            body_id, url_id
        ))),
        None => Err(Error::InvalidResource(
            "Resource id must be a string".to_string(),
        )),
    }
}

/// Stamp id, meta.versionId and meta.lastUpdated. Client-provided values
/// for these fields are overwritten; the server owns them.
fn stamp_meta(resource: &mut JsonValue, id: &str, version_id: i32, last_updated: DateTime<Utc>) {
    let Some(obj) = resource.as_object_mut() else {
        return;
    };

    obj.insert("id".to_string(), serde_json::json!(id));

    let meta = obj
        .entry("meta".to_string())
        .or_insert_with(|| serde_json::json!({}));

    if let Some(meta_obj) = meta.as_object_mut() {
        if meta_obj.contains_key("versionId") || meta_obj.contains_key("lastUpdated") {
            tracing::debug!("Overwriting client-provided meta.versionId/lastUpdated");
        }
        meta_obj.insert(
            "versionId".to_string(),
            serde_json::json!(version_id.to_string()),
        );
        meta_obj.insert(
            "lastUpdated".to_string(),
            serde_json::json!(last_updated.to_rfc3339()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryResourceStore;

    fn service() -> CrudService {
        CrudService::new(Arc::new(MemoryResourceStore::new()))
    }

    fn patient() -> JsonValue {
        serde_json::json!({
            "resourceType": "Patient",
            "name": [{"family": "FAMILY", "given": ["GIVEN1", "GIVEN2"]}]
        })
    }

    #[tokio::test]
    async fn create_assigns_id_and_version_one() {
        let svc = service();
        let result = svc.create_resource("Patient", patient()).await.unwrap();

        assert_eq!(result.operation, ResourceOperation::Created);
        assert_eq!(result.resource.version_id, 1);
        assert_eq!(
            result.resource.resource["meta"]["versionId"],
            serde_json::json!("1")
        );
        assert!(!result.resource.id.is_empty());
    }

    #[tokio::test]
    async fn create_rejects_type_mismatch() {
        let svc = service();
        let err = svc
            .create_resource("Observation", patient())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidResource(_)));
    }

    #[tokio::test]
    async fn update_increments_version() {
        let svc = service();
        let created = svc.create_resource("Patient", patient()).await.unwrap();
        let id = created.resource.id.clone();

        let mut updated = patient();
        updated["id"] = serde_json::json!(id);
        let result = svc
            .update_resource("Patient", &id, updated, None)
            .await
            .unwrap();

        assert_eq!(result.operation, ResourceOperation::Updated);
        assert_eq!(result.resource.version_id, 2);
    }

    #[tokio::test]
    async fn update_with_stale_if_match_conflicts() {
        let svc = service();
        let created = svc.create_resource("Patient", patient()).await.unwrap();
        let id = created.resource.id.clone();

        let err = svc
            .update_resource(
                "Patient",
                &id,
                patient(),
                Some(UpdateParams { if_match: Some(9) }),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::VersionConflict {
                expected: 9,
                actual: 1
            }
        ));
    }

    #[tokio::test]
    async fn update_as_create_honors_policy() {
        let store = Arc::new(MemoryResourceStore::new());
        let strict = CrudService::new_with_policy(store.clone(), false);

        let err = strict
            .update_resource("Patient", "client-id", patient(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MethodNotAllowed(_)));

        let lenient = CrudService::new_with_policy(store, true);
        let result = lenient
            .update_resource("Patient", "client-id", patient(), None)
            .await
            .unwrap();
        assert_eq!(result.operation, ResourceOperation::Created);
        assert_eq!(result.resource.version_id, 1);
    }

    #[tokio::test]
    async fn deleted_resource_reads_as_gone() {
        let svc = service();
        let created = svc.create_resource("Patient", patient()).await.unwrap();
        let id = created.resource.id.clone();

        let version = svc.delete_resource("Patient", &id).await.unwrap();
        assert_eq!(version, Some(2));

        let err = svc.read_resource("Patient", &id).await.unwrap_err();
        assert!(matches!(err, Error::ResourceDeleted { .. }));

        // Deleting again is idempotent.
        let version = svc.delete_resource("Patient", &id).await.unwrap();
        assert_eq!(version, Some(2));
    }

    #[tokio::test]
    async fn history_marks_methods() {
        let svc = service();
        let created = svc.create_resource("Patient", patient()).await.unwrap();
        let id = created.resource.id.clone();

        let mut updated = patient();
        updated["id"] = serde_json::json!(id);
        svc.update_resource("Patient", &id, updated, None)
            .await
            .unwrap();
        svc.delete_resource("Patient", &id).await.unwrap();

        let history = svc.resource_history("Patient", &id).await.unwrap();
        assert_eq!(history.entries.len(), 3);
        assert_eq!(history.entries[0].method, HistoryMethod::Delete);
        assert_eq!(history.entries[1].method, HistoryMethod::Put);
        assert_eq!(history.entries[2].method, HistoryMethod::Post);
    }
}
