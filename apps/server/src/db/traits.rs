//! Storage abstraction for versioned FHIR resources.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::{models::Resource, Result};

/// A versioned resource store.
///
/// Every write appends a new version; `read` returns the current version
/// (including tombstones, which callers surface as 410 Gone).
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Store version 1 of a new resource. The resource JSON must already
    /// carry its id and meta.
    async fn create(&self, resource_type: &str, resource: JsonValue) -> Result<Resource>;

    /// Current version of a resource, or None if it never existed.
    async fn read(&self, resource_type: &str, id: &str) -> Result<Option<Resource>>;

    /// A specific version of a resource.
    async fn vread(&self, resource_type: &str, id: &str, version_id: i32) -> Result<Resource>;

    /// Append a new version (create-or-update). The resource JSON must
    /// already carry the target version in its meta.
    async fn upsert(&self, resource_type: &str, id: &str, resource: JsonValue)
        -> Result<Resource>;

    /// Soft delete: append a tombstone version. Returns the new version id.
    async fn delete(&self, resource_type: &str, id: &str) -> Result<i32>;

    /// All versions of a resource, newest first.
    async fn history(&self, resource_type: &str, id: &str) -> Result<Vec<Resource>>;
}
