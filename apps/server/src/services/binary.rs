//! Binary creation: payload classification plus a pluggable creation handler.
//!
//! The classifier produces a [`DecodedBinary`] with three synchronized
//! representations of one request body (typed resource, raw bytes, raw
//! string). The whole record is handed to a [`BinaryCreateHandler`], which
//! acknowledges with a [`MethodOutcome`]. The default handler persists the
//! typed resource through the CRUD service; tests install capturing handlers.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use lumen_payload::{classify, DecodedBinary, IncomingPayload};

use crate::{
    models::MethodOutcome,
    services::CrudService,
    Result,
};

/// Receives the decoded outcome of one `POST /Binary` request.
#[async_trait]
pub trait BinaryCreateHandler: Send + Sync {
    async fn create(&self, decoded: DecodedBinary) -> Result<MethodOutcome>;
}

/// Default handler: stores the typed Binary through the CRUD service.
pub struct StoredBinaryHandler {
    crud: Arc<CrudService>,
}

impl StoredBinaryHandler {
    pub fn new(crud: Arc<CrudService>) -> Self {
        Self { crud }
    }
}

#[async_trait]
impl BinaryCreateHandler for StoredBinaryHandler {
    async fn create(&self, decoded: DecodedBinary) -> Result<MethodOutcome> {
        let result = self
            .crud
            .create_resource("Binary", decoded.binary.to_json())
            .await?;

        Ok(MethodOutcome::new(
            "Binary",
            result.resource.id,
            result.resource.version_id,
        ))
    }
}

pub struct BinaryService {
    handler: Arc<dyn BinaryCreateHandler>,
}

impl BinaryService {
    pub fn new(handler: Arc<dyn BinaryCreateHandler>) -> Self {
        Self { handler }
    }

    /// Classify one request body and hand the outcome to the creation handler.
    pub async fn create(
        &self,
        bytes: Bytes,
        content_type: Option<String>,
    ) -> Result<MethodOutcome> {
        let decoded = classify(IncomingPayload::new(bytes, content_type))?;

        tracing::debug!(
            content_type = decoded.binary.content_type.as_deref().unwrap_or("<none>"),
            content_len = decoded.binary.content().len(),
            "Classified Binary payload"
        );

        self.handler.create(decoded).await
    }
}
