//! Content-type driven classification of FHIR `Binary` request payloads.
//!
//! A `POST /Binary` body can arrive three ways: as opaque bytes tagged with an
//! arbitrary media type, as a FHIR-JSON-encoded `Binary` resource, or as a
//! FHIR-XML-encoded `Binary` resource. [`classify`] inspects the declared
//! content type, decodes the body once, and produces a [`DecodedBinary`]
//! carrying the typed resource together with the untouched request bytes and
//! their UTF-8 string form.

mod binary;
mod classifier;
mod encoding;
mod xml;

pub use binary::Binary;
pub use classifier::{classify, DecodedBinary, IncomingPayload};
pub use encoding::FhirEncoding;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("failed to parse FHIR JSON body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse FHIR XML body: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("expected a Binary resource, got {actual}")]
    UnexpectedResourceType { actual: String },
    #[error("invalid base64 in Binary.data: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid Binary resource: {0}")]
    InvalidBinary(String),
}
