//! The payload classifier: one decoding pass over a `POST /Binary` body.

use bytes::Bytes;

use crate::{xml, Binary, FhirEncoding, PayloadError};

/// One incoming request body: the raw octets plus the declared media type,
/// exactly as supplied by the transport layer. Consumed once by [`classify`].
#[derive(Debug, Clone)]
pub struct IncomingPayload {
    bytes: Bytes,
    content_type: Option<String>,
}

impl IncomingPayload {
    pub fn new(bytes: Bytes, content_type: Option<String>) -> Self {
        Self {
            bytes,
            content_type,
        }
    }
}

/// The outcome of classifying one request body.
///
/// All three representations come out of a single decoding pass and stay
/// consistent with each other: `raw_bytes` and `raw_string` always reflect
/// the original request body, no matter which branch produced `binary`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBinary {
    /// The typed resource handed to the creation handler. When the body was a
    /// FHIR-encoded `Binary`, the wrapper's embedded `contentType` and `data`
    /// are authoritative; otherwise the raw bytes tagged with the header.
    pub binary: Binary,
    /// The request body, byte for byte.
    pub raw_bytes: Bytes,
    /// The request body decoded as UTF-8 (invalid sequences replaced).
    pub raw_string: String,
}

/// Classify a request body by its declared content type.
///
/// - No content type, or one outside the FHIR encoding table: the body is
///   opaque binary. The resulting resource's `contentType` is the header
///   value (absent when no header was supplied, never an empty string) and
///   its content equals the raw bytes verbatim.
/// - A FHIR encoding: the body is parsed as a `Binary` resource in that
///   encoding, and the embedded `contentType`/`data` win over the header.
///   Embedded content is passed through opaque; it is never re-decoded,
///   even when it is itself a FHIR encoding.
///
/// A declared-FHIR body that does not parse, or parses to some other
/// resource type, is an error for the caller to surface; it is not
/// downgraded to opaque-binary treatment.
pub fn classify(payload: IncomingPayload) -> Result<DecodedBinary, PayloadError> {
    let raw_string = String::from_utf8_lossy(&payload.bytes).into_owned();

    let binary = match payload.content_type.as_deref().and_then(FhirEncoding::detect) {
        None => Binary::from_raw(payload.content_type.clone(), payload.bytes.to_vec()),
        Some(FhirEncoding::Json) => parse_json_binary(&raw_string)?,
        Some(FhirEncoding::Xml) => xml::parse_binary(&raw_string)?,
    };

    Ok(DecodedBinary {
        binary,
        raw_bytes: payload.bytes,
        raw_string,
    })
}

fn parse_json_binary(input: &str) -> Result<Binary, PayloadError> {
    let value: serde_json::Value = serde_json::from_str(input)?;

    let resource_type = value
        .get("resourceType")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| PayloadError::InvalidBinary("missing resourceType".to_string()))?;
    if resource_type != "Binary" {
        return Err(PayloadError::UnexpectedResourceType {
            actual: resource_type.to_string(),
        });
    }

    Ok(serde_json::from_value(value)?)
}
