//! Recognition of FHIR structured-resource content types.

/// Serialization formats in which a FHIR resource body may be encoded.
///
/// A content type outside this table means the body is opaque binary, not a
/// structured resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FhirEncoding {
    Json,
    Xml,
}

/// Content-type tokens treated as FHIR JSON.
const JSON_TOKENS: &[&str] = &[
    "application/fhir+json",
    "application/json+fhir",
    "application/json",
];

/// Content-type tokens treated as FHIR XML.
const XML_TOKENS: &[&str] = &[
    "application/fhir+xml",
    "application/xml+fhir",
    "application/xml",
    "text/xml",
];

impl FhirEncoding {
    /// Detect a FHIR encoding from a declared content-type header value.
    ///
    /// Media-type parameters (`; charset=...`) are stripped before matching.
    /// Tokens are matched exactly against the known FHIR encodings; anything
    /// else (including a garbled header) yields `None` and the body is
    /// treated as opaque binary.
    pub fn detect(content_type: &str) -> Option<Self> {
        let token = content_type.split(';').next().unwrap_or("").trim();

        if JSON_TOKENS.contains(&token) {
            Some(FhirEncoding::Json)
        } else if XML_TOKENS.contains(&token) {
            Some(FhirEncoding::Xml)
        } else {
            None
        }
    }
}
