//! The FHIR R4 `Binary` resource.

use serde::{Deserialize, Serialize};

/// A FHIR R4 `Binary` resource.
///
/// `data` holds the decoded content bytes; on the wire (JSON and XML) it is
/// base64-encoded per the FHIR `base64Binary` primitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "contentType", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(
        with = "base64_bytes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<Vec<u8>>,
}

impl Binary {
    /// Wrap opaque request bytes, tagged with the declared media type (if any).
    pub fn from_raw(content_type: Option<String>, data: Vec<u8>) -> Self {
        Self {
            id: None,
            content_type,
            data: Some(data),
        }
    }

    /// The content bytes, empty if the resource carries no data.
    pub fn content(&self) -> &[u8] {
        self.data.as_deref().unwrap_or_default()
    }

    /// The resource rendered as a FHIR JSON object, including `resourceType`.
    pub fn to_json(&self) -> serde_json::Value {
        let mut value = serde_json::json!({ "resourceType": "Binary" });
        if let serde_json::Value::Object(obj) = &mut value {
            if let serde_json::Value::Object(fields) =
                serde_json::to_value(self).expect("Binary serialization is infallible")
            {
                obj.extend(fields);
            }
        }
        value
    }
}

/// Serde adapter for the FHIR `base64Binary` primitive.
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &Option<Vec<u8>>, ser: S) -> Result<S::Ok, S::Error> {
        match data {
            Some(bytes) => ser.serialize_str(&STANDARD.encode(bytes)),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(de)?;
        encoded
            .map(|s| STANDARD.decode(s.as_bytes()))
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}
