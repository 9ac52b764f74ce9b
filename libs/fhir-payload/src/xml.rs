//! FHIR XML parsing for the `Binary` resource.
//!
//! FHIR XML encodes primitives as `value` attributes inside the
//! `http://hl7.org/fhir` namespace:
//!
//! ```xml
//! <Binary xmlns="http://hl7.org/fhir">
//!   <contentType value="application/foo"/>
//!   <data value="AAECAwQ="/>
//! </Binary>
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use roxmltree::Document;

use crate::{Binary, PayloadError};

pub(crate) fn parse_binary(input: &str) -> Result<Binary, PayloadError> {
    let doc = Document::parse(input)?;
    let root = doc.root_element();

    let resource_type = root.tag_name().name();
    if resource_type != "Binary" {
        return Err(PayloadError::UnexpectedResourceType {
            actual: resource_type.to_string(),
        });
    }

    let mut binary = Binary::default();
    for child in root.children().filter(|n| n.is_element()) {
        let value = child.attribute("value");
        match child.tag_name().name() {
            "id" => binary.id = value.map(str::to_string),
            "contentType" => binary.content_type = value.map(str::to_string),
            "data" => {
                let encoded = value.ok_or_else(|| {
                    PayloadError::InvalidBinary("data element without value attribute".to_string())
                })?;
                binary.data = Some(STANDARD.decode(encoded.as_bytes())?);
            }
            // meta, securityContext, extensions: not material to classification
            _ => {}
        }
    }

    Ok(binary)
}
