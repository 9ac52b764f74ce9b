//! Domain models shared by the storage and service layers.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

/// One stored version of a FHIR resource.
#[derive(Debug, Clone)]
pub struct Resource {
    pub id: String,
    pub resource_type: String,
    pub version_id: i32,
    pub resource: JsonValue,
    pub last_updated: DateTime<Utc>,
    pub deleted: bool,
}

/// What a write operation did, for status-code selection (201 vs 200).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceOperation {
    Created,
    Updated,
}

#[derive(Debug, Clone)]
pub struct ResourceResult {
    pub resource: Resource,
    pub operation: ResourceOperation,
}

/// HTTP method recorded for a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMethod {
    Post,
    Put,
    Delete,
}

impl HistoryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryMethod::Post => "POST",
            HistoryMethod::Put => "PUT",
            HistoryMethod::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub resource: Resource,
    pub method: HistoryMethod,
}

#[derive(Debug, Clone)]
pub struct HistoryResult {
    pub entries: Vec<HistoryEntry>,
    pub total: Option<i64>,
}

/// Parameters for conditional update (If-Match).
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateParams {
    pub if_match: Option<i32>,
}

/// Creation acknowledgment handed back by a create handler.
///
/// `located()` renders the FHIR version marker, e.g. `Binary/001/_history/2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodOutcome {
    pub resource_type: String,
    pub id: String,
    pub version_id: i32,
}

impl MethodOutcome {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>, version_id: i32) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            version_id,
        }
    }

    pub fn located(&self) -> String {
        format!(
            "{}/{}/_history/{}",
            self.resource_type, self.id, self.version_id
        )
    }
}

/// FHIR R4 resource types accepted by the REST endpoints.
///
/// A deliberately common subset; requests for anything else are rejected with
/// a validation error before touching storage.
const KNOWN_RESOURCE_TYPES: &[&str] = &[
    "AllergyIntolerance",
    "Appointment",
    "Binary",
    "Bundle",
    "CarePlan",
    "CareTeam",
    "CodeSystem",
    "Communication",
    "Condition",
    "Consent",
    "Coverage",
    "Device",
    "DiagnosticReport",
    "DocumentReference",
    "Encounter",
    "Goal",
    "Group",
    "Immunization",
    "Library",
    "Location",
    "Media",
    "Medication",
    "MedicationRequest",
    "MedicationStatement",
    "Observation",
    "OperationDefinition",
    "OperationOutcome",
    "Organization",
    "Patient",
    "Practitioner",
    "PractitionerRole",
    "Procedure",
    "Provenance",
    "Questionnaire",
    "QuestionnaireResponse",
    "RelatedPerson",
    "Schedule",
    "ServiceRequest",
    "Slot",
    "Specimen",
    "StructureDefinition",
    "Subscription",
    "Task",
    "ValueSet",
];

pub fn is_known_resource_type(resource_type: &str) -> bool {
    KNOWN_RESOURCE_TYPES.binary_search(&resource_type).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_types_are_sorted_for_binary_search() {
        let mut sorted = KNOWN_RESOURCE_TYPES.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, KNOWN_RESOURCE_TYPES);
    }

    #[test]
    fn recognizes_common_types() {
        assert!(is_known_resource_type("Patient"));
        assert!(is_known_resource_type("Binary"));
        assert!(!is_known_resource_type("NotAResource"));
        assert!(!is_known_resource_type("patient"));
    }

    #[test]
    fn method_outcome_renders_version_marker() {
        let outcome = MethodOutcome::new("Binary", "001", 2);
        assert_eq!(outcome.located(), "Binary/001/_history/2");
    }
}
