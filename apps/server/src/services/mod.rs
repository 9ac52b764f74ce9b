//! Business logic layer
//!
//! Services orchestrate operations by coordinating the resource store and
//! applying FHIR REST rules.

pub mod binary;
pub mod crud;

pub use binary::{BinaryCreateHandler, BinaryService, StoredBinaryHandler};
pub use crud::CrudService;
