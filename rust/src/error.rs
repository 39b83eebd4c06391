//! Validation errors raised while building and solving an activity network.

use thiserror::Error;

/// Errors that abort a CPM solve.
///
/// Every variant carries enough context (activity id, field name or
/// predecessor id) to locate the offending record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CpmError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Duplicate activity id: {id}")]
    DuplicateId { id: String },

    #[error("Activity {activity} has unknown predecessor: {predecessor}")]
    UnknownPredecessor {
        activity: String,
        predecessor: String,
    },

    #[error(
        "Cycle detected in activity network; CPM requires a DAG (unresolved: {})",
        .unresolved.join(", ")
    )]
    CycleDetected { unresolved: Vec<String> },

    #[error("Activity {id} has invalid duration {value:?}: expected a non-negative number")]
    InvalidDuration { id: String, value: String },

    #[error("Activity {id} has negative total float {total_float}")]
    NegativeFloat { id: String, total_float: f64 },
}

impl CpmError {
    pub(crate) fn missing_field(field: &str) -> Self {
        CpmError::MissingField {
            field: field.to_string(),
        }
    }
}
