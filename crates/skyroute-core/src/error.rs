//! Error types for planning requests.

/// Why a planning request could not produce a route.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// One or both identifiers are not in the dataset.
    #[error("can't find {}", .idents.join(", "))]
    WaypointNotFound { idents: Vec<String> },

    /// Source and destination are the same identifier.
    #[error("source and destination are the same ({ident})")]
    DegenerateRequest { ident: String },

    /// The candidate set was exhausted without reaching the destination.
    #[error("can't find a valid route from {origin} to {destination}; {guidance}")]
    NoRoute {
        origin: String,
        destination: String,
        guidance: String,
    },

    /// A caller-supplied parameter could not be used.
    #[error("invalid {name} '{value}': {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },
}
