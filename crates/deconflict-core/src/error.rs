//! Typed errors surfaced at the engine API boundary.

use thiserror::Error;

/// Errors returned by `register_mission` and `check_mission`. The engine
/// state is unchanged whenever one of these is returned; nothing inside the
/// three-stage pipeline itself fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeconflictError {
    /// The mission violates an arity, monotonicity, or numeric constraint.
    #[error("invalid mission '{drone_id}': {reason}")]
    InvalidMission { drone_id: String, reason: String },

    /// A mission with this drone_id is already registered.
    #[error("drone_id '{drone_id}' is already registered")]
    DuplicateDroneId { drone_id: String },

    /// An engine parameter is outside its valid range.
    #[error("invalid engine configuration: {reason}")]
    ConfigurationError { reason: String },
}

impl DeconflictError {
    pub(crate) fn invalid_mission(drone_id: &str, reason: impl Into<String>) -> Self {
        DeconflictError::InvalidMission {
            drone_id: drone_id.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        DeconflictError::ConfigurationError {
            reason: reason.into(),
        }
    }
}
