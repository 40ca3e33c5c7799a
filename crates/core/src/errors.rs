use thiserror::Error;

use crate::domain::stock::LocationId;

/// Failure reported by an external collaborator (position lookup, ordering system).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
    #[error("collaborator rejected request: {0}")]
    Rejected(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RedistributionError {
    #[error("invalid redistribution configuration: {0}")]
    InvalidConfiguration(String),
    #[error("invalid stock position `{location_id}`: {reason}")]
    InvalidPosition { location_id: LocationId, reason: String },
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    #[error("invalid suggestion id `{0}`")]
    InvalidSuggestionId(String),
    #[error("invalid execution parameters: {0}")]
    InvalidExecutionParams(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }
}

impl From<RedistributionError> for ApplicationError {
    fn from(value: RedistributionError) -> Self {
        match value {
            RedistributionError::InvalidConfiguration(message) => Self::Configuration(message),
            RedistributionError::Collaborator(error) => Self::Integration(error.to_string()),
            error @ (RedistributionError::InvalidPosition { .. }
            | RedistributionError::InvalidSuggestionId(_)
            | RedistributionError::InvalidExecutionParams(_)) => {
                Self::Domain(DomainError::InvariantViolation(error.to_string()))
            }
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(DomainError::InvariantViolation(message)) => {
                Self::BadRequest { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Persistence(message) | ApplicationError::Integration(message) => {
                Self::ServiceUnavailable { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::stock::LocationId;
    use crate::errors::{
        ApplicationError, CollaboratorError, DomainError, InterfaceError, RedistributionError,
    };

    #[test]
    fn invalid_suggestion_maps_to_bad_request_interface_error() {
        let interface = ApplicationError::from(RedistributionError::InvalidSuggestionId(
            "not-an-id".to_owned(),
        ))
        .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest {
                ref correlation_id,
                ..
            } if correlation_id == "req-1"
        ));
        assert_eq!(
            interface.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
    }

    #[test]
    fn collaborator_failure_maps_to_service_unavailable() {
        let interface = ApplicationError::from(RedistributionError::from(
            CollaboratorError::Unavailable("database lock timeout".to_owned()),
        ))
        .into_interface("req-2");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(
            interface.user_message(),
            "The service is temporarily unavailable. Please retry shortly."
        );
    }

    #[test]
    fn invalid_configuration_maps_to_internal() {
        let interface = ApplicationError::from(RedistributionError::InvalidConfiguration(
            "safety buffer below minimum".to_owned(),
        ))
        .into_interface("req-3");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }

    #[test]
    fn invalid_position_keeps_location_in_message() {
        let application = ApplicationError::from(RedistributionError::InvalidPosition {
            location_id: LocationId("ikeja".to_owned()),
            reason: "latitude 91 is outside [-90, 90]".to_owned(),
        });

        assert!(matches!(
            application,
            ApplicationError::Domain(DomainError::InvariantViolation(ref message))
                if message.contains("ikeja")
        ));
    }
}
