use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown {kind} `{value}`")]
    UnknownVariant { kind: &'static str, value: String },
    #[error("vehicle {0} was not found")]
    VehicleNotFound(i64),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

/// Failures seen by the request-handling layer, before they are shown to a customer.
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

/// How a failure is presented at the HTTP boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureClass {
    InvalidInput,
    Unavailable,
    Internal,
}

impl FailureClass {
    pub fn user_message(self) -> &'static str {
        match self {
            Self::InvalidInput => "That request could not be processed. Please check it and try again.",
            Self::Unavailable => {
                "The rental assistant is temporarily unavailable. Please try again shortly."
            }
            Self::Internal => "Something went wrong on our side.",
        }
    }
}

/// Customer-safe failure: the class decides the wording, `detail` stays in the logs.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{class:?} [{correlation_id}]: {detail}")]
pub struct InterfaceError {
    pub class: FailureClass,
    pub detail: String,
    pub correlation_id: String,
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        self.class.user_message()
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}

impl ApplicationError {
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Domain(_) => FailureClass::InvalidInput,
            Self::Persistence(_) | Self::Integration(_) => FailureClass::Unavailable,
            Self::Configuration(_) => FailureClass::Internal,
        }
    }

    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        InterfaceError {
            class: self.class(),
            detail: self.to_string(),
            correlation_id: correlation_id.into(),
        }
    }
}
