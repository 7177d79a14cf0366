use chrono::NaiveDate;
use thiserror::Error;

pub const INVALID_DATE_MESSAGE: &str = "Invalid date was entered.";
pub const EMPTY_NAME_MESSAGE: &str = "Please include the name of the event.";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("date `{value}` is not an ISO calendar date (YYYY-MM-DD)")]
    InvalidDate { value: String },
    #[error("date {date} is before today ({today})")]
    DateInPast { date: NaiveDate, today: NaiveDate },
    #[error("event name must not be empty")]
    EmptyName,
}

impl DomainError {
    /// Text safe to send back to the chat that triggered the failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidDate { .. } | Self::DateInPast { .. } => INVALID_DATE_MESSAGE,
            Self::EmptyName => EMPTY_NAME_MESSAGE,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, reply: &'static str, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { reply, .. } => *reply,
            Self::ServiceUnavailable { .. } => {
                "Something went wrong while accessing events. Please try again later."
            }
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        match self {
            Self::Domain(error) => InterfaceError::BadRequest {
                message: error.to_string(),
                reply: error.user_message(),
                correlation_id,
            },
            Self::Persistence(message) => {
                InterfaceError::ServiceUnavailable { message, correlation_id }
            }
        }
    }
}
