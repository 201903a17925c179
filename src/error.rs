// src/error.rs
use std::fmt;

#[derive(Debug)]
pub enum ConsoleError {
    /// Form input rejected before any remote call
    Validation(String),
    /// Rejection reported by the equipment service, message kept verbatim
    Service(String),
    NotFound(String),
    /// Transition requested from a state it does not leave
    InvalidTransition(String),
    /// Network failure talking to the equipment service
    Transport(String),
    Persistence(String),
    Config(String),
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConsoleError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            ConsoleError::Service(msg) => write!(f, "Service Error: {}", msg),
            ConsoleError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ConsoleError::InvalidTransition(msg) => write!(f, "Invalid Transition: {}", msg),
            ConsoleError::Transport(msg) => write!(f, "Transport Error: {}", msg),
            ConsoleError::Persistence(msg) => write!(f, "Persistence Error: {}", msg),
            ConsoleError::Config(msg) => write!(f, "Config Error: {}", msg),
        }
    }
}

impl std::error::Error for ConsoleError {}

impl ConsoleError {
    /// Message handed to the notification channel. Service and transport
    /// failures carry the collaborator's text untouched.
    pub fn user_message(&self) -> &str {
        match self {
            ConsoleError::Validation(msg)
            | ConsoleError::Service(msg)
            | ConsoleError::NotFound(msg)
            | ConsoleError::InvalidTransition(msg)
            | ConsoleError::Transport(msg)
            | ConsoleError::Persistence(msg)
            | ConsoleError::Config(msg) => msg,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ConsoleError::Validation(_))
    }

    pub fn service(message: impl Into<String>) -> Self {
        ConsoleError::Service(message.into())
    }

    pub fn equipment_not_found(id: i64) -> Self {
        ConsoleError::NotFound(format!("Equipment with ID '{}' not found", id))
    }

    pub fn equipment_already_exists(name: &str) -> Self {
        ConsoleError::Service(format!("Equipment '{}' already exists", name))
    }

    pub fn invalid_transition(operation: &str, status: &str) -> Self {
        ConsoleError::InvalidTransition(format!(
            "Cannot {} equipment that is already {}",
            operation, status
        ))
    }

    pub fn validation_failed(field: &str) -> Self {
        ConsoleError::Validation(format!("Validation failed for field: {}", field))
    }
}

impl From<validator::ValidationErrors> for ConsoleError {
    fn from(err: validator::ValidationErrors) -> Self {
        ConsoleError::Validation(err.to_string())
    }
}

impl From<sqlx::Error> for ConsoleError {
    fn from(err: sqlx::Error) -> Self {
        ConsoleError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        ConsoleError::Persistence(err.to_string())
    }
}

impl From<reqwest::Error> for ConsoleError {
    fn from(err: reqwest::Error) -> Self {
        ConsoleError::Transport(err.to_string())
    }
}
