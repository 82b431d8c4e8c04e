use thiserror::Error;
use tracker_config::ConfigError as CliConfigError;
use tracker_core::{AuthFlow, CoreError};

/// Unified error type for the service, storage and configuration layers.
#[derive(Error, Debug)]
pub enum BudgetError {
    #[error("{0}")]
    Validation(String),
    /// Authentication failure already mapped to the message for its flow.
    #[error("{0}")]
    Auth(String),
    #[error("Not signed in. Use `login` or `signup` first.")]
    NotSignedIn,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl BudgetError {
    /// Converts a service error raised on an authentication screen, so backend
    /// codes read the way that screen words them.
    pub fn from_auth(err: CoreError, flow: AuthFlow) -> Self {
        match err {
            CoreError::Auth(_) => BudgetError::Auth(err.user_message(Some(flow))),
            other => BudgetError::from(other),
        }
    }
}

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<CoreError> for BudgetError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(inner) => BudgetError::Validation(inner.to_string()),
            CoreError::Auth(_) => BudgetError::Auth(err.user_message(None)),
            CoreError::NotAuthenticated => BudgetError::NotSignedIn,
            CoreError::NotFound(what) => BudgetError::NotFound(what),
            CoreError::Backend(message) | CoreError::Serde(message) => {
                BudgetError::StorageError(message)
            }
            CoreError::Io(io) => BudgetError::StorageError(io.to_string()),
        }
    }
}

impl From<CliConfigError> for BudgetError {
    fn from(err: CliConfigError) -> Self {
        match err {
            CliConfigError::Io(io) => BudgetError::StorageError(io.to_string()),
            CliConfigError::Serde(message) => BudgetError::ConfigError(message),
            invalid @ (CliConfigError::UnknownKey(_) | CliConfigError::InvalidValue { .. }) => {
                BudgetError::InvalidInput(invalid.to_string())
            }
        }
    }
}

impl From<std::io::Error> for BudgetError {
    fn from(err: std::io::Error) -> Self {
        BudgetError::StorageError(err.to_string())
    }
}

impl From<CliConfigError> for CliError {
    fn from(err: CliConfigError) -> Self {
        CliError::from(BudgetError::from(err))
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::from(BudgetError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::{AuthErrorCode, ValidationError};

    #[test]
    fn auth_errors_take_the_flow_message() {
        let err = BudgetError::from_auth(
            CoreError::Auth(AuthErrorCode::EmailAlreadyInUse),
            AuthFlow::SignUp,
        );
        assert_eq!(err.to_string(), "Email already exists");

        let err = BudgetError::from_auth(
            CoreError::Auth(AuthErrorCode::UserNotFound),
            AuthFlow::SignIn,
        );
        assert_eq!(err.to_string(), "No account exists with this email");
    }

    #[test]
    fn validation_messages_pass_through() {
        let err = BudgetError::from(CoreError::Validation(ValidationError::InvalidAmount));
        assert_eq!(err.to_string(), "Please enter a valid amount.");
        assert!(matches!(
            BudgetError::from(CoreError::NotAuthenticated),
            BudgetError::NotSignedIn
        ));
    }
}
