use std::fmt;

use thiserror::Error;

/// Which authentication screen an error surfaced on. The same backend code
/// reads differently depending on what the user was trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlow {
    SignUp,
    SignIn,
    PasswordReset,
}

/// Error codes reported by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    EmailAlreadyInUse,
    InvalidEmail,
    WeakPassword,
    UserNotFound,
    WrongPassword,
    NetworkRequestFailed,
    InvalidResetToken,
    Other(String),
}

impl AuthErrorCode {
    pub fn code(&self) -> &str {
        match self {
            AuthErrorCode::EmailAlreadyInUse => "auth/email-already-in-use",
            AuthErrorCode::InvalidEmail => "auth/invalid-email",
            AuthErrorCode::WeakPassword => "auth/weak-password",
            AuthErrorCode::UserNotFound => "auth/user-not-found",
            AuthErrorCode::WrongPassword => "auth/wrong-password",
            AuthErrorCode::NetworkRequestFailed => "auth/network-request-failed",
            AuthErrorCode::InvalidResetToken => "auth/invalid-action-code",
            AuthErrorCode::Other(code) => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "auth/email-already-in-use" => AuthErrorCode::EmailAlreadyInUse,
            "auth/invalid-email" => AuthErrorCode::InvalidEmail,
            "auth/weak-password" => AuthErrorCode::WeakPassword,
            "auth/user-not-found" => AuthErrorCode::UserNotFound,
            "auth/wrong-password" => AuthErrorCode::WrongPassword,
            "auth/network-request-failed" => AuthErrorCode::NetworkRequestFailed,
            "auth/invalid-action-code" => AuthErrorCode::InvalidResetToken,
            other => AuthErrorCode::Other(other.to_string()),
        }
    }

    /// Maps the code to the message shown to the user for the given flow.
    pub fn message(&self, flow: AuthFlow) -> &'static str {
        match flow {
            AuthFlow::SignUp => match self {
                AuthErrorCode::EmailAlreadyInUse => "Email already exists",
                AuthErrorCode::InvalidEmail => "Invalid email address",
                AuthErrorCode::WeakPassword => "Password should be at least 6 characters",
                _ => "Failed to create account",
            },
            AuthFlow::SignIn => match self {
                AuthErrorCode::InvalidEmail => "Invalid email format",
                AuthErrorCode::UserNotFound => "No account exists with this email",
                AuthErrorCode::WrongPassword => "Incorrect password",
                AuthErrorCode::NetworkRequestFailed => {
                    "Network error. Please check your internet connection"
                }
                _ => "Login failed. Please try again.",
            },
            AuthFlow::PasswordReset => match self {
                AuthErrorCode::InvalidEmail => "Invalid email address",
                AuthErrorCode::UserNotFound => "No account exists with this email",
                AuthErrorCode::WeakPassword => "Password should be at least 6 characters",
                AuthErrorCode::InvalidResetToken => "The reset code is invalid or has expired",
                AuthErrorCode::NetworkRequestFailed => {
                    "Network error. Please check your internet connection"
                }
                _ => "Failed to reset password",
            },
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Input problems caught before any backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("Please fill in all required fields")]
    MissingRequiredFields,
    #[error("Please enter your email address")]
    MissingEmail,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please enter a friend's name.")]
    MissingFriendName,
    #[error("No friend selected.")]
    NoFriendSelected,
    #[error("Please enter a valid amount.")]
    InvalidAmount,
    #[error("{kind} entries cannot be recorded on the {ledger} ledger")]
    WrongLedger {
        kind: &'static str,
        ledger: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Authentication failed: {0}")]
    Auth(AuthErrorCode),
    #[error("Not signed in")]
    NotAuthenticated,
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Message suitable for an alert, given the flow the error surfaced on.
    pub fn user_message(&self, flow: Option<AuthFlow>) -> String {
        match (self, flow) {
            (CoreError::Auth(code), Some(flow)) => code.message(flow).to_string(),
            (CoreError::Auth(code), None) => code.message(AuthFlow::SignIn).to_string(),
            (CoreError::Validation(err), _) => err.to_string(),
            (other, _) => other.to_string(),
        }
    }
}

impl From<AuthErrorCode> for CoreError {
    fn from(code: AuthErrorCode) -> Self {
        CoreError::Auth(code)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serde(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_strings() {
        for code in [
            AuthErrorCode::EmailAlreadyInUse,
            AuthErrorCode::InvalidEmail,
            AuthErrorCode::WeakPassword,
            AuthErrorCode::UserNotFound,
            AuthErrorCode::WrongPassword,
            AuthErrorCode::NetworkRequestFailed,
        ] {
            assert_eq!(AuthErrorCode::from_code(code.code()), code);
        }
        assert_eq!(
            AuthErrorCode::from_code("auth/too-many-requests"),
            AuthErrorCode::Other("auth/too-many-requests".into())
        );
    }

    #[test]
    fn messages_depend_on_flow() {
        let code = AuthErrorCode::InvalidEmail;
        assert_eq!(code.message(AuthFlow::SignUp), "Invalid email address");
        assert_eq!(code.message(AuthFlow::SignIn), "Invalid email format");
        assert_eq!(
            AuthErrorCode::WrongPassword.message(AuthFlow::SignUp),
            "Failed to create account"
        );
        assert_eq!(
            AuthErrorCode::Other("x".into()).message(AuthFlow::SignIn),
            "Login failed. Please try again."
        );
    }
}
