use thiserror::Error;

/// Failure reported by a backend collaborator.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Response error: {0}")]
    Parse(String),
    #[error("{0}")]
    Provider(String),
}

impl BackendError {
    /// Text shown to the user. Provider and HTTP errors surface the backend's own
    /// wording unchanged.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http { message, .. } | Self::Provider(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_text_is_verbatim() {
        let err = BackendError::Http {
            status: 400,
            message: "Invalid login credentials".to_string(),
        };
        assert_eq!(err.user_message(), "Invalid login credentials");
        assert_eq!(
            err.to_string(),
            "Request failed (400): Invalid login credentials"
        );

        let err = BackendError::Provider("User already registered".to_string());
        assert_eq!(err.user_message(), "User already registered");
    }

    #[test]
    fn transport_errors_keep_their_prefix() {
        let err = BackendError::Timeout("Request timed out. Please try again.".to_string());
        assert_eq!(
            err.user_message(),
            "Timeout: Request timed out. Please try again."
        );
    }
}
