//! Error types for the command line front end

use sensus_client::ClientError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for command handlers
pub type CliResult<T> = Result<T, CliError>;

/// Errors a command can end with
#[derive(Error, Debug)]
pub enum CliError {
    /// A service call failed outside a fetch controller
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Configuration, validation or serialization failure
    #[error(transparent)]
    Core(#[from] sensus_core::Error),

    /// Writing a report or reading a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A fetch controller finished with an error message
    #[error("{message}")]
    Fetch {
        /// Message recorded by the controller
        message: String,
        /// A manual retry can succeed
        retryable: bool,
    },

    /// The entry form rejected the input
    #[error("Invalid input: {}", .errors.join("; "))]
    Form {
        /// `field: message` lines
        errors: Vec<String>,
    },

    /// Arguments that clap accepts but the command cannot use
    #[error("{message}")]
    Usage {
        /// Explanation
        message: String,
    },
}

impl CliError {
    /// Create a usage error
    pub fn usage<S: Into<String>>(message: S) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create an I/O error for `path`
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Indonesian message shown to the user
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(err) => err.user_message(),
            Self::Core(err) => err.to_string(),
            Self::Io { path, source } => {
                format!("Gagal menulis berkas {}: {source}", path.display())
            }
            Self::Fetch { message, .. } | Self::Usage { message } => message.clone(),
            Self::Form { errors } => {
                let mut message = "Data tidak valid, periksa kembali isian".to_string();
                for line in errors {
                    message.push_str("\n  - ");
                    message.push_str(line);
                }
                message
            }
        }
    }

    /// Whether running the same command again can succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Client(err) => err.is_retryable(),
            Self::Fetch { retryable, .. } => *retryable,
            _ => false,
        }
    }

    /// Hint printed after the message
    pub fn hint(&self) -> Option<&'static str> {
        self.is_retryable().then_some("Coba lagi")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fetch_errors_carry_retry_hint() {
        let err = CliError::Fetch {
            message: "Koneksi terputus, periksa jaringan".to_string(),
            retryable: true,
        };
        assert_eq!(err.hint(), Some("Coba lagi"));
        assert_eq!(err.user_message(), "Koneksi terputus, periksa jaringan");
    }

    #[test]
    fn test_client_errors_use_indonesian_messages() {
        let err = CliError::from(ClientError::not_found("/sensus/9"));
        assert_eq!(err.user_message(), "Data tidak ditemukan");
        assert_eq!(err.hint(), None);
    }

    #[test]
    fn test_form_errors_list_each_field() {
        let err = CliError::Form {
            errors: vec!["tempat_tidur_tersedia: Jumlah tempat tidur minimal 1".to_string()],
        };
        assert!(
            err.user_message()
                .ends_with("\n  - tempat_tidur_tersedia: Jumlah tempat tidur minimal 1")
        );
    }
}
