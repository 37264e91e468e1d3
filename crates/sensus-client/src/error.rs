//! Error types for the census service layer

use http::StatusCode;
use indexmap::IndexMap;
use sensus_core::validation::FieldError;
use serde::Deserialize;
use thiserror::Error;

/// Result type alias for service operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the census backend
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection refused, reset or otherwise unreachable
    #[error("Network error: {message}")]
    Network {
        /// Transport message
        message: String,
    },

    /// Request exceeded its deadline
    #[error("Request timed out after {seconds} seconds")]
    Timeout {
        /// Timeout duration
        seconds: u64,
    },

    /// Request was cancelled before it completed
    #[error("Request cancelled")]
    Cancelled,

    /// Backend rejected the credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource does not exist
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Requested path
        resource: String,
    },

    /// Any other non-success status
    #[error("Backend returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message taken from the body
        message: String,
    },

    /// Field-level validation failures, from the backend or pre-flight checks
    #[error("Validation failed for {count} field(s)", count = .errors.len())]
    FieldErrors {
        /// Message per field, in report order
        errors: IndexMap<String, String>,
    },

    /// Error embedded in an otherwise successful payload
    #[error("Backend error: {message}")]
    Backend {
        /// Message reported by the backend
        message: String,
    },

    /// Response body did not have the expected shape
    #[error("Failed to decode response: {message}")]
    Decode {
        /// Decoder message
        message: String,
    },

    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Report rows could not be written
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Client could not be configured
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Error message
        message: String,
    },
}

/// FastAPI error body: `detail` is either a message or a list of field errors
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Detail>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Fields(Vec<FieldDetail>),
}

#[derive(Debug, Deserialize)]
struct FieldDetail {
    #[serde(default)]
    loc: Vec<serde_json::Value>,
    msg: String,
}

impl ClientError {
    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub const fn timeout(seconds: u64) -> Self {
        Self::Timeout { seconds }
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a status error
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Create a single field error
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = IndexMap::new();
        errors.insert(field.into(), message.into());
        Self::FieldErrors { errors }
    }

    /// Create a backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Map a non-success response to an error
    ///
    /// `resource` is the requested path, used for not-found reports.
    pub fn from_response(status: StatusCode, body: &str, resource: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => return Self::Unauthorized,
            StatusCode::NOT_FOUND => return Self::not_found(resource),
            _ => {}
        }

        let parsed = serde_json::from_str::<ErrorBody>(body).ok();
        let message = match parsed {
            Some(ErrorBody {
                detail: Some(Detail::Fields(details)),
                ..
            }) if !details.is_empty() => {
                return Self::FieldErrors {
                    errors: field_map(details),
                };
            }
            Some(ErrorBody {
                detail: Some(Detail::Message(message)),
                ..
            }) => message,
            Some(ErrorBody {
                message: Some(message),
                ..
            }) => message,
            _ => body.trim().to_string(),
        };

        Self::status(status.as_u16(), message)
    }

    /// Short Indonesian explanation for the user
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { .. } => "Koneksi terputus, periksa jaringan".to_string(),
            Self::Timeout { seconds } => {
                format!("Permintaan melebihi batas waktu ({seconds} detik)")
            }
            Self::Cancelled => "Permintaan dibatalkan".to_string(),
            Self::Unauthorized => "Sesi berakhir, silakan masuk kembali".to_string(),
            Self::NotFound { .. } => "Data tidak ditemukan".to_string(),
            Self::Status { status, .. } if *status >= 500 => {
                "Terjadi kesalahan server, hubungi administrator".to_string()
            }
            Self::Status { status, message } => {
                if message.is_empty() {
                    format!("Permintaan gagal (status {status})")
                } else {
                    message.clone()
                }
            }
            Self::FieldErrors { errors } => match errors.first() {
                Some((field, message)) if errors.len() == 1 => {
                    format!("Data tidak valid: {field} - {message}")
                }
                _ => "Data tidak valid, periksa kembali isian".to_string(),
            },
            Self::Backend { message } => message.clone(),
            Self::Decode { .. } | Self::Json(_) => "Respons server tidak dapat dibaca".to_string(),
            Self::Http(err) if err.is_timeout() => "Permintaan melebihi batas waktu".to_string(),
            Self::Http(err) if err.is_connect() => "Koneksi terputus, periksa jaringan".to_string(),
            Self::Http(_) => "Permintaan gagal dikirim".to_string(),
            Self::Csv(_) => "Laporan tidak dapat dibuat".to_string(),
            Self::Configuration { message } => format!("Konfigurasi tidak valid: {message}"),
        }
    }

    /// Field messages, when this error carries any
    pub const fn field_errors(&self) -> Option<&IndexMap<String, String>> {
        match self {
            Self::FieldErrors { errors } => Some(errors),
            _ => None,
        }
    }

    /// Check if a manual retry can succeed without changing the request
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } | Self::Cancelled => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Http(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }

    /// Get error severity level for logging
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Cancelled => ErrorSeverity::Info,
            Self::Unauthorized | Self::NotFound { .. } | Self::FieldErrors { .. } => {
                ErrorSeverity::Warning
            }
            Self::Status { status, .. } if *status < 500 => ErrorSeverity::Warning,
            Self::Decode { .. } | Self::Json(_) | Self::Configuration { .. } => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::Error,
        }
    }
}

fn field_map(details: Vec<FieldDetail>) -> IndexMap<String, String> {
    let mut errors = IndexMap::new();
    for detail in details {
        let field = match detail.loc.last() {
            Some(serde_json::Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
            None => "form".to_string(),
        };
        errors.entry(field).or_insert(detail.msg);
    }
    errors
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Expected outcome, such as a user cancel
    Info,
    /// Bad input or missing data
    Warning,
    /// Request failed; retry may help
    Error,
    /// Client and backend disagree on the contract
    Critical,
}

impl From<Vec<FieldError>> for ClientError {
    fn from(errors: Vec<FieldError>) -> Self {
        let mut map = IndexMap::new();
        for error in errors {
            map.entry(error.field).or_insert(error.message);
        }
        Self::FieldErrors { errors: map }
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut map = IndexMap::new();
        for (field, list) in errors.field_errors() {
            let message = list.first().map_or_else(
                || "Nilai tidak valid".to_string(),
                |e| {
                    e.message
                        .as_ref()
                        .map_or_else(|| format!("Nilai tidak valid ({})", e.code), ToString::to_string)
                },
            );
            let field = if field == "__all__" { "form" } else { field.as_ref() };
            map.insert(field.to_string(), message);
        }
        map.sort_keys();
        Self::FieldErrors { errors: map }
    }
}

impl From<sensus_core::Error> for ClientError {
    fn from(err: sensus_core::Error) -> Self {
        match err {
            sensus_core::Error::Validation { field, message } => Self::field(field, message),
            other => Self::configuration(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_string_detail_becomes_message() {
        let err = ClientError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "Data untuk tanggal ini sudah ada"}"#,
            "sensus/",
        );
        assert!(matches!(err, ClientError::Status { status: 400, .. }));
        assert_eq!(err.user_message(), "Data untuk tanggal ini sudah ada");
    }

    #[test]
    fn test_field_detail_keyed_by_last_loc() {
        let body = r#"{"detail": [
            {"loc": ["body", "jml_masuk"], "msg": "ensure this value is less than or equal to 500"},
            {"loc": ["body", "tanggal"], "msg": "invalid date format"},
            {"loc": ["body", "jml_masuk"], "msg": "second message is dropped"}
        ]}"#;
        let err = ClientError::from_response(StatusCode::UNPROCESSABLE_ENTITY, body, "sensus/");

        let errors = err.field_errors().unwrap();
        let fields: Vec<_> = errors.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["jml_masuk", "tanggal"]);
        assert_eq!(errors["jml_masuk"], "ensure this value is less than or equal to 500");
    }

    #[test]
    fn test_special_statuses() {
        let err = ClientError::from_response(StatusCode::UNAUTHORIZED, "", "sensus/");
        assert!(matches!(err, ClientError::Unauthorized));

        let err = ClientError::from_response(StatusCode::NOT_FOUND, "{}", "sensus/99");
        assert!(matches!(err, ClientError::NotFound { ref resource } if resource == "sensus/99"));
        assert_eq!(err.user_message(), "Data tidak ditemukan");
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = ClientError::from_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"detail": "Error: division by zero"}"#,
            "export/excel",
        );
        assert_eq!(err.user_message(), "Terjadi kesalahan server, hubungi administrator");
        assert!(err.to_string().contains("division by zero"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_plain_text_body() {
        let err = ClientError::from_response(StatusCode::CONFLICT, " conflict \n", "bangsal/");
        assert_eq!(err.user_message(), "conflict");
    }

    #[rstest]
    #[case(ClientError::network("refused"), true)]
    #[case(ClientError::timeout(30), true)]
    #[case(ClientError::status(503, "down"), true)]
    #[case(ClientError::status(429, "slow down"), true)]
    #[case(ClientError::status(400, "bad"), false)]
    #[case(ClientError::field("tanggal", "Tanggal harus diisi"), false)]
    #[case(ClientError::backend("Model belum dilatih"), false)]
    fn test_error_retryable(#[case] err: ClientError, #[case] expected: bool) {
        assert_eq!(err.is_retryable(), expected);
    }

    #[test]
    fn test_error_severity() {
        assert_eq!(ClientError::Cancelled.severity(), ErrorSeverity::Info);
        assert_eq!(ClientError::not_found("x").severity(), ErrorSeverity::Warning);
        assert_eq!(ClientError::status(502, "").severity(), ErrorSeverity::Error);
        assert_eq!(ClientError::decode("eof").severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_timeout_message() {
        assert_eq!(
            ClientError::timeout(30).user_message(),
            "Permintaan melebihi batas waktu (30 detik)"
        );
    }

    #[test]
    fn test_core_field_errors_convert() {
        let err = ClientError::from(vec![
            FieldError {
                field: "jml_keluar".to_string(),
                message: "Pasien keluar tidak boleh melebihi pasien awal + masuk".to_string(),
            },
        ]);
        assert_eq!(
            err.user_message(),
            "Data tidak valid: jml_keluar - Pasien keluar tidak boleh melebihi pasien awal + masuk"
        );
    }

    #[test]
    fn test_report_write_failure() {
        let err = ClientError::from(csv::Error::from(std::io::Error::other("disk full")));
        assert_eq!(err.user_message(), "Laporan tidak dapat dibuat");
        assert!(!err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }
}
