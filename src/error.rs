use std::fmt;

/// Provider error codes on a failed top-up that are worth exactly one retry
/// through operator auto-detection.
const FALLBACK_ERROR_CODES: [&str; 3] = [
    "TRANSACTION_REFUSED_BY_OPERATOR",
    "INVALID_RECIPIENT_PHONE",
    "INVALID_AMOUNT_FOR_OPERATOR",
];

#[derive(Debug, Clone)]
pub enum Error {
    /// An error reported by the provider API: HTTP status plus the provider's
    /// own error code and message.
    Api {
        status: u16,
        error_code: String,
        message: String,
    },
    /// An exact-name operator search came back empty. Synthesized on the
    /// client, never a provider response.
    OperatorNotFound { name: String, country: String },
    /// No payable amount satisfies the target amount and tolerance for the
    /// operator's denomination model.
    ImpossibleAmount(String),
    /// The top-up builder was submitted in a state that cannot be fulfilled.
    InvalidCall(String),
    /// Transport-level failure: connection, TLS, or an undecodable body.
    Http(String),
    /// Client-side configuration problem (bad URL, missing credentials).
    Config(String),
}

impl Error {
    /// The wire-visible error code, if this error carries one. Provider
    /// errors report the provider's code; client-synthesized errors report
    /// their fixed kinds.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Error::Api { error_code, .. } => Some(error_code),
            Error::OperatorNotFound { .. } => Some("OPERATOR_NOT_FOUND"),
            Error::ImpossibleAmount(_) => Some("IMPOSSIBLE_AMOUNT"),
            Error::InvalidCall(_) => Some("INVALID_CALL"),
            Error::Http(_) | Error::Config(_) => None,
        }
    }

    /// Whether a failed submission may be retried once via auto-detection.
    /// Only provider-reported rejections qualify, never synthesized errors.
    pub fn is_fallback_eligible(&self) -> bool {
        match self {
            Error::Api { error_code, .. } => {
                FALLBACK_ERROR_CODES.contains(&error_code.as_str())
            }
            _ => false,
        }
    }

    pub(crate) fn is_token_expired(&self) -> bool {
        matches!(self, Error::Api { error_code, .. } if error_code == "TOKEN_EXPIRED")
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Api {
                status,
                error_code,
                message,
            } => write!(f, "{} ({}): {}", error_code, status, message),
            Error::OperatorNotFound { name, country } => write!(
                f,
                "could not find operator with name: {} in country: {}",
                name, country
            ),
            Error::ImpossibleAmount(msg) => write!(f, "{}", msg),
            Error::InvalidCall(msg) => write!(f, "{}", msg),
            Error::Http(msg) => write!(f, "http transport error: {}", msg),
            Error::Config(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.to_string())
    }
}
