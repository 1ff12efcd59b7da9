use {
    crate::constants::*,
    std::{
        error::Error,
        fmt::{Display, Formatter, Result as FmtResult},
        io::Error as IOError,
    },
    tower::BoxError,
};

/// Error returned when an attempt at signing an outgoing request fails.
///
/// A request that fails to sign must not be transmitted.
#[derive(Debug)]
#[non_exhaustive]
pub enum SigningError {
    /// The request body exceeds the configured maximum buffered length.
    BodyTooLarge(/* message */ String),

    /// The request body could not be buffered due to an underlying I/O error.
    IO(IOError),

    /// Signing failed due to an error from the request body that is not an I/O error.
    InternalError(BoxError),

    /// The request target could not be reassembled after path normalization.
    InvalidURIPath(/* message */ String),

    /// A header value produced during signing could not be represented as an HTTP header. This
    /// happens when the access key or session token contains control characters.
    MalformedHeader(/* message */ String),

    /// The request has no host, or the host has no dot-separated bucket label while virtual-hosted
    /// addressing is in effect.
    MalformedHost(/* message */ String),
}

impl SigningError {
    /// Returns a stable identifier for the kind of error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BodyTooLarge(_) => ERR_CODE_BODY_TOO_LARGE,
            Self::IO(_) => ERR_CODE_IO_ERROR,
            Self::InternalError(_) => ERR_CODE_INTERNAL_FAILURE,
            Self::InvalidURIPath(_) => ERR_CODE_INVALID_URI_PATH,
            Self::MalformedHeader(_) => ERR_CODE_MALFORMED_HEADER,
            Self::MalformedHost(_) => ERR_CODE_MALFORMED_HOST,
        }
    }
}

impl Display for SigningError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::BodyTooLarge(msg) => f.write_str(msg),
            Self::IO(ref e) => Display::fmt(e, f),
            Self::InternalError(ref e) => Display::fmt(e, f),
            Self::InvalidURIPath(msg) => f.write_str(msg),
            Self::MalformedHeader(msg) => f.write_str(msg),
            Self::MalformedHost(msg) => f.write_str(msg),
        }
    }
}

impl Error for SigningError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::IO(ref e) => Some(e),
            Self::InternalError(ref e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<IOError> for SigningError {
    fn from(e: IOError) -> SigningError {
        SigningError::IO(e)
    }
}

impl From<BoxError> for SigningError {
    fn from(e: BoxError) -> SigningError {
        match e.downcast::<SigningError>() {
            Ok(sig_err) => *sig_err,
            Err(e) => match e.downcast::<IOError>() {
                Ok(io_err) => SigningError::IO(*io_err),
                Err(e) => SigningError::InternalError(e),
            },
        }
    }
}

/// Error returned when credentials or endpoint configuration cannot be loaded.
#[derive(Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// The service bindings document could not be parsed.
    Json(serde_json::Error),

    /// A service binding exists but lacks a required credential field.
    InvalidServiceBinding(/* message */ String),

    /// A required environment variable is not set or is not valid Unicode.
    MissingVariable(/* variable name */ String),

    /// No service binding has the requested instance name.
    ServiceNotFound(/* instance name */ String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Json(e) => write!(f, "Invalid service bindings document: {}", e),
            Self::InvalidServiceBinding(msg) => write!(f, "Invalid service binding: {}", msg),
            Self::MissingVariable(name) => write!(f, "Environment variable not set: {}", name),
            Self::ServiceNotFound(name) => write!(f, "Service instance not bound: {}", name),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}
