use std::fmt;

/// Which external collaborator a failed service call was made against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceCall {
    FetchSet,
    ResolveFile,
    Transport,
}

impl fmt::Display for ServiceCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceCall::FetchSet => "fetch sticker set",
            ServiceCall::ResolveFile => "resolve file",
            ServiceCall::Transport => "download file",
        };
        f.write_str(s)
    }
}

/// Category of a messaging platform failure, for operator logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlatformErrorKind {
    /// The platform answered and rejected the request.
    Protocol,
    /// The platform could not be reached.
    Connectivity,
    Other,
}

impl fmt::Display for PlatformErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlatformErrorKind::Protocol => "protocol",
            PlatformErrorKind::Connectivity => "connectivity",
            PlatformErrorKind::Other => "other",
        };
        f.write_str(s)
    }
}

/// Core error type for the bot.
///
/// Adapter crates should map their specific errors into this type so the
/// sticker flow can treat every failure the same way (log + user notice).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid sticker set name {name:?}: {reason}")]
    InvalidSetName { name: String, reason: String },

    #[error("{call} failed: {message}")]
    Service { call: ServiceCall, message: String },

    #[error("messaging error ({kind}): {message}")]
    Messaging {
        kind: PlatformErrorKind,
        message: String,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn service(call: ServiceCall, message: impl Into<String>) -> Self {
        Error::Service {
            call,
            message: message.into(),
        }
    }

    pub fn messaging(kind: PlatformErrorKind, message: impl Into<String>) -> Self {
        Error::Messaging {
            kind,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
