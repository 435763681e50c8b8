//! Unified error type for the console client.
//!
//! Every fallible operation in the crate returns [`Result`]. Server-reported failures keep
//! the server's message verbatim so the presentation layer can show it as-is, and transport
//! failures collapse into a single [`Error::Connection`] variant with a fixed message.

use thiserror::Error;

/// Message shown whenever the API cannot be reached at all.
pub const CONNECTION_ERROR_MESSAGE: &str = "Unable to reach the server";

/// Every failure the console can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings file or environment override could not be used.
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong.
        message: String,
    },

    /// No response was received from the API.
    #[error("{}", CONNECTION_ERROR_MESSAGE)]
    Connection,

    /// The API answered with a non-2xx status. `message` is the server's `error` field.
    #[error("{message}")]
    Api {
        /// HTTP status of the answer.
        status: u16,
        /// Server's own wording, shown as-is.
        message: String,
    },

    /// A form value could not be coerced; nothing was sent.
    #[error("Invalid value '{value}' for {field}")]
    InvalidField {
        /// Field id of the form input.
        field: String,
        /// What was typed.
        value: String,
    },

    /// A required form value was blank; nothing was sent.
    #[error("{field} is required")]
    MissingField {
        /// Field id of the form input.
        field: String,
    },

    /// A dashboard action was attempted without a session.
    #[error("You must be logged in to do this")]
    NotLoggedIn,

    /// Deleting the logged-in user's own account.
    #[error("You cannot delete your own account")]
    SelfDeletion,

    /// An affordance the current role is not offered.
    #[error("{what} is not available for your role")]
    Forbidden {
        /// Name of the affordance, e.g. "The users tab".
        what: String,
    },

    /// A 2xx body did not have the expected shape.
    #[error("Unexpected response from server: {message}")]
    Decode {
        /// Deserializer message.
        message: String,
    },

    /// The session could not be written.
    #[error("Storage error: {message}")]
    Storage {
        /// Underlying failure.
        message: String,
    },

    /// Session file access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A payload could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status carried by a server-reported failure, `0` for transport failures.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Connection => Some(0),
            _ => None,
        }
    }

    /// True when the failure happened before any response arrived.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection)
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
