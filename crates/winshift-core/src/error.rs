use crate::hotkey::HotkeyAction;

/// Result alias used throughout the engine and the platform crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the placement engine and the hotkey lifecycle.
///
/// Only [`Error::StartupRegistration`] is fatal. Everything else is
/// logged at the call site and the surrounding loop carries on.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An OS primitive failed (enumeration, placement, metrics).
    #[error("{op} failed: {message}")]
    Os { op: &'static str, message: String },

    /// A hotkey string could not be parsed or mapped to a key code.
    #[error("invalid hotkey {spec:?}: {reason}")]
    InvalidHotkey { spec: String, reason: String },

    /// The OS refused a hotkey registration.
    #[error("failed to register {action} hotkey: {message}")]
    Registration {
        action: HotkeyAction,
        message: String,
    },

    /// The very first registration failed; the process cannot run.
    #[error("initial hotkey registration failed: {0}")]
    StartupRegistration(Box<Error>),

    /// The config file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// A platform channel or worker thread went away.
    #[error("{0} disconnected")]
    Disconnected(&'static str),
}

impl Error {
    /// Shorthand for [`Error::Os`].
    pub fn os(op: &'static str, message: impl ToString) -> Self {
        Self::Os {
            op,
            message: message.to_string(),
        }
    }

    /// Returns `true` when the process must terminate.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::StartupRegistration(_))
    }
}
