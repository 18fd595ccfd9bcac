//! Unified error types for the control panel core.
//!
//! Port implementations report [`PortError`]s; configuration loading reports
//! [`ConfigError`]s.  Both convert into the crate-wide [`Error`] so callers at
//! the edge (the simulator binary, tests) can handle them uniformly.
//!
//! None of these are fatal to the synchronizer: a failed subscription or a
//! refused command degrades to "keep showing the last known value".

use core::fmt;

use crate::app::ports::Capability;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A platform capability refused or could not service a request.
    Port(PortError),
    /// Configuration is invalid or could not be parsed.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Port(e) => write!(f, "port: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Port errors
// ---------------------------------------------------------------------------

/// Errors raised by capability ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortError {
    /// The action needs a grant the user has not given.
    PermissionDenied(Capability),
    /// The sensor or radio does not exist on this device.
    ProviderUnavailable(&'static str),
    /// The platform refused the command (e.g. toggling is not allowed).
    Rejected(&'static str),
}

impl fmt::Display for PortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied(cap) => write!(f, "permission denied: {cap}"),
            Self::ProviderUnavailable(what) => write!(f, "{what} unavailable"),
            Self::Rejected(why) => write!(f, "rejected: {why}"),
        }
    }
}

impl std::error::Error for PortError {}

impl From<PortError> for Error {
    fn from(e: PortError) -> Self {
        Self::Port(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The override document is not valid JSON for [`PanelConfig`](crate::config::PanelConfig).
    Parse(String),
    /// A field failed range validation.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
