//! Domain types for the pricing catalog with strong typing.
//!
//! This module provides type-safe wrappers and domain primitives shared by the
//! data-access layer, the HTTP API and the command line.

pub mod locale;

pub use locale::{Locale, LocalizedList, LocalizedText, resolve_localized};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a cataloged service.
///
/// The newtype keeps service ids from being mixed with category names or
/// model names, which are also plain strings in the database.
///
/// # Examples
///
/// ```rust
/// use pricing_hub::domain::ServiceId;
///
/// let id = ServiceId::new("chatgpt-plus");
/// assert_eq!(id.as_str(), "chatgpt-plus");
/// assert_eq!(id.to_string(), "chatgpt-plus");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ServiceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ServiceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Usage category of a service. A service may belong to several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    Api,
    Individual,
    CodeEditor,
}

impl ServiceType {
    pub const ALL: [Self; 3] = [Self::Api, Self::Individual, Self::CodeEditor];

    /// Returns the value stored in the `service_types.type` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Individual => "individual",
            Self::CodeEditor => "code-editor",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the known service types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service type '{0}' (expected api, individual or code-editor)")]
pub struct UnknownServiceType(pub String);

impl FromStr for ServiceType {
    type Err = UnknownServiceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "api" => Ok(Self::Api),
            "individual" => Ok(Self::Individual),
            "code-editor" => Ok(Self::CodeEditor),
            other => Err(UnknownServiceType(other.to_string())),
        }
    }
}
