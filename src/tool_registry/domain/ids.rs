//! Validated identifier types for tool kinds and operating modes.

use super::RegistryDomainError;
use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;

/// Maximum length for tool kinds and mode names.
const MAX_IDENTIFIER_LENGTH: usize = 64;

enum IdentifierFault {
    Empty,
    InvalidCharacters(String),
    TooLong(String),
}

fn normalize_identifier(value: String) -> Result<String, IdentifierFault> {
    let normalized = normalize_lookup(&value);

    if normalized.is_empty() {
        return Err(IdentifierFault::Empty);
    }

    let is_valid = normalized.chars().all(|character| {
        character.is_ascii_lowercase() || character.is_ascii_digit() || character == '_'
    });
    if !is_valid {
        return Err(IdentifierFault::InvalidCharacters(normalized));
    }

    if normalized.len() > MAX_IDENTIFIER_LENGTH {
        return Err(IdentifierFault::TooLong(normalized));
    }

    Ok(normalized)
}

/// Normalizes a caller-supplied key before catalog or hub lookups.
pub(crate) fn normalize_lookup(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

/// Validated identifier of a tool kind, such as `ray` or `obsidian`.
///
/// Maps keyed by `ToolKind` can be queried with a normalized `&str`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ToolKind(String);

impl ToolKind {
    /// Creates a validated tool kind.
    ///
    /// The input is trimmed and lowercased. Only characters in `[a-z0-9_]`
    /// are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError`] when validation fails.
    pub fn new(value: impl Into<String>) -> Result<Self, RegistryDomainError> {
        match normalize_identifier(value.into()) {
            Ok(normalized) => Ok(Self(normalized)),
            Err(IdentifierFault::Empty) => Err(RegistryDomainError::EmptyToolKind),
            Err(IdentifierFault::InvalidCharacters(raw)) => {
                Err(RegistryDomainError::InvalidToolKind(raw))
            }
            Err(IdentifierFault::TooLong(raw)) => Err(RegistryDomainError::ToolKindTooLong(raw)),
        }
    }

    /// Returns the tool kind as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ToolKind {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for ToolKind {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Validated name of an operating mode, such as `ai` or `notes`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ModeName(String);

impl ModeName {
    /// Creates a validated mode name.
    ///
    /// Normalization and accepted characters match [`ToolKind::new`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError`] when validation fails.
    pub fn new(value: impl Into<String>) -> Result<Self, RegistryDomainError> {
        match normalize_identifier(value.into()) {
            Ok(normalized) => Ok(Self(normalized)),
            Err(IdentifierFault::Empty) => Err(RegistryDomainError::EmptyModeName),
            Err(IdentifierFault::InvalidCharacters(raw)) => {
                Err(RegistryDomainError::InvalidModeName(raw))
            }
            Err(IdentifierFault::TooLong(raw)) => Err(RegistryDomainError::ModeNameTooLong(raw)),
        }
    }

    /// Returns the mode name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ModeName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for ModeName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ModeName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
