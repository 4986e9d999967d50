//! Error types for tool catalog domain validation.

use thiserror::Error;

/// Errors returned while constructing tool registry domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryDomainError {
    /// The tool kind is empty after trimming.
    #[error("tool kind must not be empty")]
    EmptyToolKind,

    /// The tool kind contains characters outside `[a-z0-9_]`.
    #[error(
        "tool kind '{0}' contains invalid characters (only lowercase alphanumeric and underscores allowed)"
    )]
    InvalidToolKind(String),

    /// The tool kind exceeds the 64-character limit.
    #[error("tool kind exceeds 64 character limit: {0}")]
    ToolKindTooLong(String),

    /// The mode name is empty after trimming.
    #[error("mode name must not be empty")]
    EmptyModeName,

    /// The mode name contains characters outside `[a-z0-9_]`.
    #[error(
        "mode name '{0}' contains invalid characters (only lowercase alphanumeric and underscores allowed)"
    )]
    InvalidModeName(String),

    /// The mode name exceeds the 64-character limit.
    #[error("mode name exceeds 64 character limit: {0}")]
    ModeNameTooLong(String),

    /// A tool or mode display name is empty after trimming.
    #[error("display name for '{0}' must not be empty")]
    EmptyDisplayName(String),

    /// A required capability identifier is empty after trimming.
    #[error("tool '{0}' declares an empty capability identifier")]
    EmptyCapability(String),
}
