//! Immutable tool and mode descriptors.

use super::{ModeName, RegistryDomainError, ToolKind};
use serde::Serialize;

/// Static description of one tool kind in the master catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    kind: ToolKind,
    display_name: String,
    description: String,
    required_capabilities: Vec<String>,
}

impl ToolDescriptor {
    /// Creates a descriptor with no required capabilities.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::EmptyDisplayName`] when `display_name`
    /// is empty after trimming.
    pub fn new(
        kind: ToolKind,
        display_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, RegistryDomainError> {
        let normalized_display_name = display_name.into().trim().to_owned();
        if normalized_display_name.is_empty() {
            return Err(RegistryDomainError::EmptyDisplayName(kind.as_str().to_owned()));
        }

        Ok(Self {
            kind,
            display_name: normalized_display_name,
            description: description.into().trim().to_owned(),
            required_capabilities: Vec::new(),
        })
    }

    /// Sets the ordered list of dependency identifiers the tool requires.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::EmptyCapability`] when any identifier is
    /// empty after trimming.
    pub fn with_required_capabilities(
        mut self,
        capabilities: impl IntoIterator<Item = String>,
    ) -> Result<Self, RegistryDomainError> {
        let mut normalized = Vec::new();
        for capability in capabilities {
            let trimmed = capability.trim().to_owned();
            if trimmed.is_empty() {
                return Err(RegistryDomainError::EmptyCapability(
                    self.kind.as_str().to_owned(),
                ));
            }
            normalized.push(trimmed);
        }

        self.required_capabilities = normalized;
        Ok(self)
    }

    /// Returns the tool kind.
    #[must_use]
    pub const fn kind(&self) -> &ToolKind {
        &self.kind
    }

    /// Returns the human-readable tool name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the tool description, possibly empty.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns dependency identifiers in declaration order.
    #[must_use]
    pub fn required_capabilities(&self) -> &[String] {
        &self.required_capabilities
    }
}

/// A named bundle of tool kinds forming one usage profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeDescriptor {
    name: ModeName,
    display_name: String,
    description: String,
    tool_kinds: Vec<ToolKind>,
}

impl ModeDescriptor {
    /// Creates a mode descriptor.
    ///
    /// Tool kinds are kept in the given order. Uniqueness and catalog
    /// membership are checked by the registry service.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::EmptyDisplayName`] when `display_name`
    /// is empty after trimming.
    pub fn new(
        name: ModeName,
        display_name: impl Into<String>,
        description: impl Into<String>,
        tool_kinds: Vec<ToolKind>,
    ) -> Result<Self, RegistryDomainError> {
        let normalized_display_name = display_name.into().trim().to_owned();
        if normalized_display_name.is_empty() {
            return Err(RegistryDomainError::EmptyDisplayName(name.as_str().to_owned()));
        }

        Ok(Self {
            name,
            display_name: normalized_display_name,
            description: description.into().trim().to_owned(),
            tool_kinds,
        })
    }

    /// Returns the mode name.
    #[must_use]
    pub const fn name(&self) -> &ModeName {
        &self.name
    }

    /// Returns the human-readable mode name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the mode description, possibly empty.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the tool kinds in declaration order.
    #[must_use]
    pub fn tool_kinds(&self) -> &[ToolKind] {
        &self.tool_kinds
    }
}
