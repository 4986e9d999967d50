//! Raw hub configuration as stored on disk.
//!
//! These types mirror the JSON layout of `config.json`. They are plain data;
//! [`ToolRegistry::new`](crate::tool_registry::services::ToolRegistry::new)
//! validates them into descriptors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Built-in tool catalog: kind, display name, description, dependencies.
const BUILTIN_TOOLS: &[(&str, &str, &str, &[&str])] = &[
    (
        "ray",
        "Ray",
        "Distributed computing framework for ML/AI workloads",
        &["ray", "fastmcp"],
    ),
    (
        "dask",
        "Dask",
        "Parallel computing library for analytics",
        &["dask", "fastmcp"],
    ),
    (
        "openai",
        "OpenAI MCP",
        "OpenAI API integration for AI models",
        &["openai", "fastmcp"],
    ),
    (
        "simulink",
        "Simulink MCP",
        "MATLAB Simulink integration",
        &["matlab", "fastmcp"],
    ),
    (
        "python_interface",
        "Python Interface",
        "Python scripting interface",
        &["fastmcp"],
    ),
    (
        "langchain",
        "LangChain MCP",
        "LangChain framework integration",
        &["langchain", "fastmcp"],
    ),
    (
        "langgraph",
        "LangGraph MCP",
        "LangGraph workflow integration",
        &["langgraph", "fastmcp"],
    ),
    (
        "fastapi",
        "FastAPI MCP",
        "FastAPI web framework integration",
        &["fastapi", "uvicorn", "fastmcp"],
    ),
    (
        "github",
        "GitHub API MCP",
        "GitHub API integration",
        &["requests", "fastmcp"],
    ),
    (
        "shortcuts",
        "Shortcuts MCP",
        "System shortcuts integration",
        &["fastmcp"],
    ),
    (
        "obsidian",
        "Obsidian MCP",
        "Obsidian note-taking integration",
        &["requests", "fastmcp"],
    ),
    (
        "zotero",
        "Zotero API MCP",
        "Zotero reference management integration",
        &["requests", "fastmcp"],
    ),
];

/// Built-in modes: name, display name, tool kinds, description.
const BUILTIN_MODES: &[(&str, &str, &[&str], &str)] = &[
    (
        "ai",
        "Data Science / AI Research",
        &["ray", "dask", "openai"],
        "Ray + Dask + OpenAI MCP for AI research",
    ),
    (
        "engineering",
        "Engineering / Simulation",
        &["simulink", "python_interface"],
        "Simulink MCP + Python interface",
    ),
    (
        "writing",
        "AI-assisted Writing",
        &["langchain", "langgraph"],
        "LangChain + LangGraph MCP",
    ),
    (
        "experiment",
        "Experiment Management",
        &["fastapi", "github", "shortcuts"],
        "FastAPI + GitHub API + Shortcuts",
    ),
    (
        "notes",
        "Cross-platform Notes / Literature",
        &["obsidian", "zotero"],
        "Obsidian MCP + Zotero API",
    ),
];

fn owned_list(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

fn builtin_tools() -> BTreeMap<String, ToolConfig> {
    BUILTIN_TOOLS
        .iter()
        .map(|(kind, name, description, dependencies)| {
            (
                (*kind).to_owned(),
                ToolConfig {
                    name: (*name).to_owned(),
                    description: (*description).to_owned(),
                    dependencies: owned_list(dependencies),
                },
            )
        })
        .collect()
}

fn builtin_modes() -> BTreeMap<String, ModeConfig> {
    BUILTIN_MODES
        .iter()
        .map(|(mode, name, tools, description)| {
            (
                (*mode).to_owned(),
                ModeConfig {
                    name: (*name).to_owned(),
                    tools: owned_list(tools),
                    description: (*description).to_owned(),
                },
            )
        })
        .collect()
}

/// Complete registry configuration: modes, tool catalog and hub settings.
///
/// `tools` and `settings` may be omitted from a stored file; the built-in
/// catalog and default settings are used in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Mode catalog keyed by mode name.
    pub modes: BTreeMap<String, ModeConfig>,
    /// Tool catalog keyed by tool kind.
    #[serde(default = "builtin_tools")]
    pub tools: BTreeMap<String, ToolConfig>,
    /// Lifecycle settings shared by every hub built from this registry.
    #[serde(default)]
    pub settings: HubSettings,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            modes: builtin_modes(),
            tools: builtin_tools(),
            settings: HubSettings::default(),
        }
    }
}

/// Stored definition of one operating mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeConfig {
    /// Human-readable mode name.
    pub name: String,
    /// Tool kinds that make up the mode, in order.
    pub tools: Vec<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

/// Stored definition of one tool kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Human-readable tool name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Dependency identifiers the tool requires.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Connection lifecycle settings.
///
/// Unknown keys in the stored `settings` block are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubSettings {
    /// Connect attempts per tool per lifecycle call; `0` is treated as `1`.
    pub max_retries: u32,
    /// Upper bound for a single connect attempt, in milliseconds.
    pub connect_timeout_ms: u64,
    /// Upper bound for a single disconnect call, in milliseconds.
    pub disconnect_timeout_ms: u64,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            connect_timeout_ms: 5_000,
            disconnect_timeout_ms: 2_000,
        }
    }
}

impl HubSettings {
    /// Returns the number of connect attempts, never less than one.
    #[must_use]
    pub const fn connect_attempts(&self) -> u32 {
        if self.max_retries == 0 {
            1
        } else {
            self.max_retries
        }
    }

    /// Returns the per-attempt connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Returns the disconnect timeout.
    #[must_use]
    pub const fn disconnect_timeout(&self) -> Duration {
        Duration::from_millis(self.disconnect_timeout_ms)
    }
}
