//! Integration tests for mode resolution and configuration loading.

use super::helpers::registry;
use camino::Utf8PathBuf;
use cap_std::{ambient_authority, fs_utf8::Dir};
use mcp_hub::tool_registry::{
    adapters::JsonFileConfigStore,
    domain::{HubSettings, RegistryConfig},
    ports::{ConfigStore, ConfigStoreError, ConfigStoreResult},
    services::{LoadRegistryError, RegistryError, ToolRegistry},
};
use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;

struct StaticStore(RegistryConfig);

impl ConfigStore for StaticStore {
    fn load(&self) -> ConfigStoreResult<RegistryConfig> {
        Ok(self.0.clone())
    }
}

fn scratch_path() -> Utf8PathBuf {
    let base = Utf8PathBuf::from_path_buf(std::env::temp_dir()).expect("utf-8 temp dir");
    base.join(format!("mcp-hub-registry-{}", uuid::Uuid::new_v4()))
}

#[rstest]
#[case("ai", &["ray", "dask", "openai"])]
#[case("engineering", &["simulink", "python_interface"])]
#[case("writing", &["langchain", "langgraph"])]
#[case("experiment", &["fastapi", "github", "shortcuts"])]
#[case("notes", &["obsidian", "zotero"])]
fn builtin_modes_resolve_in_order(
    registry: Arc<ToolRegistry>,
    #[case] mode: &str,
    #[case] expected: &[&str],
) {
    let kinds: Vec<String> = registry
        .resolve_mode(mode)
        .expect("built-in mode resolves")
        .iter()
        .map(|descriptor| descriptor.kind().to_string())
        .collect();

    assert_eq!(kinds, expected);
}

#[rstest]
fn mode_lookup_ignores_case_and_whitespace(registry: Arc<ToolRegistry>) {
    let mode = registry.mode("  AI ").expect("normalized lookup succeeds");

    assert_eq!(mode.name().as_str(), "ai");
    assert_eq!(mode.display_name(), "Data Science / AI Research");
}

#[rstest]
fn unknown_mode_names_the_alternatives(registry: Arc<ToolRegistry>) {
    let err = registry
        .resolve_mode("nonexistent")
        .expect_err("unknown mode is rejected");

    assert_eq!(
        err.to_string(),
        "unknown mode 'nonexistent' (available: ai, engineering, experiment, notes, writing)"
    );
}

#[rstest]
fn descriptors_are_shared_between_modes(registry: Arc<ToolRegistry>) {
    let direct = registry.describe("github").expect("github is catalogued");

    assert_eq!(direct.display_name(), "GitHub API MCP");
    assert_eq!(direct.required_capabilities(), ["requests", "fastmcp"]);
    assert!(matches!(
        registry.describe("slack"),
        Err(RegistryError::UnknownTool(ref kind)) if kind == "slack"
    ));
}

#[test]
fn registry_loads_through_any_store() {
    let mut config = RegistryConfig::default();
    config.settings = HubSettings {
        max_retries: 0,
        connect_timeout_ms: 250,
        disconnect_timeout_ms: 100,
    };

    let loaded = ToolRegistry::load(&StaticStore(config)).expect("registry loads");

    assert_eq!(loaded.settings().connect_attempts(), 1);
    assert_eq!(loaded.settings().connect_timeout(), Duration::from_millis(250));
    assert_eq!(loaded.modes().count(), 5);
}

#[test]
fn missing_config_file_is_created_with_defaults() {
    let path = scratch_path();
    Dir::create_ambient_dir_all(&path, ambient_authority()).expect("scratch dir created");
    let store = JsonFileConfigStore::open_ambient(&path).expect("store opens");

    let loaded = ToolRegistry::load(&store).expect("registry loads");
    let dir = Dir::open_ambient_dir(&path, ambient_authority()).expect("scratch dir opens");
    let written = dir
        .read_to_string(JsonFileConfigStore::DEFAULT_FILE_NAME)
        .expect("default file written");

    assert_eq!(loaded.tools().count(), 12);
    let reparsed: RegistryConfig = serde_json::from_str(&written).expect("written file parses");
    assert_eq!(reparsed, RegistryConfig::default());
    dir.remove_open_dir_all().expect("scratch dir removed");
}

#[test]
fn malformed_config_file_is_reported_and_kept() {
    let path = scratch_path();
    Dir::create_ambient_dir_all(&path, ambient_authority()).expect("scratch dir created");
    let dir = Dir::open_ambient_dir(&path, ambient_authority()).expect("scratch dir opens");
    dir.write("config.json", "{ not json").expect("fixture written");
    let store = JsonFileConfigStore::open_ambient(&path).expect("store opens");

    let result = ToolRegistry::load(&store);

    assert!(matches!(
        result,
        Err(LoadRegistryError::Store(ConfigStoreError::Parse { .. }))
    ));
    assert_eq!(
        dir.read_to_string("config.json").expect("file still present"),
        "{ not json"
    );
    dir.remove_open_dir_all().expect("scratch dir removed");
}

#[test]
fn mode_with_uncatalogued_tool_fails_to_load() {
    let config: RegistryConfig = serde_json::from_str(
        r#"{"modes": {"lab": {"name": "Lab", "tools": ["ray", "slack"]}}}"#,
    )
    .expect("fixture parses");

    let result = ToolRegistry::load(&StaticStore(config));

    assert!(matches!(
        result,
        Err(LoadRegistryError::Registry(RegistryError::UnknownToolInMode { .. }))
    ));
}
