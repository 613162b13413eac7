//! Registers the plugin in the OpenCode config.
//!
//! The config may be JSON or JSONC. Only the `plugin` property is edited;
//! comments and formatting elsewhere in the file are left as they were.

use anyhow::{Context, Result, anyhow, bail};
use jsonc_parser::ParseOptions;
use jsonc_parser::cst::{CstInputValue, CstRootNode};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const PLUGIN_NAME: &str = "opencode-glm-clipboard";

const PLUGIN_KEY: &str = "plugin";

/// Where OpenCode keeps its config and plugin cache.
#[derive(Debug, Clone)]
pub struct InstallerPaths {
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl InstallerPaths {
    pub fn from_home(home: &Path) -> Self {
        Self {
            config_dir: home.join(".config").join("opencode"),
            cache_dir: home.join(".cache").join("opencode"),
        }
    }

    pub fn detect() -> Result<Self> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(Self::from_home(&home))
    }

    /// `opencode.jsonc` if present, else `opencode.json` if present, else
    /// `opencode.jsonc`.
    pub fn config_path(&self) -> PathBuf {
        let jsonc = self.config_dir.join("opencode.jsonc");
        let json = self.config_dir.join("opencode.json");
        if jsonc.exists() {
            jsonc
        } else if json.exists() {
            json
        } else {
            jsonc
        }
    }

    pub fn plugin_cache_dir(&self) -> PathBuf {
        self.cache_dir.join("node_modules").join(PLUGIN_NAME)
    }
}

/// One step taken (or, in a dry run, planned) by the installer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallAction {
    CreatedConfig(PathBuf),
    UpdatedConfig(PathBuf),
    ClearedCache(PathBuf),
    NothingToUninstall,
}

impl InstallAction {
    pub fn describe(&self, dry_run: bool) -> String {
        match (self, dry_run) {
            (Self::CreatedConfig(path), false) => format!("Created {}", path.display()),
            (Self::CreatedConfig(path), true) => format!("Would create {}", path.display()),
            (Self::UpdatedConfig(path), false) => format!("Updated {}", path.display()),
            (Self::UpdatedConfig(path), true) => format!("Would update {}", path.display()),
            (Self::ClearedCache(path), false) => format!("Cleared plugin cache {}", path.display()),
            (Self::ClearedCache(path), true) => format!("Would remove {}", path.display()),
            (Self::NothingToUninstall, _) => {
                "No OpenCode config found. Nothing to uninstall.".to_string()
            }
        }
    }
}

pub struct Installer {
    paths: InstallerPaths,
    dry_run: bool,
}

impl Installer {
    pub fn new(paths: InstallerPaths, dry_run: bool) -> Self {
        Self { paths, dry_run }
    }

    pub fn paths(&self) -> &InstallerPaths {
        &self.paths
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Add the plugin to the config (creating it if needed) and clear the cache.
    pub async fn install(&self) -> Result<Vec<InstallAction>> {
        let config_path = self.paths.config_path();
        let mut actions = Vec::new();

        if !config_path.exists() {
            let content = format!(
                "{}\n",
                serde_json::to_string_pretty(&json!({ PLUGIN_KEY: [PLUGIN_NAME] }))?
            );
            self.write_config(&config_path, &content).await?;
            actions.push(InstallAction::CreatedConfig(config_path));
        } else {
            let content = read_config(&config_path).await?;
            let data = parse_config(&content)?;
            let plugins = normalize_plugin_list(data.get(PLUGIN_KEY));
            let next = set_plugin_list(&content, Some(plugins))?;
            self.write_config(&config_path, &next).await?;
            actions.push(InstallAction::UpdatedConfig(config_path));
        }

        actions.push(self.clear_plugin_cache().await?);
        Ok(actions)
    }

    /// Remove every entry for the plugin from the config and clear the cache.
    pub async fn uninstall(&self) -> Result<Vec<InstallAction>> {
        let config_path = self.paths.config_path();
        if !config_path.exists() {
            return Ok(vec![InstallAction::NothingToUninstall]);
        }

        let content = read_config(&config_path).await?;
        let data = parse_config(&content)?;
        let plugins = remove_plugin_entries(data.get(PLUGIN_KEY));
        let plugins = (!plugins.is_empty()).then_some(plugins);
        let next = set_plugin_list(&content, plugins)?;
        self.write_config(&config_path, &next).await?;

        Ok(vec![
            InstallAction::UpdatedConfig(config_path),
            self.clear_plugin_cache().await?,
        ])
    }

    async fn write_config(&self, path: &Path, content: &str) -> Result<()> {
        if self.dry_run {
            debug!(path = %path.display(), "Dry run: skipping config write");
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    async fn clear_plugin_cache(&self) -> Result<InstallAction> {
        let dir = self.paths.plugin_cache_dir();
        if !self.dry_run {
            match tokio::fs::remove_dir_all(&dir).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to remove {}", dir.display()));
                }
            }
        }
        Ok(InstallAction::ClearedCache(dir))
    }
}

async fn read_config(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Parse JSON/JSONC config text. An empty document is an empty object.
pub fn parse_config(content: &str) -> Result<Value> {
    let value = jsonc_parser::parse_to_serde_value(content, &ParseOptions::default())
        .map_err(|e| anyhow!("Invalid JSONC ({e})"))?;
    match value {
        None => Ok(Value::Object(Default::default())),
        Some(value @ Value::Object(_)) => Ok(value),
        Some(_) => bail!("Config root must be a JSON object"),
    }
}

/// Mirrors JavaScript truthiness, which is how the host filters the list.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn existing_entries(list: Option<&Value>) -> Vec<Value> {
    match list {
        Some(Value::Array(items)) => items.iter().filter(|v| is_truthy(v)).cloned().collect(),
        _ => Vec::new(),
    }
}

fn is_pinned_entry(entry: &str) -> bool {
    entry == PLUGIN_NAME || entry.starts_with(&format!("{PLUGIN_NAME}@"))
}

/// Existing entries minus any (possibly version-pinned) copy of this plugin,
/// followed by the plugin itself.
pub fn normalize_plugin_list(list: Option<&Value>) -> Vec<Value> {
    let mut entries: Vec<Value> = existing_entries(list)
        .into_iter()
        .filter(|entry| !entry.as_str().is_some_and(is_pinned_entry))
        .collect();
    entries.push(Value::String(PLUGIN_NAME.to_string()));
    entries
}

/// Existing entries minus anything that mentions this plugin.
pub fn remove_plugin_entries(list: Option<&Value>) -> Vec<Value> {
    existing_entries(list)
        .into_iter()
        .filter(|entry| match entry.as_str() {
            Some(name) => !is_pinned_entry(name) && !name.contains(PLUGIN_NAME),
            None => true,
        })
        .collect()
}

/// Rewrite the `plugin` property of `content` in place; `None` removes it.
pub fn set_plugin_list(content: &str, plugins: Option<Vec<Value>>) -> Result<String> {
    let root = CstRootNode::parse(content, &ParseOptions::default())
        .map_err(|e| anyhow!("Invalid JSONC ({e})"))?;
    let object = root.object_value_or_set();

    match (object.get(PLUGIN_KEY), plugins) {
        (Some(prop), Some(plugins)) => prop.set_value(to_cst_input(Value::Array(plugins))),
        (None, Some(plugins)) => {
            object.append(PLUGIN_KEY, to_cst_input(Value::Array(plugins)));
        }
        (Some(prop), None) => prop.remove(),
        (None, None) => {}
    }

    let mut next = root.to_string();
    if !next.ends_with('\n') {
        next.push('\n');
    }
    Ok(next)
}

fn to_cst_input(value: Value) -> CstInputValue {
    match value {
        Value::Null => CstInputValue::Null,
        Value::Bool(b) => CstInputValue::Bool(b),
        Value::Number(n) => CstInputValue::Number(n.to_string()),
        Value::String(s) => CstInputValue::String(s),
        Value::Array(items) => CstInputValue::Array(items.into_iter().map(to_cst_input).collect()),
        Value::Object(fields) => CstInputValue::Object(
            fields
                .into_iter()
                .map(|(key, value)| (key, to_cst_input(value)))
                .collect(),
        ),
    }
}
