use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use board_core::{BoardContext, BoardLayout, Column};
use serde::Deserialize;
use shared::domain::{OrganizationId, UserId};

const DEFAULT_CONFIG_FILE: &str = "board.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub api_token: Option<String>,
    pub organization_id: Option<String>,
    pub user_id: Option<String>,
    pub timeout_secs: u64,
    pub columns: Vec<Column>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:3000".into(),
            api_token: None,
            organization_id: None,
            user_id: None,
            timeout_secs: 10,
            columns: Vec::new(),
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn context(&self) -> BoardContext {
        BoardContext {
            user_id: self.user_id.clone().map(UserId::from),
            organization_id: self.organization_id.clone().map(OrganizationId::from),
        }
    }

    /// Configured columns, or the standard four when the file defines none.
    pub fn layout(&self) -> anyhow::Result<BoardLayout> {
        if self.columns.is_empty() {
            return Ok(BoardLayout::default());
        }
        BoardLayout::new(self.columns.clone()).context("invalid [[columns]] configuration")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    api_token: Option<String>,
    organization_id: Option<String>,
    user_id: Option<String>,
    timeout_secs: Option<u64>,
    #[serde(default)]
    columns: Vec<Column>,
}

/// Defaults, then `board.toml` (or `explicit_path`), then `TASKBOARD_*` env vars.
pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = explicit_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?,
        Err(err) if explicit_path.is_some() => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if file_cfg.api_token.is_some() {
        settings.api_token = file_cfg.api_token;
    }
    if file_cfg.organization_id.is_some() {
        settings.organization_id = file_cfg.organization_id;
    }
    if file_cfg.user_id.is_some() {
        settings.user_id = file_cfg.user_id;
    }
    if let Some(v) = file_cfg.timeout_secs {
        settings.timeout_secs = v;
    }
    if !file_cfg.columns.is_empty() {
        settings.columns = file_cfg.columns;
    }
    Ok(())
}

fn apply_env<F>(settings: &mut Settings, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("TASKBOARD_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = lookup("TASKBOARD_API_TOKEN") {
        settings.api_token = Some(v);
    }
    if let Some(v) = lookup("TASKBOARD_ORGANIZATION_ID") {
        settings.organization_id = Some(v);
    }
    if let Some(v) = lookup("TASKBOARD_USER_ID") {
        settings.user_id = Some(v);
    }
    if let Some(v) = lookup("TASKBOARD_TIMEOUT_SECS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.timeout_secs = parsed,
            Err(_) => bail!("TASKBOARD_TIMEOUT_SECS must be a whole number of seconds, got '{v}'"),
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
