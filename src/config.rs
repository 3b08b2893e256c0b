use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// E-mail of the logged-in user, if any.
    #[serde(default)]
    pub current_user: Option<String>,

    /// Month pickers never go back further than this.
    #[serde(default = "default_picker_start_from")]
    pub picker_start_from: String,

    #[serde(default = "default_dashboard_span")]
    pub dashboard_months_back: u32,
    #[serde(default = "default_dashboard_span")]
    pub dashboard_months_ahead: u32,

    #[serde(default = "default_budget_months_back")]
    pub budget_months_back: u32,
    #[serde(default = "default_budget_months_ahead")]
    pub budget_months_ahead: u32,

    /// Number of transactions shown on the dashboard.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

fn default_picker_start_from() -> String {
    "2025-07".to_string()
}

fn default_dashboard_span() -> u32 {
    12
}

fn default_budget_months_back() -> u32 {
    1
}

fn default_budget_months_ahead() -> u32 {
    12
}

fn default_recent_limit() -> usize {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            current_user: None,
            picker_start_from: default_picker_start_from(),
            dashboard_months_back: default_dashboard_span(),
            dashboard_months_ahead: default_dashboard_span(),
            budget_months_back: default_budget_months_back(),
            budget_months_ahead: default_budget_months_ahead(),
            recent_limit: default_recent_limit(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

pub fn app_paths(override_home: Option<PathBuf>) -> Result<AppPaths> {
    if let Some(home) = override_home {
        return Ok(AppPaths {
            config_dir: home.join("config"),
            data_dir: home.join("data"),
        });
    }

    let proj = ProjectDirs::from("com", "budgetbook", "budgetbook")
        .context("Failed to resolve platform directories")?;

    Ok(AppPaths {
        config_dir: proj.config_dir().to_path_buf(),
        data_dir: proj.data_dir().to_path_buf(),
    })
}

pub fn load_or_init_config(paths: &AppPaths) -> Result<(AppConfig, PathBuf)> {
    fs::create_dir_all(&paths.config_dir)
        .with_context(|| format!("Failed to create config dir {}", paths.config_dir.display()))?;

    let cfg_path = paths.config_dir.join("config.json");
    if !cfg_path.exists() {
        let cfg = AppConfig::default();
        write_config(&cfg_path, &cfg)?;
        return Ok((cfg, cfg_path));
    }

    let raw = fs::read_to_string(&cfg_path)
        .with_context(|| format!("Failed to read {}", cfg_path.display()))?;
    let cfg: AppConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", cfg_path.display()))?;

    Ok((cfg, cfg_path))
}

pub fn write_config(path: &Path, cfg: &AppConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(cfg)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}
