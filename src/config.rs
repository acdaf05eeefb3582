use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{DEFAULT_CATEGORIES, default_category_color};
use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Which storage adapter backs the record collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendKind,
    /// Empty means "the profile's data directory"
    #[serde(default)]
    pub database_path: String,
    /// Fill the in-memory backend with sample records on startup
    #[serde(default = "default_true")]
    pub seed_demo_data: bool,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    /// Per-category time block colors, overriding the built-in palette
    #[serde(default)]
    pub category_colors: HashMap<String, String>,
    /// Spending above this share of a limit is flagged as a warning
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold_percent: f64,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default = "default_current_theme")]
    pub current_theme: String,
    #[serde(default)]
    pub themes: HashMap<String, Theme>,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_new")]
    pub new: String,
    #[serde(default = "default_edit")]
    pub edit: String,
    #[serde(default = "default_save")]
    pub save: String,
    #[serde(default = "default_delete")]
    pub delete: String,
    #[serde(default = "default_search")]
    pub search: String,
    #[serde(default = "default_select")]
    pub select: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
    #[serde(default = "default_column_left")]
    pub column_left: String,
    #[serde(default = "default_column_right")]
    pub column_right: String,
    #[serde(default = "default_move_left")]
    pub move_left: String,
    #[serde(default = "default_move_right")]
    pub move_right: String,
    #[serde(default = "default_grab")]
    pub grab: String,
    #[serde(default = "default_week_prev")]
    pub week_prev: String,
    #[serde(default = "default_week_next")]
    pub week_next: String,
    #[serde(default = "default_jump_today")]
    pub jump_today: String,
    #[serde(default = "default_set_budget")]
    pub set_budget: String,
    #[serde(default = "default_copy")]
    pub copy: String,
    #[serde(default = "default_tag_filter")]
    pub tag_filter: String,
    #[serde(default = "default_tab_left")]
    pub tab_left: String,
    #[serde(default = "default_tab_right")]
    pub tab_right: String,
    #[serde(default = "default_tab_1")]
    pub tab_1: String,
    #[serde(default = "default_tab_2")]
    pub tab_2: String,
    #[serde(default = "default_tab_3")]
    pub tab_3: String,
    #[serde(default = "default_tab_4")]
    pub tab_4: String,
    #[serde(default = "default_tab_5")]
    pub tab_5: String,
    #[serde(default = "default_help")]
    pub help: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    #[serde(default = "default_tab_bg")]
    pub tab_bg: String,
    #[serde(default = "default_warning")]
    pub warning: String,
    #[serde(default = "default_danger")]
    pub danger: String,
    #[serde(default = "default_success")]
    pub success: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            database_path: String::new(),
            seed_demo_data: true,
            currency_symbol: default_currency_symbol(),
            categories: default_categories(),
            category_colors: HashMap::new(),
            warning_threshold_percent: default_warning_threshold(),
            key_bindings: KeyBindings::default(),
            current_theme: default_current_theme(),
            themes: HashMap::new(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            new: default_new(),
            edit: default_edit(),
            save: default_save(),
            delete: default_delete(),
            search: default_search(),
            select: default_select(),
            list_up: default_list_up(),
            list_down: default_list_down(),
            column_left: default_column_left(),
            column_right: default_column_right(),
            move_left: default_move_left(),
            move_right: default_move_right(),
            grab: default_grab(),
            week_prev: default_week_prev(),
            week_next: default_week_next(),
            jump_today: default_jump_today(),
            set_budget: default_set_budget(),
            copy: default_copy(),
            tag_filter: default_tag_filter(),
            tab_left: default_tab_left(),
            tab_right: default_tab_right(),
            tab_1: default_tab_1(),
            tab_2: default_tab_2(),
            tab_3: default_tab_3(),
            tab_4: default_tab_4(),
            tab_5: default_tab_5(),
            help: default_help(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            tab_bg: default_tab_bg(),
            warning: default_warning(),
            danger: default_danger(),
            success: default_success(),
        }
    }
}

impl Theme {
    /// Get preset themes that are always available
    pub fn get_preset_themes() -> HashMap<String, Theme> {
        let mut themes = HashMap::new();

        themes.insert("default".to_string(), Theme::default());

        themes.insert("light".to_string(), Theme {
            fg: "black".to_string(),
            bg: "white".to_string(),
            highlight_bg: "#5B4CDB".to_string(),
            tab_bg: "gray".to_string(),
            ..Theme::default()
        });

        themes.insert("monochrome".to_string(), Theme {
            fg: "white".to_string(),
            bg: "black".to_string(),
            highlight_bg: "white".to_string(),
            tab_bg: "gray".to_string(),
            warning: "white".to_string(),
            danger: "white".to_string(),
            success: "white".to_string(),
        });

        themes
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

fn default_warning_threshold() -> f64 {
    80.0
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_new() -> String {
    "n".to_string()
}

fn default_edit() -> String {
    "e".to_string()
}

fn default_save() -> String {
    "Ctrl+s".to_string()
}

fn default_delete() -> String {
    "d".to_string()
}

fn default_search() -> String {
    "/".to_string()
}

fn default_select() -> String {
    "Enter".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_column_left() -> String {
    "h".to_string()
}

fn default_column_right() -> String {
    "l".to_string()
}

fn default_move_left() -> String {
    "<".to_string()
}

fn default_move_right() -> String {
    ">".to_string()
}

fn default_grab() -> String {
    "m".to_string()
}

fn default_week_prev() -> String {
    "[".to_string()
}

fn default_week_next() -> String {
    "]".to_string()
}

fn default_jump_today() -> String {
    "t".to_string()
}

fn default_set_budget() -> String {
    "b".to_string()
}

fn default_copy() -> String {
    "y".to_string()
}

fn default_tag_filter() -> String {
    "#".to_string()
}

fn default_tab_left() -> String {
    "Left".to_string()
}

fn default_tab_right() -> String {
    "Right".to_string()
}

fn default_tab_1() -> String {
    "1".to_string()
}

fn default_tab_2() -> String {
    "2".to_string()
}

fn default_tab_3() -> String {
    "3".to_string()
}

fn default_tab_4() -> String {
    "4".to_string()
}

fn default_tab_5() -> String {
    "5".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_current_theme() -> String {
    "default".to_string()
}

fn default_fg() -> String {
    "white".to_string()
}

fn default_bg() -> String {
    "black".to_string()
}

fn default_highlight_bg() -> String {
    "blue".to_string()
}

fn default_tab_bg() -> String {
    "gray".to_string()
}

fn default_warning() -> String {
    "yellow".to_string()
}

fn default_danger() -> String {
    "red".to_string()
}

fn default_success() -> String {
    "green".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
}

impl Config {
    /// Load configuration from the profile's config file, creating it with defaults if missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        Self::load_from_path(&config_path, profile)
    }

    /// Load configuration from an explicit file (the `--config` flag).
    /// A missing file is created with defaults.
    pub fn load_from_path(config_path: &Path, profile: utils::Profile) -> Result<Self, ConfigError> {
        let mut config = if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            toml::from_str::<Config>(&contents)?
        } else {
            let mut config = Config::default();
            let save_result = config.save_to_path(config_path);
            if let Err(ref e) = save_result {
                tracing::error!(path = %config_path.display(), error = %e, "failed to save default config");
            }
            save_result?;
            config
        };

        if config.database_path.trim().is_empty() {
            config.database_path = Self::default_database_path_for_profile(profile);
        }

        Ok(config)
    }

    /// Save configuration to the given file
    pub fn save_to_path(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        // Ensure config version is set before saving
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get default database path for a specific profile
    fn default_database_path_for_profile(profile: utils::Profile) -> String {
        if let Some(data_dir) = utils::get_data_dir(profile) {
            data_dir.join("dayboard.db").to_string_lossy().to_string()
        } else {
            match profile {
                utils::Profile::Dev => "~/.local/share/dayboard-dev/dayboard.db".to_string(),
                utils::Profile::Prod => "~/.local/share/dayboard/dayboard.db".to_string(),
            }
        }
    }

    /// Get the expanded database path (with ~ expansion)
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }

    /// Time block color for a category: user override first, then the built-in palette
    pub fn category_color(&self, category: &str) -> String {
        self.category_colors
            .get(category)
            .cloned()
            .unwrap_or_else(|| default_category_color(category).to_string())
    }

    /// Get the currently active theme, falling back to the default preset
    pub fn get_active_theme(&self) -> Theme {
        if let Some(theme) = self.themes.get(&self.current_theme) {
            theme.clone()
        } else if let Some(theme) = Theme::get_preset_themes().remove(&self.current_theme) {
            theme
        } else {
            Theme::default()
        }
    }
}
