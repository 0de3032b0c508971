//! Solver configuration.
//!
//! Loaded from `~/.hive-solver/config.toml` if present. Every key is
//! optional; flags and the environment override the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::Cli;
use crate::model::{Hive, StopAction};
use crate::webdriver::DEFAULT_BASE_URL;

/// The puzzle page opened on every full setup.
pub const DEFAULT_PUZZLE_URL: &str = "https://www.nytimes.com/puzzles/spelling-bee";

const DEFAULT_WINDOW_WIDTH: u32 = 1680;
const DEFAULT_WINDOW_HEIGHT: u32 = 939;

/// Settings read from the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// `WebDriver` endpoint, e.g. `http://localhost:9515`.
    pub webdriver_url: Option<String>,

    pub puzzle_url: Option<String>,
    pub window_width: Option<u32>,
    pub window_height: Option<u32>,

    /// Directory holding `wlist_match1.txt`.
    pub dictionary_dir: Option<PathBuf>,

    pub stop_action: Option<StopAction>,
}

impl Config {
    /// Load config from `~/.hive-solver/config.toml`.
    /// A missing file (or home directory) yields the defaults.
    pub fn load() -> Result<Self, String> {
        match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.hive-solver/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".hive-solver").join("config.toml"))
    }
}

/// The page an attempt navigates to and the window size it sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSettings {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_PUZZLE_URL.to_string(),
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

/// Everything a run needs, with all layers applied.
#[derive(Debug, Clone)]
pub struct Settings {
    pub webdriver_url: String,
    pub page: PageSettings,
    pub dictionary_dir: PathBuf,
    pub stop_action: StopAction,
    pub letters: Option<Hive>,
}

impl Settings {
    /// Merges flags over the environment over the file over defaults.
    ///
    /// `env_url` is the value of `WEBDRIVER_URL`, if set. `default_dir` is
    /// consulted only when neither flags nor file name a dictionary.
    pub fn resolve(
        cli: &Cli,
        config: Config,
        env_url: Option<String>,
        default_dir: impl FnOnce() -> Option<PathBuf>,
    ) -> Result<Self, String> {
        let webdriver_url = cli
            .webdriver_url
            .clone()
            .or(env_url.filter(|url| !url.trim().is_empty()))
            .or(config.webdriver_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let defaults = PageSettings::default();
        let page = PageSettings {
            url: config.puzzle_url.unwrap_or(defaults.url),
            width: config.window_width.unwrap_or(defaults.width),
            height: config.window_height.unwrap_or(defaults.height),
        };

        let dictionary_dir = cli
            .dictionary_dir
            .clone()
            .or(config.dictionary_dir)
            .or_else(default_dir)
            .ok_or("Could not locate word list directory. Specify --dictionary-dir=PATH.")?;

        let stop_action = cli
            .stop_action()
            .or(config.stop_action)
            .unwrap_or_default();

        Ok(Self {
            webdriver_url,
            page,
            dictionary_dir,
            stop_action,
            letters: cli.letters.clone(),
        })
    }
}
