//! Configuration system for phasewall.
//!
//! Settings live in a single TOML file, `phasewall.toml`, under
//! `$XDG_CONFIG_HOME/phasewall/` (or the directory passed with `--config`).
//! A commented default file is written on first run, and the running daemon
//! reloads it whenever it changes on disk or receives `SIGUSR2`.
//!
//! ```toml
//! #[Location]
//! city = "Paris, France"   # City name, optionally "City, Country"
//! #latitude = 48.8566      # Coordinates override the city lookup
//! #longitude = 2.3522
//!
//! #[Overlay]
//! show_city = true                     # Show the location name
//! show_sunset_and_sunrise_times = true # Show today's sunrise and sunset
//! info_size = 1.0                      # Overlay text scale (0.25-4.0)
//!
//! #[Schedule]
//! update_interval = 10     # Minutes between phase checks (1-60)
//! debounce = 2000          # Milliseconds to wait after a city change (0-10000)
//!
//! #[Wallpapers]
//! wallpaper_dir = "~/.local/share/phasewall/wallpapers"
//! image_extension = "jpg"
//! render_command = "swww img \"$PHASEWALL_IMAGE\" --transition-duration \"$PHASEWALL_FADE_SECONDS\""
//! #fade_duration = 600     # Cross-fade length in seconds (defaults to update_interval)
//! ```
//!
//! Every field is optional. Accessor methods such as [`Config::update_interval`]
//! apply the defaults from [`crate::common::constants`] so callers never deal
//! with missing values.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::common::constants::*;
use crate::common::utils::{format_coordinates, private_path};

mod builder;
mod loading;
pub mod validation;
mod watcher;


pub use builder::create_default_config;
pub use loading::{
    get_config_base_dir, get_config_path, get_custom_config_dir, load, load_from_path,
    set_config_dir,
};
pub use watcher::start_config_watcher;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    /// City to resolve, "City" or "City, Country".
    pub city: Option<String>,
    /// Coordinates take precedence over `city` when both are present.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub show_city: Option<bool>,
    pub show_sunset_and_sunrise_times: Option<bool>,
    pub info_size: Option<f64>,

    pub update_interval: Option<u64>, // minutes
    pub debounce: Option<u64>,        // milliseconds

    pub wallpaper_dir: Option<String>,
    pub image_extension: Option<String>,
    pub render_command: Option<String>,
    pub fade_duration: Option<u64>, // seconds
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        load()
    }

    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        load_from_path(path)
    }

    /// Configured city, trimmed, if non-empty.
    pub fn city(&self) -> Option<&str> {
        self.city
            .as_deref()
            .map(str::trim)
            .filter(|city| !city.is_empty())
    }

    /// Configured coordinates, only when both halves are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    pub fn show_city(&self) -> bool {
        self.show_city.unwrap_or(DEFAULT_SHOW_CITY)
    }

    pub fn show_sun_times(&self) -> bool {
        self.show_sunset_and_sunrise_times
            .unwrap_or(DEFAULT_SHOW_SUN_TIMES)
    }

    pub fn info_size(&self) -> f64 {
        self.info_size.unwrap_or(DEFAULT_INFO_SIZE)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval.unwrap_or(DEFAULT_UPDATE_INTERVAL) * 60)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce.unwrap_or(DEFAULT_DEBOUNCE))
    }

    /// Cross-fade length; follows the update interval unless set explicitly.
    pub fn fade_duration(&self) -> Duration {
        self.fade_duration
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.update_interval())
    }

    pub fn image_extension(&self) -> String {
        self.image_extension
            .as_deref()
            .map(|ext| ext.trim().trim_start_matches('.'))
            .filter(|ext| !ext.is_empty())
            .unwrap_or(DEFAULT_IMAGE_EXTENSION)
            .to_string()
    }

    /// Directory holding the eight phase images, with `~` expanded.
    pub fn wallpaper_dir(&self) -> PathBuf {
        match self.wallpaper_dir.as_deref().map(str::trim) {
            Some(dir) if !dir.is_empty() => expand_home(dir),
            _ => default_wallpaper_dir(),
        }
    }

    pub fn log_config(&self) {
        log_block_start!("Loaded configuration");

        if let Ok(path) = get_config_path() {
            log_indented!("Config file: {}", private_path(&path));
        }

        match (self.coordinates(), self.city()) {
            (Some((lat, lon)), _) => {
                log_indented!("Location: {}", format_coordinates(lat, lon));
            }
            (None, Some(city)) => log_indented!("City: {city}"),
            (None, None) => log_indented!("Location: not set"),
        }

        log_indented!(
            "Update interval: {} min",
            self.update_interval().as_secs() / 60
        );
        log_indented!("City debounce: {} ms", self.debounce().as_millis());
        log_indented!(
            "Overlay: city {}, sun times {}, size {}",
            on_off(self.show_city()),
            on_off(self.show_sun_times()),
            self.info_size()
        );
        log_indented!("Wallpapers: {}", private_path(&self.wallpaper_dir()));
        match self.render_command.as_deref().map(str::trim) {
            Some(command) if !command.is_empty() => {
                log_indented!("Render command: {command}");
                log_indented!("Fade duration: {}s", self.fade_duration().as_secs());
            }
            _ => log_indented!("Render command: none (logging only)"),
        }
    }
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

fn default_wallpaper_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join("wallpapers")
}
