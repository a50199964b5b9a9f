//! Default configuration file generation.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::common::constants::*;
use crate::common::utils::private_path;

/// Write a commented default `phasewall.toml` at `path`.
///
/// The file is written to a temporary sibling and renamed into place so a
/// watcher never sees a half-written config.
pub fn create_default_config(path: &Path, city: Option<&str>) -> Result<()> {
    let parent = path
        .parent()
        .context("Config path has no parent directory")?;
    fs::create_dir_all(parent).context("Failed to create config directory")?;

    let content = default_config_content(city);

    let mut temp = NamedTempFile::new_in(parent)
        .context("Failed to create temporary config file")?;
    temp.write_all(content.as_bytes())
        .context("Failed to write default config")?;
    temp.persist(path)
        .with_context(|| format!("Failed to save config to {}", private_path(path)))?;

    log_block_start!("Created default configuration");
    log_indented!("{}", private_path(path));
    Ok(())
}

fn default_config_content(city: Option<&str>) -> String {
    let city_line = match city {
        Some(city) => format!("\"{}\"", city.replace('"', "")),
        None => "\"\"".to_string(),
    };

    let mut content = TemplateBuilder::new()
        .section("Location")
        .setting("city", &city_line, "City name, \"City\" or \"City, Country\"")
        .commented("latitude", "48.8566", "Coordinates override the city lookup")
        .commented("longitude", "2.3522", "Both are required when either is set")
        .section("Overlay")
        .setting(
            "show_city",
            &DEFAULT_SHOW_CITY.to_string(),
            "Show the location name",
        )
        .setting(
            "show_sunset_and_sunrise_times",
            &DEFAULT_SHOW_SUN_TIMES.to_string(),
            "Show today's sunrise and sunset",
        )
        .setting(
            "info_size",
            &format!("{DEFAULT_INFO_SIZE:.1}"),
            &format!("Overlay text scale ({MINIMUM_INFO_SIZE}-{MAXIMUM_INFO_SIZE})"),
        )
        .section("Schedule")
        .setting(
            "update_interval",
            &DEFAULT_UPDATE_INTERVAL.to_string(),
            &format!(
                "Minutes between phase checks ({MINIMUM_UPDATE_INTERVAL}-{MAXIMUM_UPDATE_INTERVAL})"
            ),
        )
        .setting(
            "debounce",
            &DEFAULT_DEBOUNCE.to_string(),
            &format!("Milliseconds to wait after a city change (0-{MAXIMUM_DEBOUNCE})"),
        )
        .section("Wallpapers")
        .commented(
            "wallpaper_dir",
            "\"~/.local/share/phasewall/wallpapers\"",
            "Folder with 0_night.jpg ... 7_dusk.jpg",
        )
        .setting(
            "image_extension",
            &format!("\"{DEFAULT_IMAGE_EXTENSION}\""),
            "Extension of the phase images",
        )
        .commented(
            "render_command",
            "\"swww img \\\"$PHASEWALL_IMAGE\\\"\"",
            "Shell command that sets the wallpaper",
        )
        .commented(
            "fade_duration",
            &(DEFAULT_UPDATE_INTERVAL * 60).to_string(),
            &format!("Cross-fade seconds (0-{MAXIMUM_FADE_DURATION}, default: update_interval)"),
        )
        .build();

    content.push('\n');
    content
}

struct TemplateLine {
    text: String,
    comment: Option<String>,
}

/// Builds a TOML template with comments aligned in one column.
struct TemplateBuilder {
    lines: Vec<TemplateLine>,
}

impl TemplateBuilder {
    fn new() -> Self {
        Self { lines: Vec::new() }
    }

    fn section(mut self, title: &str) -> Self {
        if !self.lines.is_empty() {
            self.lines.push(TemplateLine {
                text: String::new(),
                comment: None,
            });
        }
        self.lines.push(TemplateLine {
            text: format!("#[{title}]"),
            comment: None,
        });
        self
    }

    fn setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.lines.push(TemplateLine {
            text: format!("{key} = {value}"),
            comment: Some(comment.to_string()),
        });
        self
    }

    /// A setting that is present in the template but disabled.
    fn commented(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.lines.push(TemplateLine {
            text: format!("#{key} = {value}"),
            comment: Some(comment.to_string()),
        });
        self
    }

    fn build(self) -> String {
        let column = self
            .lines
            .iter()
            .filter(|line| line.comment.is_some())
            .map(|line| line.text.len())
            .max()
            .unwrap_or(0)
            + 1;

        self.lines
            .into_iter()
            .map(|line| match line.comment {
                Some(comment) => format!("{:<column$}# {comment}", line.text),
                None => line.text,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
