//! Shell command bridge to an external wallpaper setter.
//!
//! The configured command runs through `sh -c` once per phase change, and again
//! without a fade when the overlay text changes while the phase stays the same.
//! Everything it needs is passed in the environment:
//!
//! | Variable                   | Value                                          |
//! |----------------------------|------------------------------------------------|
//! | `PHASEWALL_PHASE`          | file stem of the phase, e.g. `5_golden_hour`   |
//! | `PHASEWALL_PHASE_INDEX`    | `0`..`7`                                       |
//! | `PHASEWALL_IMAGE`          | full path of the new image                     |
//! | `PHASEWALL_PREVIOUS_IMAGE` | image of the preceding phase (fade start)      |
//! | `PHASEWALL_INITIAL`        | `1` on the first render for a location         |
//! | `PHASEWALL_FADE_SECONDS`   | cross-fade length, `0` when initial            |
//! | `PHASEWALL_CITY`           | overlay city, empty when hidden                |
//! | `PHASEWALL_SUNRISE`        | overlay sunrise, empty when hidden             |
//! | `PHASEWALL_SUNSET`         | overlay sunset, empty when hidden              |
//! | `PHASEWALL_INFO_SIZE`      | overlay text scale                             |

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::core::phase::Phase;
use crate::render::{InfoOverlay, RenderSurface};

pub struct CommandSurface {
    command: String,
    wallpaper_dir: PathBuf,
    extension: String,
    fade: Duration,
    overlay: InfoOverlay,
    current: Option<Phase>,
}

impl CommandSurface {
    pub fn new(
        command: &str,
        wallpaper_dir: PathBuf,
        extension: impl Into<String>,
        fade: Duration,
    ) -> Self {
        Self {
            command: command.to_string(),
            wallpaper_dir,
            extension: extension.into(),
            fade,
            overlay: InfoOverlay::default(),
            current: None,
        }
    }

    pub fn wallpaper_dir(&self) -> &Path {
        &self.wallpaper_dir
    }

    /// Path of the image shown during `phase`.
    pub fn image_path(&self, phase: Phase) -> PathBuf {
        self.wallpaper_dir
            .join(format!("{}.{}", phase.file_stem(), self.extension))
    }

    fn environment(&self, phase: Phase, initial: bool) -> Vec<(&'static str, String)> {
        let fade = if initial { 0 } else { self.fade.as_secs() };
        let (sunrise, sunset) = self
            .overlay
            .sun_times
            .as_ref()
            .map(|sun| (sun.sunrise.clone(), sun.sunset.clone()))
            .unwrap_or_default();

        vec![
            ("PHASEWALL_PHASE", phase.file_stem().to_string()),
            ("PHASEWALL_PHASE_INDEX", phase.index().to_string()),
            (
                "PHASEWALL_IMAGE",
                self.image_path(phase).display().to_string(),
            ),
            (
                "PHASEWALL_PREVIOUS_IMAGE",
                self.image_path(phase.previous()).display().to_string(),
            ),
            ("PHASEWALL_INITIAL", u8::from(initial).to_string()),
            ("PHASEWALL_FADE_SECONDS", fade.to_string()),
            (
                "PHASEWALL_CITY",
                self.overlay.location.clone().unwrap_or_default(),
            ),
            ("PHASEWALL_SUNRISE", sunrise),
            ("PHASEWALL_SUNSET", sunset),
            ("PHASEWALL_INFO_SIZE", self.overlay.info_size.to_string()),
        ]
    }

    fn run_command(&self, phase: Phase, initial: bool) -> Result<()> {
        let image = self.image_path(phase);
        if !image.exists() {
            log_warning!("Wallpaper image not found: {}", image.display());
        }

        let status = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .envs(self.environment(phase, initial))
            .status()
            .with_context(|| format!("failed to run render command `{}`", self.command))?;

        if !status.success() {
            anyhow::bail!("render command `{}` exited with {status}", self.command);
        }
        Ok(())
    }
}

impl RenderSurface for CommandSurface {
    fn name(&self) -> &'static str {
        "command"
    }

    fn render(&mut self, phase: Phase, initial: bool) -> Result<()> {
        if self.current == Some(phase) {
            return Ok(());
        }

        self.run_command(phase, initial)?;
        self.current = Some(phase);
        Ok(())
    }

    fn update_overlay(&mut self, overlay: &InfoOverlay) -> Result<()> {
        self.overlay = overlay.clone();
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        match self.current {
            Some(phase) => self.run_command(phase, true),
            None => Ok(()),
        }
    }
}
