//! Render surfaces that put the selected wallpaper on screen.
//!
//! The scheduler never draws anything itself. It hands a [`Phase`] and an
//! `initial` flag to a [`RenderSurface`] and leaves image loading, compositing
//! and cross-fading to whatever sits behind it.
//!
//! ## Surfaces
//!
//! - [`CommandSurface`]: runs a user-supplied shell command (e.g. `swww img`,
//!   `feh --bg-fill`) with the phase described in environment variables
//! - [`LogSurface`]: only reports phase changes; used when no command is configured
//!
//! Both are idempotent: rendering the phase that is already showing is a no-op.

use anyhow::Result;

use crate::config::Config;
use crate::core::phase::Phase;

pub mod command;

pub use command::CommandSurface;

/// Sunrise and sunset as display strings, e.g. "6:05 AM".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SunTimesText {
    pub sunrise: String,
    pub sunset: String,
}

/// Text shown alongside the wallpaper.
///
/// Fields are `None` when the matching visibility toggle is off.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoOverlay {
    pub location: Option<String>,
    pub sun_times: Option<SunTimesText>,
    /// Relative text scale, 1.0 is the default size.
    pub info_size: f64,
}

impl InfoOverlay {
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.sun_times.is_none()
    }
}

impl Default for InfoOverlay {
    fn default() -> Self {
        Self {
            location: None,
            sun_times: None,
            info_size: crate::common::constants::DEFAULT_INFO_SIZE,
        }
    }
}

/// Visibility toggles and scale for the overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySettings {
    pub show_city: bool,
    pub show_sun_times: bool,
    pub info_size: f64,
}

impl OverlaySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            show_city: config.show_city(),
            show_sun_times: config.show_sun_times(),
            info_size: config.info_size(),
        }
    }
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Something that can display the wallpaper for a phase.
pub trait RenderSurface {
    /// Short name for log output.
    fn name(&self) -> &'static str;

    /// Show the wallpaper for `phase`.
    ///
    /// When `initial` is true the image should appear without a cross-fade.
    /// Calling this again with the phase already on screen must do nothing.
    fn render(&mut self, phase: Phase, initial: bool) -> Result<()>;

    /// Replace the overlay text. Surfaces without an overlay ignore it.
    fn update_overlay(&mut self, overlay: &InfoOverlay) -> Result<()> {
        let _ = overlay;
        Ok(())
    }

    /// Show the phase already on screen again so a new overlay takes effect.
    ///
    /// Runs without a cross-fade and does nothing before the first render.
    fn redraw(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Surface that only logs what it would show.
#[derive(Debug, Default)]
pub struct LogSurface {
    current: Option<Phase>,
}

impl LogSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSurface for LogSurface {
    fn name(&self) -> &'static str {
        "log"
    }

    fn render(&mut self, phase: Phase, initial: bool) -> Result<()> {
        if self.current == Some(phase) {
            return Ok(());
        }
        let transition = if initial { "shown" } else { "faded in" };
        log_indented!("Wallpaper {} {transition}", phase.file_stem());
        self.current = Some(phase);
        Ok(())
    }

    fn update_overlay(&mut self, overlay: &InfoOverlay) -> Result<()> {
        if let Some(location) = &overlay.location {
            log_indented!("Overlay city: {location}");
        }
        if let Some(sun) = &overlay.sun_times {
            log_indented!("Overlay sun times: ☀ {} ☾ {}", sun.sunrise, sun.sunset);
        }
        Ok(())
    }
}

/// Create the surface described by the configuration.
pub fn create_surface(config: &Config) -> Box<dyn RenderSurface> {
    match config.render_command.as_deref().map(str::trim) {
        Some(command) if !command.is_empty() => Box::new(CommandSurface::new(
            command,
            config.wallpaper_dir(),
            config.image_extension(),
            config.fade_duration(),
        )),
        _ => Box::new(LogSurface::new()),
    }
}
