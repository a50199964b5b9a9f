//! Implementation of the `now` command.
//!
//! Resolves a location (the CITY argument, or the configured coordinates or
//! city), computes today's solar times and prints the phase the daemon would
//! show right now. Nothing is rendered.

use anyhow::{Context, Result};
use chrono::Utc;

use crate::common::utils;
use crate::config::Config;
use crate::core::SchedulerSettings;
use crate::core::phase::classify;
use crate::geo::display::log_solar_times;
use crate::geo::{self, CityResolver, Location, SolarTimeProvider, SunriseProvider};
use crate::time_source;

/// Pick the location for a one-shot query.
fn location_for(city: Option<&str>, config: &Config) -> Result<Location> {
    if let Some(city) = city {
        return Ok(geo::resolve(&CityResolver::new(), city)?);
    }
    if let Some((latitude, longitude)) = config.coordinates() {
        let name = config
            .city()
            .map(str::to_string)
            .unwrap_or_else(|| utils::format_coordinates(latitude, longitude));
        return Ok(Location::new(latitude, longitude, name));
    }
    let city = config
        .city()
        .context("No location configured; pass a city or set `city` in the configuration")?;
    Ok(geo::resolve(&CityResolver::new(), city)?)
}

/// Handle `phasewall now [CITY]`.
pub fn handle_now_command(city: Option<&str>, debug_enabled: bool) -> Result<()> {
    log_version!();

    let config = Config::load()?;
    let location = location_for(city, &config)?;

    log_block_start!(
        "Location: {} ({})",
        location.name,
        utils::format_coordinates(location.latitude, location.longitude)
    );

    let now = time_source::now();
    let times = SunriseProvider::new().fetch(&location, now.date_naive())?;
    log_solar_times(&location, &times);

    let settings = SchedulerSettings::from_config(&config);
    let phase = classify(now.with_timezone(&Utc), &times, settings.lookahead());

    log_block_start!("Current phase: {phase}");
    if debug_enabled {
        log_indented!(
            "Image: {}",
            utils::private_path(
                &config
                    .wallpaper_dir()
                    .join(format!("{}.{}", phase.file_stem(), config.image_extension()))
            )
        );
        log_indented!(
            "Lookahead: {}",
            utils::plural(settings.interval.as_secs() / 60, "minute")
        );
    }
    log_end!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_win_over_city() {
        let config = Config {
            city: Some("Tokyo".to_string()),
            latitude: Some(48.8566),
            longitude: Some(2.3522),
            ..Config::default()
        };

        let location = location_for(None, &config).unwrap();
        assert_eq!(location.name, "Tokyo");
        assert_eq!(location.latitude, 48.8566);
    }

    #[test]
    fn test_unnamed_coordinates_are_formatted() {
        let config = Config {
            latitude: Some(-33.8688),
            longitude: Some(151.2093),
            ..Config::default()
        };

        let location = location_for(None, &config).unwrap();
        assert_eq!(location.name, "33.869°S, 151.209°E");
    }

    #[test]
    fn test_missing_location_is_an_error() {
        assert!(location_for(None, &Config::default()).is_err());
    }

    #[test]
    fn test_argument_overrides_config() {
        let config = Config {
            latitude: Some(0.0),
            longitude: Some(0.0),
            ..Config::default()
        };

        let location = location_for(Some("Paris, France"), &config).unwrap();
        assert_eq!(location.name, "Paris, France");
    }
}
