//! Astronomical solar event calculation.
//!
//! Civil twilight, sunrise and sunset come from the `sunrise` crate. Solar noon is
//! taken as the midpoint between sunrise and sunset, which is within a minute of
//! the true transit everywhere the classifier is meaningful.
//!
//! Near the poles the sun may not rise or set at all on a given date. Latitudes
//! are clamped to ±[`MAXIMUM_SOLAR_LATITUDE`] before calculating, and any result
//! that still violates the solar ordering is reported as
//! [`PhaseError::NoSolarData`].

use chrono::NaiveDate;
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use sunrise::{Coordinates, DawnType, SolarDay, SolarEvent};
use tzf_rs::DefaultFinder;

use crate::common::constants::MAXIMUM_SOLAR_LATITUDE;
use crate::error::PhaseError;
use crate::geo::{Location, SolarTimeProvider, SolarTimes};

static TIMEZONE_FINDER: Lazy<DefaultFinder> = Lazy::new(DefaultFinder::new);

/// Provider that computes solar events locally, with no network access.
#[derive(Debug, Default, Clone, Copy)]
pub struct SunriseProvider;

impl SunriseProvider {
    pub fn new() -> Self {
        Self
    }
}

impl SolarTimeProvider for SunriseProvider {
    fn fetch(&self, location: &Location, date: NaiveDate) -> Result<SolarTimes, PhaseError> {
        let latitude = location
            .latitude
            .clamp(-MAXIMUM_SOLAR_LATITUDE, MAXIMUM_SOLAR_LATITUDE);

        let coord = Coordinates::new(latitude, location.longitude).ok_or_else(|| {
            PhaseError::NoSolarData {
                date,
                reason: format!(
                    "invalid coordinates {:.4}, {:.4}",
                    location.latitude, location.longitude
                ),
            }
        })?;

        let day = SolarDay::new(coord, date);
        let dawn = day.event_time(SolarEvent::Dawn(DawnType::Civil));
        let sunrise = day.event_time(SolarEvent::Sunrise);
        let sunset = day.event_time(SolarEvent::Sunset);
        let dusk = day.event_time(SolarEvent::Dusk(DawnType::Civil));
        let noon = sunrise + (sunset - sunrise) / 2;

        SolarTimes::new(dawn, sunrise, noon, sunset, dusk).ok_or_else(|| {
            PhaseError::NoSolarData {
                date,
                reason: format!(
                    "solar events out of order at {} (sun may not rise or set)",
                    location.name
                ),
            }
        })
    }
}

/// Timezone of the given coordinates, falling back to UTC when the lookup fails.
pub fn determine_timezone(latitude: f64, longitude: f64) -> Tz {
    TIMEZONE_FINDER
        .get_tz_name(longitude, latitude)
        .parse::<Tz>()
        .unwrap_or(Tz::UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn paris() -> Location {
        Location::new(48.8566, 2.3522, "Paris, France")
    }

    #[test]
    fn test_paris_summer_solstice() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let times = SunriseProvider::new().fetch(&paris(), date).unwrap();

        // Sunrise around 03:47 UTC, sunset around 19:58 UTC
        assert_eq!(times.sunrise().hour(), 3);
        assert_eq!(times.sunset().hour(), 19);
        assert!(times.civil_twilight_begin() < times.sunrise());
        assert!(times.civil_twilight_end() > times.sunset());

        let noon = times.solar_noon();
        assert!(noon.hour() == 11 || noon.hour() == 12);
    }

    #[test]
    fn test_far_north_is_clamped() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 21).unwrap();
        let tromso = Location::new(69.6492, 18.9553, "Tromsø, Norway");

        // Polar night at the real latitude; the clamped latitude still has a day
        let times = SunriseProvider::new().fetch(&tromso, date).unwrap();
        assert!(times.sunrise() < times.sunset());
    }

    #[test]
    fn test_determine_timezone() {
        assert_eq!(determine_timezone(48.8566, 2.3522), chrono_tz::Europe::Paris);
        assert_eq!(determine_timezone(35.6762, 139.6503), chrono_tz::Asia::Tokyo);
    }
}
