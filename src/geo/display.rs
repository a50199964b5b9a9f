//! Display helpers for solar times and the info overlay.
//!
//! Times are always shown in the timezone of the coordinates, not the machine's
//! local timezone, so "Sunrise 6:12 AM" for Tokyo reads as Tokyo time.

use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;

use crate::geo::solar::determine_timezone;
use crate::geo::{Location, SolarTimes};
use crate::render::{InfoOverlay, OverlaySettings, SunTimesText};

/// Format a UTC instant as a 12-hour clock time in `tz`, e.g. "6:05 AM".
pub fn format_clock(time: DateTime<Utc>, tz: Tz) -> String {
    time.with_timezone(&tz).format("%-I:%M %p").to_string()
}

/// Build the overlay content for a location and its solar times.
pub fn build_overlay(
    location: &Location,
    times: &SolarTimes,
    settings: &OverlaySettings,
) -> InfoOverlay {
    let sun_times = settings.show_sun_times.then(|| {
        let tz = determine_timezone(location.latitude, location.longitude);
        SunTimesText {
            sunrise: format_clock(times.sunrise(), tz),
            sunset: format_clock(times.sunset(), tz),
        }
    });

    InfoOverlay {
        location: settings.show_city.then(|| location.name.clone()),
        sun_times,
        info_size: settings.info_size,
    }
}

/// Log all five solar events for a location, in coordinate and local time.
pub fn log_solar_times(location: &Location, times: &SolarTimes) {
    let tz = determine_timezone(location.latitude, location.longitude);
    let events = [
        ("Civil dawn", times.civil_twilight_begin()),
        ("Sunrise", times.sunrise()),
        ("Solar noon", times.solar_noon()),
        ("Sunset", times.sunset()),
        ("Civil dusk", times.civil_twilight_end()),
    ];

    let local_differs = events
        .iter()
        .any(|(_, t)| t.with_timezone(&tz).naive_local() != t.with_timezone(&Local).naive_local());

    log_decorated!("Solar times for {} ({tz}):", location.name);
    for (label, time) in events {
        if local_differs {
            log_indented!(
                "{label:>10}: {:>8}  [{} local]",
                format_clock(time, tz),
                time.with_timezone(&Local).format("%H:%M")
            );
        } else {
            log_indented!("{label:>10}: {:>8}", format_clock(time, tz));
        }
    }
}
