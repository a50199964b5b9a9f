//! Solar phases and the classifier that maps a moment in time onto one.
//!
//! The day is cut into eight ordered, contiguous intervals anchored on the five
//! solar events. Boundaries are half-open: a time exactly on a boundary belongs
//! to the later phase.
//!
//! ```text
//!   Night │ Dawn │ Sunrise │ Morning │ Day │ GoldenHour │ Sunset │ Dusk │ Night
//!         ▲      ▲         ▲         ▲     ▲            ▲        ▲      ▲
//!   civil_begin  sunrise  +30m      noon  sunset-30m   sunset  +30m  civil_end
//! ```
//!
//! When `sunset - 30m` falls before solar noon (very short days) the Day phase
//! is skipped and Morning runs straight into GoldenHour. Likewise Dusk has no
//! width when civil twilight ends within 30 minutes of sunset.

use chrono::{DateTime, Duration, Utc};
use std::fmt;

use crate::common::constants::SUN_EVENT_WINDOW_MINUTES;
use crate::geo::SolarTimes;

/// One of the eight solar-illumination states, in daily order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Night,
    Dawn,
    Sunrise,
    Morning,
    Day,
    GoldenHour,
    Sunset,
    Dusk,
}

impl Phase {
    pub const ALL: [Phase; 8] = [
        Phase::Night,
        Phase::Dawn,
        Phase::Sunrise,
        Phase::Morning,
        Phase::Day,
        Phase::GoldenHour,
        Phase::Sunset,
        Phase::Dusk,
    ];

    /// Ordinal 0..=7, also the index passed to render surfaces.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The phase after this one, wrapping Dusk to Night.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// The phase before this one, wrapping Night to Dusk.
    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Phase::Night => "Night",
            Phase::Dawn => "Dawn",
            Phase::Sunrise => "Sunrise",
            Phase::Morning => "Morning",
            Phase::Day => "Day",
            Phase::GoldenHour => "Golden hour",
            Phase::Sunset => "Sunset",
            Phase::Dusk => "Dusk",
        }
    }

    /// Wallpaper file name without extension.
    pub fn file_stem(self) -> &'static str {
        match self {
            Phase::Night => "0_night",
            Phase::Dawn => "1_dawn",
            Phase::Sunrise => "2_sunrise",
            Phase::Morning => "3_early_morning",
            Phase::Day => "4_day",
            Phase::GoldenHour => "5_golden_hour",
            Phase::Sunset => "6_sunset",
            Phase::Dusk => "7_dusk",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Classify `now + lookahead` against one day's solar events.
///
/// Total over all inputs. The lookahead (normally the update interval) makes a
/// phase change land at the start of its interval instead of up to one tick late.
pub fn classify(now: DateTime<Utc>, times: &SolarTimes, lookahead: Duration) -> Phase {
    let t = now + lookahead;
    let window = Duration::minutes(SUN_EVENT_WINDOW_MINUTES);

    if t < times.civil_twilight_begin() {
        Phase::Night
    } else if t < times.sunrise() {
        Phase::Dawn
    } else if t < times.sunrise() + window {
        Phase::Sunrise
    } else if t < times.solar_noon() {
        Phase::Morning
    } else if t < times.sunset() - window {
        Phase::Day
    } else if t < times.sunset() {
        Phase::GoldenHour
    } else if t < times.sunset() + window {
        Phase::Sunset
    } else if t < times.civil_twilight_end() {
        Phase::Dusk
    } else {
        Phase::Night
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, hour, minute, 0).unwrap()
    }

    fn equinox() -> SolarTimes {
        SolarTimes::new(at(6, 0), at(6, 30), at(12, 0), at(18, 0), at(18, 30)).unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let times = equinox();
        let zero = Duration::zero();

        assert_eq!(classify(at(6, 45), &times, zero), Phase::Sunrise);
        assert_eq!(classify(at(17, 35), &times, zero), Phase::GoldenHour);
        assert_eq!(classify(at(19, 0), &times, zero), Phase::Night);
    }

    #[test]
    fn test_boundaries_are_half_open() {
        let times = equinox();
        let zero = Duration::zero();

        let cases = [
            (at(5, 59), Phase::Night),
            (at(6, 0), Phase::Dawn),
            (at(6, 30), Phase::Sunrise),
            (at(7, 0), Phase::Morning),
            (at(12, 0), Phase::Day),
            (at(17, 30), Phase::GoldenHour),
            (at(18, 0), Phase::Sunset),
            (at(18, 29), Phase::Sunset),
            (at(18, 30), Phase::Night),
        ];

        for (time, expected) in cases {
            assert_eq!(
                classify(time, &times, zero),
                expected,
                "at {}",
                time.format("%H:%M")
            );
        }
    }

    #[test]
    fn test_lookahead_shifts_classification() {
        let times = equinox();

        assert_eq!(classify(at(5, 55), &times, Duration::zero()), Phase::Night);
        assert_eq!(
            classify(at(5, 55), &times, Duration::minutes(10)),
            Phase::Dawn
        );
    }

    #[test]
    fn test_short_day_skips_day_phase() {
        // Sunset 20 minutes after noon, so sunset - 30m falls before noon
        let times =
            SolarTimes::new(at(10, 30), at(11, 0), at(12, 0), at(12, 20), at(13, 0)).unwrap();

        let phases: Vec<Phase> = (0..24 * 60)
            .map(|m| classify(at(0, 0) + Duration::minutes(m), &times, Duration::zero()))
            .collect();

        assert!(!phases.contains(&Phase::Day));
        assert!(phases.contains(&Phase::Morning));
        assert!(phases.contains(&Phase::GoldenHour));
    }

    #[test]
    fn test_cyclic_navigation() {
        assert_eq!(Phase::Dusk.next(), Phase::Night);
        assert_eq!(Phase::Night.previous(), Phase::Dusk);
        assert_eq!(Phase::Morning.next().previous(), Phase::Morning);

        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), i);
            assert_eq!(Phase::from_index(i), Some(*phase));
        }
        assert_eq!(Phase::from_index(8), None);
    }

    #[test]
    fn test_file_stems() {
        assert_eq!(Phase::Morning.file_stem(), "3_early_morning");
        assert_eq!(Phase::GoldenHour.to_string(), "Golden hour");
    }
}
