//! Geographic collaborators of the scheduler.
//!
//! The scheduler only talks to two narrow interfaces: a [`LocationResolver`] that
//! turns a free-text city name into candidate places, and a [`SolarTimeProvider`]
//! that returns the five daily solar events for a location and date. Everything in
//! this module sits behind one of those two seams.
//!
//! ## Module Structure
//!
//! - [`resolver`]: offline city lookup backed by the `cities` database
//! - [`solar`]: astronomical solar event calculation backed by `sunrise`
//! - [`cache`]: one-entry per-day cache in front of the provider
//! - [`backoff`]: bounded exponential retry for transient provider failures
//! - [`display`]: overlay text and timezone-aware formatting of solar times

pub mod backoff;
pub mod cache;
pub mod display;
pub mod resolver;
pub mod solar;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::PhaseError;

pub use backoff::{RetryPolicy, RetryingProvider};
pub use cache::{CacheEntry, DailyCache};
pub use resolver::CityResolver;
pub use solar::SunriseProvider;

/// A resolved place on the globe.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Human-readable label, "City, Country" for resolved cities.
    pub name: String,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, name: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            name: name.into(),
        }
    }
}

/// Kind of place a resolver candidate describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceKind {
    City,
    Town,
    Village,
    /// Anything else (regions, partial matches, landmarks). Never selected.
    Other,
}

impl PlaceKind {
    /// Whether the scheduler accepts this kind of place as a location.
    pub fn is_settlement(self) -> bool {
        matches!(self, Self::City | Self::Town | Self::Village)
    }
}

/// One result of a resolver search, in the resolver's ranking order.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub latitude: f64,
    pub longitude: f64,
    pub locality: String,
    pub country: String,
    pub kind: PlaceKind,
}

impl Candidate {
    pub fn into_location(self) -> Location {
        let name = if self.country.is_empty() {
            self.locality
        } else {
            format!("{}, {}", self.locality, self.country)
        };
        Location::new(self.latitude, self.longitude, name)
    }
}

/// The five solar events of one calendar day, all in UTC.
///
/// Constructed only through [`SolarTimes::new`], which rejects any set whose
/// events are out of the order listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolarTimes {
    civil_twilight_begin: DateTime<Utc>,
    sunrise: DateTime<Utc>,
    solar_noon: DateTime<Utc>,
    sunset: DateTime<Utc>,
    civil_twilight_end: DateTime<Utc>,
}

impl SolarTimes {
    /// Build a validated set of solar events.
    ///
    /// Returns `None` unless
    /// `civil_twilight_begin <= sunrise <= solar_noon <= sunset <= civil_twilight_end`.
    pub fn new(
        civil_twilight_begin: DateTime<Utc>,
        sunrise: DateTime<Utc>,
        solar_noon: DateTime<Utc>,
        sunset: DateTime<Utc>,
        civil_twilight_end: DateTime<Utc>,
    ) -> Option<Self> {
        let ordered = civil_twilight_begin <= sunrise
            && sunrise <= solar_noon
            && solar_noon <= sunset
            && sunset <= civil_twilight_end;

        ordered.then_some(Self {
            civil_twilight_begin,
            sunrise,
            solar_noon,
            sunset,
            civil_twilight_end,
        })
    }

    pub fn civil_twilight_begin(&self) -> DateTime<Utc> {
        self.civil_twilight_begin
    }

    pub fn sunrise(&self) -> DateTime<Utc> {
        self.sunrise
    }

    pub fn solar_noon(&self) -> DateTime<Utc> {
        self.solar_noon
    }

    pub fn sunset(&self) -> DateTime<Utc> {
        self.sunset
    }

    pub fn civil_twilight_end(&self) -> DateTime<Utc> {
        self.civil_twilight_end
    }
}

/// Turns a free-text query into ranked candidate places.
pub trait LocationResolver {
    /// Search for places matching `query`. An empty result is not an error here;
    /// [`resolve`] turns it into [`PhaseError::LocationNotFound`].
    fn search(&self, query: &str) -> Result<Vec<Candidate>, PhaseError>;
}

/// Source of the daily solar events for a location.
#[cfg_attr(test, mockall::automock)]
pub trait SolarTimeProvider {
    fn fetch(&self, location: &Location, date: NaiveDate) -> Result<SolarTimes, PhaseError>;
}

/// Resolve a city query to a single location.
///
/// Takes the first candidate whose kind is a settlement (city, town or village).
pub fn resolve(resolver: &dyn LocationResolver, query: &str) -> Result<Location, PhaseError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(PhaseError::LocationNotFound {
            query: query.to_string(),
        });
    }

    resolver
        .search(query)?
        .into_iter()
        .find(|candidate| candidate.kind.is_settlement())
        .map(Candidate::into_location)
        .ok_or_else(|| PhaseError::LocationNotFound {
            query: query.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct FixedResolver(Vec<Candidate>);

    impl LocationResolver for FixedResolver {
        fn search(&self, _query: &str) -> Result<Vec<Candidate>, PhaseError> {
            Ok(self.0.clone())
        }
    }

    fn candidate(locality: &str, kind: PlaceKind) -> Candidate {
        Candidate {
            latitude: 48.85,
            longitude: 2.35,
            locality: locality.to_string(),
            country: "France".to_string(),
            kind,
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 21, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_resolve_skips_non_settlements() {
        let resolver = FixedResolver(vec![
            candidate("Île-de-France", PlaceKind::Other),
            candidate("Paris", PlaceKind::City),
        ]);

        let location = resolve(&resolver, "Paris").unwrap();
        assert_eq!(location.name, "Paris, France");
    }

    #[test]
    fn test_resolve_without_settlement_is_not_found() {
        let resolver = FixedResolver(vec![candidate("Atlantis Ridge", PlaceKind::Other)]);

        assert_eq!(
            resolve(&resolver, "Atlantis"),
            Err(PhaseError::LocationNotFound {
                query: "Atlantis".to_string()
            })
        );
        assert!(matches!(
            resolve(&resolver, "   "),
            Err(PhaseError::LocationNotFound { .. })
        ));
    }

    #[test]
    fn test_solar_times_require_ordering() {
        assert!(SolarTimes::new(at(5, 30), at(6, 0), at(12, 0), at(18, 0), at(18, 30)).is_some());
        // Coinciding events are allowed
        assert!(SolarTimes::new(at(6, 0), at(6, 0), at(12, 0), at(18, 0), at(18, 0)).is_some());
        // Sunrise before twilight begin
        assert!(SolarTimes::new(at(6, 0), at(5, 30), at(12, 0), at(18, 0), at(18, 30)).is_none());
        // Noon after sunset
        assert!(SolarTimes::new(at(5, 30), at(6, 0), at(19, 0), at(18, 0), at(18, 30)).is_none());
    }
}
