//! Offline city resolution against the bundled world cities database.
//!
//! Queries take the form `City` or `City, Country`. Exact (case-insensitive) name
//! matches come back as [`PlaceKind::City`] candidates; names that merely start
//! with the query are returned after them as [`PlaceKind::Other`] so callers can
//! see near misses without ever selecting one.

use crate::error::PhaseError;
use crate::geo::{Candidate, LocationResolver, PlaceKind};

/// Upper bound on the number of partial matches returned per search.
const MAX_PARTIAL_MATCHES: usize = 10;

/// Resolver backed by the `cities` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct CityResolver;

impl CityResolver {
    pub fn new() -> Self {
        Self
    }
}

/// Split `"Paris, France"` into `("paris", Some("france"))`.
fn split_query(query: &str) -> (String, Option<String>) {
    match query.split_once(',') {
        Some((city, country)) => {
            let country = country.trim().to_lowercase();
            (
                city.trim().to_lowercase(),
                (!country.is_empty()).then_some(country),
            )
        }
        None => (query.trim().to_lowercase(), None),
    }
}

impl LocationResolver for CityResolver {
    fn search(&self, query: &str) -> Result<Vec<Candidate>, PhaseError> {
        let (city_query, country_query) = split_query(query);
        if city_query.is_empty() {
            return Ok(Vec::new());
        }

        let mut exact = Vec::new();
        let mut partial = Vec::new();

        for city in cities::all() {
            if let Some(country) = &country_query
                && !city.country.to_lowercase().starts_with(country.as_str())
            {
                continue;
            }

            let name = city.city.to_lowercase();
            let kind = if name == city_query {
                PlaceKind::City
            } else if name.starts_with(&city_query) && partial.len() < MAX_PARTIAL_MATCHES {
                PlaceKind::Other
            } else {
                continue;
            };

            let candidate = Candidate {
                latitude: city.latitude,
                longitude: city.longitude,
                locality: city.city.to_string(),
                country: city.country.to_string(),
                kind,
            };

            match kind {
                PlaceKind::City => exact.push(candidate),
                _ => partial.push(candidate),
            }
        }

        exact.extend(partial);
        Ok(exact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::constants::test_constants::*;
    use crate::geo::resolve;

    #[test]
    fn test_split_query() {
        assert_eq!(split_query("Paris"), ("paris".to_string(), None));
        assert_eq!(
            split_query("  Paris ,  France "),
            ("paris".to_string(), Some("france".to_string()))
        );
        assert_eq!(split_query("Paris,"), ("paris".to_string(), None));
    }

    #[test]
    fn test_resolves_known_city() {
        let location = resolve(&CityResolver::new(), TEST_CITY).unwrap();

        assert!(location.name.starts_with(TEST_CITY));
    }

    #[test]
    fn test_country_filter_applies() {
        let query = format!("{TEST_CITY}, {TEST_COUNTRY}");
        let location = resolve(&CityResolver::new(), &query).unwrap();

        assert_eq!(location.name, format!("{TEST_CITY}, {TEST_COUNTRY}"));
        assert!((location.longitude - 2.35).abs() < 0.5);
    }

    #[test]
    fn test_unknown_city_is_not_found() {
        assert_eq!(
            resolve(&CityResolver::new(), "Qzxvwq Nowhere"),
            Err(PhaseError::LocationNotFound {
                query: "Qzxvwq Nowhere".to_string()
            })
        );
    }

    #[test]
    fn test_partial_matches_are_never_selected() {
        let candidates = CityResolver::new().search("Pari").unwrap();

        assert!(candidates.iter().all(|c| c.kind == PlaceKind::Other));
        assert!(candidates.len() <= MAX_PARTIAL_MATCHES);
    }
}
