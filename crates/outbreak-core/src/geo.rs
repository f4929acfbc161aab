//! Geographic points and great-circle distance.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius in meters (IUGG).
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Slack applied to the radius predicate so a point computed to lie exactly
/// on the boundary is not lost to floating-point rounding.
pub const DISTANCE_TOLERANCE_METERS: f64 = 1e-3;

/// Errors produced while building a [`GeoPoint`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// A coordinate is NaN or infinite.
    #[error("{axis} must be a finite number")]
    NotFinite { axis: &'static str },

    /// Longitude outside [-180, 180].
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    /// Latitude outside [-90, 90].
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    /// Text that is not a `POINT(lon lat)` literal.
    #[error("malformed WKT point: {0}")]
    MalformedWkt(String),
}

/// A validated WGS84 point.
///
/// The only way to obtain one is through [`GeoPoint::new`] (or the parsers
/// built on it), so any `GeoPoint` in the system holds in-range, finite
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Coordinates", into = "Coordinates")]
pub struct GeoPoint {
    longitude: f64,
    latitude: f64,
}

impl GeoPoint {
    /// Build a point from longitude and latitude in degrees.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, GeoError> {
        if !longitude.is_finite() {
            return Err(GeoError::NotFinite { axis: "longitude" });
        }
        if !latitude.is_finite() {
            return Err(GeoError::NotFinite { axis: "latitude" });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// Parse a WKT point such as `POINT(88.36 22.57)` or
    /// `SRID=4326;POINT(88.36 22.57)`.
    pub fn from_wkt(text: &str) -> Result<Self, GeoError> {
        let malformed = || GeoError::MalformedWkt(text.to_string());

        let mut body = text.trim();
        if let Some((prefix, rest)) = body.split_once(';') {
            if !prefix.trim().to_ascii_uppercase().starts_with("SRID=") {
                return Err(malformed());
            }
            body = rest.trim();
        }

        let upper = body.to_ascii_uppercase();
        let inner = upper
            .strip_prefix("POINT")
            .map(str::trim_start)
            .and_then(|s| s.strip_prefix('('))
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(malformed)?;

        let mut parts = inner.split_whitespace();
        let (Some(lon), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };
        let longitude: f64 = lon.parse().map_err(|_| malformed())?;
        let latitude: f64 = lat.parse().map_err(|_| malformed())?;

        Self::new(longitude, latitude)
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Render as a WKT point.
    pub fn to_wkt(&self) -> String {
        format!("POINT({} {})", self.longitude, self.latitude)
    }

    /// Great-circle distance to `other` in meters (haversine).
    pub fn distance_meters(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().min(1.0).asin();

        EARTH_RADIUS_METERS * c
    }

    /// Whether `other` lies within `radius_meters` of this point.
    pub fn is_within(&self, other: &GeoPoint, radius_meters: f64) -> bool {
        self.distance_meters(other) <= radius_meters + DISTANCE_TOLERANCE_METERS
    }

    /// Latitude band `(south, north)` in degrees that contains every point
    /// [`is_within`](Self::is_within) `radius_meters` of this one. Used by stores to prefilter
    /// candidates before the exact distance check.
    pub fn latitude_band(&self, radius_meters: f64) -> (f64, f64) {
        let delta = ((radius_meters + DISTANCE_TOLERANCE_METERS) / EARTH_RADIUS_METERS).to_degrees();
        (
            (self.latitude - delta).max(-90.0),
            (self.latitude + delta).min(90.0),
        )
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wkt())
    }
}

impl FromStr for GeoPoint {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wkt(s)
    }
}

/// Wire form of a point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Coordinates {
    longitude: f64,
    latitude: f64,
}

impl TryFrom<Coordinates> for GeoPoint {
    type Error = GeoError;

    fn try_from(value: Coordinates) -> Result<Self, Self::Error> {
        GeoPoint::new(value.longitude, value.latitude)
    }
}

impl From<GeoPoint> for Coordinates {
    fn from(point: GeoPoint) -> Self {
        Self {
            longitude: point.longitude,
            latitude: point.latitude,
        }
    }
}

/// A location as it arrives at the system boundary.
///
/// Reporters send either an explicit coordinate pair or a WKT string.
/// [`LocationInput::into_point`] is the single place where either form is
/// checked and turned into a [`GeoPoint`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationInput {
    /// `{"longitude": .., "latitude": ..}`
    Coordinates { longitude: f64, latitude: f64 },
    /// `"POINT(lon lat)"`
    Wkt(String),
}

impl LocationInput {
    /// Validate and convert into a point.
    pub fn into_point(self) -> Result<GeoPoint, GeoError> {
        match self {
            LocationInput::Coordinates {
                longitude,
                latitude,
            } => GeoPoint::new(longitude, latitude),
            LocationInput::Wkt(text) => GeoPoint::from_wkt(&text),
        }
    }
}

impl From<GeoPoint> for LocationInput {
    fn from(point: GeoPoint) -> Self {
        LocationInput::Coordinates {
            longitude: point.longitude,
            latitude: point.latitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lon: f64, lat: f64) -> GeoPoint {
        GeoPoint::new(lon, lat).unwrap()
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(matches!(
            GeoPoint::new(180.5, 0.0),
            Err(GeoError::LongitudeOutOfRange(_))
        ));
        assert!(matches!(
            GeoPoint::new(0.0, -90.1),
            Err(GeoError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            GeoPoint::new(f64::NAN, 0.0),
            Err(GeoError::NotFinite { axis: "longitude" })
        ));
        assert!(matches!(
            GeoPoint::new(0.0, f64::INFINITY),
            Err(GeoError::NotFinite { axis: "latitude" })
        ));
        assert!(GeoPoint::new(-180.0, 90.0).is_ok());
    }

    #[test]
    fn test_wkt_parsing() {
        let p = GeoPoint::from_wkt("POINT(88.36 22.57)").unwrap();
        assert_eq!(p.longitude(), 88.36);
        assert_eq!(p.latitude(), 22.57);

        let p = GeoPoint::from_wkt("SRID=4326;point ( -0.5  51.5 )").unwrap();
        assert_eq!(p.longitude(), -0.5);
        assert_eq!(p.latitude(), 51.5);

        assert_eq!("POINT(1 2)".parse::<GeoPoint>().unwrap(), point(1.0, 2.0));
    }

    #[test]
    fn test_wkt_rejects_garbage() {
        for text in [
            "",
            "POINT()",
            "POINT(1)",
            "POINT(1 2 3)",
            "POINT(a b)",
            "LINESTRING(1 2, 3 4)",
            "FOO;POINT(1 2)",
            "POINT 1 2",
        ] {
            assert!(
                matches!(GeoPoint::from_wkt(text), Err(GeoError::MalformedWkt(_))),
                "accepted {text:?}"
            );
        }
        assert!(matches!(
            GeoPoint::from_wkt("POINT(200 10)"),
            Err(GeoError::LongitudeOutOfRange(_))
        ));
    }

    #[test]
    fn test_wkt_roundtrip_text() {
        assert_eq!(point(88.36, 22.57).to_wkt(), "POINT(88.36 22.57)");
    }

    #[test]
    fn test_distance_known_values() {
        let kolkata = point(88.3639, 22.5726);
        let delhi = point(77.2090, 28.6139);
        let km = kolkata.distance_meters(&delhi) / 1000.0;
        // ~1305 km
        assert!((km - 1305.0).abs() < 10.0, "got {km}");

        assert_eq!(kolkata.distance_meters(&kolkata), 0.0);
    }

    #[test]
    fn test_is_within_boundary() {
        let origin = point(0.0, 0.0);
        let radius = 1_000.0;
        let delta = (radius / EARTH_RADIUS_METERS).to_degrees();

        assert!(origin.is_within(&point(0.0, delta), radius));
        let beyond = ((radius + 1.0) / EARTH_RADIUS_METERS).to_degrees();
        assert!(!origin.is_within(&point(0.0, beyond), radius));
    }

    #[test]
    fn test_latitude_band_is_clamped() {
        let near_pole = point(10.0, 89.99);
        let (south, north) = near_pole.latitude_band(50_000.0);
        assert!(south < 89.99);
        assert_eq!(north, 90.0);
    }

    #[test]
    fn test_latitude_band_covers_tolerance() {
        let origin = point(88.36, 22.57);
        let radius = 1_000.0;
        let just_past = ((radius + DISTANCE_TOLERANCE_METERS / 2.0) / EARTH_RADIUS_METERS).to_degrees();
        let north = point(88.36, 22.57 + just_past);
        let south = point(88.36, 22.57 - just_past);

        let (band_south, band_north) = origin.latitude_band(radius);
        for p in [north, south] {
            assert!(origin.is_within(&p, radius));
            assert!(p.latitude() >= band_south && p.latitude() <= band_north);
        }
    }

    #[test]
    fn test_serde_validates() {
        let p: GeoPoint = serde_json::from_str(r#"{"longitude": 88.36, "latitude": 22.57}"#).unwrap();
        assert_eq!(p, point(88.36, 22.57));

        let bad = serde_json::from_str::<GeoPoint>(r#"{"longitude": 500, "latitude": 0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_location_input_forms() {
        let wkt: LocationInput = serde_json::from_str(r#""POINT(88.36 22.57)""#).unwrap();
        assert_eq!(wkt.into_point().unwrap(), point(88.36, 22.57));

        let coords: LocationInput =
            serde_json::from_str(r#"{"longitude": 88.36, "latitude": 22.57}"#).unwrap();
        assert_eq!(coords.into_point().unwrap(), point(88.36, 22.57));

        let bad = LocationInput::Coordinates {
            longitude: 0.0,
            latitude: 91.0,
        };
        assert!(bad.into_point().is_err());
    }
}
