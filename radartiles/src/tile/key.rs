//! Tile request validation.
//!
//! Converts the four raw query parameters of a tile request into a
//! [`TileKey`]. Validation is pure: it never touches the filesystem or
//! spawns a process, so a rejected request has no side effects.
//!
//! # Example
//!
//! ```
//! use radartiles::tile::{TileKey, TileRequest};
//!
//! let request = TileRequest::new("KTLX", "10", "12", "5");
//! let key = TileKey::parse(&request).unwrap();
//! assert_eq!(key.site(), "KTLX");
//! assert_eq!((key.z(), key.x(), key.y()), (5, 10, 12));
//! ```

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Raw, unvalidated tile request as received from the front end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileRequest {
    /// Radar site identifier (e.g. `KTLX`)
    pub site: String,
    /// Tile column
    pub x: String,
    /// Tile row
    pub y: String,
    /// Zoom level
    pub z: String,
}

impl TileRequest {
    /// Create a raw request from its four query parameters.
    pub fn new(
        site: impl Into<String>,
        x: impl Into<String>,
        y: impl Into<String>,
        z: impl Into<String>,
    ) -> Self {
        Self {
            site: site.into(),
            x: x.into(),
            y: y.into(),
            z: z.into(),
        }
    }
}

/// Reasons a tile request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Site is not a `K` followed by three uppercase letters.
    #[error("invalid site code: '{0}'")]
    InvalidSite(String),

    /// A coordinate is not a decimal integer.
    #[error("invalid {axis} coordinate: '{value}'")]
    InvalidCoordinate { axis: &'static str, value: String },
}

/// Validated identity of one tile.
///
/// The site is guaranteed to match `^K[A-Z]{3}$`, so it is safe to embed
/// in filesystem paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileKey {
    site: String,
    z: i32,
    x: i32,
    y: i32,
}

impl TileKey {
    /// Create a key, validating the site code.
    pub fn new(site: impl Into<String>, z: i32, x: i32, y: i32) -> Result<Self, ValidationError> {
        let site = site.into();
        if !site_pattern().is_match(&site) {
            return Err(ValidationError::InvalidSite(site));
        }
        Ok(Self { site, z, x, y })
    }

    /// Validate a raw request.
    ///
    /// The site is checked before the coordinates. Coordinates must be plain
    /// decimal integers with an optional sign; floats, exponents and
    /// surrounding whitespace are rejected.
    pub fn parse(request: &TileRequest) -> Result<Self, ValidationError> {
        if !site_pattern().is_match(&request.site) {
            return Err(ValidationError::InvalidSite(request.site.clone()));
        }

        let x = parse_coordinate("x", &request.x)?;
        let y = parse_coordinate("y", &request.y)?;
        let z = parse_coordinate("z", &request.z)?;

        Ok(Self {
            site: request.site.clone(),
            z,
            x,
            y,
        })
    }

    /// Radar site identifier.
    pub fn site(&self) -> &str {
        &self.site
    }

    /// Zoom level.
    pub fn z(&self) -> i32 {
        self.z
    }

    /// Tile column.
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Tile row.
    pub fn y(&self) -> i32 {
        self.y
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/{}", self.site, self.z, self.x, self.y)
    }
}

/// Site codes are ICAO-style: `K` plus three uppercase ASCII letters.
fn site_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^K[A-Z]{3}$").unwrap())
}

/// `i32::from_str` accepts exactly `[+-]?[0-9]+`, which is the accepted grammar.
fn parse_coordinate(axis: &'static str, raw: &str) -> Result<i32, ValidationError> {
    raw.parse::<i32>()
        .map_err(|_| ValidationError::InvalidCoordinate {
            axis,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn request(site: &str, x: &str, y: &str, z: &str) -> TileRequest {
        TileRequest::new(site, x, y, z)
    }

    #[test]
    fn test_parse_valid_request() {
        let key = TileKey::parse(&request("KTLX", "10", "12", "5")).unwrap();
        assert_eq!(key.site(), "KTLX");
        assert_eq!(key.x(), 10);
        assert_eq!(key.y(), 12);
        assert_eq!(key.z(), 5);
    }

    #[test]
    fn test_parse_signed_coordinates() {
        let key = TileKey::parse(&request("KFWS", "-3", "+7", "0")).unwrap();
        assert_eq!(key.x(), -3);
        assert_eq!(key.y(), 7);
        assert_eq!(key.z(), 0);
    }

    #[test]
    fn test_rejects_bad_sites() {
        for site in ["XXXX", "Kabc", "KTLXX", "KTL", "", "ktlx", "K1AB", "KTL/"] {
            let result = TileKey::parse(&request(site, "1", "1", "1"));
            assert_eq!(
                result,
                Err(ValidationError::InvalidSite(site.to_string())),
                "site {:?} should be rejected",
                site
            );
        }
    }

    #[test]
    fn test_rejects_non_integer_coordinates() {
        for value in ["abc", "1.5e3", "1.5", "1e3", " 1", "1 ", "", "0x10", "-", "++1"] {
            let result = TileKey::parse(&request("KTLX", value, "1", "1"));
            assert_eq!(
                result,
                Err(ValidationError::InvalidCoordinate {
                    axis: "x",
                    value: value.to_string()
                }),
                "x {:?} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_reports_offending_axis() {
        let err = TileKey::parse(&request("KTLX", "1", "1", "zoom")).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidCoordinate {
                axis: "z",
                value: "zoom".to_string()
            }
        );
        assert!(err.to_string().contains("z coordinate"));
    }

    #[test]
    fn test_rejects_overflowing_coordinate() {
        let result = TileKey::parse(&request("KTLX", "99999999999", "1", "1"));
        assert!(matches!(
            result,
            Err(ValidationError::InvalidCoordinate { axis: "x", .. })
        ));
    }

    #[test]
    fn test_site_checked_before_coordinates() {
        let result = TileKey::parse(&request("bogus", "abc", "abc", "abc"));
        assert!(matches!(result, Err(ValidationError::InvalidSite(_))));
    }

    #[test]
    fn test_new_validates_site() {
        assert!(TileKey::new("KTLX", 5, 10, 12).is_ok());
        assert!(TileKey::new("../etc", 5, 10, 12).is_err());
    }

    #[test]
    fn test_key_equality_and_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(TileKey::new("KTLX", 5, 10, 12).unwrap());
        set.insert(TileKey::parse(&request("KTLX", "10", "12", "5")).unwrap());
        set.insert(TileKey::new("KTLX", 5, 10, 13).unwrap());

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_display() {
        let key = TileKey::new("KTLX", 5, 10, 12).unwrap();
        assert_eq!(key.to_string(), "KTLX/5/10/12");
    }

    proptest! {
        #[test]
        fn test_any_i32_roundtrips(x in any::<i32>(), y in any::<i32>(), z in any::<i32>()) {
            let key = TileKey::parse(&request("KABC", &x.to_string(), &y.to_string(), &z.to_string()))?;
            prop_assert_eq!((key.x(), key.y(), key.z()), (x, y, z));
        }

        #[test]
        fn test_valid_site_alphabet(site in "K[A-Z]{3}") {
            prop_assert!(TileKey::parse(&request(&site, "1", "2", "3")).is_ok());
        }

        #[test]
        fn test_fractional_values_rejected(whole in 0i32..1000, frac in 1u32..1000) {
            let value = format!("{}.{}", whole, frac);
            prop_assert!(TileKey::parse(&request("KTLX", "1", &value, "3")).is_err());
        }
    }
}
