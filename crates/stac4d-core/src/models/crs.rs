//! Coordinate reference system value type.
//!
//! A [`CrsValue`] is one of three states: a concrete reference system that
//! PROJ can resolve, an explicitly local (non-georeferenced) system, or
//! undefined. Construction validates; values are immutable afterwards.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, Stac4dError};

const UNDEFINED: &str = "Undefined";
const LOCAL: &str = "Local";

/// Classification of a CRS value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrsKind {
    Defined,
    Local,
    Undefined,
}

/// Validated coordinate reference system identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CrsValue {
    /// A reference system PROJ can resolve (authority code, WKT, PROJ string)
    Defined(ReferenceSystem),
    /// Explicitly local, non-georeferenced coordinates
    Local,
    /// No CRS information available
    Undefined,
}

impl CrsValue {
    /// Parse and validate a CRS identifier.
    ///
    /// `None`, empty input and `"undefined"` yield [`CrsValue::Undefined`];
    /// `"local"` yields [`CrsValue::Local`] (both case-insensitive). Anything
    /// else must resolve through PROJ or the call fails with `InvalidCrs`.
    pub fn parse(input: Option<&str>) -> Result<Self> {
        let Some(raw) = input else {
            return Ok(CrsValue::Undefined);
        };

        let trimmed = raw.trim();
        match trimmed.to_lowercase().as_str() {
            "" | "undefined" => Ok(CrsValue::Undefined),
            "local" => Ok(CrsValue::Local),
            _ => ReferenceSystem::resolve(trimmed).map(CrsValue::Defined),
        }
    }

    /// Build a defined value from an EPSG code
    pub fn from_epsg(code: u32) -> Result<Self> {
        Self::parse(Some(&format!("EPSG:{}", code)))
    }

    pub fn kind(&self) -> CrsKind {
        match self {
            CrsValue::Defined(_) => CrsKind::Defined,
            CrsValue::Local => CrsKind::Local,
            CrsValue::Undefined => CrsKind::Undefined,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, CrsValue::Defined(_))
    }

    pub fn is_local(&self) -> bool {
        matches!(self, CrsValue::Local)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, CrsValue::Undefined)
    }

    /// The resolvable reference system, only when defined
    pub fn to_reference_system(&self) -> Option<ReferenceSystem> {
        match self {
            CrsValue::Defined(rs) => Some(rs.clone()),
            _ => None,
        }
    }

    /// EPSG code of the reference system, if one can be determined
    pub fn epsg(&self) -> Option<u32> {
        match self {
            CrsValue::Defined(rs) => rs.epsg(),
            _ => None,
        }
    }
}

impl Default for CrsValue {
    fn default() -> Self {
        CrsValue::Undefined
    }
}

impl fmt::Display for CrsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrsValue::Defined(rs) => write!(f, "{}", rs.definition()),
            CrsValue::Local => f.write_str(LOCAL),
            CrsValue::Undefined => f.write_str(UNDEFINED),
        }
    }
}

impl FromStr for CrsValue {
    type Err = Stac4dError;

    fn from_str(s: &str) -> Result<Self> {
        CrsValue::parse(Some(s))
    }
}

impl Serialize for CrsValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CrsValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        CrsValue::parse(raw.as_deref()).map_err(serde::de::Error::custom)
    }
}

/// A reference system definition that PROJ resolved successfully
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceSystem {
    definition: String,
}

impl ReferenceSystem {
    /// Validate a definition against PROJ
    pub fn resolve(definition: &str) -> Result<Self> {
        let definition = definition.trim();
        match proj::Proj::new(definition) {
            Ok(_) => Ok(Self { definition: definition.to_string() }),
            Err(e) => {
                tracing::debug!(input = %definition, error = %e, "CRS did not resolve");
                Err(Stac4dError::InvalidCrs { input: definition.to_string() })
            }
        }
    }

    /// WGS 84 geographic coordinates (EPSG:4326)
    pub fn wgs84() -> Self {
        Self { definition: "EPSG:4326".to_string() }
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// EPSG code, read from an `EPSG:n` identifier or the top-level WKT authority
    pub fn epsg(&self) -> Option<u32> {
        epsg_from_definition(&self.definition)
    }

    /// True when both definitions name the same system
    pub fn same_as(&self, other: &ReferenceSystem) -> bool {
        if self.definition.eq_ignore_ascii_case(&other.definition) {
            return true;
        }
        matches!((self.epsg(), other.epsg()), (Some(a), Some(b)) if a == b)
    }
}

fn authority_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)(?:AUTHORITY|ID)\[\s*"EPSG"\s*,\s*"?(\d+)"?\s*\]"#)
            .expect("valid EPSG authority pattern")
    })
}

fn epsg_from_definition(definition: &str) -> Option<u32> {
    let trimmed = definition.trim();
    if let Some((authority, code)) = trimmed.split_once(':') {
        if authority.eq_ignore_ascii_case("epsg") {
            return code.trim().parse().ok();
        }
    }

    // In WKT the object's own authority is the last one, after nested datum/unit ids
    authority_pattern()
        .captures_iter(trimmed)
        .last()
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
