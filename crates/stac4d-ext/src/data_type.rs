use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use stac4d_core::error::{Result, Stac4dError};

use crate::schema::Topo4dField;

/// Kind of data an observation holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    PointCloud,
    Mesh,
    Raster,
    Vector,
    Text,
    Other,
}

impl DataType {
    pub const ALL: [DataType; 6] = [
        DataType::PointCloud,
        DataType::Mesh,
        DataType::Raster,
        DataType::Vector,
        DataType::Text,
        DataType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::PointCloud => "point-cloud",
            DataType::Mesh => "mesh",
            DataType::Raster => "raster",
            DataType::Vector => "vector",
            DataType::Text => "text",
            DataType::Other => "other",
        }
    }

    /// String forms accepted by [`FromStr`]
    pub fn allowed() -> Vec<String> {
        Self::ALL.iter().map(|d| d.as_str().to_string()).collect()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = Stac4dError;

    /// Exact, case-sensitive match against the string table
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == s).ok_or_else(|| {
            Stac4dError::InvalidEnumValue {
                name: Topo4dField::DataType.key().to_string(),
                value: s.to_string(),
                allowed: Self::allowed(),
            }
        })
    }
}

impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
