//! Schema identity and the table of topo4d properties

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use stac4d_core::error::{Result, Stac4dError};
use stac4d_core::models::{CrsValue, Item};

use crate::data_type::DataType;
use crate::meta::{ProductMeta, TrafoMeta};

/// Versioned schema identifier registered in `stac_extensions`
pub const SCHEMA_URI: &str = "https://stac-extensions.github.io/topo4d/v1.0.0/schema.json";

/// Prefix shared by every topo4d property key
pub const PREFIX: &str = "topo4d:";

/// JSON shape a property value must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    /// Flat array of numbers
    Numbers,
    /// Array of positions, each an array of numbers
    Positions,
    Object,
    DataType,
    Crs,
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "non-negative integer",
            FieldType::Numbers => "array of numbers",
            FieldType::Positions => "array of positions",
            FieldType::Object => "object",
            FieldType::DataType => "data type string",
            FieldType::Crs => "CRS string",
        }
    }
}

/// Every property of the extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topo4dField {
    DataType,
    NativeCrs,
    Sensor,
    Timezone,
    AcquisitionMode,
    Duration,
    Trajectory,
    ScanPosition,
    Orientation,
    PointCount,
    SpatialResolution,
    MeasurementError,
    GlobalTrafo,
    TrafoMeta,
    ProductMeta,
}

impl Topo4dField {
    pub const ALL: [Topo4dField; 15] = [
        Topo4dField::DataType,
        Topo4dField::NativeCrs,
        Topo4dField::Sensor,
        Topo4dField::Timezone,
        Topo4dField::AcquisitionMode,
        Topo4dField::Duration,
        Topo4dField::Trajectory,
        Topo4dField::ScanPosition,
        Topo4dField::Orientation,
        Topo4dField::PointCount,
        Topo4dField::SpatialResolution,
        Topo4dField::MeasurementError,
        Topo4dField::GlobalTrafo,
        Topo4dField::TrafoMeta,
        Topo4dField::ProductMeta,
    ];

    /// Full property key, including the prefix
    pub fn key(&self) -> &'static str {
        match self {
            Topo4dField::DataType => "topo4d:data_type",
            Topo4dField::NativeCrs => "topo4d:native_crs",
            Topo4dField::Sensor => "topo4d:sensor",
            Topo4dField::Timezone => "topo4d:tz",
            Topo4dField::AcquisitionMode => "topo4d:acquisition_mode",
            Topo4dField::Duration => "topo4d:duration",
            Topo4dField::Trajectory => "topo4d:trajectory",
            Topo4dField::ScanPosition => "topo4d:scan_position",
            Topo4dField::Orientation => "topo4d:orientation",
            Topo4dField::PointCount => "topo4d:point_count",
            Topo4dField::SpatialResolution => "topo4d:spatial_resolution",
            Topo4dField::MeasurementError => "topo4d:measurement_error",
            Topo4dField::GlobalTrafo => "topo4d:global_trafo",
            Topo4dField::TrafoMeta => "topo4d:trafo_meta",
            Topo4dField::ProductMeta => "topo4d:product_meta",
        }
    }

    /// Key without the prefix
    pub fn short_name(&self) -> &'static str {
        &self.key()[PREFIX.len()..]
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Topo4dField::DataType | Topo4dField::NativeCrs)
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            Topo4dField::DataType => FieldType::DataType,
            Topo4dField::NativeCrs => FieldType::Crs,
            Topo4dField::Sensor
            | Topo4dField::Timezone
            | Topo4dField::AcquisitionMode
            | Topo4dField::Orientation => FieldType::String,
            Topo4dField::Duration
            | Topo4dField::SpatialResolution
            | Topo4dField::MeasurementError => FieldType::Number,
            Topo4dField::PointCount => FieldType::Integer,
            Topo4dField::Trajectory | Topo4dField::ScanPosition => FieldType::Positions,
            Topo4dField::GlobalTrafo => FieldType::Numbers,
            Topo4dField::TrafoMeta | Topo4dField::ProductMeta => FieldType::Object,
        }
    }

    /// Look up a field by full key (`topo4d:sensor`) or short name (`sensor`)
    pub fn from_name(name: &str) -> Option<Self> {
        let short = name.strip_prefix(PREFIX).unwrap_or(name);
        Self::ALL.into_iter().find(|f| f.short_name() == short)
    }
}

/// Add the schema URI to the item's extension list unless already present
pub fn register(item: &mut Item) {
    if !has_extension(item) {
        tracing::debug!(item = %item.id, "Registering topo4d extension");
        item.stac_extensions.push(SCHEMA_URI.to_string());
    }
}

pub fn has_extension(item: &Item) -> bool {
    item.has_extension(SCHEMA_URI)
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Null, empty strings, empty arrays and empty objects all mean "absent"
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

fn is_numbers(value: &Value) -> bool {
    value.as_array().is_some_and(|a| a.iter().all(Value::is_number))
}

/// Validate `value` for `field`.
///
/// Returns `None` when the value means "delete the key", otherwise the value
/// to store. CRS strings are stored in their canonical form.
pub(crate) fn normalize(field: Topo4dField, value: Value) -> Result<Option<Value>> {
    if is_empty(&value) {
        return Ok(None);
    }

    let expected = field.field_type();
    let mismatch = Stac4dError::type_mismatch(field.key(), expected.name(), json_type(&value));

    let valid = match expected {
        FieldType::String => value.is_string(),
        FieldType::Number => value.is_number(),
        FieldType::Integer => value.is_u64(),
        FieldType::Numbers => is_numbers(&value),
        FieldType::Positions => {
            value.as_array().is_some_and(|positions| positions.iter().all(is_numbers))
        }
        FieldType::Object => {
            match field {
                Topo4dField::TrafoMeta => {
                    decode::<TrafoMeta>(field, &value)?;
                }
                Topo4dField::ProductMeta => {
                    decode::<ProductMeta>(field, &value)?;
                }
                _ => {}
            }
            value.is_object()
        }
        FieldType::DataType => match &value {
            Value::String(s) => {
                s.parse::<DataType>()?;
                true
            }
            _ => false,
        },
        FieldType::Crs => match &value {
            Value::String(s) => {
                let crs = CrsValue::parse(Some(s))?;
                return Ok(Some(Value::String(crs.to_string())));
            }
            _ => false,
        },
    };

    if valid {
        Ok(Some(value))
    } else {
        Err(mismatch)
    }
}

/// Deserialize a stored value, reporting failures as `TypeMismatch`
pub(crate) fn decode<T: DeserializeOwned>(field: Topo4dField, value: &Value) -> Result<T> {
    serde_json::from_value(value.clone()).map_err(|_| {
        Stac4dError::type_mismatch(field.key(), field.field_type().name(), json_type(value))
    })
}

/// Stored data type; an unknown string is an `InvalidEnumValue`
pub(crate) fn read_data_type(properties: &Map<String, Value>) -> Result<DataType> {
    let raw: String = read_required(properties, Topo4dField::DataType)?;
    raw.parse()
}

/// Stored native CRS, resolved again on read
pub(crate) fn read_native_crs(properties: &Map<String, Value>) -> Result<CrsValue> {
    let raw: String = read_required(properties, Topo4dField::NativeCrs)?;
    CrsValue::parse(Some(&raw))
}

/// Typed read of an optional property; null counts as absent
pub(crate) fn read_optional<T: DeserializeOwned>(
    properties: &Map<String, Value>,
    field: Topo4dField,
) -> Result<Option<T>> {
    properties
        .get(field.key())
        .filter(|v| !v.is_null())
        .map(|v| decode(field, v))
        .transpose()
}

/// Typed read of a property that must be present
pub(crate) fn read_required<T: DeserializeOwned>(
    properties: &Map<String, Value>,
    field: Topo4dField,
) -> Result<T> {
    read_optional(properties, field)?.ok_or_else(|| Stac4dError::missing(field.key()))
}
