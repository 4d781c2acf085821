//! Validated access to the topo4d properties of one item

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use stac4d_core::error::{Result, Stac4dError};
use stac4d_core::models::{CrsValue, Item};

use crate::data_type::DataType;
use crate::meta::{ProductMeta, TrafoMeta};
use crate::properties::Topo4dProperties;
use crate::schema::{
    has_extension, normalize, read_data_type, read_native_crs, read_optional, register,
    Topo4dField, SCHEMA_URI,
};

/// Accessor over an item's topo4d properties.
///
/// Setters validate before writing; a failed call leaves the item unchanged.
/// Passing `None` (or an empty value) to a setter removes the key.
#[derive(Debug)]
pub struct Topo4dExtension<'a> {
    item: &'a mut Item,
}

impl<'a> Topo4dExtension<'a> {
    /// Wrap `item`, registering the schema first when `add_if_missing` is set.
    ///
    /// Fails with `ExtensionNotRegistered` if the schema is absent and may
    /// not be added.
    pub fn ext(item: &'a mut Item, add_if_missing: bool) -> Result<Self> {
        if !has_extension(item) {
            if !add_if_missing {
                return Err(Stac4dError::ExtensionNotRegistered { uri: SCHEMA_URI.to_string() });
            }
            register(item);
        }
        Ok(Self { item })
    }

    pub fn item(&self) -> &Item {
        &*self.item
    }

    /// Raw stored value for a property, by full key or short name
    pub fn get(&self, name: &str) -> Option<&Value> {
        let field = Topo4dField::from_name(name)?;
        self.item.properties.get(field.key())
    }

    /// Raw stored value that must be present
    pub fn get_required(&self, name: &str) -> Result<&Value> {
        let field = lookup(name)?;
        self.item.properties.get(field.key()).ok_or_else(|| Stac4dError::missing(field.key()))
    }

    /// Validate and store a raw value; null or empty removes the key
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        self.set_field(lookup(name)?, value)
    }

    fn set_field(&mut self, field: Topo4dField, value: Value) -> Result<()> {
        match normalize(field, value)? {
            Some(value) => {
                self.item.properties.insert(field.key().to_string(), value);
            }
            None => {
                self.item.properties.remove(field.key());
            }
        }
        Ok(())
    }

    fn write<T: Serialize>(&mut self, field: Topo4dField, value: Option<T>) -> Result<()> {
        let value = match value {
            Some(v) => serde_json::to_value(v)?,
            None => Value::Null,
        };
        self.set_field(field, value)
    }

    fn read<T: DeserializeOwned>(&self, field: Topo4dField) -> Result<Option<T>> {
        read_optional(&self.item.properties, field)
    }

    /// Write the whole record; optional fields that are `None` are removed
    pub fn apply(&mut self, properties: Topo4dProperties) -> Result<()> {
        let mut map = properties.to_map()?;
        for field in Topo4dField::ALL {
            match map.remove(field.key()) {
                Some(value) => {
                    self.item.properties.insert(field.key().to_string(), value);
                }
                None => {
                    self.item.properties.remove(field.key());
                }
            }
        }
        Ok(())
    }

    /// Read the whole record
    pub fn properties(&self) -> Result<Topo4dProperties> {
        Topo4dProperties::from_map(&self.item.properties)
    }

    pub fn data_type(&self) -> Result<DataType> {
        read_data_type(&self.item.properties)
    }

    pub fn set_data_type(&mut self, data_type: Option<DataType>) -> Result<()> {
        self.write(Topo4dField::DataType, data_type)
    }

    pub fn native_crs(&self) -> Result<CrsValue> {
        read_native_crs(&self.item.properties)
    }

    pub fn set_native_crs(&mut self, crs: Option<&CrsValue>) -> Result<()> {
        self.write(Topo4dField::NativeCrs, crs)
    }

    pub fn sensor(&self) -> Result<Option<String>> {
        self.read(Topo4dField::Sensor)
    }

    pub fn set_sensor(&mut self, sensor: Option<&str>) -> Result<()> {
        self.write(Topo4dField::Sensor, sensor)
    }

    pub fn timezone(&self) -> Result<Option<String>> {
        self.read(Topo4dField::Timezone)
    }

    pub fn set_timezone(&mut self, tz: Option<&str>) -> Result<()> {
        self.write(Topo4dField::Timezone, tz)
    }

    pub fn acquisition_mode(&self) -> Result<Option<String>> {
        self.read(Topo4dField::AcquisitionMode)
    }

    pub fn set_acquisition_mode(&mut self, mode: Option<&str>) -> Result<()> {
        self.write(Topo4dField::AcquisitionMode, mode)
    }

    pub fn duration(&self) -> Result<Option<f64>> {
        self.read(Topo4dField::Duration)
    }

    pub fn set_duration(&mut self, seconds: Option<f64>) -> Result<()> {
        self.write(Topo4dField::Duration, finite(Topo4dField::Duration, seconds)?)
    }

    pub fn trajectory(&self) -> Result<Option<Vec<Vec<f64>>>> {
        self.read(Topo4dField::Trajectory)
    }

    pub fn set_trajectory(&mut self, positions: Option<Vec<Vec<f64>>>) -> Result<()> {
        self.write(Topo4dField::Trajectory, positions)
    }

    pub fn scan_position(&self) -> Result<Option<Vec<Vec<f64>>>> {
        self.read(Topo4dField::ScanPosition)
    }

    pub fn set_scan_position(&mut self, positions: Option<Vec<Vec<f64>>>) -> Result<()> {
        self.write(Topo4dField::ScanPosition, positions)
    }

    pub fn orientation(&self) -> Result<Option<String>> {
        self.read(Topo4dField::Orientation)
    }

    pub fn set_orientation(&mut self, orientation: Option<&str>) -> Result<()> {
        self.write(Topo4dField::Orientation, orientation)
    }

    pub fn point_count(&self) -> Result<Option<u64>> {
        self.read(Topo4dField::PointCount)
    }

    pub fn set_point_count(&mut self, count: Option<u64>) -> Result<()> {
        self.write(Topo4dField::PointCount, count)
    }

    pub fn spatial_resolution(&self) -> Result<Option<f64>> {
        self.read(Topo4dField::SpatialResolution)
    }

    pub fn set_spatial_resolution(&mut self, resolution: Option<f64>) -> Result<()> {
        self.write(Topo4dField::SpatialResolution, finite(Topo4dField::SpatialResolution, resolution)?)
    }

    pub fn measurement_error(&self) -> Result<Option<f64>> {
        self.read(Topo4dField::MeasurementError)
    }

    pub fn set_measurement_error(&mut self, error: Option<f64>) -> Result<()> {
        self.write(Topo4dField::MeasurementError, finite(Topo4dField::MeasurementError, error)?)
    }

    pub fn global_trafo(&self) -> Result<Option<Vec<f64>>> {
        self.read(Topo4dField::GlobalTrafo)
    }

    pub fn set_global_trafo(&mut self, trafo: Option<Vec<f64>>) -> Result<()> {
        self.write(Topo4dField::GlobalTrafo, trafo)
    }

    pub fn trafo_meta(&self) -> Result<Option<TrafoMeta>> {
        self.read(Topo4dField::TrafoMeta)
    }

    /// Replace the registration record
    pub fn set_trafo_meta(&mut self, meta: Option<TrafoMeta>) -> Result<()> {
        self.write(Topo4dField::TrafoMeta, meta)
    }

    /// Merge the set fields of `update` into the stored registration record
    pub fn apply_trafo_meta(&mut self, update: TrafoMeta) -> Result<()> {
        let mut meta = self.trafo_meta()?.unwrap_or_default();
        meta.apply(update);
        self.set_trafo_meta(Some(meta))
    }

    pub fn product_meta(&self) -> Result<Option<ProductMeta>> {
        self.read(Topo4dField::ProductMeta)
    }

    /// Replace the product record
    pub fn set_product_meta(&mut self, meta: Option<ProductMeta>) -> Result<()> {
        self.write(Topo4dField::ProductMeta, meta)
    }

    /// Merge the set fields of `update` into the stored product record
    pub fn apply_product_meta(&mut self, update: ProductMeta) -> Result<()> {
        let mut meta = self.product_meta()?.unwrap_or_default();
        meta.apply(update);
        self.set_product_meta(Some(meta))
    }

    /// Name of the product; fails if product metadata or its name is unset
    pub fn product_name(&self) -> Result<String> {
        let meta = self.product_meta()?.unwrap_or_default();
        meta.product_name().map(str::to_string)
    }
}

fn lookup(name: &str) -> Result<Topo4dField> {
    Topo4dField::from_name(name).ok_or_else(|| Stac4dError::InvalidEnumValue {
        name: "topo4d property".to_string(),
        value: name.to_string(),
        allowed: Topo4dField::ALL.iter().map(|f| f.key().to_string()).collect(),
    })
}

/// Non-finite numbers would serialize as null and silently delete the key
fn finite(field: Topo4dField, value: Option<f64>) -> Result<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() => {
            Err(Stac4dError::type_mismatch(field.key(), "finite number", v.to_string()))
        }
        other => Ok(other),
    }
}
