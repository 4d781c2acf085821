//! The full topo4d record and its mapping to item properties

use serde::Serialize;
use serde_json::{Map, Value};
use stac4d_core::error::{Result, Stac4dError};
use stac4d_core::models::{CrsValue, Item};

use crate::data_type::DataType;
use crate::meta::{ProductMeta, TrafoMeta};
use crate::schema::{
    has_extension, normalize, read_data_type, read_native_crs, read_optional, Topo4dField,
    SCHEMA_URI,
};

/// Every topo4d property of one item
#[derive(Debug, Clone, PartialEq)]
pub struct Topo4dProperties {
    pub data_type: DataType,
    pub native_crs: CrsValue,
    pub sensor: Option<String>,
    /// IANA time zone of the acquisition, e.g. `Europe/Berlin`
    pub timezone: Option<String>,
    pub acquisition_mode: Option<String>,
    /// Acquisition duration in seconds
    pub duration: Option<f64>,
    pub trajectory: Option<Vec<Vec<f64>>>,
    pub scan_position: Option<Vec<Vec<f64>>>,
    pub orientation: Option<String>,
    pub point_count: Option<u64>,
    pub spatial_resolution: Option<f64>,
    pub measurement_error: Option<f64>,
    /// Flattened global transformation
    pub global_trafo: Option<Vec<f64>>,
    pub trafo_meta: Option<TrafoMeta>,
    pub product_meta: Option<ProductMeta>,
}

impl Topo4dProperties {
    /// Record with the required fields and no optional ones
    pub fn new(data_type: DataType, native_crs: CrsValue) -> Self {
        Self {
            data_type,
            native_crs,
            sensor: None,
            timezone: None,
            acquisition_mode: None,
            duration: None,
            trajectory: None,
            scan_position: None,
            orientation: None,
            point_count: None,
            spatial_resolution: None,
            measurement_error: None,
            global_trafo: None,
            trafo_meta: None,
            product_meta: None,
        }
    }

    /// Property map with one key per present field; absent and empty fields have no key
    pub fn to_map(&self) -> Result<Map<String, Value>> {
        let mut map = Map::new();
        put(&mut map, Topo4dField::DataType, Some(&self.data_type))?;
        put(&mut map, Topo4dField::NativeCrs, Some(&self.native_crs))?;
        put(&mut map, Topo4dField::Sensor, self.sensor.as_ref())?;
        put(&mut map, Topo4dField::Timezone, self.timezone.as_ref())?;
        put(&mut map, Topo4dField::AcquisitionMode, self.acquisition_mode.as_ref())?;
        put(&mut map, Topo4dField::Duration, self.duration.as_ref())?;
        put(&mut map, Topo4dField::Trajectory, self.trajectory.as_ref())?;
        put(&mut map, Topo4dField::ScanPosition, self.scan_position.as_ref())?;
        put(&mut map, Topo4dField::Orientation, self.orientation.as_ref())?;
        put(&mut map, Topo4dField::PointCount, self.point_count.as_ref())?;
        put(&mut map, Topo4dField::SpatialResolution, self.spatial_resolution.as_ref())?;
        put(&mut map, Topo4dField::MeasurementError, self.measurement_error.as_ref())?;
        put(&mut map, Topo4dField::GlobalTrafo, self.global_trafo.as_ref())?;
        put(&mut map, Topo4dField::TrafoMeta, self.trafo_meta.as_ref())?;
        put(&mut map, Topo4dField::ProductMeta, self.product_meta.as_ref())?;
        Ok(map)
    }

    /// Read the record back from a property map; keys without the prefix are ignored
    pub fn from_map(map: &Map<String, Value>) -> Result<Self> {
        Ok(Self {
            data_type: read_data_type(map)?,
            native_crs: read_native_crs(map)?,
            sensor: read_optional(map, Topo4dField::Sensor)?,
            timezone: read_optional(map, Topo4dField::Timezone)?,
            acquisition_mode: read_optional(map, Topo4dField::AcquisitionMode)?,
            duration: read_optional(map, Topo4dField::Duration)?,
            trajectory: read_optional(map, Topo4dField::Trajectory)?,
            scan_position: read_optional(map, Topo4dField::ScanPosition)?,
            orientation: read_optional(map, Topo4dField::Orientation)?,
            point_count: read_optional(map, Topo4dField::PointCount)?,
            spatial_resolution: read_optional(map, Topo4dField::SpatialResolution)?,
            measurement_error: read_optional(map, Topo4dField::MeasurementError)?,
            global_trafo: read_optional(map, Topo4dField::GlobalTrafo)?,
            trafo_meta: read_optional(map, Topo4dField::TrafoMeta)?,
            product_meta: read_optional(map, Topo4dField::ProductMeta)?,
        })
    }

    /// Read the record from an item that has the extension registered
    pub fn from_item(item: &Item) -> Result<Self> {
        if !has_extension(item) {
            return Err(Stac4dError::ExtensionNotRegistered { uri: SCHEMA_URI.to_string() });
        }
        Self::from_map(&item.properties)
    }
}

fn put<T: Serialize>(map: &mut Map<String, Value>, field: Topo4dField, value: Option<&T>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if let Some(value) = normalize(field, serde_json::to_value(value)?)? {
        map.insert(field.key().to_string(), value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn uls() -> Topo4dProperties {
        let mut props = Topo4dProperties::new(DataType::PointCloud, "EPSG:25832".parse().unwrap());
        props.sensor = Some("RIEGL miniVUX-3UAV".to_string());
        props.timezone = Some("Europe/Berlin".to_string());
        props.point_count = Some(1_254_011);
        props.trajectory = Some(vec![vec![674010.0, 5265020.0, 780.0], vec![674050.0, 5265040.0, 781.5]]);
        props
    }

    #[test]
    fn test_to_map_skips_absent_fields() {
        let map = uls().to_map().unwrap();

        assert_eq!(map["topo4d:data_type"], "point-cloud");
        assert_eq!(map["topo4d:native_crs"], "EPSG:25832");
        assert_eq!(map["topo4d:tz"], "Europe/Berlin");
        assert_eq!(map["topo4d:point_count"], 1_254_011);
        assert!(!map.contains_key("topo4d:duration"));
        assert!(!map.contains_key("topo4d:trafo_meta"));
        assert_eq!(map.len(), 6);
    }

    #[test]
    fn test_empty_values_produce_no_key() {
        let mut props = uls();
        props.sensor = Some(String::new());
        props.scan_position = Some(Vec::new());
        props.trafo_meta = Some(TrafoMeta::default());

        let map = props.to_map().unwrap();
        assert!(!map.contains_key("topo4d:sensor"));
        assert!(!map.contains_key("topo4d:scan_position"));
        assert!(!map.contains_key("topo4d:trafo_meta"));
    }

    #[test]
    fn test_map_round_trip() {
        let mut props = uls();
        props.product_meta = Some(ProductMeta {
            product_name: Some("Isar ULS 10cm".to_string()),
            ..Default::default()
        });

        let back = Topo4dProperties::from_map(&props.to_map().unwrap()).unwrap();
        assert_eq!(back, props);
    }

    #[test]
    fn test_from_map_requires_data_type() {
        let map = json!({ "topo4d:native_crs": "Local" });
        let err = Topo4dProperties::from_map(map.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, Stac4dError::MissingRequiredProperty { ref name } if name == "topo4d:data_type"));
    }

    #[test]
    fn test_from_map_reports_wrong_types() {
        let map = json!({
            "topo4d:data_type": "mesh",
            "topo4d:native_crs": "Local",
            "topo4d:duration": "ten minutes",
        });
        let err = Topo4dProperties::from_map(map.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, Stac4dError::TypeMismatch { ref name, .. } if name == "topo4d:duration"));
    }

    #[test]
    fn test_from_item_requires_registration() {
        let mut item = Item::new("Isar_20240812_ULS");
        item.properties = uls().to_map().unwrap();
        assert!(matches!(
            Topo4dProperties::from_item(&item),
            Err(Stac4dError::ExtensionNotRegistered { .. })
        ));

        crate::schema::register(&mut item);
        assert_eq!(Topo4dProperties::from_item(&item).unwrap(), uls());
    }
}
