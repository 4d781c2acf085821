//! topo4d properties on a serialized STAC item

use serde_json::json;
use stac4d_core::models::{CrsValue, Item};
use stac4d_ext::{DataType, ProductMeta, Topo4dExtension, Topo4dProperties, TrafoMeta, SCHEMA_URI};

fn enriched_item() -> Item {
    let mut item = Item::new("Isar_20250325_ULS_10cm");
    let mut ext = Topo4dExtension::ext(&mut item, true).unwrap();

    let mut props = Topo4dProperties::new(DataType::PointCloud, CrsValue::from_epsg(25832).unwrap());
    props.acquisition_mode = Some("ULS".to_string());
    props.timezone = Some("Europe/Berlin".to_string());
    props.spatial_resolution = Some(0.1);
    ext.apply(props).unwrap();

    ext.apply_trafo_meta(TrafoMeta {
        reference_epoch: Some("Isar_20240812_ULS_10cm".to_string()),
        transformation_matrix: Some(vec![
            vec![1.0, 0.0, 0.0, 0.12],
            vec![0.0, 1.0, 0.0, -0.04],
            vec![0.0, 0.0, 1.0, 0.02],
            vec![0.0, 0.0, 0.0, 1.0],
        ]),
        ..Default::default()
    })
    .unwrap();
    ext.apply_product_meta(ProductMeta {
        product_name: Some("Isar ULS point cloud".to_string()),
        processing_parameters: json!({ "voxel_size": 0.1 }).as_object().cloned(),
        ..Default::default()
    })
    .unwrap();

    item
}

#[test]
fn test_properties_serialize_under_prefix() {
    let json = serde_json::to_value(enriched_item()).unwrap();

    assert_eq!(json["stac_extensions"], json!([SCHEMA_URI]));
    let properties = &json["properties"];
    assert_eq!(properties["topo4d:data_type"], "point-cloud");
    assert_eq!(properties["topo4d:native_crs"], "EPSG:25832");
    assert_eq!(properties["topo4d:acquisition_mode"], "ULS");
    assert_eq!(properties["topo4d:trafo_meta"]["transformation_matrix"][0][3], 0.12);
    assert_eq!(properties["topo4d:product_meta"]["processing_parameters"]["voxel_size"], 0.1);
    assert!(properties.get("topo4d:sensor").is_none());
}

#[test]
fn test_properties_survive_json_round_trip() {
    let item = enriched_item();
    let json = serde_json::to_string_pretty(&item).unwrap();
    let mut back: Item = serde_json::from_str(&json).unwrap();

    let ext = Topo4dExtension::ext(&mut back, false).unwrap();
    assert_eq!(ext.data_type().unwrap(), DataType::PointCloud);
    assert_eq!(ext.native_crs().unwrap().epsg(), Some(25832));
    assert_eq!(ext.product_name().unwrap(), "Isar ULS point cloud");
    assert_eq!(
        ext.trafo_meta().unwrap().unwrap().reference_epoch.as_deref(),
        Some("Isar_20240812_ULS_10cm")
    );
    assert_eq!(Topo4dProperties::from_item(&item).unwrap(), ext.properties().unwrap());
}
