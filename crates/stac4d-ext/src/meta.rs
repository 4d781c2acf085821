//! Structured sub-objects: registration metadata and product provenance.
//!
//! Both records merge partially: [`TrafoMeta::apply`] and
//! [`ProductMeta::apply`] copy only the fields that are set on the argument,
//! so successive calls with disjoint fields accumulate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stac4d_core::error::{Result, Stac4dError};

use crate::schema::Topo4dField;

fn merge<T>(target: &mut Option<T>, update: Option<T>) {
    if update.is_some() {
        *target = update;
    }
}

/// Registration and transformation metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafoMeta {
    /// Identifier or timestamp of the epoch this observation was registered to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_epoch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_error: Option<f64>,
    /// Row-major transformation matrix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transformation_matrix: Option<Vec<Vec<f64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affine_transformation: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduction_point: Option<Vec<f64>>,
}

impl TrafoMeta {
    /// Copy every field set on `update`, keep the rest
    pub fn apply(&mut self, update: TrafoMeta) {
        merge(&mut self.reference_epoch, update.reference_epoch);
        merge(&mut self.registration_error, update.registration_error);
        merge(&mut self.transformation_matrix, update.transformation_matrix);
        merge(&mut self.affine_transformation, update.affine_transformation);
        merge(&mut self.rotation, update.rotation);
        merge(&mut self.translation, update.translation);
        merge(&mut self.reduction_point, update.reduction_point);
    }
}

/// Provenance of a derived product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_parameters: Option<Map<String, Value>>,
    /// Reference to the item or product this one was derived from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_level: Option<String>,
}

impl ProductMeta {
    /// Copy every field set on `update`, keep the rest
    pub fn apply(&mut self, update: ProductMeta) {
        merge(&mut self.product_name, update.product_name);
        merge(&mut self.last_update, update.last_update);
        merge(&mut self.processing_parameters, update.processing_parameters);
        merge(&mut self.derived_from, update.derived_from);
        merge(&mut self.product_level, update.product_level);
    }

    /// Product name; required once product metadata is read
    pub fn product_name(&self) -> Result<&str> {
        self.product_name.as_deref().ok_or_else(|| {
            Stac4dError::missing(format!("{}.product_name", Topo4dField::ProductMeta.key()))
        })
    }
}
