//! Conversions between stac4d extents and `geo` types.

use geo::{BoundingRect, MultiPoint, Point, Rect};
use stac4d_core::error::Result;
use stac4d_core::models::GeoBbox;

/// Geographic bbox from a `geo::Rect` with x = lon, y = lat
pub fn rect_to_bbox(rect: &Rect<f64>) -> Result<GeoBbox> {
    GeoBbox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
}

/// Tightest rectangle around a set of points, `None` when empty
pub fn envelope(points: &[(f64, f64)]) -> Option<Rect<f64>> {
    let points: MultiPoint<f64> = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
    points.bounding_rect()
}
