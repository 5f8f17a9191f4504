use geo_types::Coord;
use geojson::{Geometry as GeoJsonGeometry, Value as GeoJsonValue};

use crate::error::ImportError;

/// Trait for parsing GeoJSON geometries into geo_types.
pub trait FromGeoJson: Sized {
    fn from_geojson(geometry: &GeoJsonGeometry) -> Result<Self, ImportError>;
}

/// A projected `(easting, northing)` position, read from a point geometry.
///
/// Survey exports sometimes wrap each point in a one-member `MultiPoint`;
/// that shape is accepted too.
impl FromGeoJson for Coord<f64> {
    fn from_geojson(geometry: &GeoJsonGeometry) -> Result<Self, ImportError> {
        match &geometry.value {
            GeoJsonValue::Point(position) => position_to_coord(position),
            GeoJsonValue::MultiPoint(points) if points.len() == 1 => position_to_coord(&points[0]),
            GeoJsonValue::MultiPoint(points) => Err(ImportError::Geometry(format!(
                "Expected a single point, got MultiPoint with {} members",
                points.len()
            ))),
            other => Err(ImportError::Geometry(format!(
                "Expected Point, got {:?}",
                other
            ))),
        }
    }
}

fn position_to_coord(position: &[f64]) -> Result<Coord<f64>, ImportError> {
    match position {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => Err(ImportError::Geometry(format!(
            "Position needs at least 2 values, got {}",
            position.len()
        ))),
    }
}
