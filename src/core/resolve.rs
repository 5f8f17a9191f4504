use geo_types::Coord;
use geojson::{Geometry as GeoJsonGeometry, JsonValue};
use serde::Deserialize;
use tracing::warn;

use crate::client::{AssetRecord, GeoPoint};
use crate::error::ImportError;

use super::geometry::FromGeoJson;
use super::utm::{UtmZone, utm_to_wgs84};

const NAME_KEY: &str = "NOM";
const ALT_NAME_KEY: &str = "Point_";
const LATITUDE_KEY: &str = "Latitude_";
const LONGITUDE_KEY: &str = "Longitude_";

/// One element of the submitted `features` list.
///
/// Properties and geometry are kept as raw JSON so that a single malformed
/// feature is skipped or defaulted instead of failing the whole payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportFeature {
    #[serde(default)]
    pub properties: Option<JsonValue>,
    #[serde(default)]
    pub geometry: Option<JsonValue>,
}

/// Typed view over the property keys the import understands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureProperties {
    /// `NOM`
    pub name: Option<String>,
    /// `Point_`
    pub alt_name: Option<String>,
    /// `Latitude_`, WGS84 degrees
    pub latitude: Option<f64>,
    /// `Longitude_`, WGS84 degrees
    pub longitude: Option<f64>,
}

impl FeatureProperties {
    /// Anything other than a JSON object reads as an empty property bag.
    pub fn from_json(properties: Option<&JsonValue>) -> Self {
        let Some(props) = properties.and_then(JsonValue::as_object) else {
            return Self::default();
        };

        Self {
            name: props.get(NAME_KEY).and_then(label),
            alt_name: props.get(ALT_NAME_KEY).and_then(label),
            latitude: props.get(LATITUDE_KEY).and_then(number),
            longitude: props.get(LONGITUDE_KEY).and_then(number),
        }
    }

    /// Both explicit coordinates, when present.
    pub fn explicit_position(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }
}

/// Labels arrive as strings or bare numbers; empty strings count as absent.
fn label(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Name, then alternate name, then `LP-{idx + 1}`.
pub fn resolve_identifier(props: &FeatureProperties, idx: usize) -> String {
    props
        .name
        .clone()
        .or_else(|| props.alt_name.clone())
        .unwrap_or_else(|| format!("LP-{}", idx + 1))
}

/// Explicit latitude/longitude when both are present, otherwise the
/// geometry's projected pair converted from `zone`.
pub fn resolve_position(
    props: &FeatureProperties,
    geometry: Option<&JsonValue>,
    zone: UtmZone,
) -> Result<GeoPoint, ImportError> {
    if let Some(position) = props.explicit_position() {
        return Ok(position);
    }

    let geometry =
        geometry.ok_or_else(|| ImportError::Geometry("Feature has no geometry".to_string()))?;
    let projected = projected_coord(geometry)?;

    Ok(utm_to_wgs84(projected.x, projected.y, zone))
}

/// Reads `(easting, northing)` from a GeoJSON geometry, or from a bare
/// `{"coordinates": [x, y]}` object without a `type`.
fn projected_coord(geometry: &JsonValue) -> Result<Coord<f64>, ImportError> {
    if let Ok(parsed) = serde_json::from_value::<GeoJsonGeometry>(geometry.clone()) {
        return Coord::from_geojson(&parsed);
    }

    let pair: Option<Vec<f64>> = geometry
        .get("coordinates")
        .and_then(JsonValue::as_array)
        .and_then(|values| values.iter().map(JsonValue::as_f64).collect());

    match pair.as_deref() {
        Some([x, y, ..]) => Ok(Coord { x: *x, y: *y }),
        _ => Err(ImportError::Geometry(
            "Geometry has no coordinate pair".to_string(),
        )),
    }
}

pub fn validate_position(position: GeoPoint) -> Result<GeoPoint, ImportError> {
    if position.is_valid() {
        Ok(position)
    } else {
        Err(ImportError::Geometry(format!(
            "Invalid coordinates: lat={}, lon={}",
            position.lat, position.lon
        )))
    }
}

/// Resolves a single feature into an asset record.
///
/// An error means the feature must be skipped; it never aborts the import.
pub fn resolve_feature(
    feature: &ImportFeature,
    idx: usize,
    zone: UtmZone,
) -> Result<AssetRecord, (String, ImportError)> {
    let props = FeatureProperties::from_json(feature.properties.as_ref());
    let identifier = resolve_identifier(&props, idx);

    match resolve_position(&props, feature.geometry.as_ref(), zone).and_then(validate_position) {
        Ok(position) => Ok(AssetRecord::new(identifier, position)),
        Err(e) => Err((identifier, e)),
    }
}

/// Candidate records in input order, plus the count of skipped features.
#[derive(Debug, Default)]
pub struct ResolvedFeatures {
    pub records: Vec<AssetRecord>,
    pub skipped_invalid: usize,
}

pub fn resolve_features(features: &[ImportFeature], zone: UtmZone) -> ResolvedFeatures {
    let mut resolved = ResolvedFeatures {
        records: Vec::with_capacity(features.len()),
        skipped_invalid: 0,
    };

    for (idx, feature) in features.iter().enumerate() {
        match resolve_feature(feature, idx, zone) {
            Ok(record) => resolved.records.push(record),
            Err((identifier, e)) => {
                warn!("Skipping {}: {}", identifier, e);
                resolved.skipped_invalid += 1;
            }
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(value: JsonValue) -> ImportFeature {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_identifier_prefers_name() {
        let f = feature(json!({
            "properties": { "NOM": "Rue 10", "Point_": "P-7" },
            "geometry": { "type": "Point", "coordinates": [500000.0, 1768935.376] }
        }));

        assert_eq!(resolve_feature(&f, 0, UtmZone::default()).unwrap().identifier, "Rue 10");
    }

    #[test]
    fn test_identifier_falls_back_to_alt_name() {
        let f = feature(json!({
            "properties": { "NOM": "", "Point_": 42 },
            "geometry": { "type": "Point", "coordinates": [500000.0, 1768935.376] }
        }));

        assert_eq!(resolve_feature(&f, 0, UtmZone::default()).unwrap().identifier, "42");
    }

    #[test]
    fn test_whitespace_name_is_kept() {
        let f = feature(json!({
            "properties": { "NOM": "  ", "Point_": "P-7" },
            "geometry": { "type": "Point", "coordinates": [500000.0, 1768935.376] }
        }));

        assert_eq!(resolve_feature(&f, 0, UtmZone::default()).unwrap().identifier, "  ");
    }

    #[test]
    fn test_non_object_properties_read_as_empty() {
        let f = feature(json!({
            "properties": "oops",
            "geometry": { "type": "Point", "coordinates": [500000.0, 1768935.376] }
        }));

        let record = resolve_feature(&f, 2, UtmZone::default()).unwrap();
        assert_eq!(record.identifier, "LP-3");
        assert!((record.latitude - 16.0).abs() < 1e-6);
    }

    #[test]
    fn test_identifier_synthesized_from_index() {
        let props = FeatureProperties::default();
        assert_eq!(resolve_identifier(&props, 4), "LP-5");
        assert_eq!(resolve_identifier(&props, 0), "LP-1");
    }

    #[test]
    fn test_explicit_coordinates_win_over_geometry() {
        let f = feature(json!({
            "properties": { "Latitude_": 14.7, "Longitude_": -17.45 },
            "geometry": { "type": "Point", "coordinates": [236519.4545, 1625776.2798] }
        }));

        let record = resolve_feature(&f, 0, UtmZone::default()).unwrap();
        assert_eq!(record.latitude, 14.7);
        assert_eq!(record.longitude, -17.45);
    }

    #[test]
    fn test_explicit_coordinates_used_without_geometry() {
        let f = feature(json!({
            "properties": { "Latitude_": "14.7", "Longitude_": "-17.45" },
            "geometry": { "type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]] }
        }));

        let record = resolve_feature(&f, 0, UtmZone::default()).unwrap();
        assert_eq!(record.latitude, 14.7);
        assert_eq!(record.longitude, -17.45);
    }

    #[test]
    fn test_single_explicit_coordinate_falls_back_to_utm() {
        let f = feature(json!({
            "properties": { "Latitude_": 99.0 },
            "geometry": { "type": "Point", "coordinates": [500000.0, 1768935.376] }
        }));

        let record = resolve_feature(&f, 0, UtmZone::default()).unwrap();
        assert!((record.latitude - 16.0).abs() < 1e-6);
        assert!((record.longitude - -15.0).abs() < 1e-9);
    }

    #[test]
    fn test_bare_coordinates_without_type() {
        let f = feature(json!({
            "properties": {},
            "geometry": { "coordinates": [500000.0, 1768935.376] }
        }));

        let record = resolve_feature(&f, 0, UtmZone::default()).unwrap();
        assert!((record.latitude - 16.0).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let f = feature(json!({
            "properties": { "NOM": "Bad", "Latitude_": 200.0, "Longitude_": -17.0 }
        }));

        let (identifier, err) = resolve_feature(&f, 0, UtmZone::default()).unwrap_err();
        assert_eq!(identifier, "Bad");
        assert!(matches!(err, ImportError::Geometry(_)));
    }

    #[test]
    fn test_missing_geometry_rejected() {
        let f = feature(json!({ "properties": { "NOM": "Lonely" } }));

        assert!(resolve_feature(&f, 0, UtmZone::default()).is_err());
    }

    #[test]
    fn test_resolve_features_counts_skips() {
        let features = vec![
            feature(json!({ "properties": { "Latitude_": 14.0, "Longitude_": -17.0 } })),
            feature(json!({ "properties": { "Latitude_": 200.0, "Longitude_": -17.0 } })),
            feature(json!({ "properties": null, "geometry": null })),
            feature(json!({
                "properties": {},
                "geometry": { "type": "Point", "coordinates": [500000.0, 0.0] }
            })),
        ];

        let resolved = resolve_features(&features, UtmZone::default());
        assert_eq!(resolved.records.len(), 2);
        assert_eq!(resolved.skipped_invalid, 2);
        assert_eq!(resolved.records[0].identifier, "LP-1");
        assert_eq!(resolved.records[1].identifier, "LP-4");
    }
}
