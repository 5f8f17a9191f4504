mod dedup;
mod geometry;
mod resolve;
mod utm;

pub use dedup::{Deduplicated, dedup_last_wins};
pub use geometry::FromGeoJson;
pub use resolve::{
    FeatureProperties, ImportFeature, ResolvedFeatures, resolve_feature, resolve_features,
    resolve_identifier, resolve_position, validate_position,
};
pub use utm::{UtmZone, utm_to_wgs84};
