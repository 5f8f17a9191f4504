pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod server;

pub use client::{
    AppRole, AssetRecord, AssetStatus, AssetStore, Backend, BatchConfig, BatchOutcome, GeoPoint,
    IdentityProvider, MemoryBackend, Principal, RoleStore, SupabaseClient, persist_in_batches,
};
pub use config::{ImportConfig, ServiceConfig};
pub use crate::core::{
    FeatureProperties, FromGeoJson, ImportFeature, UtmZone, dedup_last_wins, resolve_feature,
    resolve_features, utm_to_wgs84,
};
pub use error::ImportError;
pub use pipeline::{ImportPipeline, ImportReport, parse_payload};
pub use server::{build_router, serve};

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{ImportError, ImportPipeline, ServiceConfig, SupabaseClient};

    #[tokio::test]
    #[ignore = "requires network access, SUPABASE_URL, SUPABASE_SERVICE_ROLE_KEY and LAMPADAIRE_ADMIN_TOKEN"]
    async fn test_live_import() -> Result<(), ImportError> {
        let config = ServiceConfig::from_env()?;
        let token = std::env::var("LAMPADAIRE_ADMIN_TOKEN")
            .map_err(|_| ImportError::Config("LAMPADAIRE_ADMIN_TOKEN not set".into()))?;

        let pipeline = ImportPipeline::new(SupabaseClient::from_config(&config))
            .with_config(config.import_config());

        // Two Dakar lampposts, one in UTM and one with explicit coordinates
        let body = serde_json::to_vec(&json!({
            "geojsonData": {
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "properties": { "NOM": "LP-DKR-1" },
                        "geometry": { "type": "Point", "coordinates": [236519.4545, 1625776.2798] }
                    },
                    {
                        "type": "Feature",
                        "properties": { "NOM": "LP-DKR-2", "Latitude_": 14.7, "Longitude_": -17.45 },
                        "geometry": { "type": "Point", "coordinates": [0.0, 0.0] }
                    }
                ]
            }
        }))?;

        let report = pipeline
            .run(Some(&format!("Bearer {}", token)), &body)
            .await?;
        println!(
            "Inserted {} of {} ({} skipped)",
            report.inserted, report.total, report.skipped_invalid
        );

        Ok(())
    }
}
