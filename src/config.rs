use clap::Parser;
use clap::builder::RangedU64ValueParser;

use crate::client::BatchConfig;
use crate::core::UtmZone;
use crate::error::ImportError;

/// Settings for one import run.
#[derive(Debug, Clone, Default)]
pub struct ImportConfig {
    /// Zone used for features without explicit latitude/longitude.
    pub zone: UtmZone,
    pub batch: BatchConfig,
}

impl ImportConfig {
    pub fn with_zone(mut self, zone: UtmZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn with_batch(mut self, batch: BatchConfig) -> Self {
        self.batch = batch;
        self
    }
}

/// Service settings, from command-line flags or the environment.
#[derive(Parser, Debug, Clone)]
#[command(name = "lampadaire-import")]
#[command(about = "Streetlight registry import service")]
#[command(version)]
pub struct ServiceConfig {
    /// Base URL of the hosted backend
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: String,

    /// Service-role key used for table access
    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    pub service_role_key: String,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8000", env = "LAMPADAIRE_BIND")]
    pub bind: String,

    /// UTM zone number of projected input coordinates
    #[arg(
        long,
        default_value = "28",
        env = "LAMPADAIRE_UTM_ZONE",
        value_parser = clap::value_parser!(u8).range(1..=60)
    )]
    pub utm_zone: u8,

    /// Input coordinates are in the southern hemisphere
    #[arg(long, env = "LAMPADAIRE_UTM_SOUTH")]
    pub utm_south: bool,

    /// Rows per insert request
    #[arg(
        long,
        default_value = "100",
        env = "LAMPADAIRE_BATCH_SIZE",
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub batch_size: usize,
}

impl ServiceConfig {
    /// Reads settings from the environment only, ignoring process arguments.
    pub fn from_env() -> Result<Self, ImportError> {
        Self::try_parse_from(["lampadaire-import"])
            .map_err(|e| ImportError::Config(e.to_string()))
    }

    pub fn zone(&self) -> UtmZone {
        UtmZone::new(self.utm_zone, !self.utm_south)
    }

    pub fn import_config(&self) -> ImportConfig {
        ImportConfig::default()
            .with_zone(self.zone())
            .with_batch(BatchConfig::default().with_batch_size(self.batch_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 5] = [
        "lampadaire-import",
        "--supabase-url",
        "https://project.supabase.co",
        "--service-role-key",
        "service-key",
    ];

    fn parse(extra: &[&str]) -> Result<ServiceConfig, clap::Error> {
        ServiceConfig::try_parse_from(REQUIRED.iter().chain(extra).copied())
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).unwrap();

        assert_eq!(config.bind, "0.0.0.0:8000");
        assert_eq!(config.zone(), UtmZone::north(28));
        assert_eq!(config.import_config().batch.batch_size, 100);
    }

    #[test]
    fn test_missing_url_is_rejected() {
        let result = ServiceConfig::try_parse_from([
            "lampadaire-import",
            "--service-role-key",
            "service-key",
        ]);

        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        assert!(err.to_string().contains("supabase-url"));
    }

    #[test]
    fn test_overrides() {
        let config = parse(&[
            "--bind",
            "127.0.0.1:9000",
            "--utm-zone",
            "30",
            "--utm-south",
            "--batch-size",
            "250",
        ])
        .unwrap();

        let import = config.import_config();
        assert_eq!(config.bind, "127.0.0.1:9000");
        assert_eq!(import.zone, UtmZone::south(30));
        assert_eq!(import.batch.batch_size, 250);
    }

    #[test]
    fn test_rejects_bad_zone_and_batch_size() {
        assert!(parse(&["--utm-zone", "61"]).is_err());
        assert!(parse(&["--utm-zone", "0"]).is_err());
        assert!(parse(&["--batch-size", "0"]).is_err());
        assert!(parse(&["--batch-size", "many"]).is_err());
    }
}
