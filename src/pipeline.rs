//! The registry import: authorize, reset, resolve, deduplicate, persist.
//!
//! The reset and the inserts are separate, non-transactional calls. If the
//! run dies between them (transport timeout, process exit) the registry is
//! left partially replaced; resubmitting the same input restores it, since
//! every run starts from an empty table.
//!
//! Runs are serialized within one process. Two processes importing at the
//! same time are not coordinated and may interleave their deletes and
//! inserts.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::client::{AppRole, Backend, Principal, persist_in_batches};
use crate::config::ImportConfig;
use crate::core::{ImportFeature, dedup_last_wins, resolve_features};
use crate::error::ImportError;

/// Outcome of a completed import, returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub success: bool,
    pub message: String,
    /// Features in the submitted collection.
    pub total: usize,
    /// Rows accepted by the store.
    pub inserted: usize,
    /// Distinct identifiers left after deduplication.
    pub unique_count: usize,
    pub duplicates_count: usize,
    pub duplicate_identifiers: Vec<String>,
    /// Features dropped for unusable coordinates.
    pub skipped_invalid: usize,
}

pub struct ImportPipeline<B> {
    backend: B,
    config: ImportConfig,
    run_lock: Mutex<()>,
}

impl<B: Backend> ImportPipeline<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            config: ImportConfig::default(),
            run_lock: Mutex::new(()),
        }
    }

    pub fn with_config(mut self, config: ImportConfig) -> Self {
        self.config = config;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Runs a full import from a raw request.
    ///
    /// `authorization` is the `Authorization` header value and `body` the
    /// raw JSON body, `{ "geojsonData": { "features": [...] } }`.
    ///
    /// # Errors
    ///
    /// - [`ImportError::Unauthorized`] for a missing or rejected token
    /// - [`ImportError::Forbidden`] when the caller is not an administrator
    /// - [`ImportError::InvalidInput`] when the body has no `features` list
    /// - [`ImportError::Json`] when the body is not JSON
    ///
    /// None of these touch the registry. Once the registry has been reset,
    /// per-feature and per-batch failures only show up in the report.
    pub async fn run(
        &self,
        authorization: Option<&str>,
        body: &[u8],
    ) -> Result<ImportReport, ImportError> {
        let principal = self.authorize(authorization).await?;
        let features = parse_payload(body)?;

        let _guard = self.run_lock.lock().await;
        info!(
            "Processing {} features for {}",
            features.len(),
            principal.id
        );

        self.import(&features).await
    }

    /// Checks the bearer token and the administrator role.
    pub async fn authorize(&self, authorization: Option<&str>) -> Result<Principal, ImportError> {
        let Some(header) = authorization else {
            error!("No authorization header provided");
            return Err(ImportError::Unauthorized(
                "No authorization header".to_string(),
            ));
        };

        let token = bearer_token(header);
        if token.is_empty() {
            error!("Authentication failed: empty token");
            return Err(ImportError::Unauthorized("Invalid token".to_string()));
        }

        let principal = match self.backend.verify_token(token).await {
            Ok(principal) => principal,
            Err(e) => {
                error!("Authentication failed: {}", e);
                return Err(ImportError::Unauthorized("Invalid token".to_string()));
            }
        };

        let roles = match self.backend.roles_for(&principal.id).await {
            Ok(roles) => roles,
            Err(e) => {
                error!("Role lookup failed for {}: {}", principal.id, e);
                Vec::new()
            }
        };

        if !roles.contains(&AppRole::Admin) {
            error!("User is not admin: {} {:?}", principal.id, roles);
            return Err(ImportError::Forbidden(
                "Admin access required".to_string(),
            ));
        }

        info!("Admin user authenticated: {}", principal.id);
        Ok(principal)
    }

    /// Replaces the registry with `features`. Skips authorization.
    pub async fn import(&self, features: &[ImportFeature]) -> Result<ImportReport, ImportError> {
        if let Err(e) = self.backend.delete_all_assets().await {
            error!("Error deleting existing lampadaires: {}", e);
        }

        let resolved = resolve_features(features, self.config.zone);
        if resolved.skipped_invalid > 0 {
            warn!(
                "Skipped {} features with invalid coordinates",
                resolved.skipped_invalid
            );
        }

        let deduped = dedup_last_wins(resolved.records);
        if !deduped.duplicate_identifiers.is_empty() {
            warn!(
                "Found {} duplicated identifiers, keeping the last occurrence of each",
                deduped.duplicate_identifiers.len()
            );
        }

        info!("Inserting {} lampadaires...", deduped.records.len());
        let outcome = persist_in_batches(&deduped.records, &self.config.batch, |batch| {
            self.backend.insert_assets(batch)
        })
        .await;

        if outcome.has_errors() {
            warn!(
                "{} of {} batches failed",
                outcome.errors.len(),
                outcome.batches
            );
        }
        info!("Successfully inserted {} lampadaires", outcome.inserted);

        Ok(ImportReport {
            success: true,
            message: format!("Imported {} lampadaires", outcome.inserted),
            total: features.len(),
            inserted: outcome.inserted,
            unique_count: deduped.records.len(),
            duplicates_count: deduped.duplicate_identifiers.len(),
            duplicate_identifiers: deduped.duplicate_identifiers,
            skipped_invalid: resolved.skipped_invalid,
        })
    }
}

/// Strips a `Bearer ` prefix; a header without one is taken as the token.
fn bearer_token(header: &str) -> &str {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .unwrap_or(header)
        .trim()
}

/// Extracts `geojsonData.features` from the request body.
pub fn parse_payload(body: &[u8]) -> Result<Vec<ImportFeature>, ImportError> {
    let mut payload: Value = serde_json::from_slice(body)?;

    let features = payload
        .get_mut("geojsonData")
        .and_then(|data| data.get_mut("features"))
        .filter(|features| features.is_array())
        .map(Value::take)
        .ok_or_else(|| ImportError::InvalidInput("Invalid GeoJSON data".to_string()))?;

    serde_json::from_value(features)
        .map_err(|e| ImportError::InvalidInput(format!("Invalid GeoJSON data: {}", e)))
}
