use std::future::Future;

use super::types::{AppRole, AssetRecord, Principal};
use crate::error::ImportError;

/// Verifies caller tokens against the identity provider.
pub trait IdentityProvider {
    fn verify_token(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Principal, ImportError>> + Send;
}

/// Looks up the roles granted to a user.
pub trait RoleStore {
    fn roles_for(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<AppRole>, ImportError>> + Send;
}

/// The asset registry table.
pub trait AssetStore {
    /// Deletes every asset row.
    fn delete_all_assets(&self) -> impl Future<Output = Result<(), ImportError>> + Send;

    /// Inserts one batch of rows. A failure means none of the batch was stored.
    fn insert_assets(
        &self,
        assets: Vec<AssetRecord>,
    ) -> impl Future<Output = Result<(), ImportError>> + Send;

    fn list_assets(&self) -> impl Future<Output = Result<Vec<AssetRecord>, ImportError>> + Send;
}

/// Everything the import pipeline needs from the hosted backend.
pub trait Backend: IdentityProvider + RoleStore + AssetStore + Send + Sync {}

impl<T> Backend for T where T: IdentityProvider + RoleStore + AssetStore + Send + Sync {}
