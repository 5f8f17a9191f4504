use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::traits::{AssetStore, IdentityProvider, RoleStore};
use super::types::{AppRole, AssetRecord, Principal};
use crate::error::ImportError;

#[derive(Debug, Default)]
struct MemoryState {
    principals: HashMap<String, Principal>,
    roles: HashMap<String, Vec<AppRole>>,
    assets: Vec<AssetRecord>,
    insert_calls: usize,
    failing_inserts: HashSet<usize>,
    fail_delete: bool,
}

/// In-process backend holding users, roles and the asset table.
///
/// Insert and delete failures can be injected to exercise the pipeline's
/// partial-failure paths.
///
/// # Example
///
/// ```
/// use lampadaire_import::{AppRole, MemoryBackend};
///
/// let backend = MemoryBackend::new()
///     .with_user("admin-token", "user-1", &[AppRole::Admin])
///     .fail_insert_call(2);
/// assert!(backend.assets().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a user reachable through `token` with the given roles.
    pub fn with_user(self, token: &str, user_id: &str, roles: &[AppRole]) -> Self {
        {
            let mut state = self.lock();
            state.principals.insert(
                token.to_string(),
                Principal {
                    id: user_id.to_string(),
                    email: None,
                },
            );
            state.roles.insert(user_id.to_string(), roles.to_vec());
        }
        self
    }

    pub fn with_assets(self, assets: Vec<AssetRecord>) -> Self {
        self.lock().assets = assets;
        self
    }

    /// Makes the `call`-th insert (1-based) fail without storing anything.
    pub fn fail_insert_call(self, call: usize) -> Self {
        self.lock().failing_inserts.insert(call);
        self
    }

    pub fn fail_delete(self) -> Self {
        self.lock().fail_delete = true;
        self
    }

    /// Snapshot of the asset table.
    pub fn assets(&self) -> Vec<AssetRecord> {
        self.lock().assets.clone()
    }

    pub fn insert_calls(&self) -> usize {
        self.lock().insert_calls
    }
}

impl IdentityProvider for MemoryBackend {
    async fn verify_token(&self, token: &str) -> Result<Principal, ImportError> {
        self.lock()
            .principals
            .get(token)
            .cloned()
            .ok_or_else(|| ImportError::Unauthorized("Invalid token".to_string()))
    }
}

impl RoleStore for MemoryBackend {
    async fn roles_for(&self, user_id: &str) -> Result<Vec<AppRole>, ImportError> {
        Ok(self.lock().roles.get(user_id).cloned().unwrap_or_default())
    }
}

impl AssetStore for MemoryBackend {
    async fn delete_all_assets(&self) -> Result<(), ImportError> {
        let mut state = self.lock();
        if state.fail_delete {
            return Err(ImportError::Api("delete rejected".to_string()));
        }
        state.assets.clear();
        Ok(())
    }

    async fn insert_assets(&self, assets: Vec<AssetRecord>) -> Result<(), ImportError> {
        let mut state = self.lock();
        state.insert_calls += 1;
        let call = state.insert_calls;
        if state.failing_inserts.contains(&call) {
            return Err(ImportError::Api(format!("insert {} rejected", call)));
        }
        state.assets.extend(assets);
        Ok(())
    }

    async fn list_assets(&self) -> Result<Vec<AssetRecord>, ImportError> {
        Ok(self.assets())
    }
}
