use serde::Deserialize;

use crate::client::types::AppRole;

/// A row of the `user_roles` table, selected as `role` only.
#[derive(Debug, Deserialize)]
pub struct RoleRow {
    pub role: AppRole,
}
