use crate::client::traits::{AssetStore, IdentityProvider, RoleStore};
use crate::client::types::{AppRole, AssetRecord, HttpClient, Principal};
use crate::config::ServiceConfig;
use crate::error::ImportError;

use super::record::RoleRow;

const ASSET_TABLE: &str = "lampadaires";
const ROLE_TABLE: &str = "user_roles";
/// Filter matching every row; the REST layer refuses unfiltered deletes.
const MATCH_ALL_ROWS: &str = "id=neq.00000000-0000-0000-0000-000000000000";

/// Client for the hosted backend: auth for token checks, REST for tables.
pub struct SupabaseClient {
    http: HttpClient,
}

impl SupabaseClient {
    pub fn new(url: impl Into<String>, service_role_key: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(url, service_role_key),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(&config.supabase_url, &config.service_role_key)
    }

    fn table_path(table: &str, query: &str) -> String {
        if query.is_empty() {
            format!("/rest/v1/{}", table)
        } else {
            format!("/rest/v1/{}?{}", table, query)
        }
    }
}

impl IdentityProvider for SupabaseClient {
    async fn verify_token(&self, token: &str) -> Result<Principal, ImportError> {
        self.http.fetch_json_as("/auth/v1/user", token).await
    }
}

impl RoleStore for SupabaseClient {
    async fn roles_for(&self, user_id: &str) -> Result<Vec<AppRole>, ImportError> {
        let query = format!("select=role&user_id=eq.{}", urlencoding::encode(user_id));
        let rows: Vec<RoleRow> = self
            .http
            .fetch_json(&Self::table_path(ROLE_TABLE, &query))
            .await?;
        Ok(rows.into_iter().map(|row| row.role).collect())
    }
}

impl AssetStore for SupabaseClient {
    async fn delete_all_assets(&self) -> Result<(), ImportError> {
        self.http
            .delete(&Self::table_path(ASSET_TABLE, MATCH_ALL_ROWS))
            .await
    }

    async fn insert_assets(&self, assets: Vec<AssetRecord>) -> Result<(), ImportError> {
        self.http
            .post_json(&Self::table_path(ASSET_TABLE, ""), &assets)
            .await
    }

    async fn list_assets(&self) -> Result<Vec<AssetRecord>, ImportError> {
        self.http
            .fetch_json(&Self::table_path(
                ASSET_TABLE,
                "select=identifier,latitude,longitude,status&order=identifier",
            ))
            .await
    }
}
