use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ImportError;

/// Lifecycle state of a lamppost. Imports always create `Functional` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    #[default]
    Functional,
    Damaged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppRole {
    Admin,
    User,
}

/// A lamppost row in the `lampadaires` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub identifier: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: AssetStatus,
}

impl AssetRecord {
    pub fn new(identifier: impl Into<String>, position: GeoPoint) -> Self {
        Self {
            identifier: identifier.into(),
            latitude: position.lat,
            longitude: position.lon,
            status: AssetStatus::Functional,
        }
    }
}

/// The authenticated caller, as returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Principal {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A WGS84 position in degrees.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lon, lat }
    }

    /// Finite, with latitude in [-90, 90] and longitude in [-180, 180].
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// HTTP client for the hosted backend's REST and auth endpoints.
///
/// Every request carries the project `apikey` header. The bearer token is
/// either the service-role key or, for identity checks, the caller's token.
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn request(&self, method: Method, path: &str, bearer: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, ImportError> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ImportError::Api(format!(
                "API returned status {}: {}",
                status, body
            )));
        }

        Ok(response)
    }

    /// GET a JSON document using `bearer` as the access token.
    pub async fn fetch_json_as<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: &str,
    ) -> Result<T, ImportError> {
        let response = self.execute(self.request(Method::GET, path, bearer)).await?;
        let data: T = response.json().await?;
        Ok(data)
    }

    /// GET a JSON document with service-role privileges.
    pub async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ImportError> {
        self.fetch_json_as(path, &self.api_key).await
    }

    /// POST a JSON body with service-role privileges, discarding the response.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ImportError> {
        let request = self
            .request(Method::POST, path, &self.api_key)
            .header("Prefer", "return=minimal")
            .json(body);
        self.execute(request).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<(), ImportError> {
        let request = self
            .request(Method::DELETE, path, &self.api_key)
            .header("Prefer", "return=minimal");
        self.execute(request).await?;
        Ok(())
    }
}
