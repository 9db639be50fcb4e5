use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::errors::AppError;
use crate::models::GeoInfo;

const LOOKUP_FIELDS: &str = "status,message,country,city,query";
const DEFAULT_FAILURE_MESSAGE: &str = "Geolocalização falhou";

pub type GeoFuture<'a> = Pin<Box<dyn Future<Output = Result<GeoInfo, AppError>> + Send + 'a>>;

/// Maps an IP address to a coarse location.
pub trait GeoLocator: Send + Sync {
    fn lookup<'a>(&'a self, ip: &'a str) -> GeoFuture<'a>;
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: Option<String>,
    message: Option<String>,
    country: Option<String>,
    city: Option<String>,
    query: Option<String>,
}

/// Client for the ip-api.com JSON endpoint (or anything speaking its format).
#[derive(Clone)]
pub struct IpApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl IpApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Unexpected(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch(&self, ip: &str) -> Result<GeoInfo, AppError> {
        let url = format!("{}/json/{ip}", self.base_url);
        debug!("Looking up location for {ip}");

        let response = self
            .http
            .get(&url)
            .query(&[("fields", LOOKUP_FIELDS)])
            .send()
            .await
            .map_err(|e| {
                error!("Geolocation request for {ip} failed: {e}");
                AppError::Unexpected(format!("Geolocation request failed: {e}"))
            })?;

        let status = response.status();
        let body: Option<IpApiResponse> = response.json().await.ok();

        match body {
            Some(data) if status.is_success() && data.status.as_deref() == Some("success") => {
                Ok(GeoInfo {
                    ip: data.query.unwrap_or_else(|| ip.to_string()),
                    city: data.city.unwrap_or_default(),
                    country: data.country.unwrap_or_default(),
                })
            }
            other => {
                let message = other
                    .and_then(|data| data.message)
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
                warn!("Geolocation lookup for {ip} failed ({status}): {message}");
                Err(AppError::GeolocationFailed { message })
            }
        }
    }
}

impl GeoLocator for IpApiClient {
    fn lookup<'a>(&'a self, ip: &'a str) -> GeoFuture<'a> {
        Box::pin(self.fetch(ip))
    }
}
