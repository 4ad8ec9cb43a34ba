// src/geo_handler.rs
use serde::Deserialize;
use thiserror::Error;

use crate::jurisdiction::{Jurisdiction, JurisdictionCode, LocaleSignals};

const PRIMARY_ENDPOINT: &str = "https://ipapi.co/json/";
const BACKUP_ENDPOINT: &str = "https://api.country.is/";

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("lookup request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("lookup provider reported an error")]
    Provider,

    #[error("lookup response carries no country")]
    MissingCountry,
}

#[derive(Debug, Deserialize)]
struct PrimaryResponse {
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    region_code: Option<String>,
    #[serde(default)]
    error: Option<bool>,
}

impl PrimaryResponse {
    fn jurisdiction(&self) -> Result<Jurisdiction, GeoError> {
        if self.error == Some(true) {
            return Err(GeoError::Provider);
        }

        let country = self
            .country_code
            .as_deref()
            .filter(|code| !code.is_empty())
            .ok_or(GeoError::MissingCountry)?;
        let region = self
            .region
            .as_deref()
            .or(self.region_code.as_deref())
            .unwrap_or("");

        Ok(Jurisdiction::from_country(country, region))
    }
}

#[derive(Debug, Deserialize)]
struct BackupResponse {
    #[serde(default)]
    country: String,
}

pub struct GeoHandler {}

impl GeoHandler {
    pub fn new() -> Self {
        GeoHandler {}
    }

    /// Resolves the visitor's jurisdiction. Never fails: every error path
    /// degrades to the local-signal result.
    ///
    /// Local signals outrank the network: the lookup is skipped entirely
    /// when the locale or timezone already names a region.
    pub async fn resolve(&self, signals: &LocaleSignals) -> Jurisdiction {
        let local = Jurisdiction::from_signals(signals);
        if local.code != JurisdictionCode::Other {
            return local;
        }

        match self.lookup().await {
            Ok(jurisdiction) => jurisdiction,
            Err(err) => {
                log::warn!("IP geolocation failed, keeping local result: {err}");
                local
            }
        }
    }

    async fn lookup(&self) -> Result<Jurisdiction, GeoError> {
        match self.query_primary().await {
            Ok(jurisdiction) => Ok(jurisdiction),
            Err(err) => {
                log::warn!("primary geolocation lookup failed: {err}");
                self.query_backup().await
            }
        }
    }

    async fn query_primary(&self) -> Result<Jurisdiction, GeoError> {
        let client = reqwest::Client::new();
        let payload: PrimaryResponse = client
            .get(PRIMARY_ENDPOINT)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        payload.jurisdiction()
    }

    async fn query_backup(&self) -> Result<Jurisdiction, GeoError> {
        let payload: BackupResponse = reqwest::get(BACKUP_ENDPOINT)
            .await?
            .error_for_status()?
            .json()
            .await?;

        if payload.country.is_empty() {
            return Err(GeoError::MissingCountry);
        }

        Ok(Jurisdiction::from_country(&payload.country, ""))
    }
}
