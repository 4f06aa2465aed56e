//! AMap web service client for place search and reverse geocoding.

use super::{is_residential, PoiResult};
use crate::config::AmapConfig;
use crate::error::LocationError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// POI type codes for residential and commercial-residential areas.
const COMMUNITY_POI_TYPES: &str = "120300|120200";

/// Shortest keyword worth sending to the search endpoint.
const MIN_KEYWORD_CHARS: usize = 2;

/// AMap encodes empty string fields as `[]`.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

#[derive(Debug, Deserialize)]
struct PlaceSearchResponse {
    #[serde(deserialize_with = "lenient_string")]
    status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    info: String,
    #[serde(default)]
    pois: Vec<RawPoi>,
}

#[derive(Debug, Deserialize)]
struct RawPoi {
    #[serde(default, deserialize_with = "lenient_string")]
    id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    name: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    poi_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    location: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pname: String,
    #[serde(default, deserialize_with = "lenient_string")]
    cityname: String,
    #[serde(default, deserialize_with = "lenient_string")]
    adname: String,
    #[serde(default, deserialize_with = "lenient_string")]
    address: String,
}

#[derive(Debug, Deserialize)]
struct RegeoResponse {
    #[serde(deserialize_with = "lenient_string")]
    status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    info: String,
    regeocode: Option<Regeocode>,
}

#[derive(Debug, Deserialize)]
struct Regeocode {
    #[serde(default, deserialize_with = "lenient_string")]
    formatted_address: String,
}

/// Parse AMap's `"lng,lat"` location string.
fn parse_location(value: &str) -> Result<[f64; 2], LocationError> {
    let malformed = || LocationError::MalformedLocation {
        value: value.to_string(),
    };

    let (lng, lat) = value.split_once(',').ok_or_else(malformed)?;
    let lng = lng.trim().parse::<f64>().map_err(|_| malformed())?;
    let lat = lat.trim().parse::<f64>().map_err(|_| malformed())?;

    Ok([lng, lat])
}

fn check_status(status: &str, info: &str) -> Result<(), LocationError> {
    if status == "1" {
        Ok(())
    } else {
        Err(LocationError::Api {
            status: status.to_string(),
            info: info.to_string(),
        })
    }
}

/// Keep residential POIs and convert them to [`PoiResult`]s.
fn collect_communities(pois: Vec<RawPoi>) -> Vec<PoiResult> {
    pois.into_iter()
        .filter(|poi| is_residential(&poi.name, &poi.poi_type))
        .filter_map(|poi| match parse_location(&poi.location) {
            Ok(location) => Some(PoiResult {
                id: if poi.id.is_empty() {
                    Uuid::new_v4().to_string()
                } else {
                    poi.id
                },
                address: format!("{}{}{}{}", poi.pname, poi.cityname, poi.adname, poi.address),
                name: poi.name,
                location,
            }),
            Err(e) => {
                warn!("Skipping POI {}: {}", poi.name, e);
                None
            }
        })
        .collect()
}

/// Client for the AMap REST API.
pub struct AmapClient {
    http_client: reqwest::Client,
    base_url: String,
    key: String,
    page_size: usize,
}

impl AmapClient {
    pub fn new(config: &AmapConfig) -> Result<Self, LocationError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            key: config.key.clone().unwrap_or_default(),
            page_size: config.page_size,
        })
    }

    fn require_key(&self) -> Result<&str, LocationError> {
        if self.key.is_empty() {
            Err(LocationError::MissingKey)
        } else {
            Ok(&self.key)
        }
    }

    /// Search for residential communities matching `keyword`.
    ///
    /// Keywords shorter than two characters return nothing without a request.
    pub async fn search_communities(&self, keyword: &str) -> Result<Vec<PoiResult>, LocationError> {
        let keyword = keyword.trim();
        if keyword.chars().count() < MIN_KEYWORD_CHARS {
            debug!("Keyword {:?} too short, skipping search", keyword);
            return Ok(Vec::new());
        }

        let key = self.require_key()?;
        let url = format!("{}/v3/place/text", self.base_url);
        let page_size = self.page_size.to_string();

        info!("Searching communities for {:?}", keyword);
        let response: PlaceSearchResponse = self
            .http_client
            .get(&url)
            .query(&[
                ("key", key),
                ("keywords", keyword),
                ("types", COMMUNITY_POI_TYPES),
                ("citylimit", "false"),
                ("offset", page_size.as_str()),
                ("page", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        check_status(&response.status, &response.info)?;

        let results = collect_communities(response.pois);
        debug!("{} residential results", results.len());
        Ok(results)
    }

    /// Formatted address of a point.
    pub async fn reverse_geocode(&self, lng: f64, lat: f64) -> Result<String, LocationError> {
        let key = self.require_key()?;
        let url = format!("{}/v3/geocode/regeo", self.base_url);
        let location = format!("{},{}", lng, lat);

        let response: RegeoResponse = self
            .http_client
            .get(&url)
            .query(&[("key", key), ("location", location.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        check_status(&response.status, &response.info)?;

        Ok(response
            .regeocode
            .map(|r| r.formatted_address)
            .unwrap_or_default())
    }
}
