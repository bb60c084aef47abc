use anyhow::{anyhow, Result};
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::models::Clinic;

const SEARCH_RADIUS_METERS: u32 = 5000;
const MAX_CLINICS: usize = 10;
const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<Center>,
    #[serde(default)]
    tags: Option<Tags>,
}

#[derive(Debug, Deserialize)]
struct Center {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Default, Deserialize)]
struct Tags {
    name: Option<String>,
    amenity: Option<String>,
}

/// Clinics and hospitals near a point, from the OpenStreetMap Overpass API.
pub struct ClinicLocator {
    http_client: Client,
    overpass_url: String,
}

impl ClinicLocator {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http_client: Client::new(),
            overpass_url: config.overpass_url.clone(),
        }
    }

    pub async fn nearby(&self, lat: f64, lon: f64) -> Result<Vec<Clinic>> {
        debug!("Searching clinics near {},{}", lat, lon);

        let response = self
            .http_client
            .post(&self.overpass_url)
            .header(header::CONTENT_TYPE, "text/plain;charset=UTF-8")
            .body(overpass_query(lat, lon))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            error!("Overpass error ({}): {}", status, error_text);
            return Err(anyhow!("Overpass error ({})", status));
        }

        let payload: OverpassResponse = response.json().await?;
        Ok(nearest_clinics(lat, lon, payload.elements))
    }
}

fn overpass_query(lat: f64, lon: f64) -> String {
    let around = format!("(around:{},{},{})", SEARCH_RADIUS_METERS, lat, lon);
    format!(
        "[out:json][timeout:25];\n(\n  node[\"amenity\"~\"clinic|hospital\"]{a};\n  way[\"amenity\"~\"clinic|hospital\"]{a};\n  relation[\"amenity\"~\"clinic|hospital\"]{a};\n);\nout center 20;\n",
        a = around
    )
}

fn nearest_clinics(lat: f64, lon: f64, elements: Vec<OverpassElement>) -> Vec<Clinic> {
    let mut clinics: Vec<Clinic> = elements
        .into_iter()
        .filter_map(|el| {
            let (clat, clon) = match (el.lat, el.lon, &el.center) {
                (Some(la), Some(lo), _) => (la, lo),
                (_, _, Some(c)) => (c.lat, c.lon),
                _ => return None,
            };
            let tags = el.tags.unwrap_or_default();

            Some(Clinic {
                name: tags.name.unwrap_or_else(|| "Clinic/Hospital".to_string()),
                lat: clat,
                lon: clon,
                kind: tags.amenity.unwrap_or_else(|| "clinic".to_string()),
                distance_km: haversine_km(lat, lon, clat, clon),
            })
        })
        .collect();

    clinics.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    clinics.truncate(MAX_CLINICS);
    clinics
}

/// Great-circle distance in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}
