use crate::core::sphere::haversine_meters;
use crate::domain::model::{Coordinate, Venue};
use crate::domain::ports::VenueSource;
use crate::utils::error::{MeetError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_OVERPASS_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

/// OpenStreetMap Overpass 場地來源
pub struct OverpassVenueSource {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl OverpassVenueSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    /// 咖啡廳、餐廳、酒吧、公園等節點
    pub fn build_query(center: Coordinate, radius_meters: u32, limit: usize) -> String {
        let (lat, lng) = (center.lat, center.lng);
        format!(
            r#"[out:json][timeout:25];
(
  node["amenity"~"^(cafe|restaurant|bar|pub|fast_food|ice_cream)$"](around:{radius},{lat},{lng});
  node["leisure"~"^(park|garden)$"](around:{radius},{lat},{lng});
);
out body {limit};"#,
            radius = radius_meters,
            lat = lat,
            lng = lng,
            limit = limit
        )
    }

    async fn query(&self, center: Coordinate, radius_meters: u32, limit: usize) -> Result<Vec<Venue>> {
        let query = Self::build_query(center, radius_meters, limit);
        tracing::debug!("Making Overpass request to: {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .body(query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MeetError::upstream(
                "overpass",
                format!("HTTP {}", response.status()),
            ));
        }

        let body: OverpassResponse = response.json().await?;
        let mut venues: Vec<Venue> = body
            .elements
            .into_iter()
            .filter_map(element_to_venue)
            .collect();

        // 最近的場地排前面
        venues.sort_by(|a, b| {
            haversine_meters(center, a.location).total_cmp(&haversine_meters(center, b.location))
        });
        Ok(venues)
    }
}

fn element_to_venue(element: OverpassElement) -> Option<Venue> {
    let (lat, lng) = (element.lat?, element.lon?);
    let location = Coordinate::new(lat, lng).ok()?;
    let tags = element.tags;
    let name = tags
        .get("name")
        .cloned()
        .unwrap_or_else(|| Venue::UNNAMED.to_string());
    let category = tags
        .get("amenity")
        .or_else(|| tags.get("leisure"))
        .cloned()
        .unwrap_or_else(|| "location".to_string());

    let mut venue = Venue::new(name, category, location);
    if let Some(street) = tags.get("addr:street").filter(|s| !s.trim().is_empty()) {
        venue = venue.with_address(street.clone());
    }
    Some(venue)
}

/// 服務失敗時使用的固定場地
pub fn placeholder_venues(center: Coordinate) -> Vec<Venue> {
    let at = |dlat: f64, dlng: f64| Coordinate {
        lat: (center.lat + dlat).clamp(-90.0, 90.0),
        lng: (center.lng + dlng + 180.0).rem_euclid(360.0) - 180.0,
    };
    vec![
        Venue::new("Cafe Central", "cafe", at(0.001, 0.001)),
        Venue::new("Park Plaza", "park", at(-0.001, -0.001)),
        Venue::new("Pizza Point", "restaurant", at(0.002, -0.001)),
    ]
}

#[async_trait]
impl VenueSource for OverpassVenueSource {
    async fn fetch_candidate_venues(
        &self,
        center: Coordinate,
        radius_meters: u32,
        limit: usize,
    ) -> Vec<Venue> {
        match self.query(center, radius_meters, limit).await {
            Ok(venues) => {
                tracing::info!(
                    "🗺️ Found {} venues from Overpass near {}",
                    venues.len(),
                    center
                );
                venues
            }
            Err(e) => {
                tracing::warn!("🗺️ Overpass request failed: {}, using placeholder venues", e);
                placeholder_venues(center)
            }
        }
    }
}
