use crate::domain::model::{Coordinate, DurationMatrix};
use crate::domain::ports::DurationMatrixSource;
use crate::utils::error::{MeetError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_OSRM_ENDPOINT: &str = "http://localhost:5000";

#[derive(Debug, Deserialize)]
struct TableResponse {
    code: Option<String>,
    durations: Option<Vec<Vec<Option<f64>>>>,
}

/// OSRM table API 行車時間矩陣
pub struct OsrmMatrixSource {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl OsrmMatrixSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// 來源在前、目的地在後，以索引區分
    pub fn table_url(&self, profile: &str, sources: &[Coordinate], destinations: &[Coordinate]) -> String {
        let coords = sources
            .iter()
            .chain(destinations)
            .map(|c| format!("{},{}", c.lng, c.lat))
            .collect::<Vec<_>>()
            .join(";");
        let source_idx = (0..sources.len())
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let destination_idx = (sources.len()..sources.len() + destinations.len())
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}/table/v1/{}/{}?sources={}&destinations={}",
            self.base_url, profile, coords, source_idx, destination_idx
        )
    }

    async fn request(
        &self,
        profile: &str,
        sources: &[Coordinate],
        destinations: &[Coordinate],
    ) -> Result<DurationMatrix> {
        let url = self.table_url(profile, sources, destinations);
        tracing::debug!("Making OSRM table request to: {}", url);

        let response = self.client.get(&url).timeout(self.timeout).send().await?;
        if !response.status().is_success() {
            return Err(MeetError::upstream("osrm", format!("HTTP {}", response.status())));
        }

        let table: TableResponse = response.json().await?;
        if let Some(code) = table.code.as_deref() {
            if code != "Ok" {
                return Err(MeetError::upstream("osrm", format!("response code {}", code)));
            }
        }
        let durations = table
            .durations
            .ok_or_else(|| MeetError::upstream("osrm", "response has no durations"))?;

        // null 表示不可達
        Ok(durations
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| cell.unwrap_or(f64::INFINITY))
                    .collect()
            })
            .collect())
    }
}

#[async_trait]
impl DurationMatrixSource for OsrmMatrixSource {
    async fn fetch_duration_matrix(
        &self,
        profile: &str,
        sources: &[Coordinate],
        destinations: &[Coordinate],
    ) -> Option<DurationMatrix> {
        match self.request(profile, sources, destinations).await {
            Ok(matrix) => Some(matrix),
            Err(e) => {
                tracing::warn!("⏱️ OSRM table failed: {}", e);
                None
            }
        }
    }
}

/// 未設定行車時間服務時使用，永遠回傳 `None`
pub struct DisabledMatrixSource;

#[async_trait]
impl DurationMatrixSource for DisabledMatrixSource {
    async fn fetch_duration_matrix(
        &self,
        _profile: &str,
        _sources: &[Coordinate],
        _destinations: &[Coordinate],
    ) -> Option<DurationMatrix> {
        None
    }
}

/// 執行期選擇的矩陣來源
pub enum MatrixBackend {
    Osrm(OsrmMatrixSource),
    Disabled(DisabledMatrixSource),
}

#[async_trait]
impl DurationMatrixSource for MatrixBackend {
    async fn fetch_duration_matrix(
        &self,
        profile: &str,
        sources: &[Coordinate],
        destinations: &[Coordinate],
    ) -> Option<DurationMatrix> {
        match self {
            MatrixBackend::Osrm(source) => {
                source
                    .fetch_duration_matrix(profile, sources, destinations)
                    .await
            }
            MatrixBackend::Disabled(source) => {
                source
                    .fetch_duration_matrix(profile, sources, destinations)
                    .await
            }
        }
    }
}
