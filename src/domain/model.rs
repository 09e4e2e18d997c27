use crate::utils::error::{MeetError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 地理座標（度）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// 建立並驗證座標範圍
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        let coord = Self { lat, lng };
        coord.validate()?;
        Ok(coord)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(MeetError::invalid_input(format!(
                "coordinate ({}, {}) is not finite",
                self.lat, self.lng
            )));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(MeetError::invalid_input(format!(
                "latitude {} is outside [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(MeetError::invalid_input(format!(
                "longitude {} is outside [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// 解析 "lat,lng" 格式
impl FromStr for Coordinate {
    type Err = MeetError;

    fn from_str(s: &str) -> Result<Self> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| MeetError::invalid_input(format!("expected 'lat,lng', got '{}'", s)))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| MeetError::invalid_input(format!("invalid latitude in '{}'", s)))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| MeetError::invalid_input(format!("invalid longitude in '{}'", s)))?;
        Self::new(lat, lng)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    pub category: String,
    #[serde(flatten)]
    pub location: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Venue {
    pub const UNNAMED: &'static str = "Unnamed Location";

    pub fn new(name: impl Into<String>, category: impl Into<String>, location: Coordinate) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            location,
            address: None,
            score: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// 用於語意比對的文字：名稱加類別
    pub fn semantic_text(&self) -> String {
        format!("{} {}", self.name, self.category)
    }
}

/// 中心點的計算目標
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    /// 平均方向，快速但偏向密集群
    #[default]
    Centroid,
    /// 球面 Fermat–Weber 點，對離群值較公平
    Median,
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::Centroid => write!(f, "centroid"),
            Objective::Median => write!(f, "median"),
        }
    }
}

impl FromStr for Objective {
    type Err = MeetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "centroid" => Ok(Objective::Centroid),
            "median" => Ok(Objective::Median),
            other => Err(MeetError::InvalidConfigValueError {
                field: "objective".to_string(),
                value: other.to_string(),
                reason: "Valid objectives: centroid, median".to_string(),
            }),
        }
    }
}

/// 參與者 × 場地的行車時間矩陣（秒），不可達為 +inf
pub type DurationMatrix = Vec<Vec<f64>>;

/// 單次 pipeline 調用的參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineParams {
    pub objective: Objective,
    pub radius_meters: u32,
    pub candidate_limit: usize,
    pub result_cap: usize,
    pub travel_mode: String,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            objective: Objective::Centroid,
            radius_meters: 1500,
            candidate_limit: 30,
            result_cap: 10,
            travel_mode: "driving".to_string(),
        }
    }
}

/// 哪些可選訊號實際生效
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalsApplied {
    pub travel_time: bool,
    pub semantic: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingPlan {
    pub center: Coordinate,
    pub objective: Objective,
    pub venues: Vec<Venue>,
    pub signals: SignalsApplied,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    #[serde(flatten)]
    pub location: Coordinate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub participants: Vec<Participant>,
    #[serde(rename = "final")]
    pub is_final: bool,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.participants.iter().map(|p| p.location).collect()
    }
}
