use crate::core::centroid::centroid;
use crate::core::median::{GeodesicMedian, Termination};
use crate::core::sphere::FairnessMetrics;
use crate::domain::model::{Coordinate, MeetingPlan};
use crate::utils::error::{MeetError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = MeetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(MeetError::InvalidConfigValueError {
                field: "format".to_string(),
                value: other.to_string(),
                reason: "Valid formats: json, csv".to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectiveSummary {
    pub center: Coordinate,
    pub metrics: FairnessMetrics,
}

/// 同一組參與者下質心與測地中位數的距離比較
#[derive(Debug, Clone, Serialize)]
pub struct ObjectiveComparison {
    pub centroid: ObjectiveSummary,
    pub median: ObjectiveSummary,
    pub median_iterations: usize,
    pub median_termination: Termination,
}

impl ObjectiveComparison {
    pub fn evaluate(participants: &[Coordinate], solver: &GeodesicMedian) -> Result<Self> {
        let c = centroid(participants)?;
        let m = solver.solve(participants)?;
        Ok(Self {
            centroid: ObjectiveSummary {
                center: c,
                metrics: FairnessMetrics::evaluate(participants, c),
            },
            median: ObjectiveSummary {
                center: m.center,
                metrics: FairnessMetrics::evaluate(participants, m.center),
            },
            median_iterations: m.iterations,
            median_termination: m.termination,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    #[serde(flatten)]
    pub plan: MeetingPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ObjectiveComparison>,
}

#[derive(Debug, Serialize)]
struct VenueRow<'a> {
    rank: usize,
    name: &'a str,
    category: &'a str,
    lat: f64,
    lng: f64,
    address: &'a str,
    score: Option<f64>,
}

pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => render_csv(&report.plan),
    }
}

/// 每個場地一列，依排名
pub fn render_csv(plan: &MeetingPlan) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for (i, venue) in plan.venues.iter().enumerate() {
        writer.serialize(VenueRow {
            rank: i + 1,
            name: &venue.name,
            category: &venue.category,
            lat: venue.location.lat,
            lng: venue.location.lng,
            address: venue.address.as_deref().unwrap_or(""),
            score: venue.score,
        })?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| MeetError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| MeetError::ConfigValidationError {
        field: "output".to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Objective, SignalsApplied, Venue};

    fn plan() -> MeetingPlan {
        MeetingPlan {
            center: Coordinate { lat: 1.0, lng: 2.0 },
            objective: Objective::Centroid,
            venues: vec![
                Venue {
                    score: Some(0.5),
                    ..Venue::new("Cafe, Central", "cafe", Coordinate { lat: 1.001, lng: 2.001 })
                        .with_address("Main St")
                },
                Venue::new("Park Plaza", "park", Coordinate { lat: 0.999, lng: 1.999 }),
            ],
            signals: SignalsApplied::default(),
            generated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let csv = render_csv(&plan()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "rank,name,category,lat,lng,address,score");
        assert_eq!(lines[1], "1,\"Cafe, Central\",cafe,1.001,2.001,Main St,0.5");
        assert_eq!(lines[2], "2,Park Plaza,park,0.999,1.999,,");
    }

    #[test]
    fn test_json_flattens_plan() {
        let report = Report {
            plan: plan(),
            comparison: None,
        };
        let json: serde_json::Value =
            serde_json::from_str(&render(&report, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["center"]["lat"], 1.0);
        assert_eq!(json["objective"], "centroid");
        assert_eq!(json["venues"][0]["address"], "Main St");
        assert!(json.get("comparison").is_none());
    }

    #[test]
    fn test_comparison_reports_both_objectives() {
        let pts = [
            Coordinate { lat: 40.7589, lng: -73.9851 },
            Coordinate { lat: 40.7614, lng: -73.9776 },
            Coordinate { lat: 40.7505, lng: -73.9934 },
            Coordinate { lat: 40.6782, lng: -73.9442 },
        ];
        let cmp = ObjectiveComparison::evaluate(&pts, &GeodesicMedian::default()).unwrap();
        assert!(cmp.median.metrics.total_m < cmp.centroid.metrics.total_m);
        assert!(cmp.median_iterations >= 1);
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
