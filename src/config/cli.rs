use crate::app::report::OutputFormat;
use crate::config::toml_config::validate_params;
use crate::domain::model::{Coordinate, Objective, Participant, PipelineParams};
use crate::utils::error::{MeetError, Result};
use crate::utils::validation::Validate;
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "where2meet")]
#[command(about = "Find a fair meeting point and rank venues around it")]
pub struct CliConfig {
    /// Participant location as "lat,lng" (repeatable)
    #[arg(short, long = "participant", allow_hyphen_values = true)]
    pub participants: Vec<Coordinate>,

    /// JSON file with an array of {"name", "lat", "lng"} objects
    #[arg(long)]
    pub participants_file: Option<PathBuf>,

    /// What the group wants to do; used for semantic ranking
    #[arg(short, long, default_value = "Untitled")]
    pub query: String,

    /// centroid or median (overrides config)
    #[arg(long)]
    pub objective: Option<Objective>,

    /// Search radius in meters (overrides config)
    #[arg(long)]
    pub radius: Option<u32>,

    /// Routing profile, e.g. driving, walking, cycling (overrides config)
    #[arg(long)]
    pub mode: Option<String>,

    /// Number of venues to return (overrides config)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Number of candidate venues to request (overrides config)
    #[arg(long)]
    pub candidates: Option<usize>,

    /// Path to TOML service configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: json or csv
    #[arg(long, default_value = "json")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also evaluate both objectives and include the distance comparison
    #[arg(long)]
    pub compare: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[derive(Debug, Deserialize)]
struct ParticipantEntry {
    #[serde(default)]
    name: String,
    lat: f64,
    lng: f64,
}

/// 讀取參與者 JSON 檔案
pub fn load_participants_file(path: &Path) -> Result<Vec<Participant>> {
    let content = std::fs::read_to_string(path)?;
    let entries: Vec<ParticipantEntry> = serde_json::from_str(&content)?;
    entries
        .into_iter()
        .map(|e| {
            Ok(Participant {
                name: e.name,
                location: Coordinate::new(e.lat, e.lng)?,
            })
        })
        .collect()
}

impl CliConfig {
    /// 命令列參數覆蓋設定檔
    pub fn apply_overrides(&self, base: PipelineParams) -> PipelineParams {
        PipelineParams {
            objective: self.objective.unwrap_or(base.objective),
            radius_meters: self.radius.unwrap_or(base.radius_meters),
            candidate_limit: self.candidates.unwrap_or(base.candidate_limit),
            result_cap: self.limit.unwrap_or(base.result_cap),
            travel_mode: self
                .mode
                .as_ref()
                .map(|m| m.to_lowercase())
                .unwrap_or(base.travel_mode),
        }
    }

    /// 合併命令列與檔案中的參與者
    pub fn collect_participants(&self) -> Result<Vec<Participant>> {
        let mut participants: Vec<Participant> = self
            .participants
            .iter()
            .enumerate()
            .map(|(i, c)| Participant {
                name: format!("participant-{}", i + 1),
                location: *c,
            })
            .collect();
        if let Some(path) = &self.participants_file {
            participants.extend(load_participants_file(path)?);
        }
        Ok(participants)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if self.participants.is_empty() && self.participants_file.is_none() {
            return Err(MeetError::MissingConfigError {
                field: "participant".to_string(),
            });
        }
        validate_params(&self.apply_overrides(PipelineParams::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_arguments() {
        let cli = CliConfig::try_parse_from([
            "where2meet",
            "-p",
            "40.7128,-74.0060",
            "--participant",
            "34.0522,-118.2437",
            "--objective",
            "median",
            "--mode",
            "Walking",
            "--limit",
            "3",
            "--format",
            "csv",
        ])
        .unwrap();

        assert_eq!(cli.participants.len(), 2);
        assert_eq!(cli.participants[1].lng, -118.2437);
        assert_eq!(cli.format, OutputFormat::Csv);

        let params = cli.apply_overrides(PipelineParams::default());
        assert_eq!(params.objective, Objective::Median);
        assert_eq!(params.travel_mode, "walking");
        assert_eq!(params.result_cap, 3);
        assert_eq!(params.radius_meters, 1500);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_coordinate() {
        assert!(CliConfig::try_parse_from(["where2meet", "-p", "95,0"]).is_err());
    }

    #[test]
    fn test_requires_participants() {
        let cli = CliConfig::try_parse_from(["where2meet"]).unwrap();
        assert!(matches!(
            cli.validate().unwrap_err(),
            MeetError::MissingConfigError { .. }
        ));
    }

    #[test]
    fn test_participants_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"[{"name": "Ann", "lat": 40.7589, "lng": -73.9851}, {"lat": 40.7614, "lng": -73.9776}]"#,
        )
        .unwrap();

        let cli = CliConfig::try_parse_from([
            "where2meet",
            "-p",
            "40.7505,-73.9934",
            "--participants-file",
            file.path().to_str().unwrap(),
        ])
        .unwrap();
        let participants = cli.collect_participants().unwrap();
        assert_eq!(participants.len(), 3);
        assert_eq!(participants[0].name, "participant-1");
        assert_eq!(participants[1].name, "Ann");
        assert_eq!(participants[2].location.lat, 40.7614);
    }
}
