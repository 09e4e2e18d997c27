use crate::adapters::embedding::DEFAULT_HASH_DIMENSIONS;
use crate::adapters::osrm::DEFAULT_OSRM_ENDPOINT;
use crate::adapters::overpass::DEFAULT_OVERPASS_ENDPOINT;
use crate::core::median::MedianOptions;
use crate::domain::model::{Objective, PipelineParams};
use crate::utils::error::{MeetError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub pipeline: Option<PipelineDefaults>,
    pub services: Option<ServicesConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineDefaults {
    pub objective: Option<Objective>,
    pub radius_meters: Option<u32>,
    pub candidate_limit: Option<usize>,
    pub result_cap: Option<usize>,
    pub travel_mode: Option<String>,
    /// 中位數迭代的收斂門檻（單位向量位移）
    pub median_tolerance: Option<f64>,
    pub median_max_iterations: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServicesConfig {
    pub overpass: Option<EndpointConfig>,
    pub osrm: Option<EndpointConfig>,
    pub embedding: Option<EmbeddingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// 服務根位址；未設定時使用本地雜湊嵌入
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub enabled: Option<bool>,
    pub hash_dimensions: Option<usize>,
}

/// 解析後的服務端點與超時
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEndpoint {
    pub endpoint: String,
    pub timeout: Duration,
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MeetError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MeetError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OSRM_URL})，未定義的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            MeetError::ConfigValidationError {
                field: "environment".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn pipeline_params(&self) -> PipelineParams {
        let defaults = PipelineParams::default();
        let Some(p) = &self.pipeline else {
            return defaults;
        };
        PipelineParams {
            objective: p.objective.unwrap_or(defaults.objective),
            radius_meters: p.radius_meters.unwrap_or(defaults.radius_meters),
            candidate_limit: p.candidate_limit.unwrap_or(defaults.candidate_limit),
            result_cap: p.result_cap.unwrap_or(defaults.result_cap),
            travel_mode: p
                .travel_mode
                .clone()
                .unwrap_or(defaults.travel_mode),
        }
    }

    pub fn median_options(&self) -> MedianOptions {
        let defaults = MedianOptions::default();
        let Some(p) = &self.pipeline else {
            return defaults;
        };
        MedianOptions {
            tolerance: p.median_tolerance.unwrap_or(defaults.tolerance),
            max_iterations: p.median_max_iterations.unwrap_or(defaults.max_iterations),
            ..defaults
        }
    }

    pub fn overpass(&self) -> ResolvedEndpoint {
        let cfg = self.services.as_ref().and_then(|s| s.overpass.as_ref());
        ResolvedEndpoint {
            endpoint: cfg
                .map(|c| c.endpoint.clone())
                .unwrap_or_else(|| DEFAULT_OVERPASS_ENDPOINT.to_string()),
            timeout: Duration::from_secs(cfg.and_then(|c| c.timeout_seconds).unwrap_or(10)),
        }
    }

    /// 停用時回傳 `None`
    pub fn osrm(&self) -> Option<ResolvedEndpoint> {
        let cfg = self.services.as_ref().and_then(|s| s.osrm.as_ref());
        if !cfg.and_then(|c| c.enabled).unwrap_or(true) {
            return None;
        }
        Some(ResolvedEndpoint {
            endpoint: cfg
                .map(|c| c.endpoint.clone())
                .unwrap_or_else(|| DEFAULT_OSRM_ENDPOINT.to_string()),
            timeout: Duration::from_secs(cfg.and_then(|c| c.timeout_seconds).unwrap_or(5)),
        })
    }

    /// 有端點且未停用時回傳 HTTP 嵌入服務
    pub fn embedding(&self) -> Option<ResolvedEndpoint> {
        let cfg = self.services.as_ref().and_then(|s| s.embedding.as_ref())?;
        if !cfg.enabled.unwrap_or(true) {
            return None;
        }
        let endpoint = cfg.endpoint.clone()?;
        Some(ResolvedEndpoint {
            endpoint,
            timeout: Duration::from_secs(cfg.timeout_seconds.unwrap_or(10)),
        })
    }

    pub fn hash_dimensions(&self) -> usize {
        self.services
            .as_ref()
            .and_then(|s| s.embedding.as_ref())
            .and_then(|e| e.hash_dimensions)
            .unwrap_or(DEFAULT_HASH_DIMENSIONS)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("services.overpass.endpoint", &self.overpass().endpoint)?;
        if let Some(osrm) = self.osrm() {
            validation::validate_url("services.osrm.endpoint", &osrm.endpoint)?;
        }
        if let Some(embedding) = self.embedding() {
            validation::validate_url("services.embedding.endpoint", &embedding.endpoint)?;
        }
        validation::validate_positive_number("services.embedding.hash_dimensions", self.hash_dimensions(), 1)?;

        let median = self.median_options();
        validation::validate_positive_number("pipeline.median_max_iterations", median.max_iterations, 1)?;
        validation::validate_range("pipeline.median_tolerance", median.tolerance, 1e-12, 1e-2)?;

        validate_params(&self.pipeline_params())
    }
}

/// 驗證單次調用參數
pub fn validate_params(params: &PipelineParams) -> Result<()> {
    validation::validate_positive_number("pipeline.result_cap", params.result_cap, 1)?;
    validation::validate_positive_number("pipeline.candidate_limit", params.candidate_limit, 1)?;
    validation::validate_range("pipeline.radius_meters", params.radius_meters, 1, 50_000)?;
    validation::validate_profile("pipeline.travel_mode", &params.travel_mode)
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
