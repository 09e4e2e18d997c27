use anyhow::Context;
use clap::Parser;
use where2meet::app::report::{self, ObjectiveComparison, Report};
use where2meet::app::service::build_pipeline;
use where2meet::utils::error::ErrorSeverity;
use where2meet::utils::{logger, validation::Validate};
use where2meet::{CliConfig, GeodesicMedian, MeetError, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting where2meet");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            ServiceConfig::from_file(path).unwrap_or_else(|e| exit_with(&e))
        }
        None => ServiceConfig::default(),
    };

    // 驗證配置
    if let Err(e) = config.validate().and_then(|_| cli.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    let params = cli.apply_overrides(config.pipeline_params());
    let participants = cli.collect_participants().unwrap_or_else(|e| exit_with(&e));
    if participants.len() < 2 {
        exit_with(&MeetError::invalid_input(format!(
            "need at least 2 participants, got {}",
            participants.len()
        )));
    }
    let coordinates: Vec<_> = participants.iter().map(|p| p.location).collect();

    let pipeline = build_pipeline(&config).context("failed to build service clients")?;

    let plan = match pipeline.run(&coordinates, &cli.query, &params).await {
        Ok(plan) => plan,
        Err(e) => {
            tracing::error!(
                "❌ Pipeline failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            exit_with(&e);
        }
    };

    let comparison = if cli.compare {
        Some(ObjectiveComparison::evaluate(
            &coordinates,
            &GeodesicMedian::new(config.median_options()),
        )?)
    } else {
        None
    };

    let rendered = report::render(&Report { plan, comparison }, cli.format)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("📁 Output saved to: {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

/// 輸出用戶友好的錯誤信息，並依嚴重程度決定退出碼
fn exit_with(e: &MeetError) -> ! {
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
