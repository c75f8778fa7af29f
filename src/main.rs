use clap::Parser;
use functions_client::domain::model::RunReport;
use functions_client::utils::error::{ErrorSeverity, FunctionsError};
use functions_client::utils::{logger, validation::Validate};
use functions_client::{build_scenario, CliConfig, HypermediaClient, ScenarioRunner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting functions-client");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let result = match config.to_settings() {
        Ok(settings) => {
            let scenario = build_scenario(config.scenario, settings);
            let runner = ScenarioRunner::new(HypermediaClient::from_config(&config));
            runner.run(scenario.as_ref()).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(report) => print_report(&report, config.json)?,
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn print_report(report: &RunReport, as_json: bool) -> Result<(), serde_json::Error> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&report.result)?);
    }
    Ok(())
}

fn exit_with(e: FunctionsError) -> ! {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 依嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
