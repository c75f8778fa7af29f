use clap::Parser;
use functions_client::domain::ports::ConfigProvider;
use functions_client::utils::logger;
use functions_client::utils::validation::Validate;
use functions_client::{
    build_scenario, FunctionSettings, HypermediaClient, ScenarioConfig, ScenarioRunner,
};

#[derive(Parser)]
#[command(name = "scenario-runner")]
#[command(about = "Run functions-service scenarios described in TOML files")]
struct Args {
    /// Scenario files, executed in the given order
    #[arg(required = true)]
    configs: Vec<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Show what would be requested without calling the service
    #[arg(long)]
    dry_run: bool,

    /// Run ID for this execution
    #[arg(long)]
    run_id: Option<String>,

    /// Keep going when a scenario fails
    #[arg(long)]
    continue_on_error: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting scenario runner with {} file(s)", args.configs.len());

    // 先全部載入並驗證，再開始送請求
    let mut scenarios = Vec::with_capacity(args.configs.len());
    for path in &args.configs {
        tracing::info!("📁 Loading scenario from: {}", path);
        let config = match ScenarioConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load scenario file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        };

        if let Err(e) = config.validate() {
            tracing::error!("❌ Scenario '{}' validation failed: {}", path, e);
            eprintln!("❌ {}: {}", path, e.user_friendly_message());
            std::process::exit(1);
        }
        scenarios.push(config);
    }

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No requests will be sent");
        for config in &scenarios {
            let settings = config.to_settings()?;
            print_plan(config, &settings);
        }
        return Ok(());
    }

    let mut failures = 0usize;
    for (index, config) in scenarios.iter().enumerate() {
        let run_id = match &args.run_id {
            Some(run_id) => format!("{}_{}", run_id, index + 1),
            None => format!(
                "{}_{}",
                functions_client::core::runner::generate_run_id(),
                index + 1
            ),
        };

        let settings = config.to_settings()?;
        let scenario = build_scenario(config.scenario.kind, settings);
        let client = HypermediaClient::from_config(config).with_headers(config.headers());
        let runner = ScenarioRunner::new(client).with_run_id(run_id);

        match runner.run(scenario.as_ref()).await {
            Ok(report) => {
                println!("✅ {} ({})", config.scenario.name, report.run_id);
                println!("{}", serde_json::to_string_pretty(&report.result)?);
            }
            Err(e) => {
                failures += 1;
                tracing::error!("❌ Scenario '{}' failed: {}", config.scenario.name, e);
                eprintln!("❌ {}: {}", config.scenario.name, e.user_friendly_message());
                eprintln!("💡 {}", e.recovery_suggestion());
                if !args.continue_on_error {
                    std::process::exit(1);
                }
            }
        }
    }

    if failures > 0 {
        eprintln!("⚠️ {} of {} scenario(s) failed", failures, scenarios.len());
        std::process::exit(1);
    }

    println!("🎉 {} scenario(s) completed", scenarios.len());
    Ok(())
}

fn print_plan(config: &ScenarioConfig, settings: &FunctionSettings) {
    println!("📋 {} [{}]", config.scenario.name, config.scenario.kind.as_str());
    if let Some(description) = &config.scenario.description {
        println!("   {}", description);
    }
    println!("   1. GET {} then follow '{}'", config.endpoint(), settings.collection_rel);
    println!(
        "   2. follow '{}' for id '{}' ({} bytes of code)",
        settings.update_rel,
        settings.id,
        settings.code.len()
    );
    println!(
        "   3. follow '{}' with body {}",
        settings.invoke_rel, settings.invoke_body
    );
}
