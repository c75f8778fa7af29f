pub mod cli;
pub mod scenario_config;

use crate::app::scenarios::{FunctionSettings, ScenarioKind};
use crate::config::cli::CodeSource;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    parse_json_array, parse_json_object, validate_identifier, validate_range,
    validate_required_field, validate_url,
    Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "functions-client")]
#[command(about = "Register a code snippet on a functions service and invoke it")]
pub struct CliConfig {
    /// Base URL of the functions service
    #[arg(long, default_value = "http://localhost:8100")]
    pub endpoint: String,

    /// deploy-and-run (functions → update → run) or define-and-run (codes → update → runDefine)
    #[arg(long, default_value = "deploy-and-run")]
    pub scenario: ScenarioKind,

    #[arg(long)]
    pub namespace: Option<String>,

    #[arg(long)]
    pub id: String,

    /// Inline code to upload
    #[arg(long, conflicts_with = "code_file")]
    pub code: Option<String>,

    /// File with the code to upload
    #[arg(long)]
    pub code_file: Option<String>,

    /// Name passed as `define` to runDefine
    #[arg(long)]
    pub define: Option<String>,

    /// JSON array sent as `args`
    #[arg(long, conflicts_with = "body")]
    pub args: Option<String>,

    /// Raw JSON object sent as the invoke body, e.g. '{"x": 1, "y": 2}'
    #[arg(long)]
    pub body: Option<String>,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    #[arg(long, default_value = "0")]
    pub retry_attempts: u32,

    #[arg(long, default_value = "1")]
    pub retry_delay_seconds: u64,

    /// Print the whole run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn invoke_body(&self) -> Result<serde_json::Value> {
        match (&self.body, &self.args) {
            (Some(body), _) => parse_json_object("body", body),
            (None, Some(args)) => Ok(serde_json::json!({ "args": parse_json_array("args", args)? })),
            (None, None) => Ok(serde_json::json!({ "args": [] })),
        }
    }

    pub fn code_source(&self) -> Result<CodeSource> {
        CodeSource::from_options(self.code.as_deref(), self.code_file.as_deref())
    }

    pub fn to_settings(&self) -> Result<FunctionSettings> {
        let code = self.code_source()?.read(None)?;
        let mut settings =
            FunctionSettings::new(self.scenario, self.endpoint.clone(), self.id.clone(), code);
        settings.namespace = self.namespace.clone();
        settings.define = self.define.clone();
        settings.invoke_body = self.invoke_body()?;
        Ok(settings)
    }
}

impl ConfigProvider for CliConfig {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    fn retry_delay_seconds(&self) -> u64 {
        self.retry_delay_seconds
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("endpoint", &self.endpoint)?;
        validate_identifier("id", &self.id)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, 600)?;
        validate_range("retry_attempts", self.retry_attempts, 0, 10)?;
        self.code_source()?;
        self.invoke_body()?;

        match self.scenario {
            ScenarioKind::DeployAndRun => {
                let namespace = validate_required_field("namespace", &self.namespace)?;
                validate_identifier("namespace", namespace)?;
            }
            ScenarioKind::DefineAndRun => {
                let define = validate_required_field("define", &self.define)?;
                validate_identifier("define", define)?;
            }
        }

        Ok(())
    }
}
