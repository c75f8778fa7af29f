pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use app::scenarios::{build_scenario, FunctionSettings, ScenarioKind};
pub use config::{scenario_config::ScenarioConfig, CliConfig};
pub use core::{hypermedia::HypermediaClient, runner::ScenarioRunner};
pub use utils::error::{FunctionsError, Result};
