use crate::app::scenarios::{FunctionSettings, ScenarioKind};
use crate::config::cli::CodeSource;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{FunctionsError, Result};
use crate::utils::validation::{
    validate_identifier, validate_non_empty_string, validate_range, validate_required_field,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub scenario: ScenarioInfo,
    pub service: ServiceConfig,
    pub function: FunctionConfig,
    pub invoke: Option<InvokeConfig>,
    /// 設定檔所在目錄，用來解析相對的 code_file
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInfo {
    pub name: String,
    pub description: Option<String>,
    pub kind: ScenarioKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionConfig {
    pub namespace: Option<String>,
    pub id: String,
    pub code: Option<String>,
    pub code_file: Option<String>,
    pub define: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvokeConfig {
    pub args: Option<Vec<serde_json::Value>>,
    pub body: Option<serde_json::Value>,
    pub collection_rel: Option<String>,
    pub update_rel: Option<String>,
    pub invoke_rel: Option<String>,
}

impl ScenarioConfig {
    /// 從 TOML 檔案載入情境設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FunctionsError::IoError)?;
        let mut config = Self::from_str(&content)?;
        config.base_dir = path.as_ref().parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// 從 TOML 字串解析情境設定
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let mut config: Self =
            toml::from_str(content).map_err(|e| FunctionsError::ConfigValidationError {
                field: "scenario_toml_parsing".to_string(),
                message: format!("Scenario TOML parsing error: {}", e),
            })?;

        // 只替換 service 區段；function.code 原樣上傳
        config.service.endpoint = Self::substitute_env_vars(&config.service.endpoint)?;
        if let Some(headers) = config.service.headers.as_mut() {
            for value in headers.values_mut() {
                *value = Self::substitute_env_vars(value)?;
            }
        }

        Ok(config)
    }

    /// 替換 `${VAR}`；沒設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FunctionsError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn invoke(&self) -> InvokeConfig {
        self.invoke.clone().unwrap_or_default()
    }

    pub fn invoke_body(&self) -> serde_json::Value {
        let invoke = self.invoke();
        match (invoke.body, invoke.args) {
            (Some(body), _) => body,
            (None, Some(args)) => serde_json::json!({ "args": args }),
            (None, None) => serde_json::json!({ "args": [] }),
        }
    }

    pub fn headers(&self) -> HashMap<String, String> {
        self.service.headers.clone().unwrap_or_default()
    }

    pub fn to_settings(&self) -> Result<FunctionSettings> {
        let source =
            CodeSource::from_options(self.function.code.as_deref(), self.function.code_file.as_deref())?;
        let code = source.read(self.base_dir.as_deref())?;

        let mut settings = FunctionSettings::new(
            self.scenario.kind,
            self.service.endpoint.clone(),
            self.function.id.clone(),
            code,
        );
        settings.namespace = self.function.namespace.clone();
        settings.define = self.function.define.clone();
        settings.invoke_body = self.invoke_body();

        let invoke = self.invoke();
        if let Some(rel) = invoke.collection_rel {
            settings.collection_rel = rel;
        }
        if let Some(rel) = invoke.update_rel {
            settings.update_rel = rel;
        }
        if let Some(rel) = invoke.invoke_rel {
            settings.invoke_rel = rel;
        }

        Ok(settings)
    }
}

impl ConfigProvider for ScenarioConfig {
    fn endpoint(&self) -> &str {
        &self.service.endpoint
    }

    fn timeout_seconds(&self) -> u64 {
        self.service.timeout_seconds.unwrap_or(30)
    }

    fn retry_attempts(&self) -> u32 {
        self.service.retry_attempts.unwrap_or(0)
    }

    fn retry_delay_seconds(&self) -> u64 {
        self.service.retry_delay_seconds.unwrap_or(1)
    }
}

impl Validate for ScenarioConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("scenario.name", &self.scenario.name)?;
        validate_url("service.endpoint", &self.service.endpoint)?;
        validate_range("service.timeout_seconds", self.timeout_seconds(), 1, 600)?;
        validate_range("service.retry_attempts", self.retry_attempts(), 0, 10)?;
        validate_identifier("function.id", &self.function.id)?;
        CodeSource::from_options(self.function.code.as_deref(), self.function.code_file.as_deref())?;

        if let Some(body) = self.invoke().body {
            if !body.is_object() {
                return Err(FunctionsError::ConfigValidationError {
                    field: "invoke.body".to_string(),
                    message: "Invoke body must be a table".to_string(),
                });
            }
        }

        match self.scenario.kind {
            ScenarioKind::DeployAndRun => {
                let namespace =
                    validate_required_field("function.namespace", &self.function.namespace)?;
                validate_identifier("function.namespace", namespace)?;
            }
            ScenarioKind::DefineAndRun => {
                let define = validate_required_field("function.define", &self.function.define)?;
                validate_identifier("function.define", define)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DEPLOY_TOML: &str = r#"
[scenario]
name = "sum"
kind = "deploy-and-run"

[service]
endpoint = "http://localhost:8100"
retry_attempts = 2

[service.headers]
X-Team = "backstage"

[function]
namespace = "backstage"
id = "sum"
code = "function main(req, res) { res.send({result: req.body.x + req.body.y}); }"

[invoke.body]
x = 2
y = 3
"#;

    #[test]
    fn test_parse_deploy_scenario() {
        let config = ScenarioConfig::from_str(DEPLOY_TOML).unwrap();

        assert_eq!(config.scenario.kind, ScenarioKind::DeployAndRun);
        assert!(config.validate().is_ok());
        assert_eq!(config.retry_attempts(), 2);
        assert_eq!(config.timeout_seconds(), 30);
        assert_eq!(config.headers().get("X-Team").unwrap(), "backstage");
        assert_eq!(config.invoke_body(), serde_json::json!({"x": 2, "y": 3}));

        let settings = config.to_settings().unwrap();
        assert_eq!(settings.collection_rel, "functions");
        assert_eq!(settings.invoke_rel, "run");
        assert_eq!(settings.namespace.as_deref(), Some("backstage"));
    }

    #[test]
    fn test_define_scenario_with_code_file_and_overrides() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("transform.js"),
            "Backstage.define('transform', (x, callback) => callback(null, x));",
        )
        .unwrap();

        let config_path = temp_dir.path().join("scenario.toml");
        std::fs::write(
            &config_path,
            r#"
[scenario]
name = "transform"
kind = "define-and-run"

[service]
endpoint = "http://localhost:8100"

[function]
id = "my-code"
code_file = "transform.js"
define = "transform"

[invoke]
args = [{ resource = { name = "Marcos" } }]
invoke_rel = "runDefineV2"
"#,
        )
        .unwrap();

        let config = ScenarioConfig::from_file(&config_path).unwrap();
        assert!(config.validate().is_ok());

        let settings = config.to_settings().unwrap();
        assert!(settings.code.starts_with("Backstage.define"));
        assert_eq!(settings.collection_rel, "codes");
        assert_eq!(settings.invoke_rel, "runDefineV2");
        assert_eq!(
            settings.invoke_body,
            serde_json::json!({"args": [{"resource": {"name": "Marcos"}}]})
        );
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("FUNCTIONS_CLIENT_TEST_ENDPOINT", "http://functions.test:8100");
        let content = DEPLOY_TOML.replace(
            "http://localhost:8100",
            "${FUNCTIONS_CLIENT_TEST_ENDPOINT}",
        );

        let config = ScenarioConfig::from_str(&content).unwrap();
        assert_eq!(config.service.endpoint, "http://functions.test:8100");

        let untouched = ScenarioConfig::substitute_env_vars("${FUNCTIONS_CLIENT_UNSET_VAR}").unwrap();
        assert_eq!(untouched, "${FUNCTIONS_CLIENT_UNSET_VAR}");
    }

    #[test]
    fn test_env_substitution_leaves_code_and_quotes_intact() {
        std::env::set_var("FUNCTIONS_CLIENT_TEST_GREETING", "injected");
        std::env::set_var("FUNCTIONS_CLIENT_TEST_TOKEN", "Bearer \"quoted\"");

        let content = r#"
[scenario]
name = "greet"
kind = "deploy-and-run"

[service]
endpoint = "http://localhost:8100"

[service.headers]
Authorization = "${FUNCTIONS_CLIENT_TEST_TOKEN}"

[function]
namespace = "backstage"
id = "greet"
code = "function main(req, res) { res.send(`hi ${FUNCTIONS_CLIENT_TEST_GREETING}`); }"
"#;

        let config = ScenarioConfig::from_str(content).unwrap();
        assert_eq!(
            config.function.code.as_deref(),
            Some("function main(req, res) { res.send(`hi ${FUNCTIONS_CLIENT_TEST_GREETING}`); }")
        );
        assert_eq!(
            config.headers().get("Authorization").unwrap(),
            "Bearer \"quoted\""
        );

        let settings = config.to_settings().unwrap();
        assert!(settings.code.contains("${FUNCTIONS_CLIENT_TEST_GREETING}"));
    }

    #[test]
    fn test_validation_failures() {
        let no_namespace = DEPLOY_TOML.replace("namespace = \"backstage\"\n", "");
        let config = ScenarioConfig::from_str(&no_namespace).unwrap();
        assert!(matches!(
            config.validate(),
            Err(FunctionsError::MissingConfigError { .. })
        ));

        let bad_kind = DEPLOY_TOML.replace("deploy-and-run", "walk-and-run");
        assert!(ScenarioConfig::from_str(&bad_kind).is_err());
    }
}
