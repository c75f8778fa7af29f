pub mod define_and_run;
pub mod deploy_and_run;

pub use define_and_run::DefineAndRun;
pub use deploy_and_run::DeployAndRun;

use crate::domain::model::{RelRequest, Resource};
use crate::domain::ports::{Navigator, Scenario};
use crate::utils::error::{FunctionsError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
    DeployAndRun,
    DefineAndRun,
}

impl ScenarioKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::DeployAndRun => "deploy-and-run",
            ScenarioKind::DefineAndRun => "define-and-run",
        }
    }
}

impl FromStr for ScenarioKind {
    type Err = FunctionsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "deploy-and-run" => Ok(ScenarioKind::DeployAndRun),
            "define-and-run" => Ok(ScenarioKind::DefineAndRun),
            other => Err(FunctionsError::InvalidConfigValueError {
                field: "scenario".to_string(),
                value: other.to_string(),
                reason: "Expected 'deploy-and-run' or 'define-and-run'".to_string(),
            }),
        }
    }
}

/// 兩種情境共用的輸入
#[derive(Debug, Clone)]
pub struct FunctionSettings {
    pub endpoint: String,
    pub namespace: Option<String>,
    pub id: String,
    pub code: String,
    pub define: Option<String>,
    pub invoke_body: serde_json::Value,
    pub collection_rel: String,
    pub update_rel: String,
    pub invoke_rel: String,
}

impl FunctionSettings {
    /// 依情境填入預設的 relation 名稱
    pub fn new(kind: ScenarioKind, endpoint: String, id: String, code: String) -> Self {
        let (collection_rel, invoke_rel) = match kind {
            ScenarioKind::DeployAndRun => ("functions", "run"),
            ScenarioKind::DefineAndRun => ("codes", "runDefine"),
        };

        Self {
            endpoint,
            namespace: None,
            id,
            code,
            define: None,
            invoke_body: serde_json::json!({ "args": [] }),
            collection_rel: collection_rel.to_string(),
            update_rel: "update".to_string(),
            invoke_rel: invoke_rel.to_string(),
        }
    }

    /// `id` 與（有的話）`namespace` 參數
    pub(crate) fn identity_request(&self) -> RelRequest {
        let request = RelRequest::new().param("id", self.id.clone());
        match &self.namespace {
            Some(namespace) => request.param("namespace", namespace.clone()),
            None => request,
        }
    }

    /// 上傳同一份程式碼可以安全重送
    pub(crate) fn update_request(&self) -> RelRequest {
        self.identity_request()
            .data(serde_json::json!({ "code": self.code }))
            .idempotent()
    }

    /// 從服務根目錄跟到 collection（`functions` 或 `codes`）
    pub(crate) async fn discover_collection(&self, navigator: &dyn Navigator) -> Result<Resource> {
        let root = navigator.resource(&self.endpoint).await?;
        navigator
            .rel(&root, &self.collection_rel, RelRequest::new())
            .await
    }

    pub(crate) async fn update_code(
        &self,
        navigator: &dyn Navigator,
        collection: &Resource,
    ) -> Result<Resource> {
        navigator
            .rel(collection, &self.update_rel, self.update_request())
            .await
    }
}

pub fn build_scenario(kind: ScenarioKind, settings: FunctionSettings) -> Box<dyn Scenario> {
    match kind {
        ScenarioKind::DeployAndRun => Box::new(DeployAndRun::new(settings)),
        ScenarioKind::DefineAndRun => Box::new(DefineAndRun::new(settings)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_kind_from_str() {
        assert_eq!(
            "deploy-and-run".parse::<ScenarioKind>().unwrap(),
            ScenarioKind::DeployAndRun
        );
        assert_eq!(
            "define-and-run".parse::<ScenarioKind>().unwrap(),
            ScenarioKind::DefineAndRun
        );
        assert!("run".parse::<ScenarioKind>().is_err());
    }

    #[test]
    fn test_default_relations_per_kind() {
        let deploy = FunctionSettings::new(
            ScenarioKind::DeployAndRun,
            "http://localhost:8100".to_string(),
            "sum".to_string(),
            "function main() {}".to_string(),
        );
        assert_eq!(deploy.collection_rel, "functions");
        assert_eq!(deploy.invoke_rel, "run");
        assert_eq!(deploy.invoke_body, serde_json::json!({"args": []}));

        let define = FunctionSettings::new(
            ScenarioKind::DefineAndRun,
            "http://localhost:8100".to_string(),
            "my-code".to_string(),
            String::new(),
        );
        assert_eq!(define.collection_rel, "codes");
        assert_eq!(define.invoke_rel, "runDefine");
    }

    #[test]
    fn test_update_request_carries_identity_and_code() {
        let mut settings = FunctionSettings::new(
            ScenarioKind::DeployAndRun,
            "http://localhost:8100".to_string(),
            "sum".to_string(),
            "function main() {}".to_string(),
        );
        settings.namespace = Some("backstage".to_string());

        let request = settings.update_request();
        assert_eq!(request.params.get("id").unwrap(), "sum");
        assert_eq!(request.params.get("namespace").unwrap(), "backstage");
        assert!(request.idempotent);
        assert_eq!(request.data.unwrap()["code"], "function main() {}");
    }
}
