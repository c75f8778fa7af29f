use crate::app::scenarios::FunctionSettings;
use crate::domain::model::Resource;
use crate::domain::ports::{Navigator, Scenario};
use crate::utils::error::Result;
use async_trait::async_trait;

/// root → `functions` → `update`(namespace, id, code) → `run`(body)
pub struct DeployAndRun {
    settings: FunctionSettings,
}

impl DeployAndRun {
    pub fn new(settings: FunctionSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Scenario for DeployAndRun {
    fn name(&self) -> &str {
        "deploy-and-run"
    }

    async fn discover(&self, navigator: &dyn Navigator) -> Result<Resource> {
        self.settings.discover_collection(navigator).await
    }

    async fn update(&self, navigator: &dyn Navigator, collection: &Resource) -> Result<Resource> {
        self.settings.update_code(navigator, collection).await
    }

    async fn invoke(&self, navigator: &dyn Navigator, function: &Resource) -> Result<Resource> {
        // run 的 href 需要 namespace，函式本身的資料裡沒有
        let request = self
            .settings
            .identity_request()
            .data(self.settings.invoke_body.clone());

        navigator
            .rel(function, &self.settings.invoke_rel, request)
            .await
    }
}
