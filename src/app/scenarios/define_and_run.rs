use crate::app::scenarios::FunctionSettings;
use crate::domain::model::{RelRequest, Resource};
use crate::domain::ports::{Navigator, Scenario};
use crate::utils::error::{FunctionsError, Result};
use async_trait::async_trait;

/// root → `codes` → `update`(id, code) → `runDefine`(define, args)
pub struct DefineAndRun {
    settings: FunctionSettings,
}

impl DefineAndRun {
    pub fn new(settings: FunctionSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Scenario for DefineAndRun {
    fn name(&self) -> &str {
        "define-and-run"
    }

    async fn discover(&self, navigator: &dyn Navigator) -> Result<Resource> {
        self.settings.discover_collection(navigator).await
    }

    async fn update(&self, navigator: &dyn Navigator, collection: &Resource) -> Result<Resource> {
        self.settings.update_code(navigator, collection).await
    }

    async fn invoke(&self, navigator: &dyn Navigator, function: &Resource) -> Result<Resource> {
        let define = self
            .settings
            .define
            .clone()
            .ok_or_else(|| FunctionsError::MissingConfigError {
                field: "define".to_string(),
            })?;

        let request = RelRequest::new()
            .param("define", define)
            .data(self.settings.invoke_body.clone());

        navigator
            .rel(function, &self.settings.invoke_rel, request)
            .await
    }
}
