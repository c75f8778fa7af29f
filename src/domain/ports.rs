use crate::domain::model::{RelRequest, Resource};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 依 link relation 在服務上移動
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn resource(&self, url: &str) -> Result<Resource>;
    async fn rel(&self, resource: &Resource, rel: &str, request: RelRequest) -> Result<Resource>;
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn retry_attempts(&self) -> u32;
    fn retry_delay_seconds(&self) -> u64;
}

/// 一次執行：找到資源 → 更新程式碼 → 呼叫
#[async_trait]
pub trait Scenario: Send + Sync {
    fn name(&self) -> &str;
    async fn discover(&self, navigator: &dyn Navigator) -> Result<Resource>;
    async fn update(&self, navigator: &dyn Navigator, collection: &Resource) -> Result<Resource>;
    async fn invoke(&self, navigator: &dyn Navigator, function: &Resource) -> Result<Resource>;
}
