use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// JSON hyper-schema 中 `links` 陣列的一個項目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
}

fn default_method() -> String {
    "GET".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Schema {
    pub fn link(&self, rel: &str) -> Option<&Link> {
        self.links.iter().find(|link| link.rel == rel)
    }

    pub fn relations(&self) -> Vec<&str> {
        self.links.iter().map(|link| link.rel.as_str()).collect()
    }
}

/// 從服務取回的表示（JSON）加上它宣告的 schema
#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    pub url: String,
    pub data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl Resource {
    pub fn link(&self, rel: &str) -> Option<&Link> {
        self.schema.as_ref().and_then(|schema| schema.link(rel))
    }

    /// 取出可以當 URI template 變數的頂層欄位
    pub fn template_value(&self, name: &str) -> Option<String> {
        match self.data.get(name)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// 跟隨一個 relation 所需的輸入
#[derive(Debug, Clone, Default)]
pub struct RelRequest {
    pub params: BTreeMap<String, String>,
    pub data: Option<serde_json::Value>,
    /// 重送不會有副作用；GET 以外的請求預設只送一次
    pub idempotent: bool,
}

impl RelRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn idempotent(mut self) -> Self {
        self.idempotent = true;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: String,
    pub url: String,
    pub duration_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub scenario: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub steps: Vec<StepReport>,
    pub result: serde_json::Value,
    #[serde(serialize_with = "serialize_duration_ms")]
    pub total_duration: Duration,
}

fn serialize_duration_ms<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u128(duration.as_millis())
}
