use crate::domain::model::{RunReport, StepReport};
use crate::domain::ports::{Navigator, Scenario};
use crate::utils::error::Result;
use std::time::Instant;

/// 依序執行 discover → update → invoke，任何一步失敗就中止
pub struct ScenarioRunner<N: Navigator> {
    navigator: N,
    run_id: String,
}

impl<N: Navigator> ScenarioRunner<N> {
    pub fn new(navigator: N) -> Self {
        Self {
            navigator,
            run_id: generate_run_id(),
        }
    }

    pub fn with_run_id(mut self, run_id: String) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub async fn run(&self, scenario: &dyn Scenario) -> Result<RunReport> {
        let started = Instant::now();
        let started_at = chrono::Utc::now();
        let mut steps = Vec::with_capacity(3);
        tracing::info!("🚀 [{}] Starting scenario '{}'", self.run_id, scenario.name());

        // Discover
        let step_started = Instant::now();
        let collection = scenario.discover(&self.navigator).await?;
        tracing::info!("🔍 Discovered {}", collection.url);
        steps.push(StepReport {
            step: "discover".to_string(),
            url: collection.url.clone(),
            duration_ms: step_started.elapsed().as_millis(),
        });

        // Update
        let step_started = Instant::now();
        let function = scenario.update(&self.navigator, &collection).await?;
        tracing::info!("📝 Code updated at {}", function.url);
        if let Some(hash) = function.data.get("hash").and_then(|h| h.as_str()) {
            tracing::debug!("Code hash: {}", hash);
        }
        steps.push(StepReport {
            step: "update".to_string(),
            url: function.url.clone(),
            duration_ms: step_started.elapsed().as_millis(),
        });

        // Invoke
        let step_started = Instant::now();
        let outcome = scenario.invoke(&self.navigator, &function).await?;
        tracing::info!("▶️ Invoked {}", outcome.url);
        steps.push(StepReport {
            step: "invoke".to_string(),
            url: outcome.url.clone(),
            duration_ms: step_started.elapsed().as_millis(),
        });

        let total_duration = started.elapsed();
        tracing::info!(
            "✅ [{}] Scenario '{}' finished in {:?}",
            self.run_id,
            scenario.name(),
            total_duration
        );

        Ok(RunReport {
            run_id: self.run_id.clone(),
            scenario: scenario.name().to_string(),
            started_at,
            steps,
            result: outcome.data,
            total_duration,
        })
    }
}

pub fn generate_run_id() -> String {
    format!("run_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{RelRequest, Resource};
    use crate::utils::error::FunctionsError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 記錄呼叫順序、不走網路的 Navigator
    struct RecordingNavigator {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingNavigator {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    fn resource(url: &str, data: serde_json::Value) -> Resource {
        Resource {
            url: url.to_string(),
            data,
            schema: None,
        }
    }

    #[async_trait]
    impl Navigator for RecordingNavigator {
        async fn resource(&self, url: &str) -> Result<Resource> {
            self.calls.lock().unwrap().push(format!("GET {}", url));
            Ok(resource(url, serde_json::json!({})))
        }

        async fn rel(&self, from: &Resource, rel: &str, _request: RelRequest) -> Result<Resource> {
            self.calls.lock().unwrap().push(format!("{} -> {}", from.url, rel));
            if rel == "broken" {
                return Err(FunctionsError::RelationNotFound {
                    rel: rel.to_string(),
                    url: from.url.clone(),
                });
            }
            Ok(resource(
                &format!("{}/{}", from.url, rel),
                serde_json::json!({"result": rel}),
            ))
        }
    }

    struct FixedScenario {
        invoke_rel: &'static str,
    }

    #[async_trait]
    impl Scenario for FixedScenario {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn discover(&self, navigator: &dyn Navigator) -> Result<Resource> {
            let root = navigator.resource("http://svc").await?;
            navigator.rel(&root, "functions", RelRequest::new()).await
        }

        async fn update(&self, navigator: &dyn Navigator, collection: &Resource) -> Result<Resource> {
            navigator.rel(collection, "update", RelRequest::new()).await
        }

        async fn invoke(&self, navigator: &dyn Navigator, function: &Resource) -> Result<Resource> {
            navigator.rel(function, self.invoke_rel, RelRequest::new()).await
        }
    }

    #[tokio::test]
    async fn test_runner_executes_steps_in_order() {
        let runner = ScenarioRunner::new(RecordingNavigator::new()).with_run_id("run_test".to_string());
        let report = runner.run(&FixedScenario { invoke_rel: "run" }).await.unwrap();

        assert_eq!(report.run_id, "run_test");
        assert_eq!(report.scenario, "fixed");
        assert_eq!(
            report.steps.iter().map(|s| s.step.as_str()).collect::<Vec<_>>(),
            vec!["discover", "update", "invoke"]
        );
        assert_eq!(report.steps[2].url, "http://svc/functions/update/run");
        assert_eq!(report.result["result"], "run");

        let calls = runner.navigator.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                "GET http://svc",
                "http://svc -> functions",
                "http://svc/functions -> update",
                "http://svc/functions/update -> run",
            ]
        );
    }

    #[tokio::test]
    async fn test_runner_propagates_failure() {
        let runner = ScenarioRunner::new(RecordingNavigator::new());
        let err = runner
            .run(&FixedScenario { invoke_rel: "broken" })
            .await
            .unwrap_err();

        assert!(matches!(err, FunctionsError::RelationNotFound { .. }));
    }

    #[test]
    fn test_generate_run_id_format() {
        let run_id = generate_run_id();
        assert!(run_id.starts_with("run_"));
        assert_eq!(run_id.len(), "run_20240101_120000".len());
    }
}
