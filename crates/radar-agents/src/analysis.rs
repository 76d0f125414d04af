use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use radar_channels::telegram_fmt::escape_html;
use radar_common::ResolvedContent;
use radar_config::LlmConfig;
use tracing::{debug, warn};

use crate::prompts;
use crate::providers::{LlmProvider, LlmRequest};

/// Text substituted for any completion that could not be produced.
pub const ANALYSIS_FAILED: &str = "⚠️ Error al generar análisis.";

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("completion timed out after {0:?}")]
    Timeout(Duration),

    #[error("completion provider failed: {0}")]
    Provider(String),

    #[error("completion provider returned no text")]
    EmptyResponse,
}

#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub model: String,
    pub temperature: f64,
    pub summary_max_tokens: u32,
    pub deep_dive_max_tokens: u32,
    pub timeout: Duration,
}

impl From<&LlmConfig> for AnalysisSettings {
    fn from(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            summary_max_tokens: config.summary_max_tokens,
            deep_dive_max_tokens: config.deep_dive_max_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Turns resolved content into operator-facing analyses.
///
/// Every completion is bounded by `settings.timeout`. Failures are replaced
/// by [`ANALYSIS_FAILED`] so one bad item never hides the others.
#[derive(Clone)]
pub struct AnalysisOrchestrator {
    provider: Arc<dyn LlmProvider>,
    settings: AnalysisSettings,
}

impl AnalysisOrchestrator {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: AnalysisSettings) -> Self {
        Self { provider, settings }
    }

    /// One single-turn completion, with the timeout applied.
    pub async fn try_complete(&self, prompt: String, max_tokens: u32) -> Result<String, AnalysisError> {
        let mut request = LlmRequest::single_turn(&self.settings.model, prompt);
        request.max_tokens = Some(max_tokens);
        request.temperature = Some(self.settings.temperature);

        let response = tokio::time::timeout(self.settings.timeout, self.provider.complete(&request))
            .await
            .map_err(|_| AnalysisError::Timeout(self.settings.timeout))?
            .map_err(|e| AnalysisError::Provider(e.to_string()))?;

        if let Some(usage) = &response.usage {
            debug!(
                "completion used {} input / {} output tokens",
                usage.input_tokens, usage.output_tokens
            );
        }

        let text = response.text.trim();
        if text.is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }
        Ok(text.to_string())
    }

    pub async fn complete_or_notice(&self, prompt: String, max_tokens: u32) -> String {
        match self.try_complete(prompt, max_tokens).await {
            Ok(text) => text,
            Err(e) => {
                warn!("analysis failed: {e}");
                ANALYSIS_FAILED.to_string()
            }
        }
    }

    /// Analyse every item concurrently and number the results `1..=N` in
    /// input order.
    pub async fn batch_summary(&self, items: &[ResolvedContent], invite_deepen: bool) -> String {
        let analyses = join_all(items.iter().map(|item| {
            self.complete_or_notice(prompts::summary_prompt(item), self.settings.summary_max_tokens)
        }))
        .await;

        let ranking = analyses
            .iter()
            .enumerate()
            .map(|(i, text)| format!("{}. {}", i + 1, escape_html(text)))
            .collect::<Vec<_>>()
            .join("\n\n");

        prompts::batch_envelope(&ranking, invite_deepen)
    }

    /// Detailed analysis of the item the operator picked (1-based `index`).
    pub async fn deep_dive(&self, index: usize, item: &ResolvedContent) -> String {
        let analysis = self
            .complete_or_notice(
                prompts::deep_dive_prompt(item),
                self.settings.deep_dive_max_tokens,
            )
            .await;
        prompts::deep_dive_envelope(index, &escape_html(&analysis))
    }

    /// Free-form question, answered directly.
    pub async fn answer(&self, question: &str) -> String {
        let answer = self
            .complete_or_notice(
                prompts::question_prompt(question),
                self.settings.summary_max_tokens,
            )
            .await;
        escape_html(&answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::LlmResponse;
    use async_trait::async_trait;
    use radar_common::{Error, Result};
    use std::sync::Mutex;

    /// Replies with a canned text unless the prompt mentions `fail_marker`.
    struct ScriptedProvider {
        fail_marker: Option<&'static str>,
        delay: Option<Duration>,
        prompts: Mutex<Vec<LlmRequest>>,
    }

    impl ScriptedProvider {
        fn ok() -> Self {
            Self {
                fail_marker: None,
                delay: None,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn provider_id(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
            self.prompts.lock().unwrap().push(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let prompt = &request.messages[0].content;
            if self.fail_marker.is_some_and(|m| prompt.contains(m)) {
                return Err(Error::Agent("boom".into()));
            }
            let source = prompt
                .lines()
                .find_map(|l| l.strip_prefix("Fuente: "))
                .unwrap_or("none");
            Ok(LlmResponse {
                text: format!("  analysis of {source}  "),
                model: request.model.clone(),
                usage: None,
                stop_reason: Some("stop".into()),
            })
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    fn settings() -> AnalysisSettings {
        AnalysisSettings::from(&LlmConfig::default())
    }

    fn item(url: &str) -> ResolvedContent {
        ResolvedContent::new(url, format!("Enlace: {url}"), "body")
    }

    #[tokio::test]
    async fn batch_is_numbered_in_input_order() {
        let provider = Arc::new(ScriptedProvider::ok());
        let orchestrator = AnalysisOrchestrator::new(provider.clone(), settings());

        let out = orchestrator
            .batch_summary(&[item("https://a.example"), item("https://b.example")], true)
            .await;

        let first = out.find("1. analysis of https://a.example").unwrap();
        let second = out.find("2. analysis of https://b.example").unwrap();
        assert!(first < second);
        assert!(out.contains("\n\n2. "));
        assert!(out.starts_with(prompts::SUMMARY_HEADER));
        assert!(out.ends_with(prompts::DEEPEN_INVITATION));

        let requests = provider.prompts.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].max_tokens, Some(600));
        assert_eq!(requests[0].temperature, Some(0.5));
        assert_eq!(requests[0].model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn one_failed_completion_keeps_the_others() {
        let provider = Arc::new(ScriptedProvider {
            fail_marker: Some("https://b.example"),
            ..ScriptedProvider::ok()
        });
        let orchestrator = AnalysisOrchestrator::new(provider, settings());

        let out = orchestrator
            .batch_summary(
                &[
                    item("https://a.example"),
                    item("https://b.example"),
                    item("https://c.example"),
                ],
                false,
            )
            .await;

        assert!(out.contains("1. analysis of https://a.example"));
        assert!(out.contains(&format!("2. {ANALYSIS_FAILED}")));
        assert!(out.contains("3. analysis of https://c.example"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let provider = Arc::new(ScriptedProvider {
            delay: Some(Duration::from_secs(120)),
            ..ScriptedProvider::ok()
        });
        let orchestrator = AnalysisOrchestrator::new(provider, settings());

        let err = orchestrator
            .try_complete("hola".into(), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Timeout(d) if d == Duration::from_secs(20)));
        assert_eq!(orchestrator.answer("hola").await, ANALYSIS_FAILED);
    }

    #[tokio::test]
    async fn blank_completion_is_an_error() {
        struct Blank;

        #[async_trait]
        impl LlmProvider for Blank {
            fn provider_id(&self) -> &str {
                "blank"
            }
            async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
                Ok(LlmResponse {
                    text: "   ".into(),
                    model: request.model.clone(),
                    usage: None,
                    stop_reason: None,
                })
            }
            async fn health_check(&self) -> Result<bool> {
                Ok(true)
            }
        }

        let orchestrator = AnalysisOrchestrator::new(Arc::new(Blank), settings());
        assert!(matches!(
            orchestrator.try_complete("x".into(), 10).await,
            Err(AnalysisError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn deep_dive_names_the_index_and_uses_larger_budget() {
        let provider = Arc::new(ScriptedProvider::ok());
        let orchestrator = AnalysisOrchestrator::new(provider.clone(), settings());

        let out = orchestrator.deep_dive(2, &item("https://b.example")).await;
        assert!(out.contains("elemento 2"));
        assert!(out.contains("analysis of https://b.example"));
        assert_eq!(provider.prompts.lock().unwrap()[0].max_tokens, Some(1000));
    }

    #[tokio::test]
    async fn answers_are_html_escaped() {
        struct Markup;

        #[async_trait]
        impl LlmProvider for Markup {
            fn provider_id(&self) -> &str {
                "markup"
            }
            async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
                Ok(LlmResponse {
                    text: "use <b> & friends".into(),
                    model: request.model.clone(),
                    usage: None,
                    stop_reason: None,
                })
            }
            async fn health_check(&self) -> Result<bool> {
                Ok(true)
            }
        }

        let orchestrator = AnalysisOrchestrator::new(Arc::new(Markup), settings());
        assert_eq!(orchestrator.answer("q").await, "use &lt;b&gt; &amp; friends");
    }
}
