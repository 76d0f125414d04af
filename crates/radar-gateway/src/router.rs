use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use radar_channels::parse_webhook_update;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::state::SharedState;

/// Header carrying the alert producer's shared secret.
pub const SECRET_HEADER: &str = "x-secret-key";

/// Build the application router. Rate limiting is layered on by the server.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(telegram_webhook))
        .route("/ingest-alert", post(ingest_alert))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "ok"
}

/// POST /webhook — Telegram update push. Always acknowledged; replies go out
/// as chat messages.
async fn telegram_webhook(State(state): State<SharedState>, body: Bytes) -> &'static str {
    let Some(message) = parse_webhook_update(&body) else {
        return "OK";
    };

    let dispatcher = state.dispatcher.clone();
    tokio::spawn(async move {
        let outcome = dispatcher.handle(message).await;
        debug!("webhook message handled: {outcome:?}");
    });
    "OK"
}

#[derive(Deserialize)]
struct IngestRequest {
    #[serde(default)]
    message: String,
}

/// POST /ingest-alert — pre-formatted alert from the scout.
async fn ingest_alert(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
    let authorized = match &state.ingest_secret {
        Some(secret) => secret.verify(provided).is_ok(),
        None => false,
    };
    if !authorized {
        warn!("rejected ingest request with missing or wrong secret");
        return (StatusCode::FORBIDDEN, "Forbidden");
    }

    // Past the secret check the caller only ever sees OK; anything unusable
    // is logged and dropped here.
    let message = match serde_json::from_slice::<IngestRequest>(&body) {
        Ok(request) => request.message,
        Err(e) => {
            warn!("dropping ingest request with malformed body: {e}");
            return (StatusCode::OK, "OK");
        }
    };
    if message.trim().is_empty() {
        debug!("dropping ingest request without a message");
        return (StatusCode::OK, "OK");
    }

    let Some(destination) = state.alert_destination.clone() else {
        warn!("dropping ingested alert: no alert destination is configured");
        return (StatusCode::OK, "OK");
    };

    let dispatcher = state.dispatcher.clone();
    tokio::spawn(async move {
        let outcome = dispatcher.ingest_alert(&destination, &message).await;
        debug!("ingested alert handled: {outcome:?}");
    });
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use radar_agents::{
        AnalysisOrchestrator, AnalysisSettings, LlmProvider, LlmRequest, LlmResponse,
    };
    use radar_channels::ChannelSender;
    use radar_common::{ConversationId, ResolvedContent, Result};
    use radar_config::AppConfig;
    use radar_content::ContentSource;
    use tower::ServiceExt;

    use crate::dispatcher::{DispatchSettings, Dispatcher};
    use crate::references::ReferenceStore;
    use crate::state::AppState;

    struct EchoLlm;

    #[async_trait]
    impl LlmProvider for EchoLlm {
        fn provider_id(&self) -> &str {
            "echo"
        }
        async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
            Ok(LlmResponse {
                text: "analysis".into(),
                model: request.model.clone(),
                usage: None,
                stop_reason: None,
            })
        }
        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    struct StaticResolver;

    #[async_trait]
    impl ContentSource for StaticResolver {
        async fn resolve(&self, url: &str) -> ResolvedContent {
            ResolvedContent::new(url, "t", "b")
        }
    }

    #[derive(Default)]
    struct Outbox(Mutex<Vec<(ConversationId, String)>>);

    #[async_trait]
    impl ChannelSender for Outbox {
        fn channel_type(&self) -> &str {
            "outbox"
        }
        async fn send_text(&self, conversation: &ConversationId, text: &str) -> Result<()> {
            self.0
                .lock()
                .unwrap()
                .push((conversation.clone(), text.to_string()));
            Ok(())
        }
    }

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.telegram.allowed_chat_id = Some("111".into());
        config.ingest.secret_key = Some("s3cret".into());
        config
    }

    fn app(config: AppConfig) -> (Router, Arc<Outbox>) {
        let outbox = Arc::new(Outbox::default());
        let dispatcher = Dispatcher::new(
            Arc::new(ReferenceStore::new()),
            Arc::new(StaticResolver),
            AnalysisOrchestrator::new(Arc::new(EchoLlm), AnalysisSettings::from(&config.llm)),
            outbox.clone(),
            DispatchSettings::from_config(&config),
        );
        let state = Arc::new(AppState::new(config, Arc::new(dispatcher)));
        (build_router(state), outbox)
    }

    async fn wait_for_delivery(outbox: &Outbox) -> Vec<(ConversationId, String)> {
        for _ in 0..100 {
            let sent = outbox.0.lock().unwrap().clone();
            if !sent.is_empty() {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Vec::new()
    }

    fn ingest(secret: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::post("/ingest-alert").header("content-type", "application/json");
        if let Some(secret) = secret {
            builder = builder.header("X-Secret-Key", secret);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (app, _) = app(config());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn webhook_acknowledges_garbage() {
        let (app, outbox) = app(config());
        let response = app
            .oneshot(Request::post("/webhook").body(Body::from("not json")).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(outbox.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn webhook_message_gets_a_reply() {
        let (app, outbox) = app(config());
        let update = serde_json::json!({
            "update_id": 1,
            "message": {
                "message_id": 10,
                "date": 1700000000,
                "chat": { "id": 111, "type": "private", "first_name": "Op" },
                "from": { "id": 111, "is_bot": false, "first_name": "Op" },
                "text": "¿qué es un deepfake?"
            }
        });
        let response = app
            .oneshot(
                Request::post("/webhook")
                    .header("content-type", "application/json")
                    .body(Body::from(update.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let sent = wait_for_delivery(&outbox).await;
        assert_eq!(sent, vec![(ConversationId::from(111_i64), "analysis".to_string())]);
    }

    #[tokio::test]
    async fn ingest_rejects_wrong_or_missing_secret() {
        for secret in [None, Some("nope")] {
            let (app, outbox) = app(config());
            let response = app
                .oneshot(ingest(secret, r#"{"message":"https://example.com"}"#))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
            assert!(outbox.0.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn ingest_is_refused_without_configured_secret() {
        let mut config = config();
        config.ingest.secret_key = None;
        let (app, _) = app(config);
        let response = app
            .oneshot(ingest(Some(""), r#"{"message":"hola"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn ingest_forwards_alert_without_links() {
        let (app, outbox) = app(config());
        let response = app
            .oneshot(ingest(Some("s3cret"), r#"{"message":"🚨 nada nuevo"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let sent = wait_for_delivery(&outbox).await;
        assert_eq!(sent, vec![(ConversationId::from(111_i64), "🚨 nada nuevo".to_string())]);
    }

    #[tokio::test]
    async fn authorized_ingest_is_always_acknowledged() {
        for body in ["{", r#"{"message":""}"#, "{}", r#"{"message":"   "}"#] {
            let (app, outbox) = app(config());
            let response = app.oneshot(ingest(Some("s3cret"), body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "body {body}");
            let text = to_bytes(response.into_body(), 1024).await.unwrap();
            assert_eq!(&text[..], b"OK");

            tokio::time::sleep(Duration::from_millis(50)).await;
            assert!(outbox.0.lock().unwrap().is_empty(), "body {body}");
        }
    }

    #[tokio::test]
    async fn ingest_without_destination_is_acknowledged_and_dropped() {
        let mut config = config();
        config.telegram.allowed_chat_id = None;
        config.telegram.alert_chat_id = None;
        let (app, outbox) = app(config);

        let response = app
            .oneshot(ingest(Some("s3cret"), r#"{"message":"🚨 alerta"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(outbox.0.lock().unwrap().is_empty());
    }
}
