//! Web chat JSON API.
//!
//! - `POST /api/chat` - one stateless turn; the browser sends the history it holds
//! - `GET  /api/cars` - the available inventory

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use rentbot_agent::{AgentRuntime, TurnContext, TurnError};
use rentbot_core::domain::conversation::ConversationTurn;
use rentbot_core::domain::vehicle::Vehicle;
use rentbot_core::errors::{ApplicationError, FailureClass, InterfaceError};
use rentbot_db::VehicleRepository;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use uuid::Uuid;

use crate::report::{ConversationReport, ConversationReporter};

#[derive(Clone)]
pub struct ChatState {
    pub runtime: Arc<AgentRuntime>,
    pub catalog: Arc<dyn VehicleRepository>,
    pub reporter: Option<Arc<dyn ConversationReporter>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub media_urls: Vec<String>,
    pub success: bool,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct CarsResponse {
    pub cars: Vec<Vehicle>,
    pub success: bool,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub error: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

type ApiFailure = (StatusCode, Json<ApiError>);

pub fn router(state: ChatState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/cars", get(list_cars))
        .with_state(state)
}

pub async fn chat(
    State(state): State<ChatState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiFailure> {
    let Json(request) = payload.map_err(|rejection| {
        bad_request(format!("invalid chat request: {}", rejection.body_text()))
    })?;

    let message = request.message.trim();
    if message.is_empty() {
        return Err(bad_request("No message provided".to_string()));
    }

    let outcome = state
        .runtime
        .handle_turn(TurnContext::Inline(request.history.clone()), message)
        .await
        .map_err(|turn_error| {
            let correlation_id = turn_error.correlation_id().to_string();
            error!(
                event_name = "server.chat.turn_failed",
                correlation_id = %correlation_id,
                error = %turn_error,
                "chat turn failed"
            );
            let TurnError::Catalog { source, .. } = turn_error;
            failure(ApplicationError::Persistence(source.to_string()).into_interface(correlation_id))
        })?;

    if let Some(reporter) = &state.reporter {
        let mut history = request.history;
        history.push(ConversationTurn::user(message));
        history.push(ConversationTurn::assistant(outcome.reply_text.clone()));
        let report = ConversationReport {
            created_at: Utc::now(),
            customer_message: message.to_string(),
            bot_response: outcome.reply_text.clone(),
            history,
        };
        if let Err(report_error) = reporter.deliver(&report).await {
            warn!(
                event_name = "server.report.failed",
                correlation_id = %outcome.correlation_id,
                error = %report_error,
                "conversation report was not delivered"
            );
        }
    }

    Ok(Json(ChatResponse {
        response: outcome.reply_text,
        media_urls: outcome.media_urls,
        success: true,
    }))
}

pub async fn list_cars(State(state): State<ChatState>) -> Result<Json<CarsResponse>, ApiFailure> {
    let cars = state.catalog.list_available().await.map_err(|repository_error| {
        let correlation_id = Uuid::new_v4().to_string();
        error!(
            event_name = "server.cars.list_failed",
            correlation_id = %correlation_id,
            error = %repository_error,
            "inventory listing failed"
        );
        failure(
            ApplicationError::Persistence(repository_error.to_string()).into_interface(correlation_id),
        )
    })?;

    Ok(Json(CarsResponse { cars, success: true }))
}

fn bad_request(message: String) -> ApiFailure {
    (StatusCode::BAD_REQUEST, Json(ApiError { error: message, success: false, correlation_id: None }))
}

fn failure(interface: InterfaceError) -> ApiFailure {
    let status = match interface.class {
        FailureClass::InvalidInput => StatusCode::BAD_REQUEST,
        FailureClass::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        FailureClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ApiError {
            error: interface.user_message().to_string(),
            success: false,
            correlation_id: Some(interface.correlation_id().to_string()),
        }),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        extract::State,
        http::{header, Request, StatusCode},
        Json,
    };
    use rentbot_agent::llm::{CompletionRequest, LlmClient, LlmError, LlmReply};
    use rentbot_agent::AgentRuntime;
    use rentbot_core::domain::conversation::ConversationTurn;
    use rentbot_db::{
        CatalogSeed, InMemoryConversationRepository, InMemoryVehicleRepository, RepositoryError,
        VehicleRepository,
    };
    use tower::ServiceExt;

    use super::{chat, list_cars, router, ChatRequest, ChatState};
    use crate::report::{ConversationReport, ConversationReporter, ReportError};

    /// Replays canned completions in order.
    struct CannedLlm {
        replies: Mutex<Vec<String>>,
    }

    impl CannedLlm {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self { replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()) })
        }
    }

    #[async_trait]
    impl LlmClient for CannedLlm {
        async fn complete(&self, _: CompletionRequest) -> Result<LlmReply, LlmError> {
            let next = self.replies.lock().expect("replies lock").pop();
            next.map(LlmReply::content).ok_or(LlmError::Timeout)
        }
    }

    #[derive(Default)]
    struct CapturingReporter {
        reports: Mutex<Vec<ConversationReport>>,
    }

    #[async_trait]
    impl ConversationReporter for CapturingReporter {
        async fn deliver(&self, report: &ConversationReport) -> Result<(), ReportError> {
            self.reports.lock().expect("reports lock").push(report.clone());
            Ok(())
        }
    }

    fn fleet() -> Arc<InMemoryVehicleRepository> {
        Arc::new(InMemoryVehicleRepository::with_vehicles(CatalogSeed::vehicles()))
    }

    fn state(
        catalog: Arc<dyn VehicleRepository>,
        llm: Arc<dyn LlmClient>,
        reporter: Option<Arc<dyn ConversationReporter>>,
    ) -> ChatState {
        let runtime = AgentRuntime::new(
            catalog.clone(),
            Arc::new(InMemoryConversationRepository::default()),
            llm,
            "AED",
        );
        ChatState { runtime: Arc::new(runtime), catalog, reporter }
    }

    const INVENTORY: &str = r#"{"action_type":"get_inventory","search_criteria":null,"response":null}"#;

    #[tokio::test]
    async fn chat_returns_reply_with_media_and_reports_the_exchange() {
        let reporter = Arc::new(CapturingReporter::default());
        let llm = CannedLlm::new(&[
            INVENTORY,
            "Try the **2024 Toyota Corolla** - AED 128.45/day, great on fuel.",
        ]);
        let state = state(fleet(), llm, Some(reporter.clone()));

        let Json(response) = chat(
            State(state),
            Ok(Json(ChatRequest {
                message: "What do you have?".to_string(),
                history: vec![ConversationTurn::user("Hi"), ConversationTurn::assistant("Hello!")],
            })),
        )
        .await
        .expect("chat should succeed");

        assert!(response.success);
        assert_eq!(response.media_urls.len(), 1);
        assert!(response.media_urls[0].contains("Toyota+Corolla"), "{:?}", response.media_urls);

        let reports = reporter.reports.lock().expect("reports lock");
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].customer_message, "What do you have?");
        assert_eq!(reports[0].history.len(), 4);
    }

    #[tokio::test]
    async fn blank_message_is_rejected() {
        let state = state(fleet(), CannedLlm::new(&[]), None);

        let (status, Json(error)) = chat(
            State(state),
            Ok(Json(ChatRequest { message: "   ".to_string(), history: Vec::new() })),
        )
        .await
        .expect_err("blank message must fail");

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error.error, "No message provided");
        assert!(!error.success);
    }

    #[tokio::test]
    async fn resolver_outage_still_answers_with_apology() {
        let state = state(fleet(), CannedLlm::new(&[]), None);

        let Json(response) = chat(
            State(state),
            Ok(Json(ChatRequest { message: "hello".to_string(), history: Vec::new() })),
        )
        .await
        .expect("apology is still a success");

        assert_eq!(response.response, rentbot_agent::APOLOGY_TEXT);
        assert!(response.media_urls.is_empty());
    }

    struct OfflineCatalog;

    #[async_trait]
    impl VehicleRepository for OfflineCatalog {
        async fn list_available(&self) -> Result<Vec<rentbot_core::Vehicle>, RepositoryError> {
            Err(RepositoryError::Decode("offline".to_string()))
        }
        async fn search(
            &self,
            _: &rentbot_core::SearchCriteria,
        ) -> Result<Vec<rentbot_core::Vehicle>, RepositoryError> {
            Err(RepositoryError::Decode("offline".to_string()))
        }
        async fn insert(
            &self,
            _: rentbot_core::NewVehicle,
        ) -> Result<rentbot_core::Vehicle, RepositoryError> {
            Err(RepositoryError::Decode("offline".to_string()))
        }
        async fn find_by_id(
            &self,
            _: rentbot_core::VehicleId,
        ) -> Result<Option<rentbot_core::Vehicle>, RepositoryError> {
            Err(RepositoryError::Decode("offline".to_string()))
        }
        async fn list_all(&self) -> Result<Vec<rentbot_core::Vehicle>, RepositoryError> {
            Err(RepositoryError::Decode("offline".to_string()))
        }
        async fn set_availability(
            &self,
            _: rentbot_core::VehicleId,
            _: bool,
        ) -> Result<rentbot_core::Vehicle, RepositoryError> {
            Err(RepositoryError::Decode("offline".to_string()))
        }
        async fn set_daily_price(
            &self,
            _: rentbot_core::VehicleId,
            _: rust_decimal::Decimal,
        ) -> Result<rentbot_core::Vehicle, RepositoryError> {
            Err(RepositoryError::Decode("offline".to_string()))
        }
        async fn count(&self) -> Result<u64, RepositoryError> {
            Err(RepositoryError::Decode("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn catalog_outage_is_service_unavailable() {
        let state = state(Arc::new(OfflineCatalog), CannedLlm::new(&[INVENTORY]), None);

        let (status, Json(error)) = chat(
            State(state.clone()),
            Ok(Json(ChatRequest { message: "show cars".to_string(), history: Vec::new() })),
        )
        .await
        .expect_err("catalog outage must fail");
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(error.correlation_id.is_some());

        let (status, _) = list_cars(State(state)).await.expect_err("listing must fail");
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn cars_endpoint_lists_only_available_vehicles() {
        let catalog = fleet();
        let first = catalog.list_all().await.expect("list")[0].id;
        catalog.set_availability(first, false).await.expect("toggle");

        let app = router(state(catalog, CannedLlm::new(&[]), None));
        let response = app
            .oneshot(Request::get("/api/cars").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let payload: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload["success"], true);
        assert_eq!(payload["cars"].as_array().map(Vec::len), Some(18));
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request_envelope() {
        let app = router(state(fleet(), CannedLlm::new(&[]), None));
        let response = app
            .oneshot(
                Request::post("/api/chat")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"message\": 42}"))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let payload: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload["success"], false);
    }
}
