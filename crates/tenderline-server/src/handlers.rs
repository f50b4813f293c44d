//! HTTP request handlers for the server.
//!
//! Thin axum layer over [`RfpWorkflow`]; every error body carries the
//! workflow's machine-readable code.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tenderline_domain::{CorrelationToken, SendRecord};
use tenderline_workflow::{
    DecisionReport, DispatchOutcome, ReplyReport, RfpWorkflow, VendorSelection, WorkflowError,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The assembled workflow
    pub workflow: Arc<RfpWorkflow>,
}

impl AppState {
    /// Wrap a workflow
    pub fn new(workflow: RfpWorkflow) -> Self {
        Self {
            workflow: Arc::new(workflow),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Always "ok" while the process serves requests
    pub status: String,
    /// Crate version
    pub version: String,
}

/// Vendor list response
#[derive(Debug, Serialize, Deserialize)]
pub struct VendorsResponse {
    /// Vendor names from the directory
    pub vendors: Vec<String>,
}

/// Dispatch request body
#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    /// Free-text project description
    pub description: String,
    /// Vendors to send to
    #[serde(default)]
    pub vendors: Vec<VendorSelection>,
}

/// Dispatch response: the outcome plus where to download the document
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    /// Dispatch outcome
    #[serde(flatten)]
    pub outcome: DispatchOutcome,
    /// Download path for the rendered document
    pub document_url: String,
}

/// Download path for the document sent under `token`
pub fn document_url(token: &CorrelationToken) -> String {
    format!("/api/rfp/{}/document", token)
}

/// Optional decision request body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    /// Only consider replies since this date
    pub since: Option<NaiveDate>,
    /// Candidate vendors; defaults to those in the send record
    pub vendor_names: Option<Vec<String>>,
}

impl DecisionRequest {
    /// Parse an optional JSON body; an empty body means all defaults
    pub fn from_body(body: &[u8]) -> Result<Self, WorkflowError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| WorkflowError::InvalidRequest(format!("decision request: {}", e)))
    }
}

/// Query string for reply listing
#[derive(Debug, Default, Deserialize)]
pub struct SinceQuery {
    /// Only consider replies since this date (YYYY-MM-DD)
    pub since: Option<NaiveDate>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub struct AppError(WorkflowError);

impl From<WorkflowError> for AppError {
    fn from(e: WorkflowError) -> Self {
        AppError(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            WorkflowError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
            WorkflowError::ConfigurationMissing(_) => StatusCode::SERVICE_UNAVAILABLE,
            WorkflowError::ContentGenerationUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            WorkflowError::TransportFailure(_) | WorkflowError::ParseFailure(_) => {
                StatusCode::BAD_GATEWAY
            }
            WorkflowError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(code = self.0.code(), error = %self.0, "request failed");
        }

        let body = Json(ErrorResponse {
            code: self.0.code().to_string(),
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

fn parse_token(raw: &str) -> Result<CorrelationToken, AppError> {
    CorrelationToken::parse(raw).map_err(|e| AppError(WorkflowError::InvalidRequest(e)))
}

/// GET /health - Liveness check
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/vendors - Vendor names
async fn list_vendors(State(state): State<AppState>) -> Result<Json<VendorsResponse>, AppError> {
    let vendors = state.workflow.vendor_names().await?;
    Ok(Json(VendorsResponse { vendors }))
}

/// POST /api/rfp - Generate, send and record an RFP
async fn dispatch_rfp(
    State(state): State<AppState>,
    Json(request): Json<DispatchRequest>,
) -> Result<Json<DispatchResponse>, AppError> {
    let outcome = state
        .workflow
        .dispatch(&request.description, &request.vendors)
        .await?;
    let document_url = document_url(&outcome.token);
    Ok(Json(DispatchResponse {
        outcome,
        document_url,
    }))
}

/// GET /api/rfp/:token - Send record
async fn get_send_record(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<SendRecord>, AppError> {
    let token = parse_token(&token)?;
    Ok(Json(state.workflow.lookup(&token).await?))
}

/// GET /api/rfp/:token/document - Rendered document as sent
async fn get_document(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, AppError> {
    let token = parse_token(&token)?;
    let document = state.workflow.document(&token).await?;
    let disposition = format!("attachment; filename=\"{}\"", document.file_name);

    Ok((
        [
            (header::CONTENT_TYPE, document.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response())
}

/// GET /api/rfp/:token/replies - Collected, attributed replies
async fn list_replies(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(query): Query<SinceQuery>,
) -> Result<Json<ReplyReport>, AppError> {
    let token = parse_token(&token)?;
    Ok(Json(state.workflow.replies(&token, query.since).await?))
}

/// POST /api/rfp/:token/decision - Pick a winning vendor
async fn decide(
    State(state): State<AppState>,
    Path(token): Path<String>,
    body: Bytes,
) -> Result<Json<DecisionReport>, AppError> {
    let token = parse_token(&token)?;
    let request = DecisionRequest::from_body(&body)?;
    let report = state
        .workflow
        .decide(&token, request.since, request.vendor_names)
        .await?;
    Ok(Json(report))
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/vendors", get(list_vendors))
        .route("/api/rfp", post(dispatch_rfp))
        .route("/api/rfp/:token", get(get_send_record))
        .route("/api/rfp/:token/document", get(get_document))
        .route("/api/rfp/:token/replies", get(list_replies))
        .route("/api/rfp/:token/decision", post(decide))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tenderline_llm::MockProvider;
    use tenderline_mail::mock::{MockMailbox, RecordingTransport};
    use tenderline_store::MemoryRegistry;
    use tenderline_workflow::{Collaborators, StaticDirectory, TextFileRenderer, WorkflowConfig};
    use tower::ServiceExt; // for oneshot

    fn create_test_state() -> AppState {
        AppState::new(RfpWorkflow::new(
            Collaborators {
                llm: Arc::new(MockProvider::unreachable()),
                directory: Arc::new(StaticDirectory::default()),
                renderer: Arc::new(TextFileRenderer::new(std::env::temp_dir())),
                transport: Arc::new(RecordingTransport::new()),
                mailbox: Arc::new(MockMailbox::default()),
                registry: Arc::new(MemoryRegistry::new()),
            },
            WorkflowConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_token_is_bad_request() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .uri("/api/rfp/abc%5D")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_decision_request_from_body() {
        let empty = DecisionRequest::from_body(b"").unwrap();
        assert!(empty.since.is_none() && empty.vendor_names.is_none());

        let parsed =
            DecisionRequest::from_body(br#"{"since": "2026-10-01", "vendorNames": ["Acme"]}"#)
                .unwrap();
        assert_eq!(parsed.since, NaiveDate::from_ymd_opt(2026, 10, 1));
        assert_eq!(parsed.vendor_names, Some(vec!["Acme".to_string()]));

        let bad = DecisionRequest::from_body(br#"{"since": "last week"}"#).unwrap_err();
        assert_eq!(bad.code(), "invalid_request");
    }

    #[test]
    fn test_error_status_mapping() {
        let response = AppError(WorkflowError::NotFound("x".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError(WorkflowError::TransportFailure("x".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = AppError(WorkflowError::ConfigurationMissing("x".into())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
