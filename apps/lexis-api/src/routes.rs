use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use lexis_service::{ChatRequest, ChatResponse, Error as ServiceError};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/chat/process", post(process))
		.with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthBody {
	status: &'static str,
	llm: bool,
	qdrant: bool,
}

/// 200 when every dependency answers, 503 with the same body otherwise.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthBody>) {
	let report = state.service.health().await;
	let (status, label) = if report.is_healthy() {
		(StatusCode::OK, "healthy")
	} else {
		(StatusCode::SERVICE_UNAVAILABLE, "degraded")
	};

	(status, Json(HealthBody { status: label, llm: report.llm, qdrant: report.qdrant }))
}

async fn process(
	State(state): State<AppState>,
	Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
	let conversation_id = payload.conversation_id;

	match state.service.process(payload).await {
		Ok(response) => Ok(Json(response)),
		Err(err) => Err(ApiError::from_service(
			err,
			conversation_id,
			&state.service.cfg.messages.processing_error,
		)),
	}
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	conversation_id: Option<i64>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	conversation_id: Option<i64>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		conversation_id: Option<i64>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), conversation_id }
	}

	/// Client mistakes echo the reason; backend failures are logged and answered with the
	/// configured user-facing message.
	fn from_service(err: ServiceError, conversation_id: i64, processing_error: &str) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				Self::new(StatusCode::BAD_REQUEST, "invalid_request", message, Some(conversation_id)),
			err => {
				tracing::error!(error = %err, conversation_id, "Chat processing failed.");

				Self::new(
					StatusCode::BAD_GATEWAY,
					"processing_failed",
					processing_error,
					Some(conversation_id),
				)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			error_code: self.error_code,
			message: self.message,
			conversation_id: self.conversation_id,
		};

		(self.status, Json(body)).into_response()
	}
}
