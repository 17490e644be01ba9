use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::ai::{self, AiError};
use crate::AppState;
use shared::{GenerateRequest, GenerateResponse};

/// Health check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Prompt → batch of objects. Either the whole batch or an error status.
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, Json<Value>)> {
    match ai::generate_objects(&state, &request).await {
        Ok(response) => {
            tracing::info!(
                "Generated {} objects for prompt {:?}",
                response.objects.len(),
                request.prompt
            );
            Ok(Json(response))
        }
        Err(e) => {
            tracing::error!("Generation failed: {e}");
            Err((status_for(&e), Json(json!({ "error": e.to_string() }))))
        }
    }
}

fn status_for(err: &AiError) -> StatusCode {
    match err {
        AiError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
        AiError::Upstream(_) | AiError::UpstreamStatus(_) | AiError::Unparsable(_) => {
            StatusCode::BAD_GATEWAY
        }
        AiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&AiError::MissingApiKey), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_for(&AiError::UpstreamStatus(429)), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for(&AiError::Unparsable("no json".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&AiError::Internal("scene".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
