use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{ChatRequest, ChatResponse},
};

use super::AppState;

pub const PROMPT_REQUIRED: &str = "Prompt is required";

/// Forwards one prompt to the completion provider and returns its reply.
///
/// A missing, unreadable or blank prompt is rejected before any upstream
/// call. The prompt itself is forwarded exactly as received.
pub async fn chat(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    let prompt = match payload {
        Ok(Json(ChatRequest { prompt: Some(prompt) })) if !prompt.trim().is_empty() => prompt,
        Ok(_) => return Err(AppError::Validation(PROMPT_REQUIRED.to_string())),
        Err(rejection) => {
            tracing::debug!(
                request_id = %request_id,
                rejection = %rejection,
                "Unreadable chat body"
            );
            return Err(AppError::Validation(PROMPT_REQUIRED.to_string()));
        }
    };

    tracing::info!(
        request_id = %request_id,
        provider = state.provider.name(),
        prompt_chars = prompt.len(),
        "Relaying prompt"
    );

    let response = tokio::time::timeout(state.upstream_timeout, state.provider.complete(&prompt))
        .await
        .map_err(|_| AppError::Timeout(state.upstream_timeout.as_secs()))??;

    Ok(Json(ChatResponse { response }))
}
