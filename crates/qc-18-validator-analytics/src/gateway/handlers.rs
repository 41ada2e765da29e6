//! Route handlers

use super::error::GatewayError;
use super::recovery::recover;
use super::types::{
    ActiveSetChangesResponse, ParticipationResponse, PerformanceRequest, PerformanceResponse,
};
use super::GatewayState;
use crate::ports::inbound::RequestContext;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use tokio::sync::watch;

/// Cancels the request context when the handler future is dropped, which
/// happens when the client goes away before the response is ready.
struct CancelOnDrop(watch::Sender<bool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        let _ = self.0.send(true);
    }
}

fn request_context() -> (RequestContext, CancelOnDrop) {
    let (tx, rx) = watch::channel(false);
    (RequestContext::with_cancellation(rx), CancelOnDrop(tx))
}

fn require_state_id(state_id: &str) -> Result<&str, GatewayError> {
    let state_id = state_id.trim();
    if state_id.is_empty() {
        return Err(GatewayError::MissingStateId);
    }
    Ok(state_id)
}

pub(super) async fn participation(
    State(state): State<GatewayState>,
    Path(state_id): Path<String>,
) -> Result<Json<ParticipationResponse>, GatewayError> {
    recover(async move {
        let (ctx, _cancel) = request_context();
        let state_id = require_state_id(&state_id)?;
        let report = state.api.participation(ctx, state_id).await?;
        Ok(Json(ParticipationResponse::from(&report)))
    })
    .await
}

pub(super) async fn active_set_changes(
    State(state): State<GatewayState>,
    Path(state_id): Path<String>,
) -> Result<Json<ActiveSetChangesResponse>, GatewayError> {
    recover(async move {
        let (ctx, _cancel) = request_context();
        let state_id = require_state_id(&state_id)?;
        let report = state.api.active_set_changes(ctx, state_id).await?;
        Ok(Json(ActiveSetChangesResponse::from(&report)))
    })
    .await
}

pub(super) async fn performance(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Json<PerformanceResponse>, GatewayError> {
    recover(async move {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(GatewayError::EmptyBody);
        }
        let request: PerformanceRequest =
            serde_json::from_slice(&body).map_err(|e| GatewayError::Decode(e.to_string()))?;

        let (ctx, _cancel) = request_context();
        let report = state.api.performance(ctx, request.validator_ids()).await?;
        Ok(Json(PerformanceResponse::from(&report)))
    })
    .await
}
