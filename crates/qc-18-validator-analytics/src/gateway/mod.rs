//! HTTP gateway for the analytics endpoints
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /prysm/v1/validators/:state_id/participation` | participation |
//! | `GET /prysm/v1/validators/:state_id/active_set_changes` | active set changes |
//! | `POST /prysm/v1/validators/performance` | performance |

pub mod error;
mod handlers;
pub mod recovery;
pub mod types;

pub use error::{ErrorBody, GatewayError};
pub use recovery::recover;

use crate::ports::inbound::ValidatorAnalyticsApi;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tracing::{field, info_span, Instrument, Span};

/// Application state shared across handlers
#[derive(Clone)]
pub(crate) struct GatewayState {
    api: Arc<dyn ValidatorAnalyticsApi>,
}

/// Build the analytics router over `api`
pub fn router(api: Arc<dyn ValidatorAnalyticsApi>) -> Router {
    Router::new()
        .route(
            "/prysm/v1/validators/:state_id/participation",
            get(handlers::participation),
        )
        .route(
            "/prysm/v1/validators/:state_id/active_set_changes",
            get(handlers::active_set_changes),
        )
        .route(
            "/prysm/v1/validators/performance",
            post(handlers::performance),
        )
        .layer(middleware::from_fn(trace_request))
        .with_state(GatewayState { api })
}

/// Request span carrying the fields handlers and recovery record into
async fn trace_request(req: Request, next: Next) -> Response {
    let span = info_span!(
        "analytics_request",
        http.method = %req.method(),
        http.target = %req.uri().path(),
        http.status_code = field::Empty,
        panic.stack = field::Empty,
    );
    async move {
        let response = next.run(req).await;
        Span::current().record("http.status_code", response.status().as_u16());
        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStateStore;
    use crate::config::AnalyticsConfig;
    use crate::domain::{
        ActiveSetChangeReport, ConsensusState, ForkData, ForkVersion, ParticipationFlags,
        ParticipationReport, PerformanceReport, PublicKey, Validator, ValidatorId, GWEI_PER_ETH,
    };
    use crate::error::AnalyticsResult;
    use crate::ports::inbound::RequestContext;
    use crate::service::AnalyticsService;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let config = AnalyticsConfig::default();
        let store = Arc::new(InMemoryStateStore::new(&config).unwrap());
        let validators = (0..10u8)
            .map(|i| Validator::new(PublicKey([0xa1 + i; 48]), 32 * GWEI_PER_ETH))
            .collect();
        let mut state = ConsensusState::genesis(ForkVersion::Altair, validators).unwrap();
        state.slot = 64;
        if let ForkData::Participation(fields) = &mut state.fork_data {
            for flags in fields.current_epoch_participation.iter_mut().take(6) {
                *flags = ParticipationFlags(0b011);
            }
        }
        store.publish([1; 32], state);
        router(Arc::new(AnalyticsService::new(store, config).unwrap()))
    }

    async fn call(
        app: Router,
        method: Method,
        uri: &str,
        body: &str,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_participation_route() {
        let (status, json) = call(
            app(),
            Method::GET,
            "/prysm/v1/validators/head/participation",
            "",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["epoch"], "2");
        assert_eq!(json["finalized"], false);
        assert_eq!(json["participation"]["global_participation_rate"], "0.600000");
        assert_eq!(json["participation"]["eligible_ether"], "320000000000");
        assert_eq!(json["participation"]["voted_ether"], "192000000000");
    }

    #[tokio::test]
    async fn test_blank_state_id_rejected() {
        let (status, json) = call(
            app(),
            Method::GET,
            "/prysm/v1/validators/%20/participation",
            "",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "state_id is required in URL params");
        assert_eq!(json["code"], 400);
    }

    #[tokio::test]
    async fn test_state_errors_map_to_status() {
        let (status, json) = call(
            app(),
            Method::GET,
            "/prysm/v1/validators/bogus/active_set_changes",
            "",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], 400);

        let uri = format!("/prysm/v1/validators/0x{}/participation", "00".repeat(31) + "09");
        let (status, _) = call(app(), Method::GET, &uri, "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(
            app(),
            Method::GET,
            "/prysm/v1/validators/1000/participation",
            "",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_active_set_changes_route() {
        let (status, json) = call(
            app(),
            Method::GET,
            "/prysm/v1/validators/head/active_set_changes",
            "",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["epoch"], "2");
        assert_eq!(json["activated_indices"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_performance_route() {
        let body = serde_json::json!({
            "public_keys": [format!("0x{}", "aa".repeat(48)), "0xunknown"],
            "indices": ["1"]
        })
        .to_string();
        let (status, json) = call(
            app(),
            Method::POST,
            "/prysm/v1/validators/performance",
            &body,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["public_keys"].as_array().unwrap().len(), 2);
        assert_eq!(json["public_keys"][0], format!("0x{}", "aa".repeat(48)));
        assert_eq!(json["missing_validators"], serde_json::json!(["0xunknown"]));
        assert_eq!(json["inactivity_scores"], serde_json::json!(["0", "0"]));
    }

    #[tokio::test]
    async fn test_performance_body_errors() {
        let (status, json) =
            call(app(), Method::POST, "/prysm/v1/validators/performance", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "No data submitted");

        let (status, json) = call(
            app(),
            Method::POST,
            "/prysm/v1/validators/performance",
            "  \n\t",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "No data submitted");

        let (status, json) = call(
            app(),
            Method::POST,
            "/prysm/v1/validators/performance",
            "{not json",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["message"]
            .as_str()
            .unwrap()
            .starts_with("Could not decode request body: "));
    }

    struct PanickingApi;

    #[async_trait]
    impl ValidatorAnalyticsApi for PanickingApi {
        async fn participation(
            &self,
            _ctx: RequestContext,
            _state_id: &str,
        ) -> AnalyticsResult<ParticipationReport> {
            panic!("participation exploded");
        }

        async fn active_set_changes(
            &self,
            _ctx: RequestContext,
            _state_id: &str,
        ) -> AnalyticsResult<ActiveSetChangeReport> {
            panic!("active set exploded");
        }

        async fn performance(
            &self,
            _ctx: RequestContext,
            _ids: Vec<ValidatorId>,
        ) -> AnalyticsResult<PerformanceReport> {
            panic!("performance exploded");
        }
    }

    #[tokio::test]
    async fn test_panic_is_answered_with_500() {
        let app = router(Arc::new(PanickingApi));
        let (status, json) = call(
            app,
            Method::GET,
            "/prysm/v1/validators/head/participation",
            "",
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], 500);
        assert_eq!(json["message"], "Internal server error");
    }
}
