//! # Validator Analytics Flows
//!
//! Drives the HTTP router against a state store fed by a simulated
//! state-transition pipeline.
//!
//! ## Flows Tested:
//!
//! 1. **Phase0 participation**: pending attestations → participation over HTTP
//! 2. **Altair participation**: flags → same figures as Phase0
//! 3. **Active set changes**: slashing reported in exactly one group
//! 4. **Performance**: unknown keys reported as missing, rows for the rest
//! 5. **Concurrent pipeline writes**: every read sees one consistent state

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use bitvec::prelude::*;
    use tower::ServiceExt;

    use qc_18_validator_analytics::domain::{
        AttestationData, Checkpoint, ParticipationFlags, PendingAttestation,
    };
    use qc_18_validator_analytics::ports::inbound::{RequestContext, ValidatorAnalyticsApi};
    use qc_18_validator_analytics::{
        router, AnalyticsConfig, AnalyticsError, AnalyticsService, BeaconStateView,
        ConsensusState, ForkData, ForkVersion, InMemoryStateStore, PublicKey, Validator,
        GWEI_PER_ETH,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const EPOCH_TWO_BOUNDARY: [u8; 32] = [0x22; 32];

    fn registry(count: u8) -> Vec<Validator> {
        (0..count)
            .map(|i| Validator::new(PublicKey([0xa1 + i; 48]), 32 * GWEI_PER_ETH))
            .collect()
    }

    /// Phase0 state at slot 64 where the first `voters` validators attested
    /// to the epoch 2 boundary block.
    fn phase0_state(voters: usize) -> ConsensusState {
        let mut state = ConsensusState::genesis(ForkVersion::Phase0, registry(10)).unwrap();
        state.slot = 64;
        state.set_block_root(64, EPOCH_TWO_BOUNDARY);

        let mut bits = bitvec![u8, Msb0; 0; 10];
        for i in 0..voters {
            bits.set(i, true);
        }
        let attestation = PendingAttestation::new(
            bits,
            (0..10).collect(),
            AttestationData {
                slot: 64,
                index: 0,
                beacon_block_root: EPOCH_TWO_BOUNDARY,
                source: Checkpoint::default(),
                target: Checkpoint::new(2, EPOCH_TWO_BOUNDARY),
            },
            1,
            3,
        );
        state.fork_data = ForkData::Phase0 {
            previous_epoch_attestations: None,
            current_epoch_attestations: Some(vec![attestation]),
        };
        state
    }

    fn altair_state(voters: usize) -> ConsensusState {
        let mut state = ConsensusState::genesis(ForkVersion::Altair, registry(10)).unwrap();
        state.slot = 64;
        set_current_flags(&mut state, voters, ParticipationFlags(0b111));
        state
    }

    fn set_current_flags(state: &mut ConsensusState, voters: usize, flags: ParticipationFlags) {
        if let ForkData::Participation(fields) = &mut state.fork_data {
            for (i, f) in fields.current_epoch_participation.iter_mut().enumerate() {
                *f = if i < voters { flags } else { ParticipationFlags(0) };
            }
        }
    }

    fn setup(state: ConsensusState) -> (Arc<InMemoryStateStore>, Router) {
        let config = AnalyticsConfig::default();
        let store = Arc::new(InMemoryStateStore::new(&config).unwrap());
        store.publish([0x64; 32], state);
        let service = Arc::new(AnalyticsService::new(Arc::clone(&store), config).unwrap());
        (store, router(service))
    }

    async fn send(
        app: Router,
        method: Method,
        uri: &str,
        body: String,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    // =============================================================================
    // PARTICIPATION
    // =============================================================================

    #[tokio::test]
    async fn test_phase0_participation_over_http() {
        let (_, app) = setup(phase0_state(6));
        let (status, json) = send(
            app,
            Method::GET,
            "/prysm/v1/validators/64/participation",
            String::new(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let p = &json["participation"];
        assert_eq!(json["epoch"], "2");
        assert_eq!(p["eligible_ether"], "320000000000");
        assert_eq!(p["voted_ether"], "192000000000");
        assert_eq!(p["global_participation_rate"], "0.600000");
        assert_eq!(p["current_epoch_attesting_gwei"], "192000000000");
        assert_eq!(p["current_epoch_target_attesting_gwei"], "192000000000");
    }

    #[tokio::test]
    async fn test_phase0_and_altair_agree() {
        let (_, phase0) = setup(phase0_state(6));
        let (_, altair) = setup(altair_state(6));
        let uri = "/prysm/v1/validators/head/participation";

        let (_, a) = send(phase0, Method::GET, uri, String::new()).await;
        let (_, b) = send(altair, Method::GET, uri, String::new()).await;
        assert_eq!(a["participation"], b["participation"]);
    }

    #[tokio::test]
    async fn test_participation_by_state_root() {
        let (_, app) = setup(altair_state(10));
        let uri = format!(
            "/prysm/v1/validators/0x{}/participation",
            hex::encode([0x64u8; 32])
        );
        let (status, json) = send(app, Method::GET, &uri, String::new()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["participation"]["global_participation_rate"], "1.000000");
    }

    // =============================================================================
    // ACTIVE SET CHANGES
    // =============================================================================

    #[tokio::test]
    async fn test_slashed_validator_reported_once() {
        let config = AnalyticsConfig::default();
        let mut state = altair_state(0);
        state.slot = 3 * 32;
        state.validators[5].slashed = true;
        state.validators[5].exit_epoch = 3;
        state.validators[5].withdrawable_epoch = 3 + config.epochs_per_slashings_vector;
        state.validators[6].exit_epoch = 3;

        let (_, app) = setup(state);
        let (status, json) = send(
            app,
            Method::GET,
            "/prysm/v1/validators/head/active_set_changes",
            String::new(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["epoch"], "3");
        assert_eq!(json["slashed_indices"], serde_json::json!(["5"]));
        assert_eq!(
            json["slashed_public_keys"],
            serde_json::json!([format!("0x{}", "a6".repeat(48))])
        );
        assert_eq!(json["exited_indices"], serde_json::json!(["6"]));
        assert_eq!(json["ejected_indices"], serde_json::json!([]));
        assert_eq!(json["activated_indices"], serde_json::json!([]));
    }

    // =============================================================================
    // PERFORMANCE
    // =============================================================================

    #[tokio::test]
    async fn test_performance_reports_missing_keys() {
        let (_, app) = setup(phase0_state(6));
        let known = format!("0x{}", "aa".repeat(48));
        let body = serde_json::json!({ "public_keys": [known, "0xunknown"] }).to_string();

        let (status, json) = send(
            app,
            Method::POST,
            "/prysm/v1/validators/performance",
            body,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["public_keys"], serde_json::json!([known]));
        assert_eq!(json["missing_validators"], serde_json::json!(["0xunknown"]));
        assert_eq!(json["current_effective_balances"], serde_json::json!(["32000000000"]));
        // Phase0 tracks no inactivity
        assert_eq!(json["inactivity_scores"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_performance_bad_index_is_decode_error() {
        let (_, app) = setup(altair_state(1));
        let body = r#"{"indices": ["-1"]}"#.to_string();
        let (status, json) = send(
            app,
            Method::POST,
            "/prysm/v1/validators/performance",
            body,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["message"]
            .as_str()
            .unwrap()
            .starts_with("Could not decode request body"));
    }

    // =============================================================================
    // VERSIONED VIEW
    // =============================================================================

    #[tokio::test]
    async fn test_phase0_accessor_on_later_fork() {
        let view = BeaconStateView::from_state(altair_state(3), 32);
        assert!(matches!(
            view.current_epoch_attestations(),
            Err(AnalyticsError::UnsupportedForVersion {
                version: ForkVersion::Altair,
                ..
            })
        ));
        assert_eq!(view.current_epoch_participation().unwrap().len(), 10);
    }

    // =============================================================================
    // CONCURRENT PIPELINE WRITES
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reads_see_whole_transitions() {
        let config = AnalyticsConfig::default();
        let store = Arc::new(InMemoryStateStore::new(&config).unwrap());
        let shared = store.publish([0x64; 32], altair_state(0));
        let service = Arc::new(AnalyticsService::new(Arc::clone(&store), config).unwrap());

        // each transition flips every validator's flags in one write
        let pipeline = std::thread::spawn(move || {
            for round in 0..200 {
                let mut state = shared.write();
                let voters = if round % 2 == 0 { 10 } else { 0 };
                set_current_flags(&mut state, voters, ParticipationFlags(0b011));
                drop(state);
                std::thread::sleep(Duration::from_micros(200));
            }
        });

        let readers: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    let mut seen = Vec::new();
                    for _ in 0..25 {
                        let report = service
                            .participation(RequestContext::background(), "head")
                            .await
                            .unwrap();
                        seen.push(report.participation.voted_ether);
                        tokio::task::yield_now().await;
                    }
                    seen
                })
            })
            .collect();

        for reader in readers {
            for voted in reader.await.unwrap() {
                assert!(voted == 0 || voted == 320 * GWEI_PER_ETH, "torn read: {}", voted);
            }
        }
        pipeline.join().unwrap();
    }
}
