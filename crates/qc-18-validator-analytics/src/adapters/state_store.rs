//! In-memory state store
//!
//! Implements `StateProvider` over states published by the state-transition
//! pipeline. Each published state stays shared with the pipeline, which may
//! keep mutating it under the write lock; resolution hands out views over
//! the same `SharedState`.

use crate::config::{AnalyticsConfig, ConfigError};
use crate::domain::{BeaconStateView, ConsensusState, Epoch, Root, SharedState, Slot, StateId};
use crate::error::StateFetchError;
use crate::ports::outbound::StateProvider;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Default)]
struct StoreIndex {
    by_slot: BTreeMap<Slot, SharedState>,
    by_root: HashMap<Root, Slot>,
    finalized: (Epoch, Root),
    justified: (Epoch, Root),
}

impl StoreIndex {
    fn head_slot(&self) -> Option<Slot> {
        self.by_slot.keys().next_back().copied()
    }
}

/// States indexed by slot and state root
pub struct InMemoryStateStore {
    index: RwLock<StoreIndex>,
    slots_per_epoch: u64,
    lock_timeout: Duration,
}

impl InMemoryStateStore {
    pub fn new(config: &AnalyticsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            index: RwLock::new(StoreIndex::default()),
            slots_per_epoch: config.slots_per_epoch,
            lock_timeout: config.lock_timeout(),
        })
    }

    /// Publish `state` under `state_root`, replacing any state at the same
    /// slot. Returns the shared handle the pipeline keeps writing through.
    ///
    /// Justified and finalized checkpoints only ever move forward.
    pub fn publish(&self, state_root: Root, state: ConsensusState) -> SharedState {
        let slot = state.slot;
        let finalized = state.finalized_checkpoint;
        let justified = state.current_justified_checkpoint;
        let shared = Arc::new(RwLock::new(state));

        let mut index = self.index.write();
        index.by_root.retain(|_, s| *s != slot);
        index.by_root.insert(state_root, slot);
        index.by_slot.insert(slot, Arc::clone(&shared));
        if finalized.epoch >= index.finalized.0 {
            index.finalized = (finalized.epoch, finalized.root);
        }
        if justified.epoch >= index.justified.0 {
            index.justified = (justified.epoch, justified.root);
        }

        info!(
            "[qc-18] Published state at slot {} (root 0x{})",
            slot,
            hex::encode(&state_root[..4])
        );
        shared
    }

    pub fn head_slot(&self) -> Option<Slot> {
        self.index.read().head_slot()
    }

    pub fn len(&self) -> usize {
        self.index.read().by_slot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().by_slot.is_empty()
    }

    fn view(&self, shared: SharedState) -> BeaconStateView {
        BeaconStateView::new(shared, self.slots_per_epoch).with_lock_timeout(self.lock_timeout)
    }

    /// State at a checkpoint: by block root when indexed, else the first
    /// published slot of the checkpoint epoch.
    fn checkpoint_state(
        &self,
        index: &StoreIndex,
        (epoch, root): (Epoch, Root),
    ) -> Option<SharedState> {
        if let Some(slot) = index.by_root.get(&root) {
            return index.by_slot.get(slot).cloned();
        }
        let start = epoch.checked_mul(self.slots_per_epoch)?;
        index.by_slot.range(start..).next().map(|(_, s)| Arc::clone(s))
    }
}

#[async_trait]
impl StateProvider for InMemoryStateStore {
    async fn resolve_state(&self, state_id: &StateId) -> Result<BeaconStateView, StateFetchError> {
        let not_found = || StateFetchError::NotFound {
            state_id: state_id.to_string(),
        };
        let index = self.index.read();

        let shared = match state_id {
            StateId::Head => index.by_slot.values().next_back().cloned(),
            StateId::Genesis => index.by_slot.get(&0).cloned(),
            StateId::Finalized => self.checkpoint_state(&index, index.finalized),
            StateId::Justified => self.checkpoint_state(&index, index.justified),
            StateId::Slot(slot) => {
                let head = index.head_slot().ok_or_else(not_found)?;
                if *slot > head {
                    return Err(StateFetchError::FutureSlot {
                        requested: *slot,
                        head,
                    });
                }
                index.by_slot.get(slot).cloned()
            }
            StateId::Root(root) => match index.by_root.get(root) {
                Some(slot) => Some(index.by_slot.get(slot).cloned().ok_or_else(|| {
                    StateFetchError::Store {
                        reason: format!("root index points at missing slot {}", slot),
                    }
                })?),
                None => None,
            },
        };

        let shared = shared.ok_or_else(not_found)?;
        debug!("[qc-18] Resolved state {}", state_id);
        Ok(self.view(shared))
    }

    async fn finalized_epoch(&self) -> Epoch {
        self.index.read().finalized.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Checkpoint, ForkVersion, PublicKey, Validator};

    fn state_at(slot: Slot) -> ConsensusState {
        let mut state = ConsensusState::genesis(
            ForkVersion::Altair,
            vec![Validator::new(PublicKey([7; 48]), 32)],
        )
        .unwrap();
        state.slot = slot;
        state
    }

    fn store() -> InMemoryStateStore {
        InMemoryStateStore::new(&AnalyticsConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_head_genesis_and_slot() {
        let store = store();
        store.publish([0; 32], state_at(0));
        store.publish([1; 32], state_at(64));

        let head = store.resolve_state(&StateId::Head).await.unwrap();
        assert_eq!(head.slot().unwrap(), 64);
        let genesis = store.resolve_state(&StateId::Genesis).await.unwrap();
        assert_eq!(genesis.slot().unwrap(), 0);
        let by_root = store.resolve_state(&StateId::Root([1; 32])).await.unwrap();
        assert_eq!(by_root.slot().unwrap(), 64);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_future_slot_and_missing_slot() {
        let store = store();
        store.publish([0; 32], state_at(0));
        store.publish([1; 32], state_at(64));

        assert_eq!(
            store.resolve_state(&StateId::Slot(65)).await.unwrap_err(),
            StateFetchError::FutureSlot {
                requested: 65,
                head: 64
            }
        );
        assert_eq!(
            store.resolve_state(&StateId::Slot(10)).await.unwrap_err(),
            StateFetchError::NotFound {
                state_id: "10".into()
            }
        );
    }

    #[tokio::test]
    async fn test_empty_store_reports_not_found() {
        let store = store();
        assert!(store.is_empty());
        assert!(matches!(
            store.resolve_state(&StateId::Head).await,
            Err(StateFetchError::NotFound { .. })
        ));
        assert!(matches!(
            store.resolve_state(&StateId::Slot(0)).await,
            Err(StateFetchError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_finalized_checkpoint_tracking() {
        let store = store();
        store.publish([0; 32], state_at(0));
        store.publish([1; 32], state_at(32));
        let mut head = state_at(96);
        head.finalized_checkpoint = Checkpoint::new(1, [1; 32]);
        store.publish([3; 32], head);

        assert_eq!(store.finalized_epoch().await, 1);
        let finalized = store.resolve_state(&StateId::Finalized).await.unwrap();
        assert_eq!(finalized.slot().unwrap(), 32);

        // an older checkpoint never moves finality back
        store.publish([4; 32], state_at(128));
        assert_eq!(store.finalized_epoch().await, 1);
    }

    #[tokio::test]
    async fn test_pipeline_writes_are_visible_through_views() {
        let store = store();
        let shared = store.publish([0; 32], state_at(0));
        let view = store.resolve_state(&StateId::Head).await.unwrap();

        shared.write().balances[0] = 5;
        assert_eq!(view.balances().unwrap(), vec![5]);
    }
}
