//! The agent's shared state, as seen from the dashboard
//!
//! The conversational agent owns this store. The dashboard reads the
//! `activeFilter` intent from it and writes exactly one thing back: the
//! resolved filter, so the next agent turn sees what is actually in effect.

use std::sync::Arc;

use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_stream::{StreamExt, wrappers::WatchStream};

use crate::filter::{FilterIntent, ResolvedFilter};

/// Snapshot of the agent's shared state
///
/// Keys other than `activeFilter` belong to the agent and are carried
/// through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSharedState {
    #[serde(default)]
    pub active_filter: Option<FilterIntent>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Single-writer handle over the agent's shared state
#[derive(Debug, Clone)]
pub struct AgentStateChannel {
    tx: Arc<watch::Sender<AgentSharedState>>,
}

impl Default for AgentStateChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentStateChannel {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AgentSharedState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Agent side: replace the whole shared state
    pub fn replace(&self, state: AgentSharedState) {
        self.tx.send_replace(state);
    }

    /// Agent side: set or clear the filter intent
    pub fn publish_intent(&self, intent: Option<FilterIntent>) {
        self.tx.send_modify(|state| state.active_filter = intent);
    }

    /// Agent side: write an unrelated key
    pub fn set_extra(&self, key: impl Into<String>, value: serde_json::Value) {
        self.tx.send_modify(|state| {
            state.extra.insert(key.into(), value);
        });
    }

    /// Dashboard side: record the effective filter for the agent to read
    pub fn write_back(&self, resolved: &ResolvedFilter) {
        let intent = resolved.as_intent();
        tracing::debug!("Writing resolved filter back to agent state: {}", resolved.describe());
        self.tx.send_modify(|state| state.active_filter = Some(intent));
    }

    pub fn active_filter(&self) -> Option<FilterIntent> {
        self.tx.borrow().active_filter.clone()
    }

    pub fn snapshot(&self) -> AgentSharedState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AgentSharedState> {
        self.tx.subscribe()
    }

    /// The agent's intent as it changes
    ///
    /// Yields the current intent first, then the latest intent after each
    /// wake-up. Writes that land close together are coalesced, so
    /// intermediate states may be skipped and only the newest is seen.
    /// Writes that did not touch the filter still yield an item.
    pub fn intents(&self) -> impl Stream<Item = Option<FilterIntent>> + Send + Unpin + 'static {
        WatchStream::new(self.subscribe()).map(|state| state.active_filter)
    }
}
