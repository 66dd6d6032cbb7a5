//! Gating of agent intent updates
//!
//! The agent's shared state is rewritten for many reasons that have nothing
//! to do with the filter. [`evaluate`] decides whether an incoming intent is
//! worth a reconciliation cycle. It is pure and runs on every update.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter::{FilterIntent, ResolvedFilter};

/// Canonical serialization of an intent (or of its absence)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentSignature(String);

impl IntentSignature {
    pub fn of(intent: Option<&FilterIntent>) -> Self {
        // Field order is fixed by the struct definition, so equal intents
        // always serialize to equal bytes.
        let encoded = serde_json::to_string(&intent).unwrap_or_else(|e| {
            tracing::warn!("Failed to encode filter intent signature: {}", e);
            String::from("null")
        });
        Self(encoded)
    }

    pub fn is_absent(&self) -> bool {
        self.0 == "null"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IntentSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Same bytes as the last processed intent
    Unchanged,
    /// No intent now and none before
    NothingToClear,
    /// Agent state was cleared between turns while a filter is in effect
    TransientClear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeDecision {
    Proceed { signature: IntentSignature },
    Skip(SkipReason),
}

impl ChangeDecision {
    pub fn should_proceed(&self) -> bool {
        matches!(self, Self::Proceed { .. })
    }
}

/// Decide whether `intent` warrants a new reconciliation cycle
///
/// A skip never replaces the remembered signature, so an intent that comes
/// back after a transient clear is still recognized as unchanged.
pub fn evaluate(
    intent: Option<&FilterIntent>,
    last_signature: Option<&IntentSignature>,
    established: Option<&ResolvedFilter>,
) -> ChangeDecision {
    let signature = IntentSignature::of(intent);

    if last_signature == Some(&signature) {
        return ChangeDecision::Skip(SkipReason::Unchanged);
    }

    let previous_absent = last_signature.is_none_or(IntentSignature::is_absent);
    if intent.is_none() && previous_absent {
        return ChangeDecision::Skip(SkipReason::NothingToClear);
    }

    if intent.is_none() && established.is_some() {
        return ChangeDecision::Skip(SkipReason::TransientClear);
    }

    ChangeDecision::Proceed { signature }
}
