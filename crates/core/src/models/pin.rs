use serde::{Deserialize, Serialize};

/// Result of trying to pin a coin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The id was appended to the pinned set
    Added,
    /// The set was already at capacity; nothing was persisted
    AlreadyFull,
    /// The id was already pinned
    NoOp,
}

/// Result of trying to unpin a coin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NoOp,
}

/// Result of swapping one pinned coin for another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Replaced,
    /// The coin to evict was not pinned (another surface removed it first)
    NotPinned,
    /// The candidate was already pinned
    NoOp,
}

/// Change notification published by the pin manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinEvent {
    Added(String),
    Removed(String),
    /// Ids dropped in one pass because the catalog no longer lists them
    Pruned(Vec<String>),
}

impl PinEvent {
    /// Checked state this event implies for the control bound to `id`, if any.
    pub fn checked_state_for(&self, id: &str) -> Option<bool> {
        match self {
            PinEvent::Added(added) if added == id => Some(true),
            PinEvent::Removed(removed) if removed == id => Some(false),
            PinEvent::Pruned(ids) if ids.iter().any(|p| p == id) => Some(false),
            _ => None,
        }
    }
}

/// Data for the "limit reached" dialog: the pinned coins the user may
/// uncheck, followed by the coin that did not fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverflowPrompt {
    pub pinned: Vec<String>,
    pub candidate: String,
}

impl OverflowPrompt {
    /// All ids listed in the dialog, candidate last.
    pub fn entries(&self) -> Vec<&str> {
        self.pinned
            .iter()
            .map(|s| s.as_str())
            .chain(std::iter::once(self.candidate.as_str()))
            .collect()
    }
}

/// Result of a toggle control changing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Pinned,
    Unpinned,
    /// The persisted set already matched the control
    Unchanged,
    /// The set is full; the control stays unchecked and the prompt is shown
    Overflow(OverflowPrompt),
}
