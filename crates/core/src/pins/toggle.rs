use log::warn;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::broadcast::Receiver;

use crate::errors::CoreError;
use crate::models::pin::PinEvent;

use super::manager::PinSetManager;

/// Checked state of one rendered toggle control.
///
/// The same coin can have a toggle in the list and another in the modal.
/// Each keeps itself current from the manager's change events; if it falls
/// too far behind it re-reads the persisted set instead.
#[derive(Debug)]
pub struct PinToggle {
    id: String,
    checked: bool,
    events: Receiver<PinEvent>,
}

impl PinToggle {
    pub(crate) fn new(id: &str, checked: bool, events: Receiver<PinEvent>) -> Self {
        Self {
            id: id.to_string(),
            checked,
            events,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Apply pending change events and return the resulting state.
    pub fn refresh(&mut self, manager: &PinSetManager) -> Result<bool, CoreError> {
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    if let Some(checked) = event.checked_state_for(&self.id) {
                        self.checked = checked;
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Toggle for {} missed {skipped} pin events; re-reading", self.id);
                    self.events = self.events.resubscribe();
                    self.checked = manager.sync_toggle_state(&self.id)?;
                    return Ok(self.checked);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        Ok(self.checked)
    }
}
