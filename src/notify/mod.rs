//! Outbound broadcast collaborator. Delivery is best-effort: the economy
//! core never depends on a notification arriving.

use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastAction {
    NewEntry,
    ScoreUpdated,
    Settled,
}

impl BroadcastAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BroadcastAction::NewEntry => "NEW_ENTRY",
            BroadcastAction::ScoreUpdated => "SCORE_UPDATED",
            BroadcastAction::Settled => "SETTLED",
        }
    }
}

pub trait Broadcaster: Send + Sync {
    fn notify(&self, tournament_id: i64, action: BroadcastAction);
}

/// Default collaborator: logs the event for a relay process to pick up.
pub struct LogBroadcaster;

impl Broadcaster for LogBroadcaster {
    fn notify(&self, tournament_id: i64, action: BroadcastAction) {
        log::info!("broadcast tournament={tournament_id} action={}", action.as_str());
    }
}

/// Records every notification; used by tests to assert on emitted events.
#[derive(Default)]
pub struct RecordingBroadcaster {
    events: Mutex<Vec<(i64, BroadcastAction)>>,
}

impl RecordingBroadcaster {
    pub fn events(&self) -> Vec<(i64, BroadcastAction)> {
        self.events.lock().expect("broadcast log poisoned").clone()
    }
}

impl Broadcaster for RecordingBroadcaster {
    fn notify(&self, tournament_id: i64, action: BroadcastAction) {
        self.events
            .lock()
            .expect("broadcast log poisoned")
            .push((tournament_id, action));
    }
}
