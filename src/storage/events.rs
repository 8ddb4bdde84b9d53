// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use tokio::sync::broadcast;
use tracing::trace;

use super::traits::EventSink;
use crate::dispatch::SyncEvent;

/// Fan-out event sink over a tokio broadcast channel.
///
/// Publishing never blocks and never fails; with no subscribers the event is
/// dropped, and slow subscribers see `Lagged` rather than stalling the writer.
pub struct BroadcastEvents {
    sender: broadcast::Sender<SyncEvent>,
}

impl BroadcastEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastEvents {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventSink for BroadcastEvents {
    fn publish(&self, event: SyncEvent) {
        if self.sender.send(event).is_err() {
            trace!("No event subscribers");
        }
    }
}
