//! Bounded log of recent training events for the UI.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Category of a logged event, used for colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A car hit the track boundary.
    Crash,
    /// A generation started or ended.
    Generation,
    /// A generation beat the best fitness seen so far.
    Record,
}

/// A logged event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// Generation the event belongs to.
    pub generation: u32,
    /// Tick within the generation.
    pub tick: u32,
    /// Human-readable description.
    pub description: String,
    /// Event category.
    pub kind: EventKind,
}

/// Ring of the most recent events, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    events: VecDeque<LoggedEvent>,
    max_events: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(20)
    }
}

impl EventLog {
    /// Creates an empty log keeping at most `max_events` entries.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events,
        }
    }

    /// Records an event, dropping the oldest ones beyond capacity.
    pub fn log(&mut self, generation: u32, tick: u32, description: String, kind: EventKind) {
        self.events.push_front(LoggedEvent {
            generation,
            tick,
            description,
            kind,
        });
        self.events.truncate(self.max_events);
    }

    /// All retained events, newest first.
    pub fn events(&self) -> &VecDeque<LoggedEvent> {
        &self.events
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Removes every event.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
