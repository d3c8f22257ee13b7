use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::ignition_hal::{TableError, TableRef};

pub const TRACE_HISTORY_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnitionEvent {
    InvalidTableChecksum { table: TableRef },
    TableLoadFailed { table: TableRef, error: TableError },
}

/// Destination for diagnostic trace events.
pub trait TraceSink {
    fn trace(&mut self, event: &IgnitionEvent);
}

/// Drops every event. Used when the build has no trace transport.
pub struct NoopTrace;

impl TraceSink for NoopTrace {
    fn trace(&mut self, _event: &IgnitionEvent) {}
}

/// Forwards events to the `log` facade.
pub struct LogTrace;

impl TraceSink for LogTrace {
    fn trace(&mut self, event: &IgnitionEvent) {
        match event {
            IgnitionEvent::InvalidTableChecksum { table } => {
                log::error!("Event: <IGNITION> Error loading {:?} table [INVALID_CRC]", table.slot);
            }
            IgnitionEvent::TableLoadFailed { table, error } => {
                log::error!("Event: <IGNITION> Error loading {:?} table [{:?}]", table.slot, error);
            }
        }
    }
}

/// Keeps the most recent events along with a running count.
pub struct RecordingTrace {
    events: Vec<IgnitionEvent, TRACE_HISTORY_SIZE>,
    total: u32,
}

impl RecordingTrace {
    pub const fn new() -> Self {
        Self {
            events: Vec::new(),
            total: 0,
        }
    }

    pub fn events(&self) -> &[IgnitionEvent] {
        &self.events
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.total = 0;
    }
}

impl Default for RecordingTrace {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceSink for RecordingTrace {
    fn trace(&mut self, event: &IgnitionEvent) {
        if self.events.is_full() {
            self.events.remove(0);
        }

        let _ = self.events.push(*event);
        self.total = self.total.saturating_add(1);
    }
}
