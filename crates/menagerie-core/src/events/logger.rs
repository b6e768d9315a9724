//! Event Logger
//!
//! Append-only JSONL event logging, plus the resource systems push typed
//! payloads into during a tick.

use bevy_ecs::prelude::*;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use menagerie_events::{Event, EventPayload};

/// Resource: payloads accumulated by systems during the current tick.
/// The facade drains them into numbered [`Event`]s.
#[derive(Resource, Debug, Default)]
pub struct PendingEvents {
    pending: Vec<(u64, EventPayload)>,
    next_event_id: u64,
}

impl PendingEvents {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_event_id: 1,
        }
    }

    pub fn push(&mut self, tick: u64, payload: EventPayload) {
        self.pending.push((tick, payload));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Turn the accumulated payloads into numbered events, emptying the
    /// queue.
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.pending)
            .into_iter()
            .map(|(tick, payload)| {
                let event_id = format!("evt_{:08}", self.next_event_id);
                self.next_event_id += 1;
                Event {
                    event_id,
                    tick,
                    payload,
                }
            })
            .collect()
    }
}

/// Append-only JSONL writer for simulation events.
pub struct EventLogger {
    writer: Option<BufWriter<File>>,
    event_count: u64,
}

impl EventLogger {
    /// Create a new event logger writing to the specified path
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            event_count: 0,
        })
    }

    /// Create a logger that discards events (for testing)
    pub fn null() -> Self {
        Self {
            writer: None,
            event_count: 0,
        }
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Log an event to the file
    pub fn log(&mut self, event: &Event) -> std::io::Result<()> {
        self.event_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(event)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    /// Log multiple events
    pub fn log_batch(&mut self, events: &[Event]) -> std::io::Result<()> {
        for event in events {
            self.log(event)?;
        }
        Ok(())
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("failed to flush event logger: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> EventPayload {
        EventPayload::ConnectionFormed {
            agent1: "a".to_string(),
            agent2: "b".to_string(),
            connection: "friend".to_string(),
        }
    }

    #[test]
    fn test_pending_events_number_sequentially() {
        let mut pending = PendingEvents::new();
        pending.push(1, sample_payload());
        pending.push(1, sample_payload());

        let events = pending.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_id, "evt_00000001");
        assert_eq!(events[1].event_id, "evt_00000002");
        assert!(pending.is_empty());

        pending.push(2, sample_payload());
        let more = pending.drain();
        assert_eq!(more[0].event_id, "evt_00000003");
    }

    #[test]
    fn test_null_logger_counts_without_writing() {
        let mut logger = EventLogger::null();
        let event = Event {
            event_id: "evt_00000001".to_string(),
            tick: 0,
            payload: sample_payload(),
        };

        logger.log(&event).unwrap();
        assert_eq!(logger.event_count(), 1);
    }

    #[test]
    fn test_jsonl_round_trip() {
        let dir = std::env::temp_dir().join("menagerie_logger_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("events.jsonl");

        let mut logger = EventLogger::new(&path).unwrap();
        let event = Event {
            event_id: "evt_00000001".to_string(),
            tick: 3,
            payload: sample_payload(),
        };
        logger.log(&event).unwrap();
        logger.flush().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: Event = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
        assert_eq!(parsed, event);

        std::fs::remove_file(&path).ok();
    }
}
