use crate::domain::model::{Event, Participant};
use crate::domain::ports::EventStore;
use crate::utils::error::{MeetError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// 最少參與者數，少於此數無法定案
pub const MIN_PARTICIPANTS_TO_FINALIZE: usize = 2;

/// In-memory event store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventStore {
    events: Arc<RwLock<HashMap<String, Event>>>,
    sequence: Arc<AtomicU64>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let millis = chrono::Utc::now().timestamp_millis() as u64;
        format!("{:08x}{:04x}", millis & 0xffff_ffff, seq & 0xffff)
    }
}

impl EventStore for MemoryEventStore {
    async fn create(&self, title: &str) -> Result<Event> {
        let title = match title.trim() {
            "" => "Untitled".to_string(),
            t => t.to_string(),
        };
        let event = Event {
            id: self.next_id(),
            title,
            participants: Vec::new(),
            is_final: false,
            created_at: chrono::Utc::now(),
        };
        let mut events = self.events.write().await;
        events.insert(event.id.clone(), event.clone());
        tracing::info!("📝 Created event {} ({})", event.id, event.title);
        Ok(event)
    }

    async fn get(&self, id: &str) -> Result<Event> {
        let events = self.events.read().await;
        events
            .get(id)
            .cloned()
            .ok_or_else(|| MeetError::EventNotFound { id: id.to_string() })
    }

    async fn append(&self, id: &str, participant: Participant) -> Result<usize> {
        participant.location.validate()?;
        let mut events = self.events.write().await;
        let event = events
            .get_mut(id)
            .ok_or_else(|| MeetError::EventNotFound { id: id.to_string() })?;
        if event.is_final {
            return Err(MeetError::EventStateError {
                id: id.to_string(),
                message: "event is already finalized".to_string(),
            });
        }
        event.participants.push(Participant {
            name: participant.name.trim().to_string(),
            location: participant.location,
        });
        Ok(event.participants.len())
    }

    async fn finalize(&self, id: &str) -> Result<Event> {
        let mut events = self.events.write().await;
        let event = events
            .get_mut(id)
            .ok_or_else(|| MeetError::EventNotFound { id: id.to_string() })?;
        if event.participants.len() < MIN_PARTICIPANTS_TO_FINALIZE {
            return Err(MeetError::invalid_input(format!(
                "need at least {} participants to finalize, event has {}",
                MIN_PARTICIPANTS_TO_FINALIZE,
                event.participants.len()
            )));
        }
        event.is_final = true;
        Ok(event.clone())
    }
}
