/*
[INPUT]:  Listener registrations and protocol events from the streaming client
[OUTPUT]: In-order delivery of each event to its registered listeners
[POS]:    WebSocket layer - in-process publish/subscribe register
[UPDATE]: When adding event kinds or changing delivery semantics
*/

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

/// Names of the events a client emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Connect,
    Disconnect,
    Message,
    Error,
    Authenticated,
    Unauthenticated,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Connect => "connect",
            EventKind::Disconnect => "disconnect",
            EventKind::Message => "message",
            EventKind::Error => "error",
            EventKind::Authenticated => "authenticated",
            EventKind::Unauthenticated => "unauthenticated",
        }
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connect" => Ok(EventKind::Connect),
            "disconnect" => Ok(EventKind::Disconnect),
            "message" => Ok(EventKind::Message),
            "error" => Ok(EventKind::Error),
            "authenticated" => Ok(EventKind::Authenticated),
            "unauthenticated" => Ok(EventKind::Unauthenticated),
            other => Err(format!("unknown event: {other}")),
        }
    }
}

/// Event payloads delivered to listeners
#[derive(Debug, Clone)]
pub enum Event {
    Connect,
    Disconnect { code: Option<u16>, reason: String },
    /// Raw inbound text frame
    Message(String),
    Error(String),
    Authenticated(Value),
    Unauthenticated(Value),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Connect => EventKind::Connect,
            Event::Disconnect { .. } => EventKind::Disconnect,
            Event::Message(_) => EventKind::Message,
            Event::Error(_) => EventKind::Error,
            Event::Authenticated(_) => EventKind::Authenticated,
            Event::Unauthenticated(_) => EventKind::Unauthenticated,
        }
    }
}

pub type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

/// Handle returned by [`EventHub::on`], used to deregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct EventHub {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<EventKind, Vec<(ListenerId, Listener)>>>,
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<EventKind, usize> = self
            .lock()
            .iter()
            .map(|(kind, entries)| (*kind, entries.len()))
            .collect();
        f.debug_struct("EventHub").field("listeners", &counts).finish()
    }
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock()
            .entry(kind)
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Returns false when the listener was not registered for `kind`
    pub fn off(&self, kind: EventKind, id: ListenerId) -> bool {
        let mut guard = self.lock();
        let Some(entries) = guard.get_mut(&kind) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        before != entries.len()
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.lock().get(&kind).map_or(0, Vec::len)
    }

    /// Invoke listeners in registration order. The lock is released first so
    /// listeners may call back into the hub.
    pub fn emit(&self, event: &Event) {
        let listeners: Vec<Listener> = match self.lock().get(&event.kind()) {
            Some(entries) => entries.iter().map(|(_, listener)| listener.clone()).collect(),
            None => return,
        };
        for listener in listeners {
            listener(event);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<EventKind, Vec<(ListenerId, Listener)>>> {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
