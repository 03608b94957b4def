//! In-process publish/subscribe event bus.
//!
//! Systems announce world changes by event-type string; any number of
//! handlers may subscribe per type and run in registration order. Handler
//! failures are isolated: a failing handler is logged and skipped, and never
//! prevents later handlers from running or propagates to the emitter.
//!
//! The bus keeps a bounded history of recent events for debugging and for
//! subscribers that attach late. It is an explicitly constructed instance
//! owned by the world state, not ambient global state, so tests can build
//! isolated buses per scenario.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinSet;

use crate::logutil::escape_log;

/// Well-known event type names emitted by the world systems.
pub mod event_types {
    pub const TIME_CHANGED: &str = "time_changed";
    pub const NPC_BEHAVIOR_CHANGED: &str = "npc_behavior_changed";
    pub const CHARACTER_INTERACTION: &str = "character_interaction";
    pub const RELATIONSHIP_CHANGED: &str = "relationship_changed";
    pub const TRADE_COMPLETED: &str = "trade_completed";
    pub const TRADE_FAILED: &str = "trade_failed";
    pub const GAME_INITIALIZED: &str = "game_initialized";
    pub const GAME_SHUTDOWN: &str = "game_shutdown";
}

/// Number of events retained in the history buffer; oldest evicted first.
pub const MAX_EVENT_HISTORY: usize = 1000;

/// An event record: type, wall-clock timestamp, and a JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub data: Value,
}

impl GameEvent {
    pub fn new(event_type: &str, data: Value) -> Self {
        Self {
            event_type: event_type.to_string(),
            timestamp: Utc::now(),
            data,
        }
    }
}

type SyncHandler = Box<dyn Fn(&GameEvent) -> anyhow::Result<()> + Send + Sync>;
type BoxedEventFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;
type AsyncHandler = Arc<dyn Fn(GameEvent) -> BoxedEventFuture + Send + Sync>;

/// Handler counts for one event type, for debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListenerCount {
    pub sync: usize,
    pub r#async: usize,
}

/// Publish/subscribe dispatcher with bounded history.
#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<String, Vec<SyncHandler>>,
    async_listeners: HashMap<String, Vec<AsyncHandler>>,
    history: VecDeque<GameEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a synchronous handler for an event type. Handlers for a type
    /// run in registration order on every emit of that type.
    pub fn subscribe<F>(&mut self, event_type: &str, handler: F)
    where
        F: Fn(&GameEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.listeners
            .entry(event_type.to_string())
            .or_default()
            .push(Box::new(handler));
        debug!("subscribed sync handler to event type: {}", event_type);
    }

    /// Register an asynchronous handler for an event type. Async handlers are
    /// launched concurrently by [`EventBus::emit_async`] and make no ordering
    /// promises among themselves.
    pub fn subscribe_async<F, Fut>(&mut self, event_type: &str, handler: F)
    where
        F: Fn(GameEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let handler: AsyncHandler =
            Arc::new(move |event| -> BoxedEventFuture { Box::pin(handler(event)) });
        self.async_listeners
            .entry(event_type.to_string())
            .or_default()
            .push(handler);
        debug!("subscribed async handler to event type: {}", event_type);
    }

    /// Emit an event synchronously: record it, then invoke every sync handler
    /// for its type in order. Never fails; handler errors are logged and
    /// swallowed.
    pub fn emit(&mut self, event_type: &str, data: Value) {
        let event = GameEvent::new(event_type, data);
        self.record(event.clone());
        self.run_sync_handlers(&event);
    }

    /// Emit an event with async delivery: record it, run sync handlers first
    /// (same isolation rule), then launch every async handler for the type
    /// concurrently and wait for all of them to finish. Individual failures
    /// are collected and logged, never raised.
    pub async fn emit_async(&mut self, event_type: &str, data: Value) {
        let event = GameEvent::new(event_type, data);
        self.record(event.clone());
        self.run_sync_handlers(&event);

        let handlers: Vec<AsyncHandler> = self
            .async_listeners
            .get(event_type)
            .map(|list| list.to_vec())
            .unwrap_or_default();
        if handlers.is_empty() {
            return;
        }

        let mut tasks = JoinSet::new();
        for handler in handlers {
            let event = event.clone();
            tasks.spawn(async move { handler(event).await });
        }

        let event_type = event_type.to_string();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(
                    "async handler failed for event {}: {}",
                    event_type,
                    escape_log(&err.to_string())
                ),
                Err(err) => warn!("async handler for event {} panicked: {}", event_type, err),
            }
        }
    }

    fn run_sync_handlers(&self, event: &GameEvent) {
        if let Some(handlers) = self.listeners.get(&event.event_type) {
            for handler in handlers {
                if let Err(err) = handler(event) {
                    warn!(
                        "handler failed for event {}: {}",
                        event.event_type,
                        escape_log(&err.to_string())
                    );
                }
            }
        }
    }

    fn record(&mut self, event: GameEvent) {
        if self.history.len() >= MAX_EVENT_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(event);
    }

    /// The most recent `limit` events, optionally filtered by type,
    /// most-recent-last.
    pub fn get_event_history(&self, event_type: Option<&str>, limit: usize) -> Vec<GameEvent> {
        let matching: Vec<&GameEvent> = match event_type {
            Some(wanted) => self
                .history
                .iter()
                .filter(|e| e.event_type == wanted)
                .collect(),
            None => self.history.iter().collect(),
        };
        let skip = matching.len().saturating_sub(limit);
        matching.into_iter().skip(skip).cloned().collect()
    }

    /// Total number of recorded events still in the buffer.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        info!("event history cleared");
    }

    /// Drop every handler registered for an event type.
    pub fn clear_handlers(&mut self, event_type: &str) {
        self.listeners.remove(event_type);
        self.async_listeners.remove(event_type);
    }

    /// Handler counts for one event type.
    pub fn listener_count(&self, event_type: &str) -> ListenerCount {
        ListenerCount {
            sync: self.listeners.get(event_type).map_or(0, Vec::len),
            r#async: self.async_listeners.get(event_type).map_or(0, Vec::len),
        }
    }

    /// Total handler count across all event types.
    pub fn total_listeners(&self) -> usize {
        self.listeners.values().map(Vec::len).sum::<usize>()
            + self.async_listeners.values().map(Vec::len).sum::<usize>()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("event_types", &self.listeners.keys().len())
            .field("async_event_types", &self.async_listeners.keys().len())
            .field("history_len", &self.history.len())
            .finish()
    }
}
