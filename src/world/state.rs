//! World-state manager: the clock, per-NPC behavioral state, and the entry
//! point that turns trade proposals into committed or rejected transactions.
//!
//! All world mutation funnels through here so every change is announced on
//! the owned [`EventBus`]. Subscribers (logging, persistence, analytics)
//! attach to the bus without this module knowing who listens.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::world::catalog::ItemCatalog;
use crate::world::clock::WorldClock;
use crate::world::events::{event_types, EventBus};
use crate::world::roster::Roster;
use crate::world::trade::{self, TradeOutcome, TradeProposal, TradeRejection};

/// Mood adjustment applied to every tracked NPC on each update tick:
/// positive during day time, negative at night, clamped to [-1, 1].
pub const MOOD_DRIFT_PER_TICK: f64 = 0.1;

/// Behavioral state for one NPC. Created lazily on first reference and kept
/// for the life of the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcState {
    /// Current mood in [-1, 1].
    pub mood: f64,
    /// Free-form activity label ("idle", "patrolling", ...).
    pub activity: String,
    /// Opaque behavior data merged in by the agent layer.
    pub behavior_data: HashMap<String, Value>,
    pub last_interaction: Option<DateTime<Utc>>,
    pub interaction_count: u64,
}

impl Default for NpcState {
    fn default() -> Self {
        Self {
            mood: 0.0,
            activity: "idle".to_string(),
            behavior_data: HashMap::new(),
            last_interaction: None,
            interaction_count: 0,
        }
    }
}

/// Owns the world clock, NPC behavioral states, and the event bus.
#[derive(Debug)]
pub struct WorldState {
    clock: WorldClock,
    events: EventBus,
    npc_states: HashMap<u32, NpcState>,
    started_at: DateTime<Utc>,
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new(WorldClock::default())
    }
}

impl WorldState {
    pub fn new(clock: WorldClock) -> Self {
        info!("world state initialized at {}", clock.display());
        Self {
            clock,
            events: EventBus::new(),
            npc_states: HashMap::new(),
            started_at: Utc::now(),
        }
    }

    pub fn clock(&self) -> &WorldClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut WorldClock {
        &mut self.clock
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn npc_states(&self) -> &HashMap<u32, NpcState> {
        &self.npc_states
    }

    /// Get or lazily create the behavioral state for an NPC.
    pub fn npc_state(&mut self, npc_id: u32) -> &mut NpcState {
        self.npc_states.entry(npc_id).or_default()
    }

    /// Advance world systems by `delta_seconds` of real time.
    ///
    /// The clock cascades first; a time-change event fires iff the hour or
    /// day changed. Mood drift then runs unconditionally for every tracked
    /// NPC, regardless of whether the clock rolled over.
    pub fn update(&mut self, delta_seconds: f64) {
        let advance = self.clock.advance(delta_seconds);
        if advance.rolled_over() {
            self.events.emit(
                event_types::TIME_CHANGED,
                json!({
                    "old_hour": advance.old_hour,
                    "new_hour": advance.new_hour,
                    "old_day": advance.old_day,
                    "new_day": advance.new_day,
                    "time_period": self.clock.time_period(),
                    "is_day_time": self.clock.is_day_time(),
                }),
            );
        }

        let modifier = if self.clock.is_day_time() {
            MOOD_DRIFT_PER_TICK
        } else {
            -MOOD_DRIFT_PER_TICK
        };
        for state in self.npc_states.values_mut() {
            state.mood = (state.mood + modifier).clamp(-1.0, 1.0);
        }
    }

    /// Set an NPC's activity label, merging any behavior data into its map
    /// (new keys overwrite, others are preserved). A behavior-changed event
    /// fires only when the label actually changed.
    pub fn update_npc_activity(
        &mut self,
        npc_id: u32,
        activity: &str,
        behavior_data: Option<HashMap<String, Value>>,
    ) {
        let state = self.npc_states.entry(npc_id).or_default();
        let old_activity = std::mem::replace(&mut state.activity, activity.to_string());
        if let Some(data) = &behavior_data {
            state.behavior_data.extend(data.clone());
        }

        if old_activity != activity {
            self.events.emit(
                event_types::NPC_BEHAVIOR_CHANGED,
                json!({
                    "npc_id": npc_id,
                    "old_activity": old_activity,
                    "new_activity": activity,
                    "behavior_data": behavior_data,
                }),
            );
        }
    }

    /// Stamp an NPC/player interaction and announce the running count.
    pub fn record_interaction(&mut self, npc_id: u32, player_id: u32) {
        let now = Utc::now();
        let state = self.npc_states.entry(npc_id).or_default();
        state.last_interaction = Some(now);
        state.interaction_count += 1;
        let interaction_count = state.interaction_count;

        self.events.emit(
            event_types::CHARACTER_INTERACTION,
            json!({
                "npc_id": npc_id,
                "player_id": player_id,
                "interaction_count": interaction_count,
                "timestamp": now,
            }),
        );
    }

    /// Announce a relationship shift between an NPC and a player. The actual
    /// attribute change is applied by whoever owns the character entity.
    pub fn update_relationship(&mut self, npc_id: u32, player_id: u32, change: f64) {
        self.events.emit(
            event_types::RELATIONSHIP_CHANGED,
            json!({
                "npc_id": npc_id,
                "player_id": player_id,
                "change": change,
            }),
        );
    }

    /// Orchestration entry point for a trade proposal: resolve participants,
    /// run the validate/commit pipeline, mark the proposal processed, and
    /// emit a trade-completed or trade-failed event for the outcome. Every
    /// failure mode — unknown participants included — surfaces as a
    /// trade-failed event, never as an error to the caller.
    pub fn process_trade_event(
        &mut self,
        proposal: &mut TradeProposal,
        roster: &mut Roster,
        catalog: &ItemCatalog,
    ) -> TradeOutcome {
        info!(
            "processing trade {}: {} between NPC {} and player {}",
            proposal.id, proposal.trade_type, proposal.npc_id, proposal.player_id
        );

        let outcome = if roster.npc_by_id(proposal.npc_id).is_none() {
            TradeOutcome::failed(&TradeRejection::UnknownNpc(proposal.npc_id))
        } else if roster.player_by_id(proposal.player_id).is_none() {
            TradeOutcome::failed(&TradeRejection::UnknownPlayer(proposal.player_id))
        } else {
            match roster.trade_pair_mut(proposal.npc_id, proposal.player_id) {
                Ok((npc, player)) => trade::process(proposal, npc, player, catalog),
                // Both ids resolved above, so this arm covers only roster
                // inconsistencies; report them as a failed trade all the same.
                Err(err) => {
                    TradeOutcome::failed(&TradeRejection::ExecutionConflict(err.to_string()))
                }
            }
        };
        proposal.processed = true;

        if outcome.is_success() {
            self.events.emit(
                event_types::TRADE_COMPLETED,
                json!({
                    "npc_id": proposal.npc_id,
                    "player_id": proposal.player_id,
                    "trade_type": proposal.trade_type,
                    "items": outcome.items,
                    "transaction": outcome.transaction,
                }),
            );
            info!(
                target: "events",
                "EVENT: trade | PLAYER_ID: {} | NPC_ID: {} | EFFECTS: {}",
                proposal.player_id,
                proposal.npc_id,
                json!({
                    "trade_type": proposal.trade_type,
                    "items_transferred": outcome.items,
                    "transaction": outcome.transaction,
                    "trade_status": "success",
                }),
            );
        } else {
            let reason = outcome
                .error_message
                .clone()
                .unwrap_or_else(|| "unknown error".to_string());
            self.events.emit(
                event_types::TRADE_FAILED,
                json!({
                    "npc_id": proposal.npc_id,
                    "player_id": proposal.player_id,
                    "trade_type": proposal.trade_type,
                    "error": reason,
                }),
            );
            warn!(
                target: "events",
                "EVENT: trade | PLAYER_ID: {} | NPC_ID: {} | EFFECTS: {}",
                proposal.player_id,
                proposal.npc_id,
                json!({
                    "trade_type": proposal.trade_type,
                    "error": reason,
                    "trade_status": "failed",
                }),
            );
        }

        outcome
    }

    /// Current world context for external layers (the agent prompt builder).
    pub fn world_context(&self) -> Value {
        json!({
            "time": {
                "hour": self.clock.hour,
                "minute": self.clock.minute,
                "day": self.clock.day,
                "time_period": self.clock.time_period(),
                "is_day_time": self.clock.is_day_time(),
            }
        })
    }

    /// Condensed state block for status displays.
    pub fn state_summary(&self) -> Value {
        json!({
            "time": self.clock.display(),
            "tracked_npcs": self.npc_states.len(),
            "uptime_seconds": (Utc::now() - self.started_at).num_seconds(),
        })
    }
}
