//! Game engine: construction and orchestration of the world systems.
//!
//! The engine owns the configuration, the item catalog, the character roster,
//! and the [`WorldState`]. External layers (CLI, HTTP, agents) drive it
//! through explicit calls — `update` for time, `process_trade` for barter —
//! and observe it through the event bus and the stats accessors.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde_json::{json, Value};
use tokio::time::{interval, Duration};

use crate::config::Config;
use crate::world::{
    event_types, load_characters, load_item_catalog, ItemCatalog, Roster, TradeOutcome,
    TradeProposal, WorldState,
};

pub struct GameEngine {
    config: Config,
    world: WorldState,
    catalog: ItemCatalog,
    roster: Roster,
    is_running: bool,
    initialized_at: Option<DateTime<Utc>>,
}

impl GameEngine {
    /// Build an engine from configuration. Seed data is not touched until
    /// [`GameEngine::initialize`].
    pub fn new(config: Config) -> Self {
        let world = WorldState::new(config.world.clock());
        Self {
            config,
            world,
            catalog: ItemCatalog::new(),
            roster: Roster::new(),
            is_running: false,
            initialized_at: None,
        }
    }

    /// Load seed data, register the built-in event subscriptions, and emit
    /// the initialization event.
    pub fn initialize(&mut self) -> Result<()> {
        info!("Initializing game engine...");

        let catalog = load_item_catalog(self.config.seeds.items_dir())
            .context("loading item catalog")?;
        let characters = load_characters(self.config.seeds.characters_dir(), &catalog)
            .context("loading characters")?;

        let mut roster = Roster::new();
        for character in characters {
            if let Err(err) = roster.push(character) {
                warn!("skipping character: {}", err);
            }
        }
        if roster.npc_count() == 0 {
            warn!("no NPCs loaded; trades will have no counterparty");
        }
        if roster.player_count() == 0 {
            warn!("no players loaded");
        }

        self.catalog = catalog;
        self.roster = roster;
        self.setup_event_handlers();

        self.world.events_mut().emit(
            event_types::GAME_INITIALIZED,
            json!({
                "game": self.config.game.name,
                "npcs": self.roster.npc_count(),
                "players": self.roster.player_count(),
                "items": self.catalog.len(),
            }),
        );

        self.is_running = true;
        self.initialized_at = Some(Utc::now());
        info!(
            "Game engine initialized: {} NPCs, {} players, {} item records",
            self.roster.npc_count(),
            self.roster.player_count(),
            self.catalog.len()
        );
        Ok(())
    }

    /// Built-in subscriptions: the engine narrates notable world changes to
    /// the log, the same way any external subscriber would.
    fn setup_event_handlers(&mut self) {
        let events = self.world.events_mut();

        events.subscribe(event_types::TIME_CHANGED, |event| {
            if event.data["new_day"] != event.data["old_day"] {
                info!("New day started: Day {}", event.data["new_day"]);
            }
            Ok(())
        });

        events.subscribe(event_types::TRADE_COMPLETED, |event| {
            info!(
                "Trade completed between NPC {} and player {}",
                event.data["npc_id"], event.data["player_id"]
            );
            Ok(())
        });

        events.subscribe(event_types::CHARACTER_INTERACTION, |event| {
            debug!(
                "Character interaction: NPC {} with player {}",
                event.data["npc_id"], event.data["player_id"]
            );
            Ok(())
        });
    }

    /// Advance all world systems by `delta_seconds`. No-op until initialized.
    pub fn update(&mut self, delta_seconds: f64) {
        if !self.is_running {
            return;
        }
        self.world.update(delta_seconds);
    }

    /// Run a trade proposal through the pipeline against the loaded roster.
    pub fn process_trade(&mut self, proposal: &mut TradeProposal) -> TradeOutcome {
        self.world
            .process_trade_event(proposal, &mut self.roster, &self.catalog)
    }

    pub fn record_interaction(&mut self, npc_id: u32, player_id: u32) {
        self.world.record_interaction(npc_id, player_id);
    }

    pub fn update_npc_activity(
        &mut self,
        npc_id: u32,
        activity: &str,
        behavior_data: Option<std::collections::HashMap<String, Value>>,
    ) {
        self.world.update_npc_activity(npc_id, activity, behavior_data);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Current game statistics for status displays.
    pub fn game_stats(&self) -> Value {
        json!({
            "engine": {
                "is_running": self.is_running,
                "uptime_seconds": self
                    .initialized_at
                    .map(|t| (Utc::now() - t).num_seconds()),
                "game": self.config.game.name,
            },
            "state": self.world.state_summary(),
            "events": {
                "total_events": self.world.events().history_len(),
            },
            "characters": {
                "loaded_npcs": self.roster.npc_count(),
                "loaded_players": self.roster.player_count(),
                "item_records": self.catalog.len(),
            },
        })
    }

    /// Stop the engine: emit the shutdown event, then clear event history.
    pub fn shutdown(&mut self) {
        info!("Shutting down game engine...");
        self.is_running = false;

        let uptime_seconds = self
            .initialized_at
            .map(|t| (Utc::now() - t).num_seconds());
        self.world.events_mut().emit(
            event_types::GAME_SHUTDOWN,
            json!({ "uptime_seconds": uptime_seconds }),
        );
        self.world.events_mut().clear_history();
        info!("Game engine shutdown complete");
    }

    /// Drive the simulation loop until Ctrl-C, then shut down cleanly.
    pub async fn run(&mut self) -> Result<()> {
        let tick_seconds = self.config.game.tick_seconds;
        let mut ticker = interval(Duration::from_secs_f64(tick_seconds));
        ticker.tick().await; // the first tick is immediate

        info!(
            "{} running: tick every {:.1}s, time scale x{}",
            self.config.game.name, tick_seconds, self.config.world.time_scale
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.update(tick_seconds);
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.shutdown();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::write_starter_seeds;
    use tempfile::TempDir;

    fn seeded_engine() -> (TempDir, GameEngine) {
        let tmp = TempDir::new().unwrap();
        write_starter_seeds(tmp.path()).unwrap();

        let mut config = Config::default();
        config.seeds.data_dir = tmp.path().to_string_lossy().to_string();
        config.logging.file = None;
        config.logging.events_file = None;

        let mut engine = GameEngine::new(config);
        engine.initialize().unwrap();
        (tmp, engine)
    }

    #[test]
    fn initialize_loads_starter_world_and_emits_event() {
        let (_tmp, engine) = seeded_engine();

        assert!(engine.is_running());
        assert_eq!(engine.roster().npc_count(), 1);
        assert_eq!(engine.roster().player_count(), 1);
        assert!(engine.catalog().contains("Health Potion"));

        let history = engine
            .world()
            .events()
            .get_event_history(Some(event_types::GAME_INITIALIZED), 10);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].data["npcs"], 1);
    }

    #[test]
    fn update_before_initialize_is_a_no_op() {
        let mut engine = GameEngine::new(Config::default());
        let before = *engine.world().clock();
        engine.update(3600.0);
        assert_eq!(*engine.world().clock(), before);
    }

    #[test]
    fn shutdown_emits_and_clears_history() {
        let (_tmp, mut engine) = seeded_engine();
        engine.shutdown();

        assert!(!engine.is_running());
        assert_eq!(engine.world().events().history_len(), 0);
    }
}
