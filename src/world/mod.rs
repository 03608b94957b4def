//! The simulation kernel: entities and inventories, the event bus, the
//! bartering pipeline, and the world-state manager that ties them together.
//! Everything here is in-memory and driven by explicit method calls; the
//! engine module owns construction and the update loop.

pub mod catalog;
pub mod clock;
pub mod errors;
pub mod events;
pub mod inventory;
pub mod roster;
pub mod seed_loader;
pub mod state;
pub mod trade;
pub mod types;

pub use catalog::{ItemCatalog, GOLD_COIN};
pub use clock::{TimeAdvance, TimePeriod, WorldClock};
pub use errors::WorldError;
pub use events::{event_types, EventBus, GameEvent, ListenerCount, MAX_EVENT_HISTORY};
pub use inventory::Inventory;
pub use roster::Roster;
pub use seed_loader::{
    load_characters, load_item_catalog, starter_character_seeds, starter_item_records,
    write_starter_seeds, CharacterSeed,
};
pub use state::{NpcState, WorldState, MOOD_DRIFT_PER_TICK};
pub use trade::{
    validate, PlannedTransfer, TradeOutcome, TradePlan, TradeProposal, TradeRejection,
    TradeStatus, TradeType, TransferDirection,
};
pub use types::{Attributes, Character, CharacterKind, CharacterSummary, Item, ItemRecord};
