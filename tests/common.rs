//! Test utilities & fixtures.
//! Builds a throwaway seed tree (starter items + characters) in a temp dir
//! and wires a config at it, so each test gets an isolated world.

use emberward::config::Config;
use emberward::engine::GameEngine;
use emberward::world::write_starter_seeds;
use tempfile::TempDir;

/// A default config pointing at freshly written starter seeds in a temp dir.
/// Keep the `TempDir` alive for as long as the config is used.
#[allow(dead_code)] // Each integration suite uses the subset it needs.
pub fn seeded_config() -> (TempDir, Config) {
    let tmp = TempDir::new().expect("tempdir");
    write_starter_seeds(tmp.path()).expect("write starter seeds");

    let mut config = Config::default();
    config.seeds.data_dir = tmp.path().to_string_lossy().to_string();
    config.logging.file = None;
    config.logging.events_file = None;
    (tmp, config)
}

/// An initialized engine over the starter world: one merchant NPC (id 1,
/// 3 Health Potions / 2 Wood Shields / 1 Iron Sword / 100 Gold Coins) and
/// one player (id 100, 50 Gold Coins / 1 Old Locket).
#[allow(dead_code)] // Not every integration suite builds a full engine.
pub fn seeded_engine() -> (TempDir, GameEngine) {
    let (tmp, config) = seeded_config();
    let mut engine = GameEngine::new(config);
    engine.initialize().expect("engine initialize");
    (tmp, engine)
}
