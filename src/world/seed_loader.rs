//! Seed data loaders for data-driven world content.
//!
//! Items and characters are plain JSON files under the seed directory
//! (`items/` and `characters/`), so operators can reshape the world without
//! recompiling. Character files follow the `NPC_*.json` / `Player_*.json`
//! naming convention to pick the behavioral variant.
//!
//! A character referencing an item name missing from the catalog is a
//! recoverable load-time warning — the character loads with that entry
//! skipped, never a fatal error.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::logutil::escape_log;
use crate::world::catalog::{ItemCatalog, GOLD_COIN};
use crate::world::errors::WorldError;
use crate::world::types::{Attributes, Character, CharacterKind, ItemRecord};

/// On-disk character record. Inventory entries use the original config shape:
/// a list of single-entry name→quantity maps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterSeed {
    pub id: u32,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub inventory: Vec<HashMap<String, u32>>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub frontend_config: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub gameplay_config: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub ai_agent_config: Map<String, Value>,
}

/// Load every `*.json` item record under `dir` into a catalog.
pub fn load_item_catalog<P: AsRef<Path>>(dir: P) -> Result<ItemCatalog, WorldError> {
    let dir = dir.as_ref();
    let mut catalog = ItemCatalog::new();

    for path in json_files(dir)? {
        let contents = fs::read_to_string(&path)?;
        let record: ItemRecord =
            serde_json::from_str(&contents).map_err(|e| WorldError::InvalidSeed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        if let Some(previous) = catalog.insert(record) {
            warn!(
                "duplicate item record '{}' in {}; keeping the later one",
                escape_log(&previous.name),
                path.display()
            );
        }
    }

    info!("loaded {} item records from {}", catalog.len(), dir.display());
    Ok(catalog)
}

/// Load every character under `dir`, resolving inventories through the
/// catalog. Files that match neither naming prefix are skipped with a
/// warning, as are inventory entries whose item record is missing.
pub fn load_characters<P: AsRef<Path>>(
    dir: P,
    catalog: &ItemCatalog,
) -> Result<Vec<Character>, WorldError> {
    let dir = dir.as_ref();
    let mut characters = Vec::new();

    for path in json_files(dir)? {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let is_npc = filename.starts_with("NPC_");
        if !is_npc && !filename.starts_with("Player_") {
            warn!("skipping character config with unknown naming pattern: {}", filename);
            continue;
        }

        let contents = fs::read_to_string(&path)?;
        let seed: CharacterSeed =
            serde_json::from_str(&contents).map_err(|e| WorldError::InvalidSeed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let character = build_character(seed, is_npc, catalog);
        info!(
            "loaded {} '{}' (id {})",
            if is_npc { "NPC" } else { "player" },
            escape_log(&character.name),
            character.id
        );
        characters.push(character);
    }

    Ok(characters)
}

fn build_character(seed: CharacterSeed, is_npc: bool, catalog: &ItemCatalog) -> Character {
    let mut attributes = seed.attributes;
    if is_npc && attributes.relationship.is_none() {
        attributes.relationship = Some(0.0);
    }

    let kind = if is_npc {
        CharacterKind::Npc {
            agent_config: seed.ai_agent_config,
        }
    } else {
        CharacterKind::Player
    };

    let mut character = Character {
        id: seed.id,
        name: seed.name,
        role: seed.role,
        kind,
        attributes,
        inventory: Default::default(),
        frontend_config: seed.frontend_config,
        gameplay_config: seed.gameplay_config,
    };

    for entry in &seed.inventory {
        for (item_name, quantity) in entry {
            if let Err(err) = character
                .inventory
                .add_item(catalog, item_name, *quantity)
            {
                warn!(
                    "skipping inventory entry '{}' for {}: {}",
                    escape_log(item_name),
                    escape_log(&character.name),
                    err
                );
            }
        }
    }

    character
}

fn json_files(dir: &Path) -> Result<Vec<std::path::PathBuf>, WorldError> {
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    // Deterministic load order regardless of filesystem.
    paths.sort();
    Ok(paths)
}

// ============================================================================
// Starter content
// ============================================================================

/// Item records seeded by `init`: a small barter-ready economy.
pub fn starter_item_records() -> Vec<ItemRecord> {
    vec![
        ItemRecord {
            id: 1,
            name: GOLD_COIN.to_string(),
            item_type: "Currency".to_string(),
            description: "The coin of the realm; settles every trade.".to_string(),
            icon_pos: (0, 0),
            tradable: true,
            price: 1,
            effect: HashMap::new(),
        },
        ItemRecord {
            id: 2,
            name: "Health Potion".to_string(),
            item_type: "Consumable".to_string(),
            description: "A swirl of red liquid that knits small wounds.".to_string(),
            icon_pos: (2, 0),
            tradable: true,
            price: 10,
            effect: HashMap::from([("heal".to_string(), 20.0)]),
        },
        ItemRecord {
            id: 3,
            name: "Wood Shield".to_string(),
            item_type: "Armor".to_string(),
            description: "Oak planks banded with iron. Better than nothing.".to_string(),
            icon_pos: (4, 1),
            tradable: true,
            price: 25,
            effect: HashMap::from([("defense".to_string(), 5.0)]),
        },
        ItemRecord {
            id: 4,
            name: "Iron Sword".to_string(),
            item_type: "Weapon".to_string(),
            description: "A dependable blade with a worn leather grip.".to_string(),
            icon_pos: (1, 3),
            tradable: true,
            price: 40,
            effect: HashMap::from([("attack".to_string(), 8.0)]),
        },
        ItemRecord {
            id: 5,
            name: "Old Locket".to_string(),
            item_type: "Keepsake".to_string(),
            description: "Tarnished silver. The clasp no longer opens.".to_string(),
            icon_pos: (6, 2),
            tradable: false,
            price: 0,
            effect: HashMap::new(),
        },
    ]
}

/// Character seeds written by `init`: one merchant NPC and one player,
/// stocked so a barter session works out of the box.
pub fn starter_character_seeds() -> Vec<(String, CharacterSeed)> {
    let merchant = CharacterSeed {
        id: 1,
        name: "Garrick".to_string(),
        role: "Merchant".to_string(),
        attributes: Attributes {
            level: 6,
            health: 100,
            relationship: Some(0.1),
            extra: HashMap::new(),
        },
        inventory: vec![
            HashMap::from([("Health Potion".to_string(), 3)]),
            HashMap::from([("Wood Shield".to_string(), 2)]),
            HashMap::from([("Iron Sword".to_string(), 1)]),
            HashMap::from([(GOLD_COIN.to_string(), 100)]),
        ],
        frontend_config: Map::new(),
        gameplay_config: Map::new(),
        ai_agent_config: Map::new(),
    };

    let player = CharacterSeed {
        id: 100,
        name: "Aria".to_string(),
        role: "Warrior".to_string(),
        attributes: Attributes {
            level: 3,
            health: 100,
            relationship: None,
            extra: HashMap::new(),
        },
        inventory: vec![
            HashMap::from([(GOLD_COIN.to_string(), 50)]),
            HashMap::from([("Old Locket".to_string(), 1)]),
        ],
        frontend_config: Map::new(),
        gameplay_config: Map::new(),
        ai_agent_config: Map::new(),
    };

    vec![
        ("NPC_Garrick.json".to_string(), merchant),
        ("Player_Aria.json".to_string(), player),
    ]
}

/// Write the starter items and characters under `dir` (`items/` and
/// `characters/` subdirectories), creating directories as needed.
pub fn write_starter_seeds<P: AsRef<Path>>(dir: P) -> Result<(), WorldError> {
    let dir = dir.as_ref();
    let items_dir = dir.join("items");
    let characters_dir = dir.join("characters");
    fs::create_dir_all(&items_dir)?;
    fs::create_dir_all(&characters_dir)?;

    for record in starter_item_records() {
        let filename = format!("{}.json", record.name.replace(' ', "_"));
        let contents = serde_json::to_string_pretty(&record)?;
        fs::write(items_dir.join(filename), contents)?;
    }

    for (filename, seed) in starter_character_seeds() {
        let contents = serde_json::to_string_pretty(&seed)?;
        fs::write(characters_dir.join(filename), contents)?;
    }

    info!("starter seeds written under {}", dir.display());
    Ok(())
}
