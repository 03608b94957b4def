use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::world::inventory::Inventory;

/// Immutable catalog attributes of an item, as loaded from seed data.
///
/// Catalog records never carry a quantity; they are templates that
/// [`ItemCatalog::materialize`] turns into owned [`Item`] inventory entries.
///
/// [`ItemCatalog::materialize`]: crate::world::catalog::ItemCatalog::materialize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: u32,
    pub name: String,
    /// Classification label (e.g., "Consumable", "Weapon", "Currency").
    #[serde(rename = "type")]
    pub item_type: String,
    pub description: String,
    /// Column/row into the icon atlas, consumed only by rendering layers.
    pub icon_pos: (u32, u32),
    /// Whether the item may appear in a trade at all.
    pub tradable: bool,
    /// Unit price in settlement-currency units.
    pub price: i64,
    /// Effect name to magnitude (e.g., {"heal": 20.0}).
    #[serde(default)]
    pub effect: HashMap<String, f64>,
}

/// An inventory entry: an owned copy of catalog attributes plus a quantity.
///
/// Each inventory owns independent value copies; two characters never share a
/// mutable item instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub description: String,
    pub icon_pos: (u32, u32),
    pub tradable: bool,
    pub price: i64,
    #[serde(default)]
    pub effect: HashMap<String, f64>,
    pub quantity: u32,
}

impl Item {
    /// Build an inventory entry from a catalog record.
    pub fn from_record(record: &ItemRecord, quantity: u32) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            item_type: record.item_type.clone(),
            description: record.description.clone(),
            icon_pos: record.icon_pos,
            tradable: record.tradable,
            price: record.price,
            effect: record.effect.clone(),
            quantity,
        }
    }

    /// Detailed info block for display layers.
    pub fn info(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "type": self.item_type,
            "description": self.description,
            "tradable": self.tradable,
            "price": self.price,
            "effect": self.effect,
            "quantity": self.quantity,
            "icon_pos": self.icon_pos,
        })
    }
}

/// Character attributes: a small fixed schema plus an open extension map so
/// seed data can carry fields this kernel doesn't interpret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default = "default_health")]
    pub health: i64,
    /// Disposition toward the player in [-1, 1]. NPCs only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<f64>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

fn default_level() -> u32 {
    1
}

fn default_health() -> i64 {
    100
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            level: default_level(),
            health: default_health(),
            relationship: None,
            extra: HashMap::new(),
        }
    }
}

/// Behavioral variant of a character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CharacterKind {
    /// Autonomous character. `agent_config` is opaque data for the external
    /// agent layer; this kernel stores it without interpreting it.
    Npc {
        #[serde(default)]
        agent_config: Map<String, Value>,
    },
    /// The controlled actor.
    Player,
}

/// A world inhabitant: identity, attributes, and an owned inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: u32,
    pub name: String,
    /// Role label from seed data (e.g., "Merchant", "Warrior").
    pub role: String,
    pub kind: CharacterKind,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub inventory: Inventory,
    /// Presentation metadata consumed only by rendering layers.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub frontend_config: Map<String, Value>,
    /// Gameplay tuning consumed by external layers.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub gameplay_config: Map<String, Value>,
}

impl Character {
    /// Create an NPC with empty inventory and default attributes.
    pub fn npc(id: u32, name: &str, role: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            role: role.to_string(),
            kind: CharacterKind::Npc {
                agent_config: Map::new(),
            },
            attributes: Attributes {
                relationship: Some(0.0),
                ..Attributes::default()
            },
            inventory: Inventory::new(),
            frontend_config: Map::new(),
            gameplay_config: Map::new(),
        }
    }

    /// Create a player with empty inventory and default attributes.
    pub fn player(id: u32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            role: "Player".to_string(),
            kind: CharacterKind::Player,
            attributes: Attributes::default(),
            inventory: Inventory::new(),
            frontend_config: Map::new(),
            gameplay_config: Map::new(),
        }
    }

    pub fn is_npc(&self) -> bool {
        matches!(self.kind, CharacterKind::Npc { .. })
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, CharacterKind::Player)
    }

    /// Disposition toward the player, if this character tracks one.
    pub fn relationship(&self) -> Option<f64> {
        self.attributes.relationship
    }

    /// Stat block for display and API layers.
    pub fn summary(&self) -> CharacterSummary {
        CharacterSummary {
            id: self.id,
            name: self.name.clone(),
            role: self.role.clone(),
            level: self.attributes.level,
            health: self.attributes.health,
            relationship: if self.is_npc() {
                self.attributes.relationship
            } else {
                None
            },
        }
    }
}

/// Serializable stat summary, the character-facing slice of the API contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSummary {
    pub id: u32,
    pub name: String,
    pub role: String,
    pub level: u32,
    pub health: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<f64>,
}
