//! Bartering transaction pipeline between an NPC and the player.
//!
//! Trades run in two phases. [`validate`] is pure: it checks every requested
//! line against the source inventory, prices the exchange, and confirms the
//! paying party can settle, producing a [`TradePlan`] or the first
//! [`TradeRejection`] encountered. [`TradePlan::commit`] is the mutation
//! phase, implemented as a reservation-style two-phase commit: every planned
//! decrement is re-verified against current inventory state before anything
//! moves, so an aborted commit leaves both inventories untouched.
//!
//! Pricing note: both buy and sell value goods at the *source* item's catalog
//! price — selling uses the seller's own price field, with no merchant
//! buy-back margin. That is the observed economic model of this world and is
//! preserved here.

use std::collections::HashMap;

use log::{error, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::world::catalog::{ItemCatalog, GOLD_COIN};
use crate::world::types::Character;

/// Direction of a trade from the player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeType {
    /// The player buys items out of the NPC's inventory.
    Buy,
    /// The player sells items into the NPC's inventory.
    Sell,
}

impl std::fmt::Display for TradeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeType::Buy => write!(f, "buy"),
            TradeType::Sell => write!(f, "sell"),
        }
    }
}

/// A proposed exchange handed in from the agent/tool layer.
///
/// `items` uses the wire shape of the boundary contract: a list of
/// single-entry name→quantity maps. Created fresh per proposal and discarded
/// after processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeProposal {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub trade_type: TradeType,
    pub items: Vec<HashMap<String, u32>>,
    pub npc_id: u32,
    pub player_id: u32,
    /// Set once the pipeline has run, success or not.
    #[serde(default)]
    pub processed: bool,
}

impl TradeProposal {
    pub fn new(npc_id: u32, player_id: u32, trade_type: TradeType, lines: &[(&str, u32)]) -> Self {
        Self {
            id: Uuid::new_v4(),
            trade_type,
            items: lines
                .iter()
                .map(|(name, quantity)| HashMap::from([(name.to_string(), *quantity)]))
                .collect(),
            npc_id,
            player_id,
            processed: false,
        }
    }

    /// Flatten the wire shape into (name, quantity) pairs.
    pub fn lines(&self) -> impl Iterator<Item = (&str, u32)> {
        self.items
            .iter()
            .flat_map(|entry| entry.iter().map(|(name, qty)| (name.as_str(), *qty)))
    }
}

/// Why a trade was refused. These are expected gameplay outcomes, not errors;
/// the display strings are the human-readable reasons surfaced to players.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeRejection {
    #[error("NPC with id {0} not found")]
    UnknownNpc(u32),

    #[error("player with id {0} not found")]
    UnknownPlayer(u32),

    #[error("invalid quantity for {name}: quantity must be positive")]
    InvalidQuantity { name: String },

    #[error("the merchant doesn't have {0} available")]
    MerchantMissingItem(String),

    #[error("the merchant only has {have} {name}(s), but {requested} requested")]
    MerchantShortStock {
        name: String,
        have: u32,
        requested: u32,
    },

    #[error("the player doesn't have {0} to sell")]
    PlayerMissingItem(String),

    #[error("the player only has {have} {name}(s), but tried to sell {requested}")]
    PlayerShortStock {
        name: String,
        have: u32,
        requested: u32,
    },

    #[error("the player has insufficient funds to purchase these items")]
    InsufficientPlayerFunds,

    #[error("the merchant has insufficient funds to purchase the player's items")]
    InsufficientMerchantFunds,

    /// An inventory no longer matched the plan at commit time. The commit
    /// aborts with zero side effects and this reason is logged at error
    /// level.
    #[error("inventory changed during execution: {0}")]
    ExecutionConflict(String),
}

/// Which way a planned transfer moves goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferDirection {
    NpcToPlayer,
    PlayerToNpc,
}

/// One reserved item movement within a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTransfer {
    pub name: String,
    pub quantity: u32,
    pub direction: TransferDirection,
}

/// A fully validated trade: participants' transfer directions, reserved
/// quantities, and the settlement total. Produced by [`validate`], applied by
/// [`TradePlan::commit`].
#[derive(Debug, Clone, PartialEq)]
pub struct TradePlan {
    trade_type: TradeType,
    transfers: Vec<PlannedTransfer>,
    total_cost: i64,
    items: Vec<HashMap<String, u32>>,
}

impl TradePlan {
    pub fn trade_type(&self) -> TradeType {
        self.trade_type
    }

    pub fn transfers(&self) -> &[PlannedTransfer] {
        &self.transfers
    }

    /// Settlement total in currency units.
    pub fn total_cost(&self) -> i64 {
        self.total_cost
    }

    /// The traded lines in wire shape, for the outcome value.
    pub fn trade_items(&self) -> &[HashMap<String, u32>] {
        &self.items
    }

    /// Apply the plan to both inventories.
    ///
    /// Commit re-verifies every reserved decrement (item stock, the payer's
    /// currency balance, and catalog resolvability of each destination add)
    /// against current state first; only when the whole batch still holds are
    /// the transfers and the lump currency settlement applied. Any
    /// verification failure aborts before the first mutation.
    pub fn commit(
        &self,
        npc: &mut Character,
        player: &mut Character,
        catalog: &ItemCatalog,
    ) -> Result<(), TradeRejection> {
        // Verification pass: no mutation below until every check has passed.
        // Reserved decrements are aggregated per source item, so a plan that
        // lists the same item twice is checked against the combined total.
        let mut reserved: HashMap<(TransferDirection, &str), u64> = HashMap::new();
        for transfer in &self.transfers {
            if !catalog.contains(&transfer.name) {
                return Err(TradeRejection::ExecutionConflict(format!(
                    "{} is not in the item catalog",
                    transfer.name
                )));
            }
            *reserved
                .entry((transfer.direction, transfer.name.as_str()))
                .or_insert(0) += u64::from(transfer.quantity);
        }
        for ((direction, name), quantity) in &reserved {
            let source = match direction {
                TransferDirection::NpcToPlayer => &*npc,
                TransferDirection::PlayerToNpc => &*player,
            };
            if u64::from(source.inventory.quantity_of(name)) < *quantity {
                return Err(TradeRejection::ExecutionConflict(format!(
                    "{} no longer holds {} x{}",
                    source.name, name, quantity
                )));
            }
        }

        let settlement = if self.total_cost > 0 {
            let amount = u32::try_from(self.total_cost).map_err(|_| {
                TradeRejection::ExecutionConflict(format!(
                    "settlement amount {} out of range",
                    self.total_cost
                ))
            })?;
            let payer = match self.trade_type {
                TradeType::Buy => &*player,
                TradeType::Sell => &*npc,
            };
            if payer.inventory.quantity_of(GOLD_COIN) < amount {
                return Err(TradeRejection::ExecutionConflict(format!(
                    "{} can no longer cover the {} coin settlement",
                    payer.name, amount
                )));
            }
            if !catalog.contains(GOLD_COIN) {
                return Err(TradeRejection::ExecutionConflict(format!(
                    "{} is not in the item catalog",
                    GOLD_COIN
                )));
            }
            Some(amount)
        } else {
            None
        };

        // Every decrement verified; apply the whole batch.
        for transfer in &self.transfers {
            match transfer.direction {
                TransferDirection::NpcToPlayer => {
                    move_items(npc, player, &transfer.name, transfer.quantity, catalog)?
                }
                TransferDirection::PlayerToNpc => {
                    move_items(player, npc, &transfer.name, transfer.quantity, catalog)?
                }
            }
        }

        if let Some(amount) = settlement {
            match self.trade_type {
                TradeType::Buy => move_items(player, npc, GOLD_COIN, amount, catalog)?,
                TradeType::Sell => move_items(npc, player, GOLD_COIN, amount, catalog)?,
            }
        }

        Ok(())
    }
}

fn move_items(
    source: &mut Character,
    dest: &mut Character,
    name: &str,
    quantity: u32,
    catalog: &ItemCatalog,
) -> Result<(), TradeRejection> {
    if !source.inventory.remove_item(name, quantity) {
        return Err(TradeRejection::ExecutionConflict(format!(
            "failed to remove {} x{} from {}",
            name, quantity, source.name
        )));
    }
    dest.inventory
        .add_item(catalog, name, quantity)
        .map_err(|err| TradeRejection::ExecutionConflict(err.to_string()))
}

/// Phase 1: check the proposal against both inventories without mutating
/// anything. Returns the first failure encountered, or a fully resolved plan.
pub fn validate(
    proposal: &TradeProposal,
    npc: &Character,
    player: &Character,
) -> Result<TradePlan, TradeRejection> {
    let mut total_cost = 0i64;
    let mut transfers = Vec::new();
    let mut items = Vec::new();

    for (name, quantity) in proposal.lines() {
        if quantity == 0 {
            return Err(TradeRejection::InvalidQuantity {
                name: name.to_string(),
            });
        }

        let (source, direction) = match proposal.trade_type {
            TradeType::Buy => (npc, TransferDirection::NpcToPlayer),
            TradeType::Sell => (player, TransferDirection::PlayerToNpc),
        };

        let Some(source_item) = source.inventory.find_item_by_name(name) else {
            return Err(match proposal.trade_type {
                TradeType::Buy => TradeRejection::MerchantMissingItem(name.to_string()),
                TradeType::Sell => TradeRejection::PlayerMissingItem(name.to_string()),
            });
        };

        if source_item.quantity < quantity {
            return Err(match proposal.trade_type {
                TradeType::Buy => TradeRejection::MerchantShortStock {
                    name: name.to_string(),
                    have: source_item.quantity,
                    requested: quantity,
                },
                TradeType::Sell => TradeRejection::PlayerShortStock {
                    name: name.to_string(),
                    have: source_item.quantity,
                    requested: quantity,
                },
            });
        }

        total_cost += source_item.price * i64::from(quantity);
        items.push(HashMap::from([(source_item.name.clone(), quantity)]));
        transfers.push(PlannedTransfer {
            name: source_item.name.clone(),
            quantity,
            direction,
        });
    }

    let payer = match proposal.trade_type {
        TradeType::Buy => player,
        TradeType::Sell => npc,
    };
    let funds = i64::from(payer.inventory.quantity_of(GOLD_COIN));
    if funds < total_cost {
        return Err(match proposal.trade_type {
            TradeType::Buy => TradeRejection::InsufficientPlayerFunds,
            TradeType::Sell => TradeRejection::InsufficientMerchantFunds,
        });
    }

    Ok(TradePlan {
        trade_type: proposal.trade_type,
        transfers,
        total_cost,
        items,
    })
}

/// Pipeline outcome status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    Success,
    Failed,
}

/// The structured result every caller of the pipeline receives. This exact
/// serde shape — including empty `items` and a zero `transaction` on failure
/// — is the contract the agent/tool layer parses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOutcome {
    pub status: TradeStatus,
    pub items: Vec<HashMap<String, u32>>,
    pub transaction: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl TradeOutcome {
    pub fn success(items: Vec<HashMap<String, u32>>, transaction: i64) -> Self {
        Self {
            status: TradeStatus::Success,
            items,
            transaction,
            error_message: None,
        }
    }

    pub fn failed(rejection: &TradeRejection) -> Self {
        Self {
            status: TradeStatus::Failed,
            items: Vec::new(),
            transaction: 0,
            error_message: Some(rejection.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TradeStatus::Success
    }
}

/// Run the full pipeline against resolved participants: validate, then
/// commit. All domain failures surface through the returned outcome value; no
/// error escapes a well-formed call.
pub fn process(
    proposal: &TradeProposal,
    npc: &mut Character,
    player: &mut Character,
    catalog: &ItemCatalog,
) -> TradeOutcome {
    let plan = match validate(proposal, npc, player) {
        Ok(plan) => plan,
        Err(rejection) => {
            warn!(
                "trade {} rejected ({} between NPC {} and player {}): {}",
                proposal.id, proposal.trade_type, npc.id, player.id, rejection
            );
            return TradeOutcome::failed(&rejection);
        }
    };

    match plan.commit(npc, player, catalog) {
        Ok(()) => TradeOutcome::success(plan.trade_items().to_vec(), plan.total_cost()),
        Err(rejection) => {
            error!(
                "trade {} aborted at commit ({} between NPC {} and player {}): {}",
                proposal.id, proposal.trade_type, npc.id, player.id, rejection
            );
            TradeOutcome::failed(&rejection)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::inventory::Inventory;
    use crate::world::types::ItemRecord;

    fn catalog() -> ItemCatalog {
        let mut catalog = ItemCatalog::new();
        for (id, name, price) in [(1, "Health Potion", 10), (2, "Wood Shield", 25), (3, GOLD_COIN, 1)]
        {
            catalog.insert(ItemRecord {
                id,
                name: name.to_string(),
                item_type: "Misc".to_string(),
                description: format!("A {}", name),
                icon_pos: (0, 0),
                tradable: true,
                price,
                effect: HashMap::new(),
            });
        }
        catalog
    }

    fn merchant(catalog: &ItemCatalog) -> Character {
        let mut npc = Character::npc(1, "Garrick", "Merchant");
        npc.inventory.add_item(catalog, "Health Potion", 3).unwrap();
        npc.inventory.add_item(catalog, GOLD_COIN, 100).unwrap();
        npc
    }

    fn adventurer(catalog: &ItemCatalog, gold: u32) -> Character {
        let mut player = Character::player(100, "Aria");
        if gold > 0 {
            player.inventory.add_item(catalog, GOLD_COIN, gold).unwrap();
        }
        player
    }

    #[test]
    fn validate_prices_from_the_source_item() {
        let catalog = catalog();
        let npc = merchant(&catalog);
        let player = adventurer(&catalog, 50);

        let proposal =
            TradeProposal::new(1, 100, TradeType::Buy, &[("Health Potion", 2)]);
        let plan = validate(&proposal, &npc, &player).unwrap();

        assert_eq!(plan.total_cost(), 20);
        assert_eq!(plan.transfers().len(), 1);
        assert_eq!(
            plan.transfers()[0].direction,
            TransferDirection::NpcToPlayer
        );
    }

    #[test]
    fn validate_is_idempotent_on_an_unchanged_world() {
        let catalog = catalog();
        let npc = merchant(&catalog);
        let player = adventurer(&catalog, 50);

        let proposal =
            TradeProposal::new(1, 100, TradeType::Buy, &[("Health Potion", 2)]);
        let first = validate(&proposal, &npc, &player).unwrap();
        let second = validate(&proposal, &npc, &player).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn validate_rejects_zero_quantity_first() {
        let catalog = catalog();
        let npc = merchant(&catalog);
        let player = adventurer(&catalog, 50);

        let proposal =
            TradeProposal::new(1, 100, TradeType::Buy, &[("Health Potion", 0)]);
        let rejection = validate(&proposal, &npc, &player).unwrap_err();
        assert!(matches!(rejection, TradeRejection::InvalidQuantity { .. }));
    }

    #[test]
    fn validate_rejects_missing_and_short_stock() {
        let catalog = catalog();
        let npc = merchant(&catalog);
        let player = adventurer(&catalog, 500);

        let missing = TradeProposal::new(1, 100, TradeType::Buy, &[("Wood Shield", 1)]);
        assert_eq!(
            validate(&missing, &npc, &player).unwrap_err(),
            TradeRejection::MerchantMissingItem("Wood Shield".to_string())
        );

        let short = TradeProposal::new(1, 100, TradeType::Buy, &[("Health Potion", 5)]);
        assert_eq!(
            validate(&short, &npc, &player).unwrap_err(),
            TradeRejection::MerchantShortStock {
                name: "Health Potion".to_string(),
                have: 3,
                requested: 5,
            }
        );
    }

    #[test]
    fn validate_rejects_underfunded_payer_on_both_sides() {
        let catalog = catalog();
        let mut npc = merchant(&catalog);
        let mut player = adventurer(&catalog, 5);

        let buy = TradeProposal::new(1, 100, TradeType::Buy, &[("Health Potion", 2)]);
        assert_eq!(
            validate(&buy, &npc, &player).unwrap_err(),
            TradeRejection::InsufficientPlayerFunds
        );

        // Give the player a shield worth more than the merchant's purse.
        npc.inventory = Inventory::new();
        npc.inventory.add_item(&catalog, GOLD_COIN, 10).unwrap();
        player
            .inventory
            .add_item(&catalog, "Wood Shield", 1)
            .unwrap();

        let sell = TradeProposal::new(1, 100, TradeType::Sell, &[("Wood Shield", 1)]);
        assert_eq!(
            validate(&sell, &npc, &player).unwrap_err(),
            TradeRejection::InsufficientMerchantFunds
        );
    }

    #[test]
    fn commit_moves_items_and_settlement_in_one_batch() {
        let catalog = catalog();
        let mut npc = merchant(&catalog);
        let mut player = adventurer(&catalog, 50);

        let proposal =
            TradeProposal::new(1, 100, TradeType::Buy, &[("Health Potion", 2)]);
        let plan = validate(&proposal, &npc, &player).unwrap();
        plan.commit(&mut npc, &mut player, &catalog).unwrap();

        assert_eq!(npc.inventory.quantity_of("Health Potion"), 1);
        assert_eq!(npc.inventory.quantity_of(GOLD_COIN), 120);
        assert_eq!(player.inventory.quantity_of("Health Potion"), 2);
        assert_eq!(player.inventory.quantity_of(GOLD_COIN), 30);
    }

    #[test]
    fn stale_plan_aborts_commit_with_zero_side_effects() {
        let catalog = catalog();
        let mut npc = merchant(&catalog);
        let mut player = adventurer(&catalog, 50);

        let proposal =
            TradeProposal::new(1, 100, TradeType::Buy, &[("Health Potion", 3)]);
        let plan = validate(&proposal, &npc, &player).unwrap();

        // The world changes between validate and commit.
        assert!(npc.inventory.remove_item("Health Potion", 2));

        let rejection = plan.commit(&mut npc, &mut player, &catalog).unwrap_err();
        assert!(matches!(rejection, TradeRejection::ExecutionConflict(_)));

        // Nothing moved: the remaining potion and all gold stay put.
        assert_eq!(npc.inventory.quantity_of("Health Potion"), 1);
        assert_eq!(npc.inventory.quantity_of(GOLD_COIN), 100);
        assert_eq!(player.inventory.quantity_of(GOLD_COIN), 50);
        assert!(player.inventory.find_item_by_name("Health Potion").is_none());
    }

    #[test]
    fn repeated_lines_are_verified_against_the_combined_total() {
        let catalog = catalog();
        let mut npc = merchant(&catalog);
        let mut player = adventurer(&catalog, 50);

        // Each line passes the per-line stock check (3 >= 2), but the
        // combined reservation of 4 exceeds stock; the commit must refuse
        // before moving anything.
        let proposal = TradeProposal::new(
            1,
            100,
            TradeType::Buy,
            &[("Health Potion", 2), ("Health Potion", 2)],
        );
        let plan = validate(&proposal, &npc, &player).unwrap();
        let rejection = plan.commit(&mut npc, &mut player, &catalog).unwrap_err();

        assert!(matches!(rejection, TradeRejection::ExecutionConflict(_)));
        assert_eq!(npc.inventory.quantity_of("Health Potion"), 3);
        assert_eq!(player.inventory.quantity_of(GOLD_COIN), 50);
    }

    #[test]
    fn sell_uses_the_players_item_price() {
        let catalog = catalog();
        let mut npc = merchant(&catalog);
        let mut player = adventurer(&catalog, 0);
        player
            .inventory
            .add_item(&catalog, "Wood Shield", 2)
            .unwrap();

        let proposal = TradeProposal::new(1, 100, TradeType::Sell, &[("Wood Shield", 2)]);
        let outcome = process(&proposal, &mut npc, &mut player, &catalog);

        assert!(outcome.is_success());
        assert_eq!(outcome.transaction, 50);
        assert_eq!(npc.inventory.quantity_of("Wood Shield"), 2);
        assert_eq!(npc.inventory.quantity_of(GOLD_COIN), 50);
        assert_eq!(player.inventory.quantity_of(GOLD_COIN), 50);
        assert!(player.inventory.find_item_by_name("Wood Shield").is_none());
    }

    #[test]
    fn failed_outcome_carries_reason_and_empty_items() {
        let catalog = catalog();
        let mut npc = merchant(&catalog);
        let mut player = adventurer(&catalog, 5);

        let proposal =
            TradeProposal::new(1, 100, TradeType::Buy, &[("Health Potion", 2)]);
        let outcome = process(&proposal, &mut npc, &mut player, &catalog);

        assert_eq!(outcome.status, TradeStatus::Failed);
        assert!(outcome.items.is_empty());
        assert_eq!(outcome.transaction, 0);
        assert!(outcome
            .error_message
            .as_deref()
            .unwrap()
            .contains("insufficient funds"));

        // Both inventories unchanged.
        assert_eq!(npc.inventory.quantity_of("Health Potion"), 3);
        assert_eq!(player.inventory.quantity_of(GOLD_COIN), 5);
    }

    #[test]
    fn outcome_serializes_to_the_wire_contract() {
        let outcome = TradeOutcome::success(
            vec![HashMap::from([("Health Potion".to_string(), 2)])],
            20,
        );
        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["transaction"], 20);
        assert_eq!(value["items"][0]["Health Potion"], 2);
        assert!(value.get("error_message").is_none());
    }
}
