//! The set of loaded characters and id-based access to them.
//!
//! The roster owns every character in the world. Trades need simultaneous
//! mutable access to two inventories, which [`Roster::trade_pair_mut`]
//! provides through a disjoint split of the underlying storage — the only
//! sanctioned way two inventories are mutated in one operation.

use crate::world::errors::WorldError;
use crate::world::types::Character;

#[derive(Debug, Clone, Default)]
pub struct Roster {
    characters: Vec<Character>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a character; ids must be unique across the roster.
    pub fn push(&mut self, character: Character) -> Result<(), WorldError> {
        if self.characters.iter().any(|c| c.id == character.id) {
            return Err(WorldError::DuplicateCharacter(character.id));
        }
        self.characters.push(character);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter()
    }

    pub fn get(&self, id: u32) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    /// Look up an NPC by id; non-NPC characters don't match.
    pub fn npc_by_id(&self, id: u32) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id && c.is_npc())
    }

    /// Look up a player by id; NPCs don't match.
    pub fn player_by_id(&self, id: u32) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id && c.is_player())
    }

    /// Case-insensitive NPC lookup by name.
    pub fn npc_by_name(&self, name: &str) -> Option<&Character> {
        self.characters
            .iter()
            .find(|c| c.is_npc() && c.name.eq_ignore_ascii_case(name))
    }

    pub fn npc_count(&self) -> usize {
        self.characters.iter().filter(|c| c.is_npc()).count()
    }

    pub fn player_count(&self) -> usize {
        self.characters.iter().filter(|c| c.is_player()).count()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Mutable access to an NPC and a player at once, for the trade pipeline.
    ///
    /// Fails with [`WorldError::UnknownCharacter`] when either id is missing
    /// and [`WorldError::NotATradingPair`] when the roles don't line up.
    pub fn trade_pair_mut(
        &mut self,
        npc_id: u32,
        player_id: u32,
    ) -> Result<(&mut Character, &mut Character), WorldError> {
        let npc_index = self
            .characters
            .iter()
            .position(|c| c.id == npc_id)
            .ok_or(WorldError::UnknownCharacter(npc_id))?;
        let player_index = self
            .characters
            .iter()
            .position(|c| c.id == player_id)
            .ok_or(WorldError::UnknownCharacter(player_id))?;

        if npc_index == player_index
            || !self.characters[npc_index].is_npc()
            || !self.characters[player_index].is_player()
        {
            return Err(WorldError::NotATradingPair { npc_id, player_id });
        }

        // Split around the higher index so both borrows are disjoint.
        if npc_index < player_index {
            let (head, tail) = self.characters.split_at_mut(player_index);
            Ok((&mut head[npc_index], &mut tail[0]))
        } else {
            let (head, tail) = self.characters.split_at_mut(npc_index);
            Ok((&mut tail[0], &mut head[player_index]))
        }
    }
}
