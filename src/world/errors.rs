use thiserror::Error;

/// Errors that can arise while manipulating world entities and seed data.
///
/// Expected gameplay outcomes (a trade being refused for lack of stock or
/// funds) are *not* errors; those travel as [`TradeRejection`] values through
/// the trade pipeline. This enum covers contract violations and
/// infrastructure failures only.
///
/// [`TradeRejection`]: crate::world::trade::TradeRejection
#[derive(Debug, Error)]
pub enum WorldError {
    /// A positive amount was required but zero was supplied.
    /// Quantities are unsigned, so this is the whole "non-positive" class.
    #[error("invalid quantity for {item}: amount must be positive")]
    InvalidQuantity { item: String },

    /// Referenced an item name absent from the catalog.
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// Referenced a character id absent from the roster.
    #[error("unknown character: {0}")]
    UnknownCharacter(u32),

    /// A trade referenced ids that do not form an NPC/player pair.
    #[error("characters {npc_id} and {player_id} are not a valid trading pair")]
    NotATradingPair { npc_id: u32, player_id: u32 },

    /// Two roster entries share an id.
    #[error("duplicate character id: {0}")]
    DuplicateCharacter(u32),

    /// Wrapper around IO errors (seed directory scans, file reads).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapper around JSON serialization and deserialization errors.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Returned when a seed file's contents don't describe a usable record.
    #[error("invalid seed data in {path}: {reason}")]
    InvalidSeed { path: String, reason: String },
}
