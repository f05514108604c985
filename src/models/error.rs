//! PositioningError: everything a positioning operation can refuse to do.

use crate::models::stage::{ParticipantId, StageId};
use crate::models::match_up::MatchId;

/// Errors that can occur while assigning, clearing or advancing draw positions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PositioningError {
    // Input validation.
    /// Neither a participant nor a qualifier marker was supplied.
    MissingParticipant,
    /// The slot number does not exist in the stage.
    InvalidSlot(u32),
    /// A request carried values that cannot describe a draw (bad sizes, rounds, links).
    InvalidValues(String),

    // State conflicts.
    /// The slot's occupant has already advanced (or its opponent has).
    SlotActive(u32),
    /// The participant already occupies (or is seeded at) another slot in the stage.
    ExistingParticipantAssignment { participant_id: ParticipantId, slot: u32 },
    /// A match side that should receive a value already carries a different one.
    SlotAssigned(u32),
    /// More byes are already placed than the entries leave room for.
    ByesLimitReached { placed: u32, allowed: u32 },
    /// More entries than free slots.
    InsufficientSlots { needed: u32, available: u32 },
    /// The match has already been decided and cannot take an exit.
    InvalidMatchStatus(MatchId),

    // Seeding and policy violations.
    /// A seeded participant was aimed outside its seed block.
    InvalidSeedPosition { seed_number: u32, slot: u32 },
    /// Every slot of the seed's block is taken.
    SeedBlockExhausted { seed_number: u32 },
    /// More seeds than slots.
    SeedsCountGreaterThanDrawSize { seeds: u32, draw_size: u32 },

    // Structural lookup failures.
    /// No stage with this identifier in the bracket.
    StageNotFound(StageId),
    /// A link or target points at a stage round that has no matches.
    MissingStructure { stage_id: StageId, round: u32 },
    /// A match that the bracket shape requires could not be found.
    MissingMatch(MatchId),
}

impl PositioningError {
    /// Structural failures mean the bracket is corrupt or mismatched; they always
    /// abort the enclosing operation instead of being collected.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            PositioningError::StageNotFound(_)
                | PositioningError::MissingStructure { .. }
                | PositioningError::MissingMatch(_)
        )
    }
}

impl std::fmt::Display for PositioningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositioningError::MissingParticipant => write!(f, "Missing participant or qualifier"),
            PositioningError::InvalidSlot(slot) => write!(f, "Invalid draw position {}", slot),
            PositioningError::InvalidValues(reason) => write!(f, "Invalid values: {}", reason),
            PositioningError::SlotActive(slot) => write!(f, "Draw position {} is active", slot),
            PositioningError::ExistingParticipantAssignment { slot, .. } => {
                write!(f, "Participant is already assigned to draw position {}", slot)
            }
            PositioningError::SlotAssigned(slot) => {
                write!(f, "Draw position {} is already assigned in the target match", slot)
            }
            PositioningError::ByesLimitReached { placed, allowed } => {
                write!(f, "BYEs limit reached ({} placed, {} allowed)", placed, allowed)
            }
            PositioningError::InsufficientSlots { needed, available } => {
                write!(f, "Insufficient draw positions: need {}, have {}", needed, available)
            }
            PositioningError::InvalidMatchStatus(_) => write!(f, "Invalid match status for this action"),
            PositioningError::InvalidSeedPosition { seed_number, slot } => {
                write!(f, "Draw position {} is not valid for seed {}", slot, seed_number)
            }
            PositioningError::SeedBlockExhausted { seed_number } => {
                write!(f, "No free draw position left in the block of seed {}", seed_number)
            }
            PositioningError::SeedsCountGreaterThanDrawSize { seeds, draw_size } => {
                write!(f, "Seeds count {} is greater than draw size {}", seeds, draw_size)
            }
            PositioningError::StageNotFound(_) => write!(f, "Structure not found"),
            PositioningError::MissingStructure { round, .. } => {
                write!(f, "Missing structure: no matches in round {}", round)
            }
            PositioningError::MissingMatch(_) => write!(f, "Missing match"),
        }
    }
}

impl std::error::Error for PositioningError {}
