//! Stage (one bracket or round-robin container), its slots and seed assignments.

use crate::models::match_up::{MatchIdx, MatchType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a stage.
pub type StageId = Uuid;

/// Unique identifier for a participant (player, pair or team).
pub type ParticipantId = Uuid;

/// Arena index of a stage inside its bracket.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct StageIdx(pub usize);

/// Which part of the event the stage belongs to.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Qualifying,
    #[default]
    Main,
    Consolation,
    PlayOff,
}

/// How finishing positions are derived.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishingRule {
    /// Elimination: the round a participant loses in decides their finish.
    #[default]
    RoundOutcome,
    /// Round robin: win ratio decides; there are no winner/loser targets.
    WinRatio,
}

/// Seed placement profile.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingProfile {
    /// USTA style: seed blocks spread to the edges of each section.
    #[default]
    Separate,
    /// ITF style: seed blocks cluster toward section boundaries.
    Cluster,
    /// Fill every slot in seed order; byes are placed before seeds.
    Waterfall,
}

/// Whether a stage holds matches itself or is a container of groups.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageLayout {
    #[default]
    Elimination,
    /// Round-robin container; slots live here, matches live in the groups.
    Container { groups: Vec<StageIdx> },
    /// One round-robin group; `slots` are numbers owned by the container.
    Group { container: StageIdx, slots: Vec<u32> },
}

/// What sits in a slot. Exactly one of these at any time.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occupant {
    #[default]
    Empty,
    Participant(ParticipantId),
    Bye,
    Qualifier,
}

impl Occupant {
    pub fn is_empty(&self) -> bool {
        matches!(self, Occupant::Empty)
    }

    pub fn is_bye(&self) -> bool {
        matches!(self, Occupant::Bye)
    }

    pub fn participant(&self) -> Option<ParticipantId> {
        match self {
            Occupant::Participant(id) => Some(*id),
            _ => None,
        }
    }
}

/// A numbered seat in a stage (a draw position).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub number: u32,
    pub occupant: Occupant,
    /// Whether link-driven positioning may still be offered for this slot.
    /// Any direct assignment or clear switches it off.
    pub link_positioning: bool,
}

impl Slot {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            occupant: Occupant::Empty,
            link_positioning: true,
        }
    }
}

/// A seed number held by a participant in a stage.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeedAssignment {
    pub seed_number: u32,
    /// Differs from `seed_number` when round-robin group thresholds apply.
    pub seed_value: u32,
    pub participant_id: Option<ParticipantId>,
}

/// One bracket or round-robin group within a bracket.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub name: String,
    pub kind: StageKind,
    pub sequence: u32,
    pub layout: StageLayout,
    pub finishing: FinishingRule,
    /// Overrides the seeding policy's profile for this stage.
    pub seeding_profile: Option<SeedingProfile>,
    pub match_type: MatchType,
    /// One entry per slot, numbered 1..=N. Empty for groups.
    pub slots: Vec<Slot>,
    pub seeds: Vec<SeedAssignment>,
    /// Matches owned directly by this stage (none for a container).
    pub matches: Vec<MatchIdx>,
}

impl Stage {
    pub fn new(name: impl Into<String>, kind: StageKind, layout: StageLayout) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            sequence: 1,
            layout,
            finishing: FinishingRule::RoundOutcome,
            seeding_profile: None,
            match_type: MatchType::Singles,
            slots: Vec::new(),
            seeds: Vec::new(),
            matches: Vec::new(),
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self.layout, StageLayout::Container { .. })
    }

    pub fn draw_size(&self) -> u32 {
        self.slots.len() as u32
    }

    pub fn slot(&self, number: u32) -> Option<&Slot> {
        self.slots.iter().find(|s| s.number == number)
    }

    pub fn slot_mut(&mut self, number: u32) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.number == number)
    }

    /// Occupant of a slot; `Empty` for unknown numbers.
    pub fn occupant(&self, number: u32) -> Occupant {
        self.slot(number).map(|s| s.occupant).unwrap_or_default()
    }

    /// Slot currently holding the participant, if any.
    pub fn participant_slot(&self, participant_id: ParticipantId) -> Option<u32> {
        self.slots
            .iter()
            .find(|s| s.occupant == Occupant::Participant(participant_id))
            .map(|s| s.number)
    }

    pub fn seed_of(&self, participant_id: ParticipantId) -> Option<&SeedAssignment> {
        self.seeds
            .iter()
            .find(|s| s.participant_id == Some(participant_id))
    }

    pub fn bye_slots(&self) -> Vec<u32> {
        self.slots
            .iter()
            .filter(|s| s.occupant.is_bye())
            .map(|s| s.number)
            .collect()
    }

    pub fn unassigned_slots(&self) -> Vec<u32> {
        self.slots
            .iter()
            .filter(|s| s.occupant.is_empty())
            .map(|s| s.number)
            .collect()
    }

    pub fn qualifier_count(&self) -> u32 {
        self.slots
            .iter()
            .filter(|s| s.occupant == Occupant::Qualifier)
            .count() as u32
    }

    pub fn participant_count(&self) -> u32 {
        self.slots
            .iter()
            .filter(|s| s.occupant.participant().is_some())
            .count() as u32
    }
}
