//! Match, its status and sides.

use crate::models::stage::{ParticipantId, StageIdx};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Arena index of a match inside its bracket.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct MatchIdx(pub usize);

/// Side of a match. Side one is `slots[0]`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    One,
    Two,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    pub fn from_index(index: usize) -> Side {
        if index == 0 {
            Side::One
        } else {
            Side::Two
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    #[default]
    ToBePlayed,
    Bye,
    InProgress,
    Completed,
    Retired,
    Walkover,
    Defaulted,
    DoubleWalkover,
    DoubleDefault,
}

impl MatchStatus {
    /// Statuses that settle the match for good.
    pub fn is_completed(self) -> bool {
        matches!(
            self,
            MatchStatus::Completed
                | MatchStatus::Retired
                | MatchStatus::Walkover
                | MatchStatus::Defaulted
                | MatchStatus::DoubleWalkover
                | MatchStatus::DoubleDefault
        )
    }

    /// Completed or under way: the slots in such a match cannot be cleared.
    pub fn is_decided(self) -> bool {
        self.is_completed() || self == MatchStatus::InProgress
    }

    pub fn is_double_exit(self) -> bool {
        matches!(self, MatchStatus::DoubleWalkover | MatchStatus::DoubleDefault)
    }
}

/// Kind of exit: the opponent did not show, or was defaulted.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitKind {
    Walkover,
    Default,
}

impl ExitKind {
    pub fn status(self) -> MatchStatus {
        match self {
            ExitKind::Walkover => MatchStatus::Walkover,
            ExitKind::Default => MatchStatus::Defaulted,
        }
    }

    pub fn double_status(self) -> MatchStatus {
        match self {
            ExitKind::Walkover => MatchStatus::DoubleWalkover,
            ExitKind::Default => MatchStatus::DoubleDefault,
        }
    }

    /// Two exits meeting: only two defaults make a double default.
    pub fn combine(self, other: ExitKind) -> ExitKind {
        match (self, other) {
            (ExitKind::Default, ExitKind::Default) => ExitKind::Default,
            _ => ExitKind::Walkover,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    #[default]
    Singles,
    Doubles,
    Team,
}

/// Where a match's winner or loser goes, as cached at generation time.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TargetRef {
    pub match_idx: MatchIdx,
    pub side: Side,
}

/// An exit received from one feeder while the other half is still open.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PendingExit {
    pub from: MatchIdx,
    pub kind: ExitKind,
}

/// A single match. Slot values are copies carried forward from the round where
/// each slot first appears.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub stage: StageIdx,
    pub round: u32,
    /// 1-based position within the round.
    pub position: u32,
    pub slots: [Option<u32>; 2],
    pub status: MatchStatus,
    pub winning_side: Option<Side>,
    pub winner_target: Option<TargetRef>,
    pub loser_target: Option<TargetRef>,
    pub pending_exit: Option<PendingExit>,
    /// Team events: lineup attached per slot.
    #[serde(default)]
    pub lineups: BTreeMap<u32, Vec<ParticipantId>>,
}

impl Match {
    pub fn new(stage: StageIdx, round: u32, position: u32, slots: [Option<u32>; 2]) -> Self {
        Self {
            id: Uuid::new_v4(),
            stage,
            round,
            position,
            slots,
            status: MatchStatus::ToBePlayed,
            winning_side: None,
            winner_target: None,
            loser_target: None,
            pending_exit: None,
            lineups: BTreeMap::new(),
        }
    }

    pub fn contains(&self, slot: u32) -> bool {
        self.slots.contains(&Some(slot))
    }

    pub fn side_of(&self, slot: u32) -> Option<Side> {
        self.slots
            .iter()
            .position(|s| *s == Some(slot))
            .map(Side::from_index)
    }

    /// The other slot value in the match, if present.
    pub fn paired_slot(&self, slot: u32) -> Option<u32> {
        let side = self.side_of(slot)?;
        self.slots[side.opposite().index()]
    }

    pub fn present_slots(&self) -> impl Iterator<Item = u32> + '_ {
        self.slots.iter().flatten().copied()
    }
}
