//! Links between stages: how a source round feeds a target round.

use crate::models::stage::StageIdx;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Winner,
    Loser,
    /// Finishing positions of a win-ratio stage feed a play-off.
    Position,
}

/// Ordering rule mapping source positions onto target slots.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedProfile {
    #[default]
    TopDown,
    BottomUp,
    /// Whole-draw feed: targets are always computed, never read from the cache.
    Draw,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LinkSource {
    pub stage: StageIdx,
    pub round: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LinkTarget {
    pub stage: StageIdx,
    pub round: u32,
    pub feed_profile: FeedProfile,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub kind: LinkKind,
    pub source: LinkSource,
    pub target: LinkTarget,
}

impl Link {
    pub fn is_sourced_at(&self, kind: LinkKind, stage: StageIdx, round: u32) -> bool {
        self.kind == kind && self.source.stage == stage && self.source.round == round
    }
}
