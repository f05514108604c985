//! Bracket (draw definition): arena of stages and matches plus the links between stages.

use crate::models::error::PositioningError;
use crate::models::link::{Link, LinkKind};
use crate::models::match_up::{Match, MatchId, MatchIdx, MatchStatus};
use crate::models::stage::{Occupant, ParticipantId, Stage, StageId, StageIdx, StageLayout};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// Unique identifier for a bracket.
pub type DrawId = Uuid;

/// Root aggregate: every positioning operation mutates one of these in place.
///
/// Stages and matches live in flat arenas and refer to each other by
/// [`StageIdx`] / [`MatchIdx`], so a clone is a fully independent copy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bracket {
    pub id: DrawId,
    pub name: String,
    pub stages: Vec<Stage>,
    pub matches: Vec<Match>,
    pub links: Vec<Link>,
    /// Team events: lineup to attach when a team is placed.
    #[serde(default)]
    pub default_lineups: HashMap<ParticipantId, Vec<ParticipantId>>,
}

impl Bracket {
    /// Create an empty bracket with no stages.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            stages: Vec::new(),
            matches: Vec::new(),
            links: Vec::new(),
            default_lineups: HashMap::new(),
        }
    }

    pub fn stage(&self, idx: StageIdx) -> &Stage {
        &self.stages[idx.0]
    }

    pub fn stage_mut(&mut self, idx: StageIdx) -> &mut Stage {
        &mut self.stages[idx.0]
    }

    pub fn match_up(&self, idx: MatchIdx) -> &Match {
        &self.matches[idx.0]
    }

    pub fn match_up_mut(&mut self, idx: MatchIdx) -> &mut Match {
        &mut self.matches[idx.0]
    }

    pub fn stage_idx(&self, id: StageId) -> Result<StageIdx, PositioningError> {
        self.stages
            .iter()
            .position(|s| s.id == id)
            .map(StageIdx)
            .ok_or(PositioningError::StageNotFound(id))
    }

    pub fn match_idx(&self, id: MatchId) -> Result<MatchIdx, PositioningError> {
        self.matches
            .iter()
            .position(|m| m.id == id)
            .map(MatchIdx)
            .ok_or(PositioningError::MissingMatch(id))
    }

    /// The stage whose slot list holds the numbers used by `stage`'s matches.
    pub fn slot_owner(&self, stage: StageIdx) -> StageIdx {
        match self.stage(stage).layout {
            StageLayout::Group { container, .. } => container,
            _ => stage,
        }
    }

    pub fn occupant(&self, stage: StageIdx, slot: u32) -> Occupant {
        self.stage(self.slot_owner(stage)).occupant(slot)
    }

    pub fn is_bye(&self, stage: StageIdx, slot: u32) -> bool {
        self.occupant(stage, slot).is_bye()
    }

    /// Every match of a stage, including the matches of a container's groups.
    pub fn stage_match_indices(&self, stage: StageIdx) -> Vec<MatchIdx> {
        match &self.stage(stage).layout {
            StageLayout::Container { groups } => groups
                .iter()
                .flat_map(|g| self.stage(*g).matches.iter().copied())
                .collect(),
            _ => self.stage(stage).matches.clone(),
        }
    }

    /// Matches of one round, ordered by position.
    pub fn round_matches(&self, stage: StageIdx, round: u32) -> Vec<MatchIdx> {
        let mut matches: Vec<MatchIdx> = self
            .stage(stage)
            .matches
            .iter()
            .copied()
            .filter(|m| self.match_up(*m).round == round)
            .collect();
        matches.sort_by_key(|m| self.match_up(*m).position);
        matches
    }

    pub fn round_numbers(&self, stage: StageIdx) -> Vec<u32> {
        let rounds: BTreeSet<u32> = self
            .stage(stage)
            .matches
            .iter()
            .map(|m| self.match_up(*m).round)
            .collect();
        rounds.into_iter().collect()
    }

    pub fn first_round(&self, stage: StageIdx) -> Option<u32> {
        self.round_numbers(stage).first().copied()
    }

    /// Slot pairs of a round, in position order.
    pub fn round_pairs(&self, stage: StageIdx, round: u32) -> Vec<[Option<u32>; 2]> {
        self.round_matches(stage, round)
            .into_iter()
            .map(|m| self.match_up(m).slots)
            .collect()
    }

    pub fn match_in_round(&self, stage: StageIdx, round: u32, slot: u32) -> Option<MatchIdx> {
        self.stage(stage).matches.iter().copied().find(|m| {
            let mu = self.match_up(*m);
            mu.round == round && mu.contains(slot)
        })
    }

    /// First round in which the slot appears. Later appearances are carried copies.
    pub fn initial_round(&self, stage: StageIdx, slot: u32) -> Option<u32> {
        self.stage(stage)
            .matches
            .iter()
            .map(|m| self.match_up(*m))
            .filter(|m| m.contains(slot))
            .map(|m| m.round)
            .min()
    }

    pub fn initial_match(&self, stage: StageIdx, slot: u32) -> Option<MatchIdx> {
        let round = self.initial_round(stage, slot)?;
        self.match_in_round(stage, round, slot)
    }

    /// Whether `slot` sits in match `m` only because it was carried forward.
    pub fn is_carried(&self, m: MatchIdx, slot: u32) -> bool {
        let mu = self.match_up(m);
        self.initial_round(mu.stage, slot)
            .map_or(false, |initial| initial < mu.round)
    }

    pub fn link_from(&self, kind: LinkKind, stage: StageIdx, round: u32) -> Option<&Link> {
        self.links.iter().find(|l| l.is_sourced_at(kind, stage, round))
    }

    /// Links whose target is this stage.
    pub fn links_into(&self, stage: StageIdx) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(move |l| l.target.stage == stage)
    }

    /// Slots that can no longer be cleared: anything in a decided match, plus
    /// the slots of a bye match whose advancer has since been decided.
    pub fn active_slots(&self, stage: StageIdx) -> BTreeSet<u32> {
        let mut matches = self.stage_match_indices(stage);
        matches.sort_by_key(|m| std::cmp::Reverse(self.match_up(*m).round));

        let mut active = BTreeSet::new();
        for m in matches {
            let mu = self.match_up(m);
            if mu.status.is_decided() || mu.winning_side.is_some() {
                active.extend(mu.present_slots());
            } else if mu.status == MatchStatus::Bye
                && mu.present_slots().any(|s| active.contains(&s))
            {
                active.extend(mu.present_slots());
            }
        }
        active
    }

    pub fn is_active(&self, stage: StageIdx, slot: u32) -> bool {
        self.active_slots(stage).contains(&slot)
    }
}
