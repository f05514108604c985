//! Placing participants, qualifiers and byes into slots, and the bye
//! advancement that follows.

use crate::logic::cascade::{transact, Cascade, Step};
use crate::logic::seed_blocks::seed_block_for;
use crate::logic::targets::{loser_target, winner_target, Target};
use crate::models::{
    Bracket, MatchIdx, MatchStatus, MatchType, Notices, Occupant, ParticipantId,
    PositioningError, Side, StageId, StageIdx,
};
use serde::{Deserialize, Serialize};

/// What to put into a slot. A participant wins over the qualifier flag.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotRequest {
    pub participant_id: Option<ParticipantId>,
    pub qualifier: bool,
}

impl SlotRequest {
    pub fn participant(participant_id: ParticipantId) -> Self {
        Self {
            participant_id: Some(participant_id),
            qualifier: false,
        }
    }

    pub fn qualifier() -> Self {
        Self {
            participant_id: None,
            qualifier: true,
        }
    }

    fn occupant(&self) -> Result<Occupant, PositioningError> {
        match (self.participant_id, self.qualifier) {
            (Some(id), _) => Ok(Occupant::Participant(id)),
            (None, true) => Ok(Occupant::Qualifier),
            (None, false) => Err(PositioningError::MissingParticipant),
        }
    }
}

/// Place a participant or qualifier into a slot.
///
/// An occupied slot is cleared first (including any byes it carried). A
/// participant already in this slot is a no-op; one sitting elsewhere in the
/// stage is rejected, as is a seeded participant outside its seed block.
pub fn assign_slot(
    bracket: &mut Bracket,
    stage_id: StageId,
    slot: u32,
    request: SlotRequest,
    notices: &mut Notices<'_>,
) -> Result<(), PositioningError> {
    let occupant = request.occupant()?;
    let stage = bracket.stage_idx(stage_id)?;
    transact(bracket, notices, |cascade| cascade.assign(stage, slot, occupant))
}

pub fn assign_participant(
    bracket: &mut Bracket,
    stage_id: StageId,
    slot: u32,
    participant_id: ParticipantId,
    notices: &mut Notices<'_>,
) -> Result<(), PositioningError> {
    assign_slot(bracket, stage_id, slot, SlotRequest::participant(participant_id), notices)
}

pub fn assign_qualifier(
    bracket: &mut Bracket,
    stage_id: StageId,
    slot: u32,
    notices: &mut Notices<'_>,
) -> Result<(), PositioningError> {
    assign_slot(bracket, stage_id, slot, SlotRequest::qualifier(), notices)
}

/// Place a bye. The opponent (or, for two byes, the lower slot) advances.
pub fn assign_bye(
    bracket: &mut Bracket,
    stage_id: StageId,
    slot: u32,
    notices: &mut Notices<'_>,
) -> Result<(), PositioningError> {
    let stage = bracket.stage_idx(stage_id)?;
    transact(bracket, notices, |cascade| cascade.assign(stage, slot, Occupant::Bye))
}

impl Cascade<'_> {
    pub(crate) fn assign(
        &mut self,
        stage: StageIdx,
        slot: u32,
        occupant: Occupant,
    ) -> Result<(), PositioningError> {
        let stage = self.bracket.slot_owner(stage);
        let current = self
            .bracket
            .stage(stage)
            .slot(slot)
            .map(|s| s.occupant)
            .ok_or(PositioningError::InvalidSlot(slot))?;
        if current == occupant {
            return Ok(());
        }
        if let Occupant::Participant(participant_id) = occupant {
            self.check_participant(stage, slot, participant_id)?;
        }
        if self.bracket.is_active(stage, slot) {
            return Err(PositioningError::SlotActive(slot));
        }
        if !current.is_empty() {
            self.clear(stage, slot)?;
            self.run()?;
        }
        self.place(stage, slot, occupant)?;
        if let Occupant::Participant(participant_id) = occupant {
            self.inherit_seed(stage, slot, participant_id);
        }
        Ok(())
    }

    fn check_participant(
        &self,
        stage: StageIdx,
        slot: u32,
        participant_id: ParticipantId,
    ) -> Result<(), PositioningError> {
        let s = self.bracket.stage(stage);
        if let Some(existing) = s.participant_slot(participant_id) {
            return Err(PositioningError::ExistingParticipantAssignment {
                participant_id,
                slot: existing,
            });
        }
        if let Some(seed) = s.seed_of(participant_id) {
            if let Some(block) = seed_block_for(self.bracket, stage, seed.seed_value) {
                if !block.contains(&slot) {
                    return Err(PositioningError::InvalidSeedPosition {
                        seed_number: seed.seed_number,
                        slot,
                    });
                }
            }
        }
        Ok(())
    }

    /// Write an occupant into an unoccupied slot and queue the settle of the
    /// match it first appears in.
    pub(crate) fn place(
        &mut self,
        stage: StageIdx,
        slot: u32,
        occupant: Occupant,
    ) -> Result<(), PositioningError> {
        let stage = self.bracket.slot_owner(stage);
        let entry = self
            .bracket
            .stage_mut(stage)
            .slot_mut(slot)
            .ok_or(PositioningError::InvalidSlot(slot))?;
        entry.occupant = occupant;
        entry.link_positioning = false;
        self.touch_stage(stage);
        log::debug!(
            "placed {:?} in slot {} of {}",
            occupant,
            slot,
            self.bracket.stage(stage).name
        );

        if let Occupant::Participant(participant_id) = occupant {
            self.attach_lineup(stage, slot, participant_id);
        }
        if self.bracket.stage(stage).is_container() {
            self.refresh_groups(stage);
        } else if occupant.is_bye() {
            self.reconcile_slot(stage, slot);
        } else if let Some(m) = self.bracket.initial_match(stage, slot) {
            self.push(Step::Settle(m));
        }
        Ok(())
    }

    /// Recompute a match from its occupants; a bye match carries its advancer.
    pub(crate) fn settle(&mut self, m: MatchIdx) -> Result<(), PositioningError> {
        let mu = self.bracket.match_up(m);
        let stage = mu.stage;
        if !self.is_elimination(stage) {
            let owner = self.bracket.slot_owner(stage);
            self.refresh_groups(owner);
            return Ok(());
        }
        if let Some(pending) = mu.pending_exit {
            return self.settle_pending_exit(m, pending);
        }
        if mu.status.is_decided() {
            return Ok(());
        }

        let has_bye = mu.present_slots().any(|s| self.bracket.is_bye(stage, s));
        let status = if has_bye {
            MatchStatus::Bye
        } else {
            MatchStatus::ToBePlayed
        };
        self.set_status(m, status, None);

        if let Some(advancer) = self.bye_advancer(m) {
            self.advance(m, advancer)?;
            self.direct_loser_bye(m)?;
        }
        Ok(())
    }

    pub(crate) fn set_status(&mut self, m: MatchIdx, status: MatchStatus, winning_side: Option<Side>) {
        let mu = self.bracket.match_up_mut(m);
        if mu.status == status && mu.winning_side == winning_side {
            return;
        }
        log::debug!(
            "round {} match {}: {:?} -> {:?}",
            mu.round,
            mu.position,
            mu.status,
            status
        );
        mu.status = status;
        mu.winning_side = winning_side;
        self.touch_match(m);
    }

    /// The slot a bye match carries: the non-bye slot, or the lower of two byes.
    pub(crate) fn bye_advancer(&self, m: MatchIdx) -> Option<u32> {
        let mu = self.bracket.match_up(m);
        let [Some(a), Some(b)] = mu.slots else {
            return None;
        };
        match (self.bracket.is_bye(mu.stage, a), self.bracket.is_bye(mu.stage, b)) {
            (true, true) => Some(a.min(b)),
            (true, false) => Some(b),
            (false, true) => Some(a),
            (false, false) => None,
        }
    }

    /// What a match currently justifies carrying into its winner target.
    pub(crate) fn expected_advancer(&self, m: MatchIdx) -> Option<u32> {
        let mu = self.bracket.match_up(m);
        if let Some(side) = mu.winning_side {
            return mu.slots[side.index()];
        }
        if mu.status.is_decided() {
            return None;
        }
        self.bye_advancer(m)
    }

    /// Carry `slot` from match `m` into its winner target.
    pub(crate) fn advance(&mut self, m: MatchIdx, slot: u32) -> Result<(), PositioningError> {
        let Some(target) = winner_target(self.bracket, m)? else {
            return Ok(());
        };
        let source_stage = self.bracket.match_up(m).stage;
        if target.stage != source_stage {
            return self.advance_across(source_stage, slot, target);
        }

        let w = target.match_idx;
        match self.bracket.match_up(w).slots[target.side.index()] {
            Some(existing) if existing == slot => Ok(()),
            Some(existing) => Err(PositioningError::SlotAssigned(existing)),
            None => {
                let lineup = self.bracket.match_up(m).lineups.get(&slot).cloned();
                if self.bracket.match_up(w).pending_exit.map(|p| p.from) == Some(m) {
                    // The feeder now produces a winner instead of an exit.
                    self.bracket.match_up_mut(w).pending_exit = None;
                    self.set_status(w, MatchStatus::ToBePlayed, None);
                }
                let next = self.bracket.match_up_mut(w);
                next.slots[target.side.index()] = Some(slot);
                if let Some(lineup) = lineup {
                    next.lineups.insert(slot, lineup);
                }
                log::debug!("slot {} carried into round {}", slot, next.round);
                self.touch_match(w);
                self.push(Step::Settle(w));
                Ok(())
            }
        }
    }

    /// A winner leaving the stage: byes travel as byes, participants as themselves.
    fn advance_across(
        &mut self,
        source_stage: StageIdx,
        slot: u32,
        target: Target,
    ) -> Result<(), PositioningError> {
        let Some(fixed) = target.slot else {
            return Ok(());
        };
        let there = self.bracket.occupant(target.stage, fixed);
        match self.bracket.occupant(source_stage, slot) {
            Occupant::Bye => {
                if there.is_empty() {
                    self.push(Step::DirectBye(target.stage, fixed));
                }
                Ok(())
            }
            Occupant::Participant(participant_id) => {
                if there == Occupant::Participant(participant_id) {
                    return Ok(());
                }
                if !matches!(there, Occupant::Empty | Occupant::Qualifier) {
                    return Err(PositioningError::SlotAssigned(fixed));
                }
                let owner = self.bracket.slot_owner(target.stage);
                if self.bracket.stage(owner).participant_slot(participant_id).is_some() {
                    log::warn!(
                        "participant {} already placed in {}",
                        participant_id,
                        self.bracket.stage(owner).name
                    );
                    return Ok(());
                }
                self.place(owner, fixed, Occupant::Participant(participant_id))
            }
            Occupant::Empty | Occupant::Qualifier => Ok(()),
        }
    }

    /// A bye match's loser is a bye: direct it into an empty cross-stage loser slot.
    pub(crate) fn direct_loser_bye(&mut self, m: MatchIdx) -> Result<(), PositioningError> {
        let stage = self.bracket.match_up(m).stage;
        let Some(target) = loser_target(self.bracket, m)? else {
            return Ok(());
        };
        if target.stage == stage {
            return Ok(());
        }
        if let Some(fixed) = target.slot {
            if self.bracket.occupant(target.stage, fixed).is_empty() {
                self.push(Step::DirectBye(target.stage, fixed));
            }
        }
        Ok(())
    }

    pub(crate) fn direct_bye(&mut self, stage: StageIdx, slot: u32) -> Result<(), PositioningError> {
        let owner = self.bracket.slot_owner(stage);
        let Some(entry) = self.bracket.stage_mut(owner).slot_mut(slot) else {
            return Err(PositioningError::InvalidSlot(slot));
        };
        if !entry.occupant.is_empty() {
            return Ok(());
        }
        entry.occupant = Occupant::Bye;
        self.touch_stage(owner);
        log::debug!("bye directed into slot {} of {}", slot, self.bracket.stage(owner).name);
        if self.bracket.stage(owner).is_container() {
            self.refresh_groups(owner);
        } else {
            self.reconcile_slot(owner, slot);
        }
        Ok(())
    }

    fn attach_lineup(&mut self, stage: StageIdx, slot: u32, participant_id: ParticipantId) {
        if self.bracket.stage(stage).match_type != MatchType::Team {
            return;
        }
        let Some(lineup) = self.bracket.default_lineups.get(&participant_id).cloned() else {
            return;
        };
        for m in self.bracket.stage_match_indices(stage) {
            let mu = self.bracket.match_up_mut(m);
            if mu.contains(slot) && !mu.status.is_decided() {
                mu.lineups.insert(slot, lineup.clone());
                self.touch_match(m);
            }
        }
    }

    pub(crate) fn detach_lineup(&mut self, stage: StageIdx, slot: u32) {
        for m in self.bracket.stage_match_indices(stage) {
            if self.bracket.match_up_mut(m).lineups.remove(&slot).is_some() {
                self.touch_match(m);
            }
        }
    }

    /// Carry a seed over from a stage that feeds this one, when the slot is
    /// inside the seed's block here.
    fn inherit_seed(&mut self, stage: StageIdx, slot: u32, participant_id: ParticipantId) {
        if self.bracket.stage(stage).seed_of(participant_id).is_some() {
            return;
        }
        let sources: Vec<StageIdx> = self
            .bracket
            .links_into(stage)
            .map(|l| self.bracket.slot_owner(l.source.stage))
            .filter(|s| *s != stage)
            .collect();
        for source in sources {
            let Some(seed) = self.bracket.stage(source).seed_of(participant_id).cloned() else {
                continue;
            };
            let taken = self
                .bracket
                .stage(stage)
                .seeds
                .iter()
                .any(|s| s.seed_number == seed.seed_number);
            let fits = seed_block_for(self.bracket, stage, seed.seed_value)
                .map_or(false, |block| block.contains(&slot));
            if taken || !fits {
                log::debug!("seed {} not carried into slot {}", seed.seed_number, slot);
                continue;
            }
            let target = self.bracket.stage_mut(stage);
            target.seeds.push(seed);
            target.seeds.sort_by_key(|s| s.seed_number);
            self.touch_stage(stage);
            return;
        }
    }
}
