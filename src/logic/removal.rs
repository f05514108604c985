//! Clearing slots and unwinding what they carried forward.

use crate::logic::cascade::{transact, Cascade, Step};
use crate::logic::targets::resolve_targets;
use crate::models::{
    Bracket, MatchIdx, MatchStatus, Notices, PositioningError, StageId, StageIdx,
};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ClearOutcome {
    /// False when the slot was already empty.
    pub cleared: bool,
}

/// Empty a slot. Byes it produced, in this stage or directed into others,
/// are withdrawn; slots whose matches are decided cannot be cleared.
pub fn clear_slot(
    bracket: &mut Bracket,
    stage_id: StageId,
    slot: u32,
    notices: &mut Notices<'_>,
) -> Result<ClearOutcome, PositioningError> {
    let stage = bracket.slot_owner(bracket.stage_idx(stage_id)?);
    if bracket.stage(stage).slot(slot).is_none() {
        return Err(PositioningError::InvalidSlot(slot));
    }
    if bracket.is_active(stage, slot) {
        return Err(PositioningError::SlotActive(slot));
    }
    let cleared = transact(bracket, notices, |cascade| cascade.clear(stage, slot))?;
    Ok(ClearOutcome { cleared })
}

impl Cascade<'_> {
    /// Empty a slot on request and queue the unwind. Returns whether anything was there.
    pub(crate) fn clear(&mut self, stage: StageIdx, slot: u32) -> Result<bool, PositioningError> {
        self.empty_slot(stage, slot, true)
    }

    /// Only a requested clear switches link positioning off; a withdrawn
    /// directed bye leaves the slot as the link left it.
    fn empty_slot(&mut self, stage: StageIdx, slot: u32, requested: bool) -> Result<bool, PositioningError> {
        let stage = self.bracket.slot_owner(stage);
        let entry = self
            .bracket
            .stage_mut(stage)
            .slot_mut(slot)
            .ok_or(PositioningError::InvalidSlot(slot))?;
        let previous = std::mem::take(&mut entry.occupant);
        if requested {
            entry.link_positioning = false;
        }
        if previous.is_empty() {
            return Ok(false);
        }
        self.touch_stage(stage);
        log::debug!(
            "cleared {:?} from slot {} of {}",
            previous,
            slot,
            self.bracket.stage(stage).name
        );
        if previous.participant().is_some() {
            self.detach_lineup(stage, slot);
        }

        if self.bracket.stage(stage).is_container() {
            self.refresh_groups(stage);
        } else if previous.is_bye() {
            self.reconcile_slot(stage, slot);
        } else if let Some(m) = self.bracket.initial_match(stage, slot) {
            self.push(Step::Settle(m));
        }
        Ok(true)
    }

    /// Withdraw what `m` carried forward but no longer justifies, then settle
    /// the target again. Byes directed into other stages are withdrawn too.
    pub(crate) fn retract(&mut self, m: MatchIdx) -> Result<(), PositioningError> {
        let stage = self.bracket.match_up(m).stage;
        if !self.is_elimination(stage) {
            return Ok(());
        }
        let targets = resolve_targets(self.bracket, m)?;
        let has_bye = self
            .bracket
            .match_up(m)
            .present_slots()
            .any(|s| self.bracket.is_bye(stage, s));
        let expected = self.expected_advancer(m);
        let carries_bye = expected.map_or(false, |s| self.bracket.is_bye(stage, s));

        let directed = [(targets.loser, has_bye), (targets.winner, carries_bye)];
        for (target, still_backed) in directed {
            let Some(target) = target.filter(|t| t.stage != stage) else {
                continue;
            };
            if let Some(fixed) = target.slot {
                if !still_backed && self.bracket.is_bye(target.stage, fixed) {
                    self.push(Step::ClearSlot(target.stage, fixed));
                }
            }
        }

        let Some(winner) = targets.winner.filter(|t| t.stage == stage) else {
            return Ok(());
        };
        let w = winner.match_idx;
        if let Some(pending) = self.bracket.match_up(w).pending_exit {
            if pending.from == m && !self.passes_exit(m) {
                log::debug!("exit withdrawn from round {}", self.bracket.match_up(w).round);
                self.bracket.match_up_mut(w).pending_exit = None;
                self.set_status(w, MatchStatus::ToBePlayed, None);
                self.push(Step::Retract(w));
                self.push(Step::Settle(w));
                return Ok(());
            }
        }
        let Some(value) = self.bracket.match_up(w).slots[winner.side.index()] else {
            return Ok(());
        };
        if !self.bracket.is_carried(w, value) || expected == Some(value) {
            return Ok(());
        }
        if self.bracket.match_up(w).status.is_decided() {
            return Err(PositioningError::SlotActive(value));
        }

        let next = self.bracket.match_up_mut(w);
        next.slots[winner.side.index()] = None;
        next.lineups.remove(&value);
        log::debug!("slot {} withdrawn from round {}", value, next.round);
        self.touch_match(w);
        self.push(Step::Retract(w));
        self.push(Step::Settle(w));
        Ok(())
    }

    /// Clear a bye that another stage directed here, unless it is already in play.
    pub(crate) fn clear_directed(&mut self, stage: StageIdx, slot: u32) -> Result<(), PositioningError> {
        if !self.bracket.is_bye(stage, slot) {
            return Ok(());
        }
        if self.bracket.is_active(stage, slot) {
            log::warn!(
                "directed bye in slot {} of {} is active; left in place",
                slot,
                self.bracket.stage(stage).name
            );
            return Ok(());
        }
        self.empty_slot(stage, slot, false).map(|_| ())
    }
}

