//! Double walkovers and double defaults, and how an exit travels forward.
//!
//! A match decided by a double exit has no winner. Its winner target then
//! either waits for the paired feeder, hands a walkover to the opponent
//! already there, or becomes a double exit itself when both feeders exited.

use crate::logic::cascade::{transact, Cascade, Step};
use crate::logic::targets::{paired_source, resolve_targets};
use crate::models::{
    Bracket, ExitKind, MatchId, MatchIdx, MatchStatus, Notices, PendingExit, PositioningError,
    Side,
};

/// Record a double walkover or double default and advance the exit.
pub fn set_double_exit(
    bracket: &mut Bracket,
    match_id: MatchId,
    kind: ExitKind,
    notices: &mut Notices<'_>,
) -> Result<(), PositioningError> {
    let m = bracket.match_idx(match_id)?;
    let mu = bracket.match_up(m);
    if mu.status.is_completed() {
        return Err(PositioningError::InvalidMatchStatus(match_id));
    }
    let [Some(a), Some(b)] = mu.slots else {
        return Err(PositioningError::InvalidMatchStatus(match_id));
    };
    if bracket.is_bye(mu.stage, a) || bracket.is_bye(mu.stage, b) {
        return Err(PositioningError::InvalidMatchStatus(match_id));
    }
    transact(bracket, notices, |cascade| {
        cascade.bracket.match_up_mut(m).pending_exit = None;
        cascade.set_status(m, kind.double_status(), None);
        cascade.push(Step::Exit(m, kind));
        Ok(())
    })
}

impl Cascade<'_> {
    /// `m` produced no winner: pass the exit to its targets.
    pub(crate) fn advance_exit(&mut self, m: MatchIdx, kind: ExitKind) -> Result<(), PositioningError> {
        let stage = self.bracket.match_up(m).stage;
        let targets = resolve_targets(self.bracket, m)?;

        // Nobody leaves through either target of another stage: those slots become byes.
        for target in [targets.loser, targets.winner].into_iter().flatten() {
            if target.stage == stage {
                continue;
            }
            if let Some(fixed) = target.slot {
                if self.bracket.occupant(target.stage, fixed).is_empty() {
                    self.push(Step::DirectBye(target.stage, fixed));
                }
            }
        }

        let Some(winner) = targets.winner.filter(|t| t.stage == stage) else {
            return Ok(());
        };
        let w = winner.match_idx;
        let next = self.bracket.match_up(w);
        if let Some(existing) = next.slots[winner.side.index()] {
            return Err(PositioningError::SlotAssigned(existing));
        }
        let opponent = next.slots[winner.side.opposite().index()];
        let (round, position, pending_exit) = (next.round, next.position, next.pending_exit);

        match pending_exit {
            Some(pending) if pending.from == m => Ok(()),
            Some(pending) => {
                let combined = kind.combine(pending.kind);
                log::debug!("round {} match {}: both feeders exited", round, position);
                self.bracket.match_up_mut(w).pending_exit = None;
                self.set_status(w, combined.double_status(), None);
                self.push(Step::Exit(w, combined));
                Ok(())
            }
            None => {
                if opponent.is_none() {
                    // The other half is still to come; its feeder has to exist.
                    paired_source(self.bracket, m, w)?;
                }
                self.bracket.match_up_mut(w).pending_exit = Some(PendingExit { from: m, kind });
                self.touch_match(w);
                match opponent {
                    None => self.set_status(w, kind.status(), None),
                    Some(_) => {
                        // Settled afresh against the exit.
                        self.set_status(w, MatchStatus::ToBePlayed, None);
                        self.push(Step::Settle(w));
                    }
                }
                Ok(())
            }
        }
    }

    /// Whether `m` is currently passing an exit on to its winner target.
    pub(crate) fn passes_exit(&self, m: MatchIdx) -> bool {
        let mu = self.bracket.match_up(m);
        mu.status.is_double_exit() || (mu.pending_exit.is_some() && mu.status == MatchStatus::Bye)
    }

    /// Settle a match holding an exit from one feeder.
    pub(crate) fn settle_pending_exit(
        &mut self,
        m: MatchIdx,
        pending: PendingExit,
    ) -> Result<(), PositioningError> {
        let mu = self.bracket.match_up(m);
        let stage = mu.stage;
        let present: Vec<(Side, u32)> = mu
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|slot| (Side::from_index(i), slot)))
            .collect();

        match present.as_slice() {
            [] => {
                if self.passes_exit(m) {
                    self.push(Step::Retract(m));
                }
                self.set_status(m, pending.kind.status(), None);
                Ok(())
            }
            [(_, slot)] if self.bracket.is_bye(stage, *slot) => {
                // A bye meets the exit: no one to advance, so the exit moves on.
                let already = self.bracket.match_up(m).status == MatchStatus::Bye;
                self.set_status(m, MatchStatus::Bye, None);
                if !already {
                    self.push(Step::Exit(m, pending.kind));
                }
                Ok(())
            }
            [(side, slot)] => {
                let (side, slot) = (*side, *slot);
                self.set_status(m, pending.kind.status(), Some(side));
                self.advance(m, slot)?;
                self.direct_loser_bye(m)
            }
            [_, (_, second)] => Err(PositioningError::SlotAssigned(*second)),
            _ => Ok(()),
        }
    }
}
