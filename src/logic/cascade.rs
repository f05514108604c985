//! Work queue shared by assignment, removal and exit advancement.
//!
//! Every mutating operation runs inside [`transact`]: the bracket is
//! snapshotted, the operation pushes steps, the queue is drained, and either
//! the whole change is kept (and notices go out) or the snapshot is restored.

use crate::models::{
    Bracket, ExitKind, MatchIdx, MatchStatus, Notice, Notices, PositioningError, StageIdx,
    StageLayout,
};
use std::collections::{BTreeSet, VecDeque};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Step {
    /// Recompute a match's status from its occupants and carry its advancer.
    Settle(MatchIdx),
    /// Withdraw whatever the match carried forward that it no longer justifies.
    Retract(MatchIdx),
    /// Clear a bye that was directed into another stage.
    ClearSlot(StageIdx, u32),
    /// Put a bye into an empty slot of another stage.
    DirectBye(StageIdx, u32),
    /// The match produced no winner; pass the exit on.
    Exit(MatchIdx, ExitKind),
}

pub(crate) struct Cascade<'b> {
    pub(crate) bracket: &'b mut Bracket,
    queue: VecDeque<Step>,
    stages: BTreeSet<StageIdx>,
    matches: BTreeSet<MatchIdx>,
}

impl<'b> Cascade<'b> {
    fn new(bracket: &'b mut Bracket) -> Self {
        Self {
            bracket,
            queue: VecDeque::new(),
            stages: BTreeSet::new(),
            matches: BTreeSet::new(),
        }
    }

    pub(crate) fn push(&mut self, step: Step) {
        self.queue.push_back(step);
    }

    pub(crate) fn touch_stage(&mut self, stage: StageIdx) {
        self.stages.insert(self.bracket.slot_owner(stage));
    }

    pub(crate) fn touch_match(&mut self, m: MatchIdx) {
        self.matches.insert(m);
    }

    /// Drain the queue. Steps may push further steps.
    pub(crate) fn run(&mut self) -> Result<(), PositioningError> {
        while let Some(step) = self.queue.pop_front() {
            log::trace!("cascade step {:?}", step);
            match step {
                Step::Settle(m) => self.settle(m)?,
                Step::Retract(m) => self.retract(m)?,
                Step::ClearSlot(stage, slot) => self.clear_directed(stage, slot)?,
                Step::DirectBye(stage, slot) => self.direct_bye(stage, slot)?,
                Step::Exit(m, kind) => self.advance_exit(m, kind)?,
            }
        }
        Ok(())
    }

    /// A slot changed whether it is a bye: every match it appears in may now
    /// carry a different advancer.
    pub(crate) fn reconcile_slot(&mut self, stage: StageIdx, slot: u32) {
        let mut holding: Vec<MatchIdx> = self
            .bracket
            .stage(stage)
            .matches
            .iter()
            .copied()
            .filter(|m| self.bracket.match_up(*m).contains(slot))
            .collect();
        holding.sort_by_key(|m| self.bracket.match_up(*m).round);
        for m in &holding {
            self.push(Step::Retract(*m));
        }
        for m in holding {
            self.push(Step::Settle(m));
        }
    }

    /// Recompute statuses of a round-robin container's group matches.
    pub(crate) fn refresh_groups(&mut self, container: StageIdx) {
        for m in self.bracket.stage_match_indices(container) {
            let mu = self.bracket.match_up(m);
            if mu.status.is_decided() {
                continue;
            }
            let status = if mu.present_slots().any(|s| self.bracket.is_bye(container, s)) {
                MatchStatus::Bye
            } else {
                MatchStatus::ToBePlayed
            };
            self.set_status(m, status, None);
        }
    }

    pub(crate) fn is_elimination(&self, stage: StageIdx) -> bool {
        matches!(self.bracket.stage(stage).layout, StageLayout::Elimination)
    }

    fn publish(&self, notices: &mut Notices<'_>) {
        for stage in &self.stages {
            notices.emit(Notice::SlotAssignments {
                stage_id: self.bracket.stage(*stage).id,
            });
        }
        for m in &self.matches {
            notices.emit(Notice::MatchModified {
                match_id: self.bracket.match_up(*m).id,
            });
        }
        if !self.stages.is_empty() || !self.matches.is_empty() {
            notices.emit(Notice::DrawModified {
                draw_id: self.bracket.id,
            });
        }
    }
}

/// Run `operation` and drain its cascade atomically.
///
/// On error the bracket is restored to its state before the call and no
/// notices are emitted.
pub(crate) fn transact<T>(
    bracket: &mut Bracket,
    notices: &mut Notices<'_>,
    operation: impl FnOnce(&mut Cascade<'_>) -> Result<T, PositioningError>,
) -> Result<T, PositioningError> {
    let snapshot = bracket.clone();
    let mut cascade = Cascade::new(bracket);
    let result = operation(&mut cascade).and_then(|value| cascade.run().map(|()| value));
    match result {
        Ok(value) => {
            cascade.publish(notices);
            Ok(value)
        }
        Err(e) => {
            log::debug!("rolling back draw {}: {}", snapshot.id, e);
            *cascade.bracket = snapshot;
            Err(e)
        }
    }
}
