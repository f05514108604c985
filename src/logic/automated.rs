//! Automated positioning: byes, seeds, qualifiers and unseeded participants
//! placed in one run.

use crate::logic::assignment::{assign_bye, assign_participant, assign_qualifier};
use crate::logic::byes::plan_byes;
use crate::logic::qualifiers::{faces_bye, plan_qualifiers};
use crate::logic::seeding::{plan_seeds, trim_seeds};
use crate::logic::unseeded::plan_unseeded;
use crate::models::{
    AutomatedOptions, Bracket, NoticeLog, Notices, ParticipantId, Policies, PositioningError,
    SeedingProfile, StageId, StageIdx,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Result of an automated run. Placement failures are collected here instead
/// of failing the call; only structural errors abort it.
#[derive(Clone, Debug, Default)]
pub struct AutomatedOutcome {
    pub errors: Vec<PositioningError>,
    /// Participants left unplaced or drawn against a grouped opponent.
    pub unseeded_conflicts: Vec<ParticipantId>,
    /// Slots where a qualifier ended up facing a bye.
    pub qualifier_conflicts: Vec<u32>,
    /// The positioned copy, for provisional runs.
    pub bracket: Option<Bracket>,
}

impl AutomatedOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.unseeded_conflicts.is_empty() && self.qualifier_conflicts.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    Byes,
    Seeds,
    Qualifiers,
    Unseeded,
}

impl Phase {
    /// Waterfall fills byes first so they claim the top-seed-adjacent slots.
    fn order(profile: SeedingProfile) -> [Phase; 4] {
        match profile {
            SeedingProfile::Waterfall => [Phase::Byes, Phase::Seeds, Phase::Qualifiers, Phase::Unseeded],
            SeedingProfile::Separate | SeedingProfile::Cluster => {
                [Phase::Seeds, Phase::Byes, Phase::Qualifiers, Phase::Unseeded]
            }
        }
    }
}

/// Position `participants` (seeded and unseeded), the requested qualifiers and
/// the byes that fill the rest of a stage. Seeded participants of the stage
/// are entrants even when missing from `participants`.
///
/// The run works on a copy. Its notices are buffered and only go out once the
/// copy replaces the bracket; a structural error leaves the bracket untouched
/// and emits nothing. A provisional run hands the copy back in the outcome
/// instead and emits nothing either.
pub fn automated_positioning(
    bracket: &mut Bracket,
    stage_id: StageId,
    participants: &[ParticipantId],
    policies: &Policies,
    options: &AutomatedOptions,
    notices: &mut Notices<'_>,
) -> Result<AutomatedOutcome, PositioningError> {
    let stage = bracket.slot_owner(bracket.stage_idx(stage_id)?);
    let mut working = bracket.clone();
    let mut buffered = NoticeLog::new();
    let mut outcome = match run(
        &mut working,
        stage,
        participants,
        policies,
        options,
        &mut Notices::new(&mut buffered),
    ) {
        Ok(outcome) => outcome,
        Err(e) => {
            log::warn!("automated positioning of {} aborted: {}", bracket.stage(stage).name, e);
            return Err(e);
        }
    };
    if options.provisional {
        outcome.bracket = Some(working);
        return Ok(outcome);
    }

    *bracket = working;
    for notice in buffered.notices() {
        notices.emit(*notice);
    }
    Ok(outcome)
}

fn run(
    bracket: &mut Bracket,
    stage: StageIdx,
    participants: &[ParticipantId],
    policies: &Policies,
    options: &AutomatedOptions,
    notices: &mut Notices<'_>,
) -> Result<AutomatedOutcome, PositioningError> {
    let mut rng = match options.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let profile =
        policies.seeding_profile(options.seeding_profile.or(bracket.stage(stage).seeding_profile));
    bracket.stage_mut(stage).seeding_profile = Some(profile);

    let mut entrants: Vec<ParticipantId> = Vec::with_capacity(participants.len());
    for p in participants {
        if !entrants.contains(p) {
            entrants.push(*p);
        }
    }
    let seeded: Vec<ParticipantId> = bracket
        .stage(stage)
        .seeds
        .iter()
        .filter_map(|a| a.participant_id)
        .filter(|p| !entrants.contains(p))
        .collect();
    if !seeded.is_empty() {
        log::debug!("{} seeded participants added to the entrants", seeded.len());
        entrants.extend(seeded);
    }
    if let Some(seeding) = &policies.seeding {
        let draw_size = bracket.stage(stage).draw_size();
        if let Some(allowed) = seeding.seeds_count(draw_size, entrants.len() as u32) {
            trim_seeds(bracket, stage, allowed);
        }
    }

    let mut outcome = AutomatedOutcome::default();
    let mut positioning = Run {
        bracket,
        stage,
        options,
        notices,
        outcome: &mut outcome,
    };
    for phase in Phase::order(profile) {
        log::debug!("automated positioning: {:?}", phase);
        match phase {
            Phase::Byes => positioning.byes(&entrants)?,
            Phase::Seeds => positioning.seeds(profile, &mut rng)?,
            Phase::Qualifiers => positioning.qualifiers(&mut rng)?,
            Phase::Unseeded => positioning.unseeded(&entrants, policies, &mut rng)?,
        }
    }

    let s = positioning.bracket.stage(stage);
    log::info!(
        "{}: {} participants, {} qualifiers, {} byes placed; {} errors",
        s.name,
        s.participant_count(),
        s.qualifier_count(),
        s.bye_slots().len(),
        positioning.outcome.errors.len()
    );
    Ok(outcome)
}

struct Run<'r, 'n> {
    bracket: &'r mut Bracket,
    stage: StageIdx,
    options: &'r AutomatedOptions,
    notices: &'r mut Notices<'n>,
    outcome: &'r mut AutomatedOutcome,
}

impl Run<'_, '_> {
    fn stage_id(&self) -> StageId {
        self.bracket.stage(self.stage).id
    }

    /// Keep a placement error unless it is structural.
    fn record(&mut self, result: Result<(), PositioningError>) -> Result<(), PositioningError> {
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_structural() => Err(e),
            Err(e) => {
                log::warn!("automated positioning: {}", e);
                self.outcome.errors.push(e);
                Ok(())
            }
        }
    }

    /// Slots entrants start in: the first round, or every slot of a round robin.
    fn entry_slots(&self) -> Vec<u32> {
        let s = self.bracket.stage(self.stage);
        if s.is_container() {
            return s.slots.iter().map(|slot| slot.number).collect();
        }
        let first_round = self.bracket.first_round(self.stage);
        s.slots
            .iter()
            .map(|slot| slot.number)
            .filter(|n| self.bracket.initial_round(self.stage, *n) == first_round)
            .collect()
    }

    fn byes(&mut self, entrants: &[ParticipantId]) -> Result<(), PositioningError> {
        let entry = self.entry_slots();
        let s = self.bracket.stage(self.stage);
        let first_round = self.bracket.first_round(self.stage);
        let qualifiers_at_entry = s.is_container()
            || self.options.qualifier_round.is_none()
            || self.options.qualifier_round == first_round;
        let qualifiers = if qualifiers_at_entry {
            self.options.qualifiers_count
        } else {
            0
        };
        let needed = entrants.len() as u32 + qualifiers;
        let capacity = entry.len() as u32;
        if needed > capacity {
            // Nothing to fill; a shortfall is reported by the placements that miss out.
            return Ok(());
        }
        let allowed = capacity - needed;
        let placed = entry.iter().filter(|n| s.occupant(**n).is_bye()).count() as u32;
        if placed > allowed {
            return self.record(Err(PositioningError::ByesLimitReached { placed, allowed }));
        }

        let stage_id = self.stage_id();
        for slot in plan_byes(self.bracket, self.stage, allowed - placed) {
            let result = assign_bye(self.bracket, stage_id, slot, self.notices);
            self.record(result)?;
        }
        Ok(())
    }

    fn seeds(&mut self, profile: SeedingProfile, rng: &mut StdRng) -> Result<(), PositioningError> {
        let plan = plan_seeds(self.bracket, self.stage, profile, rng);
        for e in plan.errors {
            self.record(Err(e))?;
        }
        let stage_id = self.stage_id();
        for (participant_id, slot) in plan.placements {
            let result = assign_participant(self.bracket, stage_id, slot, participant_id, self.notices);
            self.record(result)?;
        }
        Ok(())
    }

    fn qualifiers(&mut self, rng: &mut StdRng) -> Result<(), PositioningError> {
        let wanted = self
            .options
            .qualifiers_count
            .saturating_sub(self.bracket.stage(self.stage).qualifier_count());
        let slots = plan_qualifiers(self.bracket, self.stage, wanted, self.options.qualifier_round, rng);
        if (slots.len() as u32) < wanted {
            self.record(Err(PositioningError::InsufficientSlots {
                needed: wanted,
                available: slots.len() as u32,
            }))?;
        }

        let stage_id = self.stage_id();
        for slot in slots {
            let result = assign_qualifier(self.bracket, stage_id, slot, self.notices);
            let placed = result.is_ok();
            self.record(result)?;
            if placed && faces_bye(self.bracket, self.stage, slot) {
                log::warn!("qualifier in slot {} faces a bye", slot);
                self.outcome.qualifier_conflicts.push(slot);
            }
        }
        Ok(())
    }

    fn unseeded(
        &mut self,
        entrants: &[ParticipantId],
        policies: &Policies,
        rng: &mut StdRng,
    ) -> Result<(), PositioningError> {
        let s = self.bracket.stage(self.stage);
        let pending: Vec<ParticipantId> = entrants
            .iter()
            .copied()
            .filter(|p| s.participant_slot(*p).is_none() && s.seed_of(*p).is_none())
            .collect();
        let plan = plan_unseeded(self.bracket, self.stage, &pending, policies.avoidance.as_ref(), rng);

        let stage_id = self.stage_id();
        for (participant_id, slot) in plan.placements {
            let result = assign_participant(self.bracket, stage_id, slot, participant_id, self.notices);
            if result.is_err() {
                self.outcome.unseeded_conflicts.push(participant_id);
            }
            self.record(result)?;
        }
        if !plan.unplaced.is_empty() {
            log::warn!("{} participants could not be placed", plan.unplaced.len());
            self.record(Err(PositioningError::InsufficientSlots {
                needed: pending.len() as u32,
                available: (pending.len() - plan.unplaced.len()) as u32,
            }))?;
            self.outcome.unseeded_conflicts.extend(plan.unplaced);
        }
        self.outcome.unseeded_conflicts.extend(plan.conflicts);
        Ok(())
    }
}
