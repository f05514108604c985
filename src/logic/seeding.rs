//! Seed assignments and seed placement.

use crate::logic::seed_blocks::{group_seed_values, seed_block_for, stage_seed_blocks};
use crate::models::{
    Bracket, ParticipantId, PositioningError, SeedAssignment, SeedingProfile, StageId, StageIdx,
    StageLayout,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// Register (or replace) the holder of a seed number in a stage.
///
/// `seed_value` defaults to the seed number; round-robin thresholds give
/// several seeds the same value.
pub fn assign_seed(
    bracket: &mut Bracket,
    stage_id: StageId,
    seed_number: u32,
    participant_id: ParticipantId,
    seed_value: Option<u32>,
) -> Result<(), PositioningError> {
    let stage = bracket.slot_owner(bracket.stage_idx(stage_id)?);
    let s = bracket.stage(stage);
    if seed_number == 0 {
        return Err(PositioningError::InvalidValues("seed numbers start at 1".into()));
    }
    if seed_number > s.draw_size() {
        return Err(PositioningError::SeedsCountGreaterThanDrawSize {
            seeds: seed_number,
            draw_size: s.draw_size(),
        });
    }
    if let Some(held) = s.seed_of(participant_id) {
        if held.seed_number != seed_number {
            return Err(PositioningError::InvalidValues(format!(
                "participant {} already holds seed {}",
                participant_id, held.seed_number
            )));
        }
    }

    let assignment = SeedAssignment {
        seed_number,
        seed_value: seed_value.unwrap_or(seed_number),
        participant_id: Some(participant_id),
    };
    let s = bracket.stage_mut(stage);
    s.seeds.retain(|a| a.seed_number != seed_number);
    s.seeds.push(assignment);
    s.seeds.sort_by_key(|a| a.seed_number);
    log::debug!("seed {} in {} -> {}", seed_number, s.name, participant_id);
    Ok(())
}

/// Re-value a round-robin container's seeds so each run of group-count seeds
/// shares the lowest seed number of the run.
pub fn apply_group_seed_values(bracket: &mut Bracket, stage_id: StageId) -> Result<(), PositioningError> {
    let stage = bracket.slot_owner(bracket.stage_idx(stage_id)?);
    let StageLayout::Container { groups } = &bracket.stage(stage).layout else {
        return Ok(());
    };
    let group_count = groups.len() as u32;
    let s = bracket.stage_mut(stage);
    let count = s.seeds.iter().map(|a| a.seed_number).max().unwrap_or(0);
    for (seed_number, value) in group_seed_values(count, group_count) {
        if let Some(a) = s.seeds.iter_mut().find(|a| a.seed_number == seed_number) {
            a.seed_value = value;
        }
    }
    Ok(())
}

/// Outcome of planning seed positions.
#[derive(Debug, Default)]
pub(crate) struct SeedPlan {
    pub placements: Vec<(ParticipantId, u32)>,
    pub errors: Vec<PositioningError>,
}

/// Choose a slot for every unplaced seeded participant of a stage.
///
/// Waterfall takes the first free slot of each block (snaking across
/// round-robin groups); the other profiles pick at random within the block.
pub(crate) fn plan_seeds<R: Rng>(
    bracket: &Bracket,
    stage: StageIdx,
    profile: SeedingProfile,
    rng: &mut R,
) -> SeedPlan {
    let s = bracket.stage(stage);
    let mut plan = SeedPlan::default();
    let seeded: Vec<&SeedAssignment> = s.seeds.iter().filter(|a| a.participant_id.is_some()).collect();
    if seeded.len() as u32 > s.draw_size() {
        plan.errors.push(PositioningError::SeedsCountGreaterThanDrawSize {
            seeds: seeded.len() as u32,
            draw_size: s.draw_size(),
        });
        return plan;
    }

    let active = bracket.active_slots(stage);
    let mut taken: Vec<u32> = Vec::new();
    let blocks = stage_seed_blocks(bracket, stage);
    for seed in seeded {
        let Some(participant_id) = seed.participant_id else {
            continue;
        };
        if s.participant_slot(participant_id).is_some() {
            continue;
        }
        let Some(mut block) = seed_block_for(bracket, stage, seed.seed_value) else {
            plan.errors.push(PositioningError::SeedBlockExhausted {
                seed_number: seed.seed_number,
            });
            continue;
        };
        if profile == SeedingProfile::Waterfall && s.is_container() {
            let row = blocks.iter().position(|b| *b == block).unwrap_or(0);
            if row % 2 == 1 {
                block.reverse();
            }
        }
        let free: Vec<u32> = block
            .into_iter()
            .filter(|slot| s.occupant(*slot).is_empty() && !active.contains(slot) && !taken.contains(slot))
            .collect();
        let chosen = match profile {
            SeedingProfile::Waterfall => free.first().copied(),
            SeedingProfile::Separate | SeedingProfile::Cluster => free.choose(rng).copied(),
        };
        match chosen {
            Some(slot) => {
                taken.push(slot);
                plan.placements.push((participant_id, slot));
            }
            None => plan.errors.push(PositioningError::SeedBlockExhausted {
                seed_number: seed.seed_number,
            }),
        }
    }
    plan
}

/// Drop seeds beyond what the seeding policy allows for this draw.
pub(crate) fn trim_seeds(bracket: &mut Bracket, stage: StageIdx, allowed: u32) -> Vec<ParticipantId> {
    let s = bracket.stage_mut(stage);
    let mut dropped = Vec::new();
    s.seeds.retain(|a| {
        let keep = a.seed_number <= allowed;
        if !keep {
            dropped.extend(a.participant_id);
        }
        keep
    });
    if !dropped.is_empty() {
        log::warn!(
            "{}: policy allows {} seeds, {} unseeded",
            s.name,
            allowed,
            dropped.len()
        );
    }
    dropped
}
