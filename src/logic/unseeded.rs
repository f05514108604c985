//! Placing unseeded participants, keeping grouped participants apart.

use crate::models::{AvoidancePolicy, Bracket, ParticipantId, StageIdx, StageLayout};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub(crate) struct UnseededPlan {
    pub placements: Vec<(ParticipantId, u32)>,
    /// Placed next to someone sharing a grouping key.
    pub conflicts: Vec<ParticipantId>,
    /// No free slot was left.
    pub unplaced: Vec<ParticipantId>,
}

/// Choose slots for unplaced participants in random order.
///
/// Without an avoidance policy each takes a random free slot. With one, the
/// slot with the lowest avoidance score wins, ties broken at random.
pub(crate) fn plan_unseeded<R: Rng>(
    bracket: &Bracket,
    stage: StageIdx,
    participants: &[ParticipantId],
    avoidance: Option<&AvoidancePolicy>,
    rng: &mut R,
) -> UnseededPlan {
    let s = bracket.stage(stage);
    let active = bracket.active_slots(stage);
    let first_round = bracket.first_round(stage);
    let mut free: Vec<u32> = s
        .unassigned_slots()
        .into_iter()
        .filter(|slot| !active.contains(slot))
        .filter(|slot| s.is_container() || bracket.initial_round(stage, *slot) == first_round)
        .collect();

    let mut placed: HashMap<u32, ParticipantId> = s
        .slots
        .iter()
        .filter_map(|slot| Some((slot.number, slot.occupant.participant()?)))
        .collect();
    let sections = Sections::of(bracket, stage);

    let mut order: Vec<ParticipantId> = participants.to_vec();
    order.shuffle(rng);

    let mut plan = UnseededPlan::default();
    for participant_id in order {
        if free.is_empty() {
            plan.unplaced.push(participant_id);
            continue;
        }
        let grouped = avoidance.filter(|p| !p.keys(participant_id).is_empty());
        let slot = match grouped {
            Some(policy) => {
                let scores: Vec<u32> = free
                    .iter()
                    .map(|slot| sections.score(*slot, participant_id, &placed, policy))
                    .collect();
                let best = scores.iter().copied().min().unwrap_or(0);
                let ties: Vec<u32> = free
                    .iter()
                    .zip(&scores)
                    .filter(|(_, score)| **score == best)
                    .map(|(slot, _)| *slot)
                    .collect();
                let slot = ties.choose(rng).copied().unwrap_or(free[0]);
                if sections.pair_conflict(slot, participant_id, &placed, policy) {
                    log::warn!("participant {} drawn next to a grouped opponent", participant_id);
                    plan.conflicts.push(participant_id);
                }
                slot
            }
            None => free.choose(rng).copied().unwrap_or(free[0]),
        };
        free.retain(|candidate| *candidate != slot);
        placed.insert(slot, participant_id);
        plan.placements.push((participant_id, slot));
    }
    plan
}

/// Nested sections of a draw used for avoidance scoring.
enum Sections {
    /// Elimination: sections of 2, 4, 8, ... consecutive slots.
    Halves { draw_size: u32 },
    /// Round robin: the group a slot belongs to.
    Groups(HashMap<u32, usize>),
}

impl Sections {
    fn of(bracket: &Bracket, stage: StageIdx) -> Self {
        match &bracket.stage(stage).layout {
            StageLayout::Container { groups } => {
                let mut group_of = HashMap::new();
                for (i, g) in groups.iter().enumerate() {
                    if let StageLayout::Group { slots, .. } = &bracket.stage(*g).layout {
                        group_of.extend(slots.iter().map(|s| (*s, i)));
                    }
                }
                Sections::Groups(group_of)
            }
            _ => Sections::Halves {
                draw_size: bracket.stage(stage).draw_size().next_power_of_two(),
            },
        }
    }

    /// Weighted count of grouped participants sharing a section with `slot`.
    /// A shared pair weighs `pair_weight`, each wider section half as much.
    fn score(
        &self,
        slot: u32,
        participant_id: ParticipantId,
        placed: &HashMap<u32, ParticipantId>,
        policy: &AvoidancePolicy,
    ) -> u32 {
        let conflicting = placed
            .iter()
            .filter(|(_, other)| policy.conflicts(participant_id, **other))
            .map(|(s, _)| *s);
        match self {
            Sections::Groups(group_of) => {
                let group = group_of.get(&slot);
                conflicting.filter(|s| group_of.get(s) == group).count() as u32 * policy.pair_weight
            }
            Sections::Halves { draw_size } => {
                let mut total = 0;
                for other in conflicting {
                    let mut size = 2;
                    let mut weight = policy.pair_weight;
                    while size < *draw_size {
                        if (slot - 1) / size == (other - 1) / size {
                            total += weight.max(1);
                        }
                        size *= 2;
                        weight /= 2;
                    }
                }
                total
            }
        }
    }

    /// Whether the slot's closest section (pair or group) holds a conflict.
    fn pair_conflict(
        &self,
        slot: u32,
        participant_id: ParticipantId,
        placed: &HashMap<u32, ParticipantId>,
        policy: &AvoidancePolicy,
    ) -> bool {
        placed.iter().any(|(other, id)| {
            policy.conflicts(participant_id, *id)
                && match self {
                    Sections::Groups(group_of) => group_of.get(other) == group_of.get(&slot),
                    Sections::Halves { .. } => (slot - 1) / 2 == (other - 1) / 2,
                }
        })
    }
}
