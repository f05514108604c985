//! Where byes go.

use crate::logic::seed_blocks::stage_seed_blocks;
use crate::models::{Bracket, Occupant, StageIdx, StageLayout};
use std::collections::{BTreeSet, HashMap};

/// Slots to receive `count` more byes, in placement order.
///
/// Elimination: first the opponents of placed seeds in seed order, then the
/// opponents of seed-block positions in block order, skipping pairs that
/// already hold a bye. Byes only double up once no pair is left without one,
/// filling from the last block backwards. Round robin: the last free slot of each group,
/// groups taken from the back.
pub fn plan_byes(bracket: &Bracket, stage: StageIdx, count: u32) -> Vec<u32> {
    if count == 0 {
        return Vec::new();
    }
    match &bracket.stage(stage).layout {
        StageLayout::Container { groups } => plan_group_byes(bracket, stage, groups, count),
        _ => plan_elimination_byes(bracket, stage, count),
    }
}

fn plan_elimination_byes(bracket: &Bracket, stage: StageIdx, count: u32) -> Vec<u32> {
    let s = bracket.stage(stage);
    let Some(first_round) = bracket.first_round(stage) else {
        return Vec::new();
    };
    let mut partner: HashMap<u32, u32> = HashMap::new();
    for [a, b] in bracket.round_pairs(stage, first_round) {
        if let (Some(a), Some(b)) = (a, b) {
            partner.insert(a, b);
            partner.insert(b, a);
        }
    }
    let active = bracket.active_slots(stage);
    let mut planned: Vec<u32> = Vec::new();

    let is_bye = |slot: u32, planned: &[u32]| s.occupant(slot).is_bye() || planned.contains(&slot);
    let free = |slot: u32, planned: &[u32]| {
        s.occupant(slot).is_empty() && !active.contains(&slot) && !planned.contains(&slot)
    };

    let mut anchors: Vec<u32> = Vec::new();
    let mut seeds: Vec<_> = s.seeds.iter().filter_map(|a| Some((a.seed_number, a.participant_id?))).collect();
    seeds.sort_by_key(|(n, _)| *n);
    anchors.extend(seeds.iter().filter_map(|(_, p)| s.participant_slot(*p)));
    let blocks = stage_seed_blocks(bracket, stage);
    anchors.extend(blocks.iter().flatten().copied());

    let mut seen = BTreeSet::new();
    for anchor in anchors {
        if planned.len() as u32 == count {
            return planned;
        }
        if !seen.insert(anchor) {
            continue;
        }
        let Some(&opponent) = partner.get(&anchor) else {
            continue;
        };
        if is_bye(anchor, &planned) || is_bye(opponent, &planned) {
            continue;
        }
        if free(opponent, &planned) {
            planned.push(opponent);
        }
    }

    // Whatever is left goes to free slots, least protected positions first.
    for slot in blocks.iter().rev().flat_map(|b| b.iter().rev()).copied() {
        if planned.len() as u32 == count {
            break;
        }
        if partner.contains_key(&slot) && free(slot, &planned) {
            planned.push(slot);
        }
    }
    planned
}

fn plan_group_byes(bracket: &Bracket, stage: StageIdx, groups: &[StageIdx], count: u32) -> Vec<u32> {
    let s = bracket.stage(stage);
    let mut planned: Vec<u32> = Vec::new();
    let group_slots: Vec<Vec<u32>> = groups
        .iter()
        .map(|g| match &bracket.stage(*g).layout {
            StageLayout::Group { slots, .. } => slots.clone(),
            _ => Vec::new(),
        })
        .collect();

    loop {
        let before = planned.len();
        for slots in group_slots.iter().rev() {
            if planned.len() as u32 == count {
                return planned;
            }
            let last_free = slots
                .iter()
                .rev()
                .copied()
                .find(|slot| s.occupant(*slot) == Occupant::Empty && !planned.contains(slot));
            if let Some(slot) = last_free {
                planned.push(slot);
            }
        }
        if planned.len() == before {
            return planned;
        }
    }
}
