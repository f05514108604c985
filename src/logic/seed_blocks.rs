//! Seed blocks: the slots each seed rank may take.

use crate::models::{Bracket, SeedingProfile, StageIdx, StageLayout};
use std::collections::VecDeque;

/// Ordered seed blocks for a stage of `slot_count` slots.
///
/// Block 0 holds seed 1, block 1 seed 2, block 2 seeds 3-4, block 3 seeds 5-8
/// and so on. With `clustered` the ITF pattern is used, otherwise the USTA
/// ("separate") one. Slots beyond `slot_count` are dropped from their block.
pub fn seed_blocks(slot_count: u32, clustered: bool) -> Vec<Vec<u32>> {
    if slot_count == 0 {
        return Vec::new();
    }
    let size = slot_count.next_power_of_two();
    if size == 1 {
        return vec![vec![1]];
    }

    let mut ordered: Vec<u32> = Vec::with_capacity(size as usize);
    let mut chunk_count = 2u32;
    loop {
        let chunk_size = size / chunk_count;
        for i in 0..chunk_count {
            let first = i * chunk_size + 1;
            let slot = if picks_first(i, chunk_count, clustered) {
                first
            } else {
                first + chunk_size - 1
            };
            if !ordered.contains(&slot) {
                ordered.push(slot);
            }
        }
        chunk_count *= 2;
        if size / chunk_count < 2 {
            break;
        }
    }

    // Whatever the halving did not claim is dealt alternately from back and front.
    let mut remaining: VecDeque<u32> = (1..=size).filter(|s| !ordered.contains(s)).collect();
    let mut from_back = true;
    loop {
        let next = if from_back {
            remaining.pop_back()
        } else {
            remaining.pop_front()
        };
        match next {
            Some(slot) => ordered.push(slot),
            None => break,
        }
        from_back = !from_back;
    }

    let mut blocks = Vec::new();
    let mut rest = ordered.as_slice();
    let mut index = 0usize;
    while !rest.is_empty() {
        let len = nominal_block_size(index).min(rest.len());
        let (block, tail) = rest.split_at(len);
        let block: Vec<u32> = block.iter().copied().filter(|s| *s <= slot_count).collect();
        if !block.is_empty() {
            blocks.push(block);
        }
        rest = tail;
        index += 1;
    }
    blocks
}

fn nominal_block_size(index: usize) -> usize {
    if index < 2 {
        1
    } else {
        1 << (index - 1)
    }
}

fn picks_first(chunk: u32, chunk_count: u32, clustered: bool) -> bool {
    let top_half = chunk < chunk_count / 2;
    if !clustered || chunk_count <= 4 {
        return top_half;
    }
    if chunk_count == 8 {
        // Pivot at the half: the bottom half mirrors the top.
        if top_half {
            chunk % 2 == 0
        } else {
            (chunk_count - 1 - chunk) % 2 == 1
        }
    } else {
        chunk % 2 == 0
    }
}

/// Index of the elimination seed block holding `seed_value`.
pub fn elimination_block_index(seed_value: u32) -> usize {
    match seed_value {
        0 | 1 => 0,
        2 => 1,
        n => (31 - (n - 1).leading_zeros()) as usize + 1,
    }
}

/// Round-robin seed blocks: block `j` is the `j`-th slot of every group, so
/// seeds `j*G+1..=(j+1)*G` land one per group.
pub fn round_robin_seed_blocks(groups: &[Vec<u32>]) -> Vec<Vec<u32>> {
    let depth = groups.iter().map(|g| g.len()).max().unwrap_or(0);
    (0..depth)
        .map(|j| groups.iter().filter_map(|g| g.get(j).copied()).collect())
        .collect()
}

/// Seed values under round-robin group thresholds: every run of `group_count`
/// consecutive seeds shares the lowest seed number of the run.
pub fn group_seed_values(seeds_count: u32, group_count: u32) -> Vec<(u32, u32)> {
    let group_count = group_count.max(1);
    (1..=seeds_count)
        .map(|seed| (seed, ((seed - 1) / group_count) * group_count + 1))
        .collect()
}

/// Seed blocks for a stage: halving pattern for elimination, per-group slices
/// for a round-robin container.
pub fn stage_seed_blocks(bracket: &Bracket, stage: StageIdx) -> Vec<Vec<u32>> {
    let s = bracket.stage(stage);
    match &s.layout {
        StageLayout::Container { groups } => {
            let group_slots: Vec<Vec<u32>> = groups
                .iter()
                .map(|g| match &bracket.stage(*g).layout {
                    StageLayout::Group { slots, .. } => slots.clone(),
                    _ => Vec::new(),
                })
                .collect();
            round_robin_seed_blocks(&group_slots)
        }
        _ => {
            let clustered = s.seeding_profile == Some(SeedingProfile::Cluster);
            seed_blocks(s.draw_size(), clustered)
        }
    }
}

/// The slots a seed with `seed_value` may legally take in a stage.
pub fn seed_block_for(bracket: &Bracket, stage: StageIdx, seed_value: u32) -> Option<Vec<u32>> {
    let blocks = stage_seed_blocks(bracket, stage);
    let index = match &bracket.stage(stage).layout {
        StageLayout::Container { groups } => {
            (seed_value.saturating_sub(1) / (groups.len().max(1) as u32)) as usize
        }
        _ => elimination_block_index(seed_value),
    };
    blocks.get(index).cloned()
}
