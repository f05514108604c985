//! Where qualifiers go.

use crate::models::{Bracket, StageIdx};
use rand::seq::SliceRandom;
use rand::Rng;

/// Slots for `count` qualifiers, taken from the free slots that first appear
/// in `round` (the first round when `None`). Slots not facing a bye are used
/// first so qualifiers are not handed a free pass.
pub fn plan_qualifiers<R: Rng>(
    bracket: &Bracket,
    stage: StageIdx,
    count: u32,
    round: Option<u32>,
    rng: &mut R,
) -> Vec<u32> {
    if count == 0 {
        return Vec::new();
    }
    let s = bracket.stage(stage);
    let active = bracket.active_slots(stage);
    let candidates: Vec<u32> = if s.is_container() {
        s.unassigned_slots()
    } else {
        let Some(round) = round.or_else(|| bracket.first_round(stage)) else {
            return Vec::new();
        };
        s.unassigned_slots()
            .into_iter()
            .filter(|slot| bracket.initial_round(stage, *slot) == Some(round))
            .collect()
    };

    let (mut preferred, mut facing_bye): (Vec<u32>, Vec<u32>) = candidates
        .into_iter()
        .filter(|slot| !active.contains(slot))
        .partition(|slot| !faces_bye(bracket, stage, *slot));
    preferred.shuffle(rng);
    facing_bye.shuffle(rng);
    preferred
        .into_iter()
        .chain(facing_bye)
        .take(count as usize)
        .collect()
}

/// Whether the slot's opponent in its first match is a bye.
pub(crate) fn faces_bye(bracket: &Bracket, stage: StageIdx, slot: u32) -> bool {
    let s = bracket.stage(stage);
    if s.is_container() {
        return false;
    }
    bracket
        .initial_match(stage, slot)
        .and_then(|m| bracket.match_up(m).paired_slot(slot))
        .map_or(false, |other| s.occupant(other).is_bye())
}
