//! Where a match's winner and loser go, in the same stage or through a link.

use crate::models::{
    Bracket, FeedProfile, FinishingRule, Link, LinkKind, MatchIdx, PositioningError, Side,
    StageIdx, StageLayout, TargetRef,
};

/// A resolved destination: the target match, the side that receives, and the
/// slot already sitting on that side when the side is fixed by the bracket
/// shape (fed slots, linked first rounds).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Target {
    pub stage: StageIdx,
    pub match_idx: MatchIdx,
    pub side: Side,
    pub slot: Option<u32>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PositionTargets {
    pub winner: Option<Target>,
    pub loser: Option<Target>,
    /// Where the loser target's winner goes; a bye directed into the loser
    /// target advances its opponent here.
    pub bye: Option<Target>,
}

/// Winner, loser and bye targets for a match. Win-ratio stages have none.
pub fn resolve_targets(bracket: &Bracket, m: MatchIdx) -> Result<PositionTargets, PositioningError> {
    if !has_targets(bracket, bracket.match_up(m).stage) {
        return Ok(PositionTargets::default());
    }
    let winner = winner_target(bracket, m)?;
    let loser = loser_target(bracket, m)?;
    let bye = match loser {
        Some(l) if has_targets(bracket, l.stage) => winner_target(bracket, l.match_idx)?,
        _ => None,
    };
    Ok(PositionTargets { winner, loser, bye })
}

fn has_targets(bracket: &Bracket, stage: StageIdx) -> bool {
    let s = bracket.stage(stage);
    s.finishing == FinishingRule::RoundOutcome && matches!(s.layout, StageLayout::Elimination)
}

pub fn winner_target(bracket: &Bracket, m: MatchIdx) -> Result<Option<Target>, PositioningError> {
    let mu = bracket.match_up(m);
    let link = bracket.link_from(LinkKind::Winner, mu.stage, mu.round);
    if let Some(cached) = mu.winner_target {
        if uses_cache(link) {
            return Ok(Some(from_cache(bracket, cached)));
        }
    }
    if let Some(link) = link {
        return linked_target(bracket, m, link).map(Some);
    }

    // Plain single-elimination advancement.
    let next_round = mu.round + 1;
    for slot in mu.present_slots() {
        if let Some(next) = bracket.match_in_round(mu.stage, next_round, slot) {
            if let Some(side) = bracket.match_up(next).side_of(slot) {
                if bracket.is_carried(next, slot) {
                    return Ok(Some(target_at(bracket, next, side)));
                }
            }
        }
    }
    if bracket.round_matches(mu.stage, next_round).is_empty() {
        return Ok(None);
    }
    place(bracket, m, mu.stage, next_round, FeedProfile::TopDown).map(Some)
}

pub fn loser_target(bracket: &Bracket, m: MatchIdx) -> Result<Option<Target>, PositioningError> {
    let mu = bracket.match_up(m);
    let Some(link) = bracket.link_from(LinkKind::Loser, mu.stage, mu.round) else {
        return Ok(None);
    };
    if let Some(cached) = mu.loser_target {
        if uses_cache(Some(link)) {
            return Ok(Some(from_cache(bracket, cached)));
        }
    }
    linked_target(bracket, m, link).map(Some)
}

fn uses_cache(link: Option<&Link>) -> bool {
    link.map_or(true, |l| l.target.feed_profile != FeedProfile::Draw)
}

fn from_cache(bracket: &Bracket, cached: TargetRef) -> Target {
    target_at(bracket, cached.match_idx, cached.side)
}

fn target_at(bracket: &Bracket, m: MatchIdx, side: Side) -> Target {
    let mu = bracket.match_up(m);
    let slot = mu.slots[side.index()].filter(|s| !bracket.is_carried(m, *s));
    Target {
        stage: mu.stage,
        match_idx: m,
        side,
        slot,
    }
}

fn linked_target(bracket: &Bracket, m: MatchIdx, link: &Link) -> Result<Target, PositioningError> {
    place(bracket, m, link.target.stage, link.target.round, link.target.feed_profile)
}

/// Structural placement of a source match onto a target round.
pub(crate) fn place(
    bracket: &Bracket,
    m: MatchIdx,
    target_stage: StageIdx,
    target_round: u32,
    profile: FeedProfile,
) -> Result<Target, PositioningError> {
    let mu = bracket.match_up(m);
    let source_count = bracket.round_matches(mu.stage, mu.round).len() as u32;
    let targets = bracket.round_matches(target_stage, target_round);
    if targets.is_empty() {
        return Err(PositioningError::MissingStructure {
            stage_id: bracket.stage(target_stage).id,
            round: target_round,
        });
    }

    let (position, side) =
        target_position(mu.position, source_count, targets.len() as u32, profile);
    let target = targets[(position - 1) as usize];
    let side = side.unwrap_or_else(|| {
        let fed = fed_side(bracket, target);
        if target_stage == mu.stage {
            fed.opposite()
        } else {
            fed
        }
    });
    Ok(target_at(bracket, target, side))
}

/// Target position for a source position. `None` for the side means one source
/// match feeds one target match and the fed slot decides the side.
pub(crate) fn target_position(
    position: u32,
    source_count: u32,
    target_count: u32,
    profile: FeedProfile,
) -> (u32, Option<Side>) {
    let source_count = source_count.max(1);
    let position = position.clamp(1, source_count);
    let ordinal = match profile {
        FeedProfile::BottomUp => source_count + 1 - position,
        FeedProfile::TopDown | FeedProfile::Draw => position,
    };
    if target_count >= source_count {
        return (ordinal.min(target_count), None);
    }
    // Several source matches share one target match, possibly across skipped rounds.
    let group = (source_count + target_count - 1) / target_count;
    let target = (ordinal - 1) / group + 1;
    let within = (ordinal - 1) % group;
    let side = if within < (group + 1) / 2 {
        Side::One
    } else {
        Side::Two
    };
    (target.min(target_count), Some(side))
}

/// Side holding the slot that first appears in this match's round.
fn fed_side(bracket: &Bracket, m: MatchIdx) -> Side {
    let mu = bracket.match_up(m);
    mu.slots
        .iter()
        .position(|s| s.map_or(false, |slot| !bracket.is_carried(m, slot)))
        .map(Side::from_index)
        .unwrap_or(Side::One)
}

/// The other match of `m`'s round that feeds the same winner target.
///
/// A target with an open side must have such a feeder; its absence means the
/// bracket is malformed and is reported instead of guessed.
pub fn paired_source(bracket: &Bracket, m: MatchIdx, target: MatchIdx) -> Result<MatchIdx, PositioningError> {
    let mu = bracket.match_up(m);
    for other in bracket.round_matches(mu.stage, mu.round) {
        if other == m {
            continue;
        }
        if let Some(t) = winner_target(bracket, other)? {
            if t.match_idx == target {
                return Ok(other);
            }
        }
    }
    Err(PositioningError::MissingMatch(bracket.match_up(target).id))
}
