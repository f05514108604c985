//! Skeleton builder: empty stages with their matches, slots and links.

use crate::logic::targets::place;
use crate::models::{
    Bracket, FeedProfile, FinishingRule, Link, LinkKind, LinkSource, LinkTarget, Match, MatchIdx,
    MatchType, ParticipantId, PositioningError, Side, Slot, Stage, StageIdx, StageKind,
    StageLayout, TargetRef,
};

impl Bracket {
    /// Single elimination of `draw_size` slots (a power of two). Round 1 pairs
    /// slots `2i-1` and `2i`; winner targets are cached on every match.
    pub fn add_elimination_stage(
        &mut self,
        name: impl Into<String>,
        kind: StageKind,
        draw_size: u32,
    ) -> Result<StageIdx, PositioningError> {
        if draw_size < 2 || !draw_size.is_power_of_two() {
            return Err(PositioningError::InvalidValues(format!(
                "draw size {} is not a power of two",
                draw_size
            )));
        }
        self.add_feed_in_stage(name, kind, draw_size, &[])
    }

    /// Elimination whose `fed_rounds` each take one fresh slot per match, on
    /// side one, against the previous round's winner. Fed slots are numbered
    /// after the `base_size` first-round slots.
    pub fn add_feed_in_stage(
        &mut self,
        name: impl Into<String>,
        kind: StageKind,
        base_size: u32,
        fed_rounds: &[u32],
    ) -> Result<StageIdx, PositioningError> {
        if base_size < 2 || !base_size.is_power_of_two() {
            return Err(PositioningError::InvalidValues(format!(
                "base size {} is not a power of two",
                base_size
            )));
        }
        if fed_rounds.iter().any(|r| *r < 2) {
            return Err(PositioningError::InvalidValues("round 1 cannot be fed".into()));
        }

        let idx = self.push_stage(Stage::new(name, kind, StageLayout::Elimination));
        let mut next_slot = base_size + 1;
        let mut previous: Vec<MatchIdx> = (1..=base_size / 2)
            .map(|p| self.push_match(idx, 1, p, [Some(2 * p - 1), Some(2 * p)]))
            .collect();
        let mut round = 1;
        loop {
            round += 1;
            let fed = fed_rounds.contains(&round);
            if previous.len() == 1 && !fed {
                break;
            }
            let count = if fed { previous.len() } else { previous.len() / 2 };
            let mut current = Vec::with_capacity(count);
            for p in 1..=count as u32 {
                let slots = if fed {
                    let slot = next_slot;
                    next_slot += 1;
                    [Some(slot), None]
                } else {
                    [None, None]
                };
                current.push(self.push_match(idx, round, p, slots));
            }
            for (i, m) in previous.iter().enumerate() {
                let target = if fed {
                    TargetRef { match_idx: current[i], side: Side::Two }
                } else {
                    TargetRef {
                        match_idx: current[i / 2],
                        side: Side::from_index(i % 2),
                    }
                };
                self.match_up_mut(*m).winner_target = Some(target);
            }
            previous = current;
        }

        let stage = self.stage_mut(idx);
        stage.slots = (1..next_slot).map(Slot::new).collect();
        log::debug!(
            "built {} with {} slots and {} matches",
            stage.name,
            stage.slots.len(),
            stage.matches.len()
        );
        Ok(idx)
    }

    /// Round-robin container of `group_count` groups of `group_size`. Slots
    /// are dealt across groups (group `g` holds `g+1`, `g+1+G`, ...) so each
    /// seed block is a run of consecutive slot numbers.
    pub fn add_round_robin_stage(
        &mut self,
        name: impl Into<String>,
        kind: StageKind,
        group_count: u32,
        group_size: u32,
    ) -> Result<StageIdx, PositioningError> {
        if group_count == 0 || group_size < 2 {
            return Err(PositioningError::InvalidValues(format!(
                "{} groups of {} is not a round robin",
                group_count, group_size
            )));
        }
        let name = name.into();
        let mut container = Stage::new(name.clone(), kind, StageLayout::Container { groups: Vec::new() });
        container.finishing = FinishingRule::WinRatio;
        container.slots = (1..=group_count * group_size).map(Slot::new).collect();
        let container_idx = self.push_stage(container);

        let mut groups = Vec::with_capacity(group_count as usize);
        for g in 0..group_count {
            let slots: Vec<u32> = (0..group_size).map(|j| j * group_count + g + 1).collect();
            let mut group = Stage::new(
                format!("{} group {}", name, g + 1),
                kind,
                StageLayout::Group {
                    container: container_idx,
                    slots: slots.clone(),
                },
            );
            group.finishing = FinishingRule::WinRatio;
            group.sequence = g + 1;
            let group_idx = StageIdx(self.stages.len());
            self.stages.push(group);
            groups.push(group_idx);

            for (round, pairs) in circle_pairings(&slots).into_iter().enumerate() {
                for (p, (a, b)) in pairs.into_iter().enumerate() {
                    self.push_match(group_idx, round as u32 + 1, p as u32 + 1, [Some(a), Some(b)]);
                }
            }
        }
        self.stage_mut(container_idx).layout = StageLayout::Container { groups };
        Ok(container_idx)
    }

    /// Link a source round to a target round. Unless the feed profile is
    /// `Draw`, the resulting targets are cached on the source matches.
    pub fn link(
        &mut self,
        kind: LinkKind,
        source_stage: StageIdx,
        source_round: u32,
        target_stage: StageIdx,
        target_round: u32,
        feed_profile: FeedProfile,
    ) -> Result<usize, PositioningError> {
        for (stage, round) in [(source_stage, source_round), (target_stage, target_round)] {
            if stage.0 >= self.stages.len() {
                return Err(PositioningError::InvalidValues(format!("no stage at {}", stage.0)));
            }
            if kind != LinkKind::Position && self.round_matches(stage, round).is_empty() {
                return Err(PositioningError::MissingStructure {
                    stage_id: self.stage(stage).id,
                    round,
                });
            }
        }

        self.links.push(Link {
            kind,
            source: LinkSource {
                stage: source_stage,
                round: source_round,
            },
            target: LinkTarget {
                stage: target_stage,
                round: target_round,
                feed_profile,
            },
        });
        if feed_profile != FeedProfile::Draw && kind != LinkKind::Position {
            for m in self.round_matches(source_stage, source_round) {
                let target = place(self, m, target_stage, target_round, feed_profile)?;
                let cached = Some(TargetRef {
                    match_idx: target.match_idx,
                    side: target.side,
                });
                let mu = self.match_up_mut(m);
                match kind {
                    LinkKind::Winner => mu.winner_target = cached,
                    LinkKind::Loser => mu.loser_target = cached,
                    LinkKind::Position => {}
                }
            }
        }
        Ok(self.links.len() - 1)
    }

    pub fn set_match_type(&mut self, stage: StageIdx, match_type: MatchType) {
        let owner = self.slot_owner(stage);
        self.stage_mut(owner).match_type = match_type;
        if let StageLayout::Container { groups } = self.stage(owner).layout.clone() {
            for g in groups {
                self.stage_mut(g).match_type = match_type;
            }
        }
    }

    /// Lineup attached to a team's side whenever the team is placed.
    pub fn set_default_lineup(&mut self, team: ParticipantId, lineup: Vec<ParticipantId>) {
        self.default_lineups.insert(team, lineup);
    }

    fn push_stage(&mut self, mut stage: Stage) -> StageIdx {
        stage.sequence = self
            .stages
            .iter()
            .filter(|s| s.kind == stage.kind && !matches!(s.layout, StageLayout::Group { .. }))
            .count() as u32
            + 1;
        self.stages.push(stage);
        StageIdx(self.stages.len() - 1)
    }

    fn push_match(&mut self, stage: StageIdx, round: u32, position: u32, slots: [Option<u32>; 2]) -> MatchIdx {
        let idx = MatchIdx(self.matches.len());
        self.matches.push(Match::new(stage, round, position, slots));
        self.stage_mut(stage).matches.push(idx);
        idx
    }
}

/// Circle-method rounds: every slot meets every other once.
fn circle_pairings(slots: &[u32]) -> Vec<Vec<(u32, u32)>> {
    let mut ring: Vec<Option<u32>> = slots.iter().copied().map(Some).collect();
    if ring.len() % 2 == 1 {
        ring.push(None);
    }
    let n = ring.len();
    let mut rounds = Vec::with_capacity(n - 1);
    for _ in 0..n - 1 {
        let pairs: Vec<(u32, u32)> = (0..n / 2)
            .filter_map(|i| match (ring[i], ring[n - 1 - i]) {
                (Some(a), Some(b)) => Some((a.min(b), a.max(b))),
                _ => None,
            })
            .collect();
        rounds.push(pairs);
        ring[1..].rotate_right(1);
    }
    rounds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_pairings_meet_everyone_once() {
        let rounds = circle_pairings(&[1, 5, 9, 13]);
        assert_eq!(rounds.len(), 3);
        let mut all: Vec<(u32, u32)> = rounds.into_iter().flatten().collect();
        all.sort();
        assert_eq!(all, vec![(1, 5), (1, 9), (1, 13), (5, 9), (5, 13), (9, 13)]);
    }

    #[test]
    fn odd_groups_sit_one_out_per_round() {
        let rounds = circle_pairings(&[1, 2, 3]);
        assert_eq!(rounds.len(), 3);
        assert!(rounds.iter().all(|r| r.len() == 1));
    }
}
