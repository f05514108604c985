//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use draw_positions::{
    assign_participant, Bracket, MatchIdx, MatchStatus, Notices, ParticipantId, Side, StageIdx,
    StageKind,
};
use uuid::Uuid;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn participants(n: usize) -> Vec<ParticipantId> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}

pub fn elimination(draw_size: u32) -> (Bracket, StageIdx) {
    init_logger();
    let mut bracket = Bracket::new("Test draw");
    let stage = bracket
        .add_elimination_stage("Main", StageKind::Main, draw_size)
        .unwrap();
    (bracket, stage)
}

/// Elimination stage with slot `i` holding participant `i-1`.
pub fn filled_elimination(draw_size: u32) -> (Bracket, StageIdx, Vec<ParticipantId>) {
    let (mut bracket, stage) = elimination(draw_size);
    let players = participants(draw_size as usize);
    let stage_id = bracket.stage(stage).id;
    for (i, p) in players.iter().enumerate() {
        assign_participant(&mut bracket, stage_id, i as u32 + 1, *p, &mut Notices::silent())
            .unwrap();
    }
    (bracket, stage, players)
}

pub fn match_at(bracket: &Bracket, stage: StageIdx, round: u32, position: u32) -> MatchIdx {
    bracket.round_matches(stage, round)[position as usize - 1]
}

/// Score entry stand-in: complete a match and carry the winner forward.
pub fn complete_match(bracket: &mut Bracket, m: MatchIdx, side: Side) {
    let winner = bracket.match_up(m).slots[side.index()].unwrap();
    let target = bracket.match_up(m).winner_target;
    let mu = bracket.match_up_mut(m);
    mu.status = MatchStatus::Completed;
    mu.winning_side = Some(side);
    if let Some(target) = target {
        bracket.match_up_mut(target.match_idx).slots[target.side.index()] = Some(winner);
    }
}
