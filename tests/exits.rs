//! Integration tests for double walkovers, double defaults and exit propagation.

mod common;

use common::{complete_match, elimination, filled_elimination, match_at, participants};
use draw_positions::{
    assign_bye, assign_participant, clear_slot, set_double_exit, ExitKind, MatchStatus, Notices,
    PositioningError, Side,
};

#[test]
fn two_double_walkovers_make_a_double_walkover() {
    let (mut bracket, stage, _) = filled_elimination(8);
    let first = match_at(&bracket, stage, 1, 1);
    let second = match_at(&bracket, stage, 1, 2);
    let next = match_at(&bracket, stage, 2, 1);
    let final_round = match_at(&bracket, stage, 3, 1);

    let first_id = bracket.match_up(first).id;
    set_double_exit(&mut bracket, first_id, ExitKind::Walkover, &mut Notices::silent()).unwrap();
    assert_eq!(bracket.match_up(next).status, MatchStatus::Walkover);
    assert_eq!(bracket.match_up(next).pending_exit.map(|p| p.from), Some(first));

    let second_id = bracket.match_up(second).id;
    set_double_exit(&mut bracket, second_id, ExitKind::Walkover, &mut Notices::silent()).unwrap();
    assert_eq!(bracket.match_up(next).status, MatchStatus::DoubleWalkover);
    assert_eq!(bracket.match_up(next).winning_side, None);
    assert_eq!(bracket.match_up(final_round).status, MatchStatus::Walkover);
    assert_eq!(bracket.match_up(final_round).pending_exit.map(|p| p.from), Some(next));
}

#[test]
fn two_double_defaults_make_a_double_default() {
    let (mut bracket, stage, _) = filled_elimination(4);
    for position in [1, 2] {
        let m = match_at(&bracket, stage, 1, position);
        let id = bracket.match_up(m).id;
        set_double_exit(&mut bracket, id, ExitKind::Default, &mut Notices::silent()).unwrap();
    }
    let final_round = match_at(&bracket, stage, 2, 1);
    assert_eq!(bracket.match_up(final_round).status, MatchStatus::DoubleDefault);
}

#[test]
fn exit_hands_a_walkover_to_the_waiting_opponent() {
    let (mut bracket, stage, _) = filled_elimination(8);
    let second = match_at(&bracket, stage, 1, 2);
    complete_match(&mut bracket, second, Side::One);

    let first = match_at(&bracket, stage, 1, 1);
    let first_id = bracket.match_up(first).id;
    set_double_exit(&mut bracket, first_id, ExitKind::Walkover, &mut Notices::silent()).unwrap();

    let next = match_at(&bracket, stage, 2, 1);
    let final_round = match_at(&bracket, stage, 3, 1);
    assert_eq!(bracket.match_up(next).status, MatchStatus::Walkover);
    assert_eq!(bracket.match_up(next).winning_side, Some(Side::Two));
    assert_eq!(bracket.match_up(final_round).slots, [Some(3), None]);
}

#[test]
fn completed_match_cannot_take_a_double_exit() {
    let (mut bracket, stage, _) = filled_elimination(8);
    let first = match_at(&bracket, stage, 1, 1);
    complete_match(&mut bracket, first, Side::Two);
    let first_id = bracket.match_up(first).id;

    let result = set_double_exit(&mut bracket, first_id, ExitKind::Walkover, &mut Notices::silent());
    assert_eq!(result, Err(PositioningError::InvalidMatchStatus(first_id)));
}

#[test]
fn match_without_two_participants_cannot_take_a_double_exit() {
    let (mut bracket, stage) = elimination(4);
    let stage_id = bracket.stage(stage).id;
    let p = participants(1)[0];
    assign_participant(&mut bracket, stage_id, 1, p, &mut Notices::silent()).unwrap();
    assign_bye(&mut bracket, stage_id, 2, &mut Notices::silent()).unwrap();

    let first = match_at(&bracket, stage, 1, 1);
    let first_id = bracket.match_up(first).id;
    let result = set_double_exit(&mut bracket, first_id, ExitKind::Walkover, &mut Notices::silent());
    assert_eq!(result, Err(PositioningError::InvalidMatchStatus(first_id)));

    let final_round = match_at(&bracket, stage, 2, 1);
    let final_id = bracket.match_up(final_round).id;
    let result = set_double_exit(&mut bracket, final_id, ExitKind::Default, &mut Notices::silent());
    assert_eq!(result, Err(PositioningError::InvalidMatchStatus(final_id)));
}

#[test]
fn exit_meeting_a_bye_moves_on() {
    let (mut bracket, stage) = elimination(8);
    let stage_id = bracket.stage(stage).id;
    let players = participants(6);
    for (slot, p) in [1, 2, 5, 6, 7, 8].into_iter().zip(&players) {
        assign_participant(&mut bracket, stage_id, slot, *p, &mut Notices::silent()).unwrap();
    }
    for slot in [3, 4] {
        assign_bye(&mut bracket, stage_id, slot, &mut Notices::silent()).unwrap();
    }

    let first = match_at(&bracket, stage, 1, 1);
    let first_id = bracket.match_up(first).id;
    set_double_exit(&mut bracket, first_id, ExitKind::Walkover, &mut Notices::silent()).unwrap();

    let next = match_at(&bracket, stage, 2, 1);
    let final_round = match_at(&bracket, stage, 3, 1);
    assert_eq!(bracket.match_up(next).status, MatchStatus::Bye);
    assert_eq!(bracket.match_up(final_round).status, MatchStatus::Walkover);
    assert_eq!(bracket.match_up(final_round).pending_exit.map(|p| p.from), Some(next));
}

#[test]
fn exit_becomes_a_walkover_once_the_bye_is_withdrawn() {
    let (mut bracket, stage) = elimination(8);
    let stage_id = bracket.stage(stage).id;
    let players = participants(6);
    for (slot, p) in [1, 2, 5, 6, 7, 8].into_iter().zip(&players) {
        assign_participant(&mut bracket, stage_id, slot, *p, &mut Notices::silent()).unwrap();
    }
    for slot in [3, 4] {
        assign_bye(&mut bracket, stage_id, slot, &mut Notices::silent()).unwrap();
    }
    let first = match_at(&bracket, stage, 1, 1);
    let first_id = bracket.match_up(first).id;
    set_double_exit(&mut bracket, first_id, ExitKind::Walkover, &mut Notices::silent()).unwrap();

    clear_slot(&mut bracket, stage_id, 4, &mut Notices::silent()).unwrap();

    let next = match_at(&bracket, stage, 2, 1);
    let final_round = match_at(&bracket, stage, 3, 1);
    assert_eq!(bracket.match_up(next).slots, [None, Some(4)]);
    assert_eq!(bracket.match_up(next).status, MatchStatus::Walkover);
    assert_eq!(bracket.match_up(next).winning_side, Some(Side::Two));
    assert_eq!(bracket.match_up(final_round).slots, [Some(4), None]);
    assert_eq!(bracket.match_up(final_round).pending_exit, None);
    assert_eq!(bracket.match_up(final_round).status, MatchStatus::ToBePlayed);
}

#[test]
fn bye_behind_a_decided_walkover_is_active() {
    let (mut bracket, stage) = elimination(4);
    let stage_id = bracket.stage(stage).id;
    let players = participants(3);
    for (slot, p) in [1, 2, 3].into_iter().zip(&players) {
        assign_participant(&mut bracket, stage_id, slot, *p, &mut Notices::silent()).unwrap();
    }
    assign_bye(&mut bracket, stage_id, 4, &mut Notices::silent()).unwrap();

    let first = match_at(&bracket, stage, 1, 1);
    let first_id = bracket.match_up(first).id;
    set_double_exit(&mut bracket, first_id, ExitKind::Walkover, &mut Notices::silent()).unwrap();

    let final_round = match_at(&bracket, stage, 2, 1);
    assert_eq!(bracket.match_up(final_round).status, MatchStatus::Walkover);
    assert_eq!(bracket.match_up(final_round).winning_side, Some(Side::Two));

    let result = clear_slot(&mut bracket, stage_id, 4, &mut Notices::silent());
    assert_eq!(result, Err(PositioningError::SlotActive(4)));
}

#[test]
fn fully_exited_draw_leaves_nothing_to_play() {
    let (mut bracket, stage) = elimination(8);
    let stage_id = bracket.stage(stage).id;
    for (i, p) in participants(7).into_iter().enumerate() {
        assign_participant(&mut bracket, stage_id, i as u32 + 1, p, &mut Notices::silent()).unwrap();
    }
    assign_bye(&mut bracket, stage_id, 8, &mut Notices::silent()).unwrap();

    for position in [1, 2, 3] {
        let m = match_at(&bracket, stage, 1, position);
        let id = bracket.match_up(m).id;
        set_double_exit(&mut bracket, id, ExitKind::Walkover, &mut Notices::silent()).unwrap();
    }

    for m in bracket.stage_match_indices(stage) {
        let mu = bracket.match_up(m);
        assert!(
            mu.status == MatchStatus::Bye || mu.status.is_completed(),
            "round {} match {} left as {:?}",
            mu.round,
            mu.position,
            mu.status
        );
    }
    let second = match_at(&bracket, stage, 2, 1);
    assert_eq!(bracket.match_up(second).status, MatchStatus::DoubleWalkover);
    let final_round = match_at(&bracket, stage, 3, 1);
    assert_eq!(bracket.match_up(final_round).status, MatchStatus::Walkover);
    assert_eq!(bracket.match_up(final_round).winning_side, Some(Side::Two));
    assert_eq!(bracket.match_up(final_round).slots, [None, Some(7)]);
}
