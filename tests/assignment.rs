//! Integration tests for slot assignment and bye advancement.

mod common;

use common::{complete_match, elimination, filled_elimination, match_at, participants};
use draw_positions::{
    apply_group_seed_values, assign_bye, assign_participant, assign_qualifier, assign_seed,
    assign_slot, Bracket, MatchStatus, MatchType, Notice, NoticeLog, Notices, Occupant,
    PositioningError, Side, SlotRequest, StageKind,
};

#[test]
fn request_without_participant_or_qualifier_is_rejected() {
    let (mut bracket, stage) = elimination(8);
    let stage_id = bracket.stage(stage).id;
    let result = assign_slot(&mut bracket, stage_id, 1, SlotRequest::default(), &mut Notices::silent());
    assert_eq!(result, Err(PositioningError::MissingParticipant));
}

#[test]
fn unknown_slot_is_rejected() {
    let (mut bracket, stage) = elimination(8);
    let stage_id = bracket.stage(stage).id;
    let p = participants(1)[0];
    let result = assign_participant(&mut bracket, stage_id, 9, p, &mut Notices::silent());
    assert_eq!(result, Err(PositioningError::InvalidSlot(9)));
}

#[test]
fn participant_cannot_take_a_second_slot() {
    let (mut bracket, stage) = elimination(16);
    let stage_id = bracket.stage(stage).id;
    let p = participants(1)[0];
    assign_participant(&mut bracket, stage_id, 7, p, &mut Notices::silent()).unwrap();

    let result = assign_participant(&mut bracket, stage_id, 3, p, &mut Notices::silent());
    assert!(matches!(
        result,
        Err(PositioningError::ExistingParticipantAssignment { slot: 7, .. })
    ));
    assert_eq!(bracket.stage(stage).occupant(3), Occupant::Empty);
}

#[test]
fn reassigning_same_slot_is_a_no_op() {
    let (mut bracket, stage) = elimination(8);
    let stage_id = bracket.stage(stage).id;
    let p = participants(1)[0];
    assign_participant(&mut bracket, stage_id, 4, p, &mut Notices::silent()).unwrap();

    let mut log = NoticeLog::new();
    assign_participant(&mut bracket, stage_id, 4, p, &mut Notices::new(&mut log)).unwrap();
    assert!(log.is_empty());
}

#[test]
fn seeded_participant_must_stay_in_block() {
    let (mut bracket, stage) = elimination(16);
    let stage_id = bracket.stage(stage).id;
    let p = participants(1)[0];
    assign_seed(&mut bracket, stage_id, 2, p, None).unwrap();

    let result = assign_participant(&mut bracket, stage_id, 5, p, &mut Notices::silent());
    assert_eq!(
        result,
        Err(PositioningError::InvalidSeedPosition { seed_number: 2, slot: 5 })
    );
    assign_participant(&mut bracket, stage_id, 16, p, &mut Notices::silent()).unwrap();
}

#[test]
fn bye_advances_opponent() {
    let (mut bracket, stage) = elimination(8);
    let stage_id = bracket.stage(stage).id;
    let p = participants(1)[0];
    assign_participant(&mut bracket, stage_id, 1, p, &mut Notices::silent()).unwrap();
    assign_bye(&mut bracket, stage_id, 2, &mut Notices::silent()).unwrap();

    let first = match_at(&bracket, stage, 1, 1);
    let second = match_at(&bracket, stage, 2, 1);
    assert_eq!(bracket.match_up(first).status, MatchStatus::Bye);
    assert_eq!(bracket.match_up(second).slots, [Some(1), None]);
    assert_eq!(bracket.match_up(second).status, MatchStatus::ToBePlayed);
}

#[test]
fn double_byes_carry_the_lower_slot() {
    let (mut bracket, stage) = elimination(8);
    let stage_id = bracket.stage(stage).id;
    for slot in [2, 1, 4, 3] {
        assign_bye(&mut bracket, stage_id, slot, &mut Notices::silent()).unwrap();
    }

    let second = match_at(&bracket, stage, 2, 1);
    let third = match_at(&bracket, stage, 3, 1);
    assert_eq!(bracket.match_up(second).slots, [Some(1), Some(3)]);
    assert_eq!(bracket.match_up(second).status, MatchStatus::Bye);
    assert_eq!(bracket.match_up(third).slots, [Some(1), None]);
}

#[test]
fn assigning_into_a_bye_slot_clears_the_bye_first() {
    let (mut bracket, stage) = elimination(8);
    let stage_id = bracket.stage(stage).id;
    let players = participants(2);
    assign_participant(&mut bracket, stage_id, 1, players[0], &mut Notices::silent()).unwrap();
    assign_bye(&mut bracket, stage_id, 2, &mut Notices::silent()).unwrap();

    assign_participant(&mut bracket, stage_id, 2, players[1], &mut Notices::silent()).unwrap();

    let first = match_at(&bracket, stage, 1, 1);
    let second = match_at(&bracket, stage, 2, 1);
    assert_eq!(bracket.match_up(first).status, MatchStatus::ToBePlayed);
    assert_eq!(bracket.match_up(second).slots, [None, None]);
    assert!(bracket.stage(stage).bye_slots().is_empty());
}

#[test]
fn active_slot_cannot_be_reassigned() {
    let (mut bracket, stage, _) = filled_elimination(8);
    let stage_id = bracket.stage(stage).id;
    let first = match_at(&bracket, stage, 1, 1);
    complete_match(&mut bracket, first, Side::One);

    let newcomer = participants(1)[0];
    let result = assign_participant(&mut bracket, stage_id, 2, newcomer, &mut Notices::silent());
    assert_eq!(result, Err(PositioningError::SlotActive(2)));
}

#[test]
fn qualifier_marker_occupies_slot() {
    let (mut bracket, stage) = elimination(8);
    let stage_id = bracket.stage(stage).id;
    assign_qualifier(&mut bracket, stage_id, 6, &mut Notices::silent()).unwrap();
    assert_eq!(bracket.stage(stage).occupant(6), Occupant::Qualifier);
    assert_eq!(bracket.stage(stage).qualifier_count(), 1);
    assert!(!bracket.stage(stage).slot(6).unwrap().link_positioning);
}

#[test]
fn assignment_emits_stage_and_draw_notices() {
    let (mut bracket, stage) = elimination(8);
    let stage_id = bracket.stage(stage).id;
    let draw_id = bracket.id;
    let p = participants(1)[0];

    let mut log = NoticeLog::new();
    assign_participant(&mut bracket, stage_id, 3, p, &mut Notices::new(&mut log)).unwrap();
    let notices: Vec<Notice> = log.notices().copied().collect();
    assert!(notices.contains(&Notice::SlotAssignments { stage_id }));
    assert_eq!(notices.last(), Some(&Notice::DrawModified { draw_id }));
}

#[test]
fn failed_assignment_emits_nothing() {
    let (mut bracket, stage) = elimination(8);
    let stage_id = bracket.stage(stage).id;
    let p = participants(1)[0];
    assign_participant(&mut bracket, stage_id, 1, p, &mut Notices::silent()).unwrap();

    let mut log = NoticeLog::new();
    let result = assign_participant(&mut bracket, stage_id, 2, p, &mut Notices::new(&mut log));
    assert!(result.is_err());
    assert!(log.is_empty());
}

#[test]
fn team_lineup_is_attached() {
    let (mut bracket, stage) = elimination(4);
    let stage_id = bracket.stage(stage).id;
    let team = participants(1)[0];
    let lineup = participants(3);
    bracket.set_match_type(stage, MatchType::Team);
    bracket.set_default_lineup(team, lineup.clone());

    assign_participant(&mut bracket, stage_id, 2, team, &mut Notices::silent()).unwrap();
    let first = match_at(&bracket, stage, 1, 1);
    assert_eq!(bracket.match_up(first).lineups.get(&2), Some(&lineup));
}

#[test]
fn seed_is_inherited_from_a_linked_stage() {
    let (mut bracket, main) = elimination(16);
    let consolation = bracket
        .add_elimination_stage("Consolation", StageKind::Consolation, 8)
        .unwrap();
    bracket
        .link(
            draw_positions::LinkKind::Loser,
            main,
            1,
            consolation,
            1,
            draw_positions::FeedProfile::TopDown,
        )
        .unwrap();
    let p = participants(1)[0];
    let main_id = bracket.stage(main).id;
    assign_seed(&mut bracket, main_id, 1, p, None).unwrap();

    let consolation_id = bracket.stage(consolation).id;
    assign_participant(&mut bracket, consolation_id, 1, p, &mut Notices::silent()).unwrap();
    let seed = bracket.stage(consolation).seed_of(p).unwrap();
    assert_eq!(seed.seed_number, 1);
}

#[test]
fn round_robin_seeds_share_values_per_run_of_groups() {
    let mut bracket = Bracket::new("Pools");
    let container = bracket
        .add_round_robin_stage("Pools", StageKind::Main, 2, 4)
        .unwrap();
    let stage_id = bracket.stage(container).id;
    let players = participants(4);
    for (i, p) in players.iter().enumerate() {
        assign_seed(&mut bracket, stage_id, i as u32 + 1, *p, None).unwrap();
    }
    apply_group_seed_values(&mut bracket, stage_id).unwrap();

    let mut seeds = bracket.stage(container).seeds.clone();
    seeds.sort_by_key(|a| a.seed_number);
    let values: Vec<u32> = seeds.iter().map(|a| a.seed_value).collect();
    assert_eq!(values, vec![1, 1, 3, 3]);

    // Seed 2 shares the first block with seed 1: one slot per group.
    let result = assign_participant(&mut bracket, stage_id, 3, players[1], &mut Notices::silent());
    assert_eq!(
        result,
        Err(PositioningError::InvalidSeedPosition { seed_number: 2, slot: 3 })
    );
    assign_participant(&mut bracket, stage_id, 2, players[1], &mut Notices::silent()).unwrap();
    assign_participant(&mut bracket, stage_id, 3, players[2], &mut Notices::silent()).unwrap();
    let s = bracket.stage(container);
    assert_eq!(s.participant_slot(players[1]), Some(2));
    assert_eq!(s.participant_slot(players[2]), Some(3));
}
