//! Integration tests for winner, loser and bye target resolution.

mod common;

use common::{elimination, match_at};
use draw_positions::logic::{loser_target, paired_source, winner_target};
use draw_positions::{
    resolve_targets, FeedProfile, LinkKind, PositioningError, Side, StageKind,
};

#[test]
fn winners_move_to_the_next_round_by_position() {
    let (bracket, stage) = elimination(16);
    let third = match_at(&bracket, stage, 1, 3);
    let target = winner_target(&bracket, third).unwrap().unwrap();
    assert_eq!(target.match_idx, match_at(&bracket, stage, 2, 2));
    assert_eq!(target.side, Side::One);
    assert_eq!(target.slot, None);

    let fourth = match_at(&bracket, stage, 1, 4);
    let target = winner_target(&bracket, fourth).unwrap().unwrap();
    assert_eq!(target.side, Side::Two);
}

#[test]
fn final_has_no_winner_target() {
    let (bracket, stage) = elimination(4);
    let final_round = match_at(&bracket, stage, 2, 1);
    assert_eq!(winner_target(&bracket, final_round).unwrap(), None);
    assert_eq!(loser_target(&bracket, final_round).unwrap(), None);
}

#[test]
fn losers_follow_the_link_profile() {
    let (mut bracket, main) = elimination(16);
    let top_down = bracket
        .add_elimination_stage("Consolation", StageKind::Consolation, 8)
        .unwrap();
    bracket
        .link(LinkKind::Loser, main, 1, top_down, 1, FeedProfile::TopDown)
        .unwrap();

    let third = match_at(&bracket, main, 1, 3);
    let target = loser_target(&bracket, third).unwrap().unwrap();
    assert_eq!(target.stage, top_down);
    assert_eq!(target.match_idx, match_at(&bracket, top_down, 1, 2));
    assert_eq!(target.side, Side::One);
    assert_eq!(target.slot, Some(3));
}

#[test]
fn bottom_up_links_reverse_the_order() {
    let (mut bracket, main) = elimination(16);
    let bottom_up = bracket
        .add_elimination_stage("Consolation", StageKind::Consolation, 8)
        .unwrap();
    bracket
        .link(LinkKind::Loser, main, 1, bottom_up, 1, FeedProfile::BottomUp)
        .unwrap();

    let third = match_at(&bracket, main, 1, 3);
    let target = loser_target(&bracket, third).unwrap().unwrap();
    assert_eq!(target.match_idx, match_at(&bracket, bottom_up, 1, 3));
    assert_eq!(target.side, Side::Two);
    assert_eq!(target.slot, Some(6));
}

#[test]
fn bye_target_is_where_the_loser_target_advances() {
    let (mut bracket, main) = elimination(16);
    let consolation = bracket
        .add_elimination_stage("Consolation", StageKind::Consolation, 8)
        .unwrap();
    bracket
        .link(LinkKind::Loser, main, 1, consolation, 1, FeedProfile::TopDown)
        .unwrap();

    let third = match_at(&bracket, main, 1, 3);
    let targets = resolve_targets(&bracket, third).unwrap();
    let bye = targets.bye.unwrap();
    assert_eq!(bye.stage, consolation);
    assert_eq!(bye.match_idx, match_at(&bracket, consolation, 2, 1));
    assert_eq!(bye.side, Side::Two);
}

#[test]
fn feed_in_round_receives_losers_on_its_fed_side() {
    let (mut bracket, main) = elimination(16);
    let consolation = bracket
        .add_feed_in_stage("Consolation", StageKind::Consolation, 8, &[2])
        .unwrap();
    bracket
        .link(LinkKind::Loser, main, 2, consolation, 2, FeedProfile::TopDown)
        .unwrap();

    let second_round = match_at(&bracket, main, 2, 1);
    let target = loser_target(&bracket, second_round).unwrap().unwrap();
    assert_eq!(target.match_idx, match_at(&bracket, consolation, 2, 1));
    assert_eq!(target.side, Side::One);
    assert_eq!(target.slot, Some(9));

    // First-round consolation winners meet the fed slot from the other side.
    let consolation_first = match_at(&bracket, consolation, 1, 1);
    let winner = winner_target(&bracket, consolation_first).unwrap().unwrap();
    assert_eq!(winner.match_idx, match_at(&bracket, consolation, 2, 1));
    assert_eq!(winner.side, Side::Two);
}

#[test]
fn draw_profile_links_are_resolved_on_demand() {
    let (mut bracket, main) = elimination(8);
    let consolation = bracket
        .add_elimination_stage("Consolation", StageKind::Consolation, 4)
        .unwrap();
    bracket
        .link(LinkKind::Loser, main, 1, consolation, 1, FeedProfile::Draw)
        .unwrap();

    let second = match_at(&bracket, main, 1, 2);
    assert_eq!(bracket.match_up(second).loser_target, None);
    let target = loser_target(&bracket, second).unwrap().unwrap();
    assert_eq!(target.match_idx, match_at(&bracket, consolation, 1, 1));
    assert_eq!(target.side, Side::Two);
}

#[test]
fn linking_to_a_missing_round_fails() {
    let (mut bracket, main) = elimination(16);
    let consolation = bracket
        .add_elimination_stage("Consolation", StageKind::Consolation, 8)
        .unwrap();
    let result = bracket.link(LinkKind::Loser, main, 1, consolation, 9, FeedProfile::TopDown);
    assert_eq!(
        result,
        Err(PositioningError::MissingStructure {
            stage_id: bracket.stage(consolation).id,
            round: 9,
        })
    );
}

#[test]
fn round_robin_matches_have_no_targets() {
    let mut bracket = draw_positions::Bracket::new("Round robin");
    let container = bracket
        .add_round_robin_stage("Pools", StageKind::Main, 2, 4)
        .unwrap();
    let m = bracket.stage_match_indices(container)[0];
    let targets = resolve_targets(&bracket, m).unwrap();
    assert_eq!(targets, Default::default());
}

#[test]
fn paired_source_is_the_other_feeder() {
    let (bracket, stage) = elimination(8);
    let first = match_at(&bracket, stage, 1, 1);
    let second = match_at(&bracket, stage, 1, 2);
    let next = match_at(&bracket, stage, 2, 1);
    assert_eq!(paired_source(&bracket, first, next), Ok(second));

    let final_round = match_at(&bracket, stage, 3, 1);
    assert_eq!(
        paired_source(&bracket, first, final_round),
        Err(PositioningError::MissingMatch(bracket.match_up(final_round).id))
    );
}
