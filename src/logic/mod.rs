//! Positioning logic: assignment, removal and exit cascades, target
//! resolution, seed blocks and automated placement.

mod assignment;
mod automated;
mod byes;
mod cascade;
mod exits;
mod qualifiers;
mod removal;
mod seed_blocks;
mod seeding;
mod skeleton;
mod targets;
mod unseeded;

pub use assignment::{assign_bye, assign_participant, assign_qualifier, assign_slot, SlotRequest};
pub use automated::{automated_positioning, AutomatedOutcome};
pub use byes::plan_byes;
pub use exits::set_double_exit;
pub use qualifiers::plan_qualifiers;
pub use removal::{clear_slot, ClearOutcome};
pub use seed_blocks::{
    elimination_block_index, group_seed_values, round_robin_seed_blocks, seed_block_for,
    seed_blocks, stage_seed_blocks,
};
pub use seeding::{apply_group_seed_values, assign_seed};
pub use targets::{loser_target, paired_source, resolve_targets, winner_target, PositionTargets, Target};
