//! Draw positions: assigning participants, byes and qualifiers to bracket
//! slots, and keeping match contents consistent as they change.

pub mod logic;
pub mod models;

pub use logic::{
    apply_group_seed_values, assign_bye, assign_participant, assign_qualifier, assign_seed,
    assign_slot, automated_positioning, clear_slot, group_seed_values, resolve_targets,
    seed_block_for, seed_blocks, set_double_exit, AutomatedOutcome, ClearOutcome,
    PositionTargets, SlotRequest, Target,
};
pub use models::{
    AutomatedOptions, AvoidancePolicy, Bracket, DrawId, ExitKind, FeedProfile, FinishingRule,
    LinkKind, Match, MatchId, MatchIdx, MatchStatus, MatchType, Notice, NoticeLog, Notices,
    Notifier, Occupant, ParticipantId, Policies, PositioningError, SeedAssignment, SeedingPolicy,
    SeedingProfile, SeedsThreshold, Side, Stage, StageId, StageIdx, StageKind, StageLayout,
};
