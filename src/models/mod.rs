//! Data structures for a draw: bracket, stages, slots, matches, links, policies.

mod bracket;
mod error;
mod link;
mod match_up;
mod notice;
mod policy;
mod stage;

pub use bracket::{Bracket, DrawId};
pub use error::PositioningError;
pub use link::{FeedProfile, Link, LinkKind, LinkSource, LinkTarget};
pub use match_up::{
    ExitKind, Match, MatchId, MatchIdx, MatchStatus, MatchType, PendingExit, Side, TargetRef,
};
pub use notice::{MuteGuard, Notice, NoticeLog, Notices, Notifier};
pub use policy::{AutomatedOptions, AvoidancePolicy, Policies, SeedingPolicy, SeedsThreshold};
pub use stage::{
    FinishingRule, Occupant, ParticipantId, SeedAssignment, SeedingProfile, Slot, Stage, StageId,
    StageIdx, StageKind, StageLayout,
};
