//! Change notices and the capability used to emit them.

use crate::models::bracket::DrawId;
use crate::models::match_up::MatchId;
use crate::models::stage::StageId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// What changed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Notice {
    SlotAssignments { stage_id: StageId },
    MatchModified { match_id: MatchId },
    DrawModified { draw_id: DrawId },
}

/// Receiver of notices (event bus, log, ...). Delivery is up to the implementor.
pub trait Notifier {
    fn notify(&mut self, notice: &Notice);
}

/// Records notices with the time they were received. Consecutive duplicates are coalesced.
#[derive(Clone, Debug, Default)]
pub struct NoticeLog {
    pub entries: Vec<(DateTime<Utc>, Notice)>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.entries.iter().map(|(_, n)| n)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Notifier for NoticeLog {
    fn notify(&mut self, notice: &Notice) {
        if self.entries.last().map(|(_, last)| last) == Some(notice) {
            return;
        }
        self.entries.push((Utc::now(), *notice));
    }
}

/// Capability to emit notices, passed explicitly to every mutating call.
pub struct Notices<'a> {
    sink: Option<&'a mut dyn Notifier>,
    muted: bool,
}

impl<'a> Notices<'a> {
    pub fn new(sink: &'a mut dyn Notifier) -> Self {
        Self {
            sink: Some(sink),
            muted: false,
        }
    }

    /// Emits nothing.
    pub fn silent() -> Self {
        Self {
            sink: None,
            muted: false,
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted || self.sink.is_none()
    }

    pub fn emit(&mut self, notice: Notice) {
        if self.muted {
            log::trace!("muted notice {:?}", notice);
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.notify(&notice);
        }
    }

    /// Suppress notices until the returned guard is dropped, on every exit path.
    pub fn mute(&mut self) -> MuteGuard<'_, 'a> {
        let previous = self.muted;
        self.muted = true;
        MuteGuard {
            notices: self,
            previous,
        }
    }
}

/// Restores the previous mute state on drop.
pub struct MuteGuard<'g, 'a> {
    notices: &'g mut Notices<'a>,
    previous: bool,
}

impl<'a> Deref for MuteGuard<'_, 'a> {
    type Target = Notices<'a>;

    fn deref(&self) -> &Self::Target {
        self.notices
    }
}

impl<'a> DerefMut for MuteGuard<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.notices
    }
}

impl Drop for MuteGuard<'_, '_> {
    fn drop(&mut self) {
        self.notices.muted = self.previous;
    }
}
