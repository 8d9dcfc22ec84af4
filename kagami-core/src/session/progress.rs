//! Wizard cursor and navigation intents.

use serde::Serialize;

/// Coordinates of the wizard's cursor. Steps are 1-based and
/// server-assigned; the group index is 0-based and client-local.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub step: u32,
    pub total_steps: u32,
    pub group_index: usize,
    pub total_groups: usize,
}

impl SessionProgress {
    pub fn is_last_group(&self) -> bool {
        self.group_index + 1 >= self.total_groups
    }

    pub fn is_final_step(&self) -> bool {
        self.step >= self.total_steps
    }
}

/// How a session enters a step. Consumed exactly once, by session
/// construction, so a later re-render of the same step cannot re-apply it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryMode {
    /// Start at the first group
    #[default]
    Fresh,
    /// Re-enter a step mid-way (server resume hint)
    ResumeAtGroup(usize),
    /// Arriving backward from the next step: start at the last group
    JumpToLast,
}

/// What a completed `advance`/`retreat` asks the surrounding wizard to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Stay on this step, show the next group (scroll to top, no network)
    NextGroup { group_index: usize },
    /// Stay on this step, show the previous group (no network)
    PrevGroup { group_index: usize },
    /// Fetch another step and rebuild the session with the given entry
    LoadStep { step: u32, entry: EntryMode },
    /// The whole evaluation is done; leave for the dashboard
    Finished,
    /// Retreated past the very beginning; leave for the dashboard
    Dashboard,
}
