//! Harvest run state machine.
//!
//! ```text
//! Idle → Discovering → Paging → Done
//!                         └──→ DetailHarvesting → Done
//! Discovering ──(failure)──→ Failed
//! ```
//!
//! A detail-only run enters `DetailHarvesting` straight from `Idle`, and a
//! run cancelled while discovering ends in `Done` with an empty result.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of a harvest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarvestPhase {
    /// No run in progress.
    #[default]
    Idle,
    /// Probing the first page for the total count.
    Discovering,
    /// Fetching listing pages.
    Paging,
    /// Fetching per-item detail in batches.
    DetailHarvesting,
    /// Run finished (possibly with absorbed failures or cancellation).
    Done,
    /// Discovery failed; no page plan could be built.
    Failed,
}

impl HarvestPhase {
    /// Returns true if the run is over.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if `next` is a legal successor of this phase.
    ///
    /// Terminal phases may start a new run.
    pub fn can_transition_to(self, next: Self) -> bool {
        use HarvestPhase::{DetailHarvesting, Discovering, Done, Failed, Idle, Paging};
        matches!(
            (self, next),
            (Idle | Done | Failed, Discovering | DetailHarvesting)
                | (Discovering, Paging | Failed | Done)
                | (Paging, DetailHarvesting | Done)
                | (DetailHarvesting, Done)
        )
    }

    /// Returns the display name for this phase.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Discovering => "discovering",
            Self::Paging => "paging",
            Self::DetailHarvesting => "detail harvesting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for HarvestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
