/// Lifecycle of one clone job
///
/// A job moves strictly forward through
/// `Idle → Discovering → Scraping → Packaging → Done`. Any non-terminal state
/// may drop to `Failed` on a fatal error (unreachable seed, failed first page,
/// packaging failure).
use std::fmt;

/// Represents the current phase of a clone job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    /// Job created, nothing fetched yet
    Idle,

    /// Fetching the seed and checking candidate links
    Discovering,

    /// Scraping confirmed pages (and streaming them to the packager)
    Scraping,

    /// Finalizing the output artifact
    Packaging,

    // ===== Terminal States =====
    /// Job finished; soft failures may have been recorded
    Done,

    /// Job aborted on a fatal error
    Failed,
}

impl JobState {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if the transition `self -> next` is allowed
    pub fn can_transition_to(&self, next: JobState) -> bool {
        match (self, next) {
            (Self::Idle, Self::Discovering)
            | (Self::Discovering, Self::Scraping)
            | (Self::Scraping, Self::Packaging)
            | (Self::Packaging, Self::Done) => true,
            (from, Self::Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Discovering => "discovering",
            Self::Scraping => "scraping",
            Self::Packaging => "packaging",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
