use std::fmt;

/// Linear progress of one run. Failures before `Discovered` end the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunPhase {
    Idle,
    Connected,
    CatalogFetched,
    Validated,
    Discovered,
    Sampled,
    Exported,
    Switching,
    Reported,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunPhase::Idle => "idle",
            RunPhase::Connected => "connected",
            RunPhase::CatalogFetched => "catalog_fetched",
            RunPhase::Validated => "validated",
            RunPhase::Discovered => "discovered",
            RunPhase::Sampled => "sampled",
            RunPhase::Exported => "exported",
            RunPhase::Switching => "switching",
            RunPhase::Reported => "reported",
        };
        f.write_str(s)
    }
}

/// Tracks the current phase and logs transitions.
#[derive(Debug)]
pub struct PhaseTracker {
    current: RunPhase,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self {
            current: RunPhase::Idle,
        }
    }

    pub fn current(&self) -> RunPhase {
        self.current
    }

    pub fn advance(&mut self, next: RunPhase) {
        debug_assert!(next > self.current, "phases only move forward");
        tracing::debug!(from = %self.current, to = %next, "run phase");
        self.current = next;
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}
