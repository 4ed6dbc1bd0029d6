//! Paint-tick scheduling.
//!
//! Recompute requests raised between two paint ticks collapse into one. The
//! host asks `request()` whether it needs to schedule an animation frame and
//! calls `take()` from that frame.

/// What the next tick has to recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Recompute {
    #[default]
    Nothing,
    /// Every connector line.
    Connectors,
}

#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    pending: Recompute,
    ticks: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a connector recompute on the next tick.
    /// Returns true only for the first request since the last tick.
    pub fn request(&mut self) -> bool {
        let first = self.pending == Recompute::Nothing;
        self.pending = Recompute::Connectors;
        first
    }

    pub fn is_pending(&self) -> bool {
        self.pending != Recompute::Nothing
    }

    /// Consume the pending work for this tick.
    pub fn take(&mut self) -> Recompute {
        self.ticks += 1;
        std::mem::take(&mut self.pending)
    }

    /// Number of ticks observed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
