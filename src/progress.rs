// src/progress.rs
/// Hooks into the leaderboard fetch. Pages are identified by start offset.
pub trait Progress {
    /// Number of pages about to be requested.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// A page starting at `_start` arrived.
    fn item_done(&mut self, _start: u32) {}

    /// A page starting at `_start` failed for good; the run is aborting.
    fn item_failed(&mut self, _start: u32) {}

    /// Fetch loop over, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
