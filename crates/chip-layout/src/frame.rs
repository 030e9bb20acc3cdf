//! Frame callback abstraction.
//!
//! Measurement must happen after the host finished laying out the current
//! frame, never inside the event that asked for it. The scheduler therefore
//! only ever *requests* a frame; the host later reports which requests became
//! due. A request can be cancelled before it fires, which is how bursts of
//! triggers collapse into a single measurement.

use std::fmt;

/// Handle for one requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequestId(u64);

impl FrameRequestId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FrameRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame#{}", self.0)
    }
}

/// Source of "after layout" callbacks (animation frame, render tick, ...).
pub trait FrameClock {
    /// Ask for a callback at the next paint-stable point.
    fn request_frame(&mut self) -> FrameRequestId;
    /// Drop a request that has not fired yet. Unknown ids are ignored.
    fn cancel_frame(&mut self, id: FrameRequestId);
}

/// Frame clock driven explicitly by the host loop (render tick, tests).
///
/// Requests queue until `take_due` hands them out; cancelled ids are removed
/// immediately so they are never delivered.
#[derive(Debug, Default)]
pub struct ManualFrameClock {
    next_id: u64,
    pending: Vec<FrameRequestId>,
}

impl ManualFrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[FrameRequestId] {
        &self.pending
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Hand out every request due at this frame, oldest first.
    pub fn take_due(&mut self) -> Vec<FrameRequestId> {
        std::mem::take(&mut self.pending)
    }
}

impl FrameClock for ManualFrameClock {
    fn request_frame(&mut self) -> FrameRequestId {
        self.next_id += 1;
        let id = FrameRequestId(self.next_id);
        self.pending.push(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        self.pending.retain(|p| *p != id);
    }
}
