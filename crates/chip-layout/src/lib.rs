//! Chip overflow layout engine.
//!
//! Decides how many filter chips fit into a capped number of rows while
//! keeping room for the leading label, the clear-all control and the expand
//! affordance, and keeps that decision current as the container resizes or
//! the chip set changes.
//!
//! Layers (leaves first):
//! * `measure`: the `WidthProvider` seam and snapshot capture.
//! * `pack`: the pure row-packing core.
//! * `frame`: deferred "after layout" callbacks with cancellation.
//! * `expand`: the collapsed/expanded toggle.
//! * `scheduler`: coalesced recomputation with memoized commits.

pub mod expand;
pub mod frame;
pub mod measure;
pub mod pack;
pub mod scheduler;

pub use expand::{ExpandController, ExpandMode};
pub use frame::{FrameClock, FrameRequestId, ManualFrameClock};
pub use measure::{StaticWidthProvider, WidthProvider, capture};
pub use pack::{pack, pack_widths};
pub use scheduler::{
    FrameOutcome, LayoutObserver, RecomputeScheduler, SchedulerMetricsSnapshot, SchedulerState,
    Trigger,
};
