//! Recompute scheduler.
//!
//! Owns the committed `LayoutResult` and the expand flag. Producers report
//! *why* the layout may be stale (`Trigger`) and return immediately; the
//! actual measure + pack + commit runs later, inside a frame callback, once
//! the host's own layout pass has settled.
//!
//! State machine:
//! * `Idle -> PendingMeasurement` on mount, item-set change, container resize,
//!   expand toggle or config change.
//! * `PendingMeasurement -> Committed` when the frame fires and the freshly
//!   packed result differs from (or is the first) committed result.
//! * `Committed -> Idle` immediately after observers were notified.
//! * A frame whose result and expand mode both equal the committed ones goes
//!   straight back to `Idle` without notifying anyone.
//!
//! Coalescing: at most one frame request is outstanding. A trigger arriving
//! while one is pending cancels it and requests a new one (cancel and
//! reschedule), so a resize burst within one frame costs one recomputation.
//!
//! Loop prevention: observers typically re-render, which can produce another
//! size notification. Because unchanged results are never re-committed, that
//! second pass ends in `Unchanged` and the cycle stops.
//!
//! Empty item lists short-circuit to `LayoutResult::empty()` without
//! measuring or packing.

use crate::expand::{ExpandController, ExpandMode};
use crate::frame::{FrameClock, FrameRequestId, ManualFrameClock};
use crate::measure::{WidthProvider, capture};
use crate::pack::pack;
use chip_model::{Item, LayoutConfig, LayoutResult};
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

/// Reason a recomputation was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Mount,
    ItemsChanged,
    Resize,
    ExpandToggled,
    ConfigChanged,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::Mount => "mount",
            Trigger::ItemsChanged => "items_changed",
            Trigger::Resize => "resize",
            Trigger::ExpandToggled => "expand_toggled",
            Trigger::ConfigChanged => "config_changed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchedulerState {
    #[default]
    Idle,
    PendingMeasurement,
    /// Momentary: observers are being notified of a new result.
    Committed,
}

/// What a delivered frame did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A new result was stored and observers were notified.
    Committed,
    /// The recomputed result matched the committed one; nothing notified.
    Unchanged,
    /// The frame id was cancelled or never requested; ignored.
    Stale,
}

/// Receives every committed layout.
pub trait LayoutObserver {
    fn on_commit(&mut self, layout: &LayoutResult, mode: ExpandMode);
}

impl<F> LayoutObserver for F
where
    F: FnMut(&LayoutResult, ExpandMode),
{
    fn on_commit(&mut self, layout: &LayoutResult, mode: ExpandMode) {
        self(layout, mode)
    }
}

/// Recompute counters.
#[derive(Debug, Default)]
pub struct SchedulerMetrics {
    triggers: AtomicU64,
    coalesced: AtomicU64,
    frames: AtomicU64,
    stale_frames: AtomicU64,
    packs: AtomicU64,
    empty_short_circuits: AtomicU64,
    commits: AtomicU64,
    skipped_commits: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerMetricsSnapshot {
    pub triggers: u64,
    /// Triggers that replaced an outstanding frame request.
    pub coalesced: u64,
    /// Frames that ran a recomputation.
    pub frames: u64,
    pub stale_frames: u64,
    pub packs: u64,
    pub empty_short_circuits: u64,
    pub commits: u64,
    pub skipped_commits: u64,
}

impl SchedulerMetrics {
    pub fn snapshot(&self) -> SchedulerMetricsSnapshot {
        SchedulerMetricsSnapshot {
            triggers: self.triggers.load(Relaxed),
            coalesced: self.coalesced.load(Relaxed),
            frames: self.frames.load(Relaxed),
            stale_frames: self.stale_frames.load(Relaxed),
            packs: self.packs.load(Relaxed),
            empty_short_circuits: self.empty_short_circuits.load(Relaxed),
            commits: self.commits.load(Relaxed),
            skipped_commits: self.skipped_commits.load(Relaxed),
        }
    }

    fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Relaxed);
    }
}

pub struct RecomputeScheduler<C: FrameClock = ManualFrameClock> {
    clock: C,
    config: LayoutConfig,
    items: Vec<Item>,
    expand: ExpandController,
    state: SchedulerState,
    pending: Option<FrameRequestId>,
    committed: Option<LayoutResult>,
    /// Mode the committed result was packed for.
    committed_mode: ExpandMode,
    observers: Vec<Box<dyn LayoutObserver>>,
    metrics: SchedulerMetrics,
}

impl RecomputeScheduler<ManualFrameClock> {
    pub fn with_manual_clock(config: LayoutConfig) -> Self {
        Self::new(ManualFrameClock::new(), config)
    }

    /// Deliver every due frame request. Returns the outcome of the last live
    /// one, or `None` when nothing was pending.
    pub fn drive_frame<P: WidthProvider + ?Sized>(&mut self, provider: &P) -> Option<FrameOutcome> {
        let due = self.clock.take_due();
        let mut last = None;
        for id in due {
            last = Some(self.on_frame(id, provider));
        }
        last
    }
}

impl<C: FrameClock> RecomputeScheduler<C> {
    pub fn new(clock: C, config: LayoutConfig) -> Self {
        Self {
            clock,
            config,
            items: Vec::new(),
            expand: ExpandController::default(),
            state: SchedulerState::Idle,
            pending: None,
            committed: None,
            committed_mode: ExpandMode::Collapsed,
            observers: Vec::new(),
            metrics: SchedulerMetrics::default(),
        }
    }

    /// First mount: adopt the initial item list and schedule the first pass.
    pub fn mount(&mut self, items: Vec<Item>) {
        self.items = items;
        self.request(Trigger::Mount);
    }

    /// Replace the item list. Schedules a pass only when the set changed in a
    /// way that can alter rendered widths (length, ids, labels, selection).
    /// Returns true when a pass was scheduled.
    pub fn set_items(&mut self, items: Vec<Item>) -> bool {
        let changed = items.len() != self.items.len()
            || items
                .iter()
                .zip(&self.items)
                .any(|(new, old)| new.renders_differently(old));
        self.items = items;
        if changed {
            self.request(Trigger::ItemsChanged);
        }
        changed
    }

    pub fn set_config(&mut self, config: LayoutConfig) -> bool {
        if config == self.config {
            return false;
        }
        self.config = config;
        self.request(Trigger::ConfigChanged);
        true
    }

    /// Container size may have changed.
    pub fn notify_resized(&mut self) {
        self.request(Trigger::Resize);
    }

    pub fn toggle_expanded(&mut self) -> ExpandMode {
        let mode = self.expand.toggle();
        self.request(Trigger::ExpandToggled);
        mode
    }

    pub fn set_expanded(&mut self, mode: ExpandMode) -> bool {
        let changed = self.expand.set(mode);
        if changed {
            self.request(Trigger::ExpandToggled);
        }
        changed
    }

    /// Register an observer for future commits.
    pub fn subscribe<O: LayoutObserver + 'static>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    fn request(&mut self, trigger: Trigger) {
        SchedulerMetrics::incr(&self.metrics.triggers);
        let coalesced = if let Some(prev) = self.pending.take() {
            self.clock.cancel_frame(prev);
            SchedulerMetrics::incr(&self.metrics.coalesced);
            true
        } else {
            false
        };
        let id = self.clock.request_frame();
        self.pending = Some(id);
        self.state = SchedulerState::PendingMeasurement;
        tracing::trace!(
            target: "layout.scheduler",
            trigger = trigger.as_str(),
            coalesced,
            frame = id.get(),
            "recompute_requested"
        );
    }

    /// Frame callback: measure, pack and commit if `id` is the live request.
    pub fn on_frame<P: WidthProvider + ?Sized>(
        &mut self,
        id: FrameRequestId,
        provider: &P,
    ) -> FrameOutcome {
        if self.pending != Some(id) {
            SchedulerMetrics::incr(&self.metrics.stale_frames);
            tracing::trace!(target: "layout.scheduler", frame = id.get(), "stale_frame");
            return FrameOutcome::Stale;
        }
        self.pending = None;
        SchedulerMetrics::incr(&self.metrics.frames);

        let result = if self.items.is_empty() {
            SchedulerMetrics::incr(&self.metrics.empty_short_circuits);
            LayoutResult::empty()
        } else {
            let widths = capture(provider, &self.items);
            let config = self.config.with_measured(widths.reserved());
            SchedulerMetrics::incr(&self.metrics.packs);
            pack(&self.items, &widths, &config, self.expand.is_expanded())
        };
        self.commit(result)
    }

    fn commit(&mut self, result: LayoutResult) -> FrameOutcome {
        let mode = self.expand.mode();
        if self.committed.as_ref() == Some(&result) && self.committed_mode == mode {
            SchedulerMetrics::incr(&self.metrics.skipped_commits);
            self.state = SchedulerState::Idle;
            tracing::trace!(target: "layout.scheduler", "commit_skipped_unchanged");
            return FrameOutcome::Unchanged;
        }
        self.state = SchedulerState::Committed;
        SchedulerMetrics::incr(&self.metrics.commits);
        tracing::debug!(
            target: "layout.scheduler",
            items = self.items.len(),
            visible = result.visible_count,
            rows = result.row_count(),
            overflow = result.has_overflow,
            mode = mode.as_str(),
            "layout_committed"
        );
        for observer in &mut self.observers {
            observer.on_commit(&result, mode);
        }
        self.committed = Some(result);
        self.committed_mode = mode;
        self.state = SchedulerState::Idle;
        FrameOutcome::Committed
    }

    /// Last committed layout; `None` before the first commit.
    pub fn layout(&self) -> Option<&LayoutResult> {
        self.committed.as_ref()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn expand_mode(&self) -> ExpandMode {
        self.expand.mode()
    }

    pub fn is_expanded(&self) -> bool {
        self.expand.is_expanded()
    }

    pub fn pending_frame(&self) -> Option<FrameRequestId> {
        self.pending
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn metrics_snapshot(&self) -> SchedulerMetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::StaticWidthProvider;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn items(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| Item::new(format!("f{i}"), format!("Filter {i}")))
            .collect()
    }

    fn provider(n: usize, width: u32, container: u32) -> StaticWidthProvider {
        let mut p = StaticWidthProvider::new(container);
        for i in 0..n {
            p.set_item(format!("f{i}"), width);
        }
        p
    }

    #[test]
    fn trigger_does_not_measure_synchronously() {
        let mut s = RecomputeScheduler::with_manual_clock(LayoutConfig::default());
        s.mount(items(3));
        assert_eq!(s.state(), SchedulerState::PendingMeasurement);
        assert!(s.layout().is_none());
        assert_eq!(s.metrics_snapshot().packs, 0);
    }

    #[test]
    fn burst_coalesces_into_one_frame() {
        let mut s = RecomputeScheduler::with_manual_clock(LayoutConfig::default());
        s.mount(items(3));
        for _ in 0..5 {
            s.notify_resized();
        }
        assert_eq!(s.clock().pending().len(), 1);
        let out = s.drive_frame(&provider(3, 10, 100));
        assert_eq!(out, Some(FrameOutcome::Committed));
        let m = s.metrics_snapshot();
        assert_eq!(m.triggers, 6);
        assert_eq!(m.coalesced, 5);
        assert_eq!(m.frames, 1);
        assert_eq!(m.packs, 1);
        assert_eq!(s.state(), SchedulerState::Idle);
    }

    #[test]
    fn cancelled_frame_is_stale() {
        let mut s = RecomputeScheduler::with_manual_clock(LayoutConfig::default());
        s.mount(items(1));
        let first = s.pending_frame().unwrap();
        s.notify_resized();
        let out = s.on_frame(first, &provider(1, 10, 100));
        assert_eq!(out, FrameOutcome::Stale);
        assert!(s.layout().is_none());
        assert_eq!(s.metrics_snapshot().stale_frames, 1);
    }

    #[test]
    fn unchanged_result_does_not_notify() {
        let seen = Rc::new(RefCell::new(0usize));
        let counter = seen.clone();
        let mut s = RecomputeScheduler::with_manual_clock(LayoutConfig::default());
        s.subscribe(move |_: &LayoutResult, _: ExpandMode| *counter.borrow_mut() += 1);
        let p = provider(3, 10, 100);
        s.mount(items(3));
        assert_eq!(s.drive_frame(&p), Some(FrameOutcome::Committed));
        s.notify_resized();
        assert_eq!(s.drive_frame(&p), Some(FrameOutcome::Unchanged));
        assert_eq!(*seen.borrow(), 1);
        assert_eq!(s.metrics_snapshot().skipped_commits, 1);
    }

    #[test]
    fn toggle_without_overflow_still_notifies() {
        let modes = Rc::new(RefCell::new(Vec::new()));
        let sink = modes.clone();
        let mut s = RecomputeScheduler::with_manual_clock(LayoutConfig::default());
        s.subscribe(move |_: &LayoutResult, mode: ExpandMode| sink.borrow_mut().push(mode));
        let p = provider(1, 10, 100);
        s.mount(items(1));
        s.drive_frame(&p);
        let collapsed = s.layout().cloned();

        s.toggle_expanded();
        assert_eq!(s.drive_frame(&p), Some(FrameOutcome::Committed));
        assert_eq!(s.layout().cloned(), collapsed);
        s.notify_resized();
        assert_eq!(s.drive_frame(&p), Some(FrameOutcome::Unchanged));
        assert_eq!(
            *modes.borrow(),
            vec![ExpandMode::Collapsed, ExpandMode::Expanded]
        );
    }

    #[test]
    fn empty_items_skip_packing() {
        let mut s = RecomputeScheduler::with_manual_clock(LayoutConfig::default());
        s.mount(Vec::new());
        let out = s.drive_frame(&StaticWidthProvider::unmeasured());
        assert_eq!(out, Some(FrameOutcome::Committed));
        assert_eq!(s.layout(), Some(&LayoutResult::empty()));
        let m = s.metrics_snapshot();
        assert_eq!(m.packs, 0);
        assert_eq!(m.empty_short_circuits, 1);
    }

    #[test]
    fn metadata_only_change_is_not_a_trigger() {
        let mut s = RecomputeScheduler::with_manual_clock(LayoutConfig::default());
        s.mount(items(2));
        s.drive_frame(&provider(2, 10, 100));
        let mut next = items(2);
        next[0] = next[0].clone().with_metadata("source", "url");
        assert!(!s.set_items(next));
        assert!(s.pending_frame().is_none());
        let mut next = items(2);
        next[1].selected = true;
        assert!(s.set_items(next));
    }

    #[test]
    fn same_config_is_ignored() {
        let mut s = RecomputeScheduler::with_manual_clock(LayoutConfig::default());
        assert!(!s.set_config(LayoutConfig::default()));
        assert!(s.set_config(LayoutConfig::new(3, 1)));
        assert_eq!(s.config().max_rows, 3);
    }
}
