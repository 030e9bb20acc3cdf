//! Interactive chip bar state.
//!
//! Owns the item list, keyboard focus and the recompute scheduler. Every
//! mutation updates the cell width provider first and then tells the
//! scheduler; measuring and packing only happen later in `on_frame`.

use crate::view::{BarView, help_line};
use chip_events::{ChipEvent, ChipEventSink, KeyCode, KeyEvent};
use chip_layout::{FrameOutcome, RecomputeScheduler, SchedulerMetricsSnapshot, WidthProvider};
use chip_model::{Item, LayoutConfig, Width};
use chip_terminal::Line;
use chip_text::CellWidthProvider;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarControl {
    Continue,
    Quit,
}

pub struct ChipBar<S: ChipEventSink> {
    scheduler: RecomputeScheduler,
    provider: CellWidthProvider,
    items: Vec<Item>,
    focus: usize,
    sink: S,
    dirty: bool,
}

impl<S: ChipEventSink> ChipBar<S> {
    pub fn new(items: Vec<Item>, config: LayoutConfig, provider: CellWidthProvider, sink: S) -> Self {
        let mut provider = provider;
        provider.sync_items(&items);
        let mut scheduler = RecomputeScheduler::with_manual_clock(config);
        scheduler.mount(items.clone());
        Self {
            scheduler,
            provider,
            items,
            focus: 0,
            sink,
            dirty: true,
        }
    }

    pub fn resize(&mut self, cols: u16) {
        self.provider.set_container(Width::from(cols));
        self.scheduler.notify_resized();
        self.dirty = true;
    }

    /// Frame boundary: run whatever recomputation is pending.
    pub fn on_frame(&mut self) -> Option<FrameOutcome> {
        let outcome = self.scheduler.drive_frame(&self.provider);
        if outcome == Some(FrameOutcome::Committed) {
            self.clamp_focus();
            self.dirty = true;
        }
        outcome
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> BarControl {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return BarControl::Quit,
            KeyCode::Left => self.move_focus(-1),
            KeyCode::Right | KeyCode::Tab => self.move_focus(1),
            KeyCode::Home => self.set_focus(0),
            KeyCode::End => self.set_focus(usize::MAX),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete | KeyCode::Backspace => self.delete_focused(),
            KeyCode::Char('c') => self.clear_all(),
            KeyCode::Char('e') => self.toggle_expanded(),
            _ => {}
        }
        BarControl::Continue
    }

    pub fn toggle_selected(&mut self) {
        let Some(item) = self.items.get_mut(self.focus) else {
            return;
        };
        item.selected = !item.selected;
        let event = ChipEvent::Select {
            id: item.id.clone(),
            selected: item.selected,
        };
        self.sink.emit(&event);
        self.publish_items();
    }

    pub fn delete_focused(&mut self) {
        if self.focus >= self.items.len() {
            return;
        }
        let removed = self.items.remove(self.focus);
        self.sink.emit(&ChipEvent::Delete { id: removed.id });
        self.focus = self.focus.min(self.items.len().saturating_sub(1));
        self.publish_items();
    }

    pub fn clear_all(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.items.clear();
        self.focus = 0;
        self.sink.emit(&ChipEvent::ClearAll);
        self.publish_items();
    }

    pub fn toggle_expanded(&mut self) {
        let mode = self.scheduler.toggle_expanded();
        self.provider.set_expanded(mode.is_expanded());
        self.sink.emit(&ChipEvent::SetExpanded(mode.is_expanded()));
        info!(target: "runtime", mode = mode.as_str(), "expand_toggled");
        self.dirty = true;
    }

    fn publish_items(&mut self) {
        self.provider.sync_items(&self.items);
        let scheduled = self.scheduler.set_items(self.items.clone());
        debug!(target: "runtime", items = self.items.len(), scheduled, "items_published");
        self.dirty = true;
    }

    /// Chips the user can reach: the visible ones once a layout exists.
    fn focusable(&self) -> usize {
        match self.scheduler.layout() {
            Some(layout) => layout.visible_count.min(self.items.len()),
            None => self.items.len(),
        }
    }

    fn move_focus(&mut self, delta: isize) {
        let target = self.focus.saturating_add_signed(delta);
        self.set_focus(target);
    }

    fn set_focus(&mut self, index: usize) {
        let max = self.focusable().saturating_sub(1);
        let next = index.min(max);
        if next != self.focus {
            self.focus = next;
            self.dirty = true;
        }
    }

    fn clamp_focus(&mut self) {
        self.focus = self.focus.min(self.focusable().saturating_sub(1));
    }

    /// True once since the last call if anything visible changed.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn lines(&self) -> Vec<Line> {
        let view = BarView {
            items: &self.items,
            layout: self.scheduler.layout(),
            expanded: self.scheduler.is_expanded(),
            focus: (!self.items.is_empty()).then_some(self.focus),
            locale: self.provider.locale(),
            gap: self.scheduler.config().item_gap,
            container: self.container(),
        };
        let mut lines = view.lines();
        lines.push(Vec::new());
        lines.push(help_line());
        lines
    }

    fn container(&self) -> Width {
        self.provider.container_width().unwrap_or(0)
    }

    #[cfg(test)]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[cfg(test)]
    pub fn focus(&self) -> usize {
        self.focus
    }

    #[cfg(test)]
    pub fn layout(&self) -> Option<&chip_model::LayoutResult> {
        self.scheduler.layout()
    }

    #[cfg(test)]
    pub fn is_expanded(&self) -> bool {
        self.scheduler.is_expanded()
    }

    pub fn metrics_snapshot(&self) -> SchedulerMetricsSnapshot {
        self.scheduler.metrics_snapshot()
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }
}
