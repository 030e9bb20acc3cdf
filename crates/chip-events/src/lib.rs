//! Event types and channel helpers for the chip bar runtime.
//!
//! One bounded channel feeds the event loop. Producers are async sources
//! (terminal input, the frame clock) registered in an `EventSourceRegistry`;
//! the loop is the single consumer. Chip interactions leave the loop as
//! `ChipEvent`s through a `ChipEventSink`, the pass-through callbacks a host
//! wires to its own select / delete / clear-all / expand handling.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Bounded capacity of the runtime channel. Producers await when it is full
/// rather than dropping input.
pub const EVENT_CHANNEL_CAP: usize = 8192;

// Relaxed atomic counters, inspected by tests and logged at shutdown.
pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);
pub static KEYPRESS_TOTAL: AtomicU64 = AtomicU64::new(0);
pub static RESIZE_TOTAL: AtomicU64 = AtomicU64::new(0);
pub static FRAME_TICKS: AtomicU64 = AtomicU64::new(0);

/// Top-level event consumed by the central loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Input(InputEvent),
    /// Frame boundary. Deferred layout work runs here, never inside the
    /// handler of the event that requested it.
    Frame,
    Shutdown,
}

/// Normalized terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    /// Terminal resize (columns, rows).
    Resize(u16, u16),
    /// Interrupt surfaced distinctly so the loop can quit without a keymap.
    CtrlC,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Delete,
    Tab,
    Left,
    Right,
    Home,
    End,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{:?}", self.code, self.mods)
    }
}

/// Chip interactions handed to the host. The engine never interprets them
/// beyond updating its own item list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChipEvent {
    Select { id: String, selected: bool },
    Delete { id: String },
    ClearAll,
    SetExpanded(bool),
}

impl ChipEvent {
    /// Stable name for logs; ids stay out of log lines together with labels.
    pub fn kind(&self) -> &'static str {
        match self {
            ChipEvent::Select { .. } => "select",
            ChipEvent::Delete { .. } => "delete",
            ChipEvent::ClearAll => "clear_all",
            ChipEvent::SetExpanded(true) => "expand",
            ChipEvent::SetExpanded(false) => "collapse",
        }
    }
}

/// Receiver of pass-through chip callbacks.
pub trait ChipEventSink {
    fn emit(&mut self, event: &ChipEvent);
}

impl<F: FnMut(&ChipEvent)> ChipEventSink for F {
    fn emit(&mut self, event: &ChipEvent) {
        self(event)
    }
}

/// Sink that only records the callback in the log.
#[derive(Debug, Default)]
pub struct LogChipEventSink {
    emitted: u64,
}

impl LogChipEventSink {
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl ChipEventSink for LogChipEventSink {
    fn emit(&mut self, event: &ChipEvent) {
        self.emitted += 1;
        tracing::info!(target: "chips.callback", kind = event.kind(), "chip_event");
    }
}

/// Any async event producer. Implementors hold their configuration and spawn
/// one background task that pushes `Event`s into the shared channel, stopping
/// once a send fails (consumer dropped).
pub trait AsyncEventSource: Send + 'static {
    /// Stable identifier used in logs.
    fn name(&self) -> &'static str;
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()>;
}

pub struct EventSourceRegistry {
    sources: Vec<Box<dyn AsyncEventSource>>,
}

impl Default for EventSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn register<S: AsyncEventSource>(&mut self, src: S) {
        self.sources.push(Box::new(src));
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Spawn all registered sources, each with its own `Sender` clone. Draining
    /// prevents a second call from spawning duplicates. During shutdown the
    /// caller drops its last `Sender` before awaiting the handles so sources
    /// observe the closed channel and exit.
    pub fn spawn_all(&mut self, tx: &Sender<Event>) -> Vec<JoinHandle<()>> {
        let mut out = Vec::with_capacity(self.sources.len());
        for src in self.sources.drain(..) {
            let name = src.name();
            tracing::info!(target: "runtime.events", source = name, "spawning event source");
            out.push(src.spawn(tx.clone()));
        }
        out
    }
}

/// Frame clock: emits `Event::Frame` every interval. Late ticks are skipped,
/// not replayed, so a stalled loop sees one frame instead of a burst.
pub struct FrameTickSource {
    interval: Duration,
}

impl FrameTickSource {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl AsyncEventSource for FrameTickSource {
    fn name(&self) -> &'static str {
        "frame"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        let dur = self.interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(dur);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if tx.send(Event::Frame).await.is_err() {
                    CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
                    break;
                }
                FRAME_TICKS.fetch_add(1, Ordering::Relaxed);
            }
        })
    }
}

pub type EventResult<T> = anyhow::Result<T>;
