//! Event loop: one consumer draining the runtime channel.
//!
//! Resize and item changes only schedule work; the frame event is where the
//! layout is measured, packed and committed, and where the screen is repainted
//! if anything changed.

use crate::bar::{BarControl, ChipBar};
use anyhow::Result;
use chip_events::{ChipEventSink, Event, InputEvent};
use chip_input::AsyncInputShutdown;
use std::fmt;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    CtrlC,
    QuitKey,
    ShutdownEvent,
    ChannelClosed,
}

impl ShutdownReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::CtrlC => "ctrl_c",
            ShutdownReason::QuitKey => "quit_key",
            ShutdownReason::ShutdownEvent => "shutdown_event",
            ShutdownReason::ChannelClosed => "channel_closed",
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum LoopControl {
    Continue,
    Break { reason: ShutdownReason },
}

fn log_shutdown_stage(reason: ShutdownReason, stage: &'static str) {
    info!(
        target: "runtime.shutdown",
        reason = reason.as_str(),
        stage = stage,
        "shutdown_stage"
    );
}

pub struct ChipRuntime<S: ChipEventSink, W: Write> {
    bar: ChipBar<S>,
    out: W,
    rx: mpsc::Receiver<Event>,
    tx: Option<mpsc::Sender<Event>>,
    source_handles: Vec<JoinHandle<()>>,
    input_task: Option<JoinHandle<()>>,
    input_shutdown: Option<AsyncInputShutdown>,
}

impl<S: ChipEventSink, W: Write> ChipRuntime<S, W> {
    pub fn new(bar: ChipBar<S>, out: W, tx: mpsc::Sender<Event>, rx: mpsc::Receiver<Event>) -> Self {
        Self {
            bar,
            out,
            rx,
            tx: Some(tx),
            source_handles: Vec::new(),
            input_task: None,
            input_shutdown: None,
        }
    }

    pub fn with_sources(mut self, handles: Vec<JoinHandle<()>>) -> Self {
        self.source_handles = handles;
        self
    }

    pub fn with_input(mut self, task: JoinHandle<()>, shutdown: AsyncInputShutdown) -> Self {
        self.input_task = Some(task);
        self.input_shutdown = Some(shutdown);
        self
    }

    pub async fn run(&mut self) -> Result<ShutdownReason> {
        let span = tracing::debug_span!(target: "runtime", "event_loop");
        let _enter_loop = span.enter();

        self.repaint();
        let mut shutdown_reason = ShutdownReason::ChannelClosed;
        while let Some(event) = self.rx.recv().await {
            let control = match &event {
                Event::Input(input) => self.handle_input_event(input),
                Event::Frame => self.handle_frame(),
                Event::Shutdown => LoopControl::Break {
                    reason: ShutdownReason::ShutdownEvent,
                },
            };
            match control {
                LoopControl::Break { reason } => {
                    shutdown_reason = reason;
                    break;
                }
                LoopControl::Continue => {
                    if self.bar.take_dirty() {
                        self.repaint();
                    }
                }
            }
        }

        self.rx.close();
        self.finalize_shutdown(shutdown_reason).await;
        Ok(shutdown_reason)
    }

    fn handle_input_event(&mut self, input: &InputEvent) -> LoopControl {
        match input {
            InputEvent::CtrlC => LoopControl::Break {
                reason: ShutdownReason::CtrlC,
            },
            InputEvent::Key(key) => match self.bar.handle_key(key) {
                BarControl::Quit => LoopControl::Break {
                    reason: ShutdownReason::QuitKey,
                },
                BarControl::Continue => LoopControl::Continue,
            },
            InputEvent::Resize(cols, rows) => {
                trace!(target: "runtime", cols, rows, "resize");
                self.bar.resize(*cols);
                LoopControl::Continue
            }
        }
    }

    fn handle_frame(&mut self) -> LoopControl {
        if let Some(outcome) = self.bar.on_frame() {
            trace!(target: "runtime", ?outcome, "frame_processed");
        }
        LoopControl::Continue
    }

    fn repaint(&mut self) {
        let lines = self.bar.lines();
        tracing::debug!(target: "render.chips", lines = lines.len(), "repaint");
        if let Err(e) = chip_terminal::paint(&mut self.out, &lines) {
            error!(target: "render.chips", ?e, "repaint_failed");
        }
    }

    async fn finalize_shutdown(&mut self, reason: ShutdownReason) {
        log_shutdown_stage(reason, "begin");
        if let Some(tx) = self.tx.take() {
            trace!(target: "runtime.shutdown", reason = reason.as_str(), "dropping_runtime_sender");
            drop(tx);
        }

        while let Some(handle) = self.source_handles.pop() {
            match tokio::time::timeout(Duration::from_millis(200), handle).await {
                Ok(Ok(_)) => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "event_source_task_stopped"
                ),
                Ok(Err(err)) if err.is_cancelled() => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "event_source_task_cancelled"
                ),
                Ok(Err(err)) => error!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    ?err,
                    "event_source_task_error"
                ),
                Err(_) => warn!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "event_source_task_timeout"
                ),
            }
        }

        if let Some(shutdown) = self.input_shutdown.take() {
            shutdown.signal();
        }
        if let Some(handle) = self.input_task.take() {
            match handle.await {
                Ok(_) => trace!(target: "runtime.shutdown", reason = reason.as_str(), "input_task_joined"),
                Err(err) if err.is_cancelled() => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "input_task_cancelled"
                ),
                Err(err) => error!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    ?err,
                    "input_task_join_failed"
                ),
            }
        }

        let m = self.bar.metrics_snapshot();
        info!(
            target: "runtime.shutdown",
            triggers = m.triggers,
            coalesced = m.coalesced,
            frames = m.frames,
            packs = m.packs,
            commits = m.commits,
            skipped_commits = m.skipped_commits,
            "layout_metrics"
        );
        log_shutdown_stage(reason, "complete");
    }

    #[cfg(test)]
    pub fn bar(&self) -> &ChipBar<S> {
        &self.bar
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::items_from_labels;
    use chip_events::{EVENT_CHANNEL_CAP, KeyCode, KeyEvent, LogChipEventSink};
    use chip_model::{LayoutConfig, LocaleStrings};
    use chip_text::CellWidthProvider;

    fn runtime(
        labels: &[&str],
    ) -> (
        ChipRuntime<LogChipEventSink, Vec<u8>>,
        mpsc::Sender<Event>,
    ) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAP);
        let provider = CellWidthProvider::new(LocaleStrings::default());
        let bar = ChipBar::new(
            items_from_labels(labels, "test"),
            LayoutConfig::new(2, 1),
            provider,
            LogChipEventSink::default(),
        );
        (ChipRuntime::new(bar, Vec::new(), tx.clone(), rx), tx)
    }

    fn key(c: char) -> Event {
        Event::Input(InputEvent::Key(KeyEvent::plain(KeyCode::Char(c))))
    }

    #[tokio::test]
    async fn frames_commit_and_repaint_until_quit() {
        let (mut rt, tx) = runtime(&["Open", "Mine", "Urgent"]);
        for ev in [
            Event::Input(InputEvent::Resize(40, 10)),
            Event::Frame,
            key('d'),
            Event::Frame,
            key('q'),
            key('x'),
        ] {
            tx.send(ev).await.unwrap();
        }
        let reason = rt.run().await.unwrap();
        assert_eq!(reason, ShutdownReason::QuitKey);

        assert_eq!(rt.bar().items().len(), 2);
        assert_eq!(rt.bar().layout().unwrap().visible_count, 2);
        assert_eq!(rt.bar().sink().emitted(), 1);
        let painted = String::from_utf8_lossy(rt.output());
        assert!(painted.contains("[Urgent ×]"));
        assert!(painted.contains("q quit"));
    }

    #[tokio::test]
    async fn ctrl_c_and_shutdown_events_stop_the_loop() {
        let (mut rt, tx) = runtime(&["Open"]);
        tx.send(Event::Input(InputEvent::CtrlC)).await.unwrap();
        assert_eq!(rt.run().await.unwrap(), ShutdownReason::CtrlC);

        let (mut rt, tx) = runtime(&["Open"]);
        tx.send(Event::Shutdown).await.unwrap();
        assert_eq!(rt.run().await.unwrap(), ShutdownReason::ShutdownEvent);
    }

    #[tokio::test]
    async fn closed_channel_ends_the_loop() {
        let (mut rt, tx) = runtime(&["Open"]);
        drop(tx);
        // The runtime still holds its own sender until shutdown; close from the
        // receiving side instead.
        rt.rx.close();
        assert_eq!(rt.run().await.unwrap(), ShutdownReason::ChannelClosed);
    }
}
