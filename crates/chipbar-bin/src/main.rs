//! chipbar entrypoint: an interactive two-row filter chip bar in the terminal.
use anyhow::Result;
use chip_config::{Preset, load_from};
use chip_events::{EVENT_CHANNEL_CAP, EventSourceRegistry, FrameTickSource, LogChipEventSink};
use chip_terminal::{CrosstermBackend, TerminalBackend};
use chip_text::CellWidthProvider;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tokio::sync::mpsc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

mod bar;
mod items;
mod runtime;
mod view;

use bar::ChipBar;
use runtime::ChipRuntime;

const LOG_FILE: &str = "chipbar.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "chipbar", version, about = "Two-row filter chip bar")]
struct Args {
    /// Chip labels, in display order. A built-in demo set is used when empty.
    pub labels: Vec<String>,
    /// Read chip labels from a file, one per line (overrides positional labels).
    #[arg(long = "file", short = 'f')]
    pub file: Option<PathBuf>,
    /// Optional configuration file path (overrides discovery of `chipbar.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Preset to start from (`tag-filter` or `chip-panel`), replacing the file's.
    #[arg(long = "preset")]
    pub preset: Option<Preset>,
}

struct AppStartup {
    backend: CrosstermBackend,
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self {
            backend: CrosstermBackend::new(),
            log_guard: None,
        }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join(LOG_FILE);
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .with_ansi(false)
            .try_init()
            .is_ok()
        {
            self.log_guard = Some(guard);
        }
        // Otherwise a global subscriber already exists; dropping the guard shuts the writer down.
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::new();
    startup.configure_logging()?;
    AppStartup::install_panic_hook();
    info!(target: "runtime", "startup");

    let mut config = load_from(args.config.clone())?;
    if let Some(preset) = args.preset {
        config = config.with_preset(preset);
    }
    let layout_config = config.layout_config();
    let items = items::load_items(&args.labels, args.file.as_deref())?;
    info!(
        target: "runtime.startup",
        items = items.len(),
        preset = config.preset().as_str(),
        max_rows = layout_config.max_rows,
        config_override = args.config.is_some(),
        "bootstrap_complete"
    );

    startup.backend.set_title("chipbar")?;
    let (cols, _rows) = startup.backend.size()?;
    let _terminal_guard = startup.backend.enter_guard()?;

    let mut bar = ChipBar::new(
        items,
        layout_config,
        CellWidthProvider::new(config.locale()),
        LogChipEventSink::default(),
    );
    bar.resize(cols);

    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAP);
    let (input_task, input_shutdown) = chip_input::spawn_async_input(tx.clone());
    let mut registry = EventSourceRegistry::new();
    registry.register(FrameTickSource::new(config.frame_interval()));
    let source_handles = registry.spawn_all(&tx);

    let mut runtime = ChipRuntime::new(bar, std::io::stdout(), tx, rx)
        .with_sources(source_handles)
        .with_input(input_task, input_shutdown);
    let reason = runtime.run().await?;
    info!(target: "runtime", reason = reason.as_str(), "exit");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_parse_labels_and_flags() {
        let args = Args::try_parse_from([
            "chipbar",
            "--preset",
            "chip-panel",
            "--config",
            "alt.toml",
            "Open",
            "Mine",
        ])
        .unwrap();
        assert_eq!(args.labels, vec!["Open", "Mine"]);
        assert_eq!(args.preset, Some(Preset::ChipPanel));
        assert_eq!(args.config, Some(PathBuf::from("alt.toml")));
        assert!(args.file.is_none());
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!(Args::try_parse_from(["chipbar", "--preset", "grid"]).is_err());
    }
}
