//! Configuration loading and parsing.
//!
//! Parses `chipbar.toml` (or an override path provided by the binary). Every
//! field is optional and unknown fields are ignored so older binaries keep
//! reading newer files. A file that fails to parse is reported under the
//! `config` target and replaced by defaults; a bad config never stops the bar
//! from drawing.
//!
//! Resolution order for layout values: preset first, then explicit `[layout]`
//! entries. Reserved widths are static fallbacks that only apply until the
//! width provider has measured the real affordances.

use anyhow::Result;
use chip_model::{LayoutConfig, LocaleStrings, Width};
use serde::Deserialize;
use std::{fs, path::PathBuf, time::Duration};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "chipbar.toml";

/// Named starting points matching the two shipped chip bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Tag filter: leading "Filtered by" label, clear-all, expand.
    #[default]
    TagFilter,
    /// Chip filter panel: no leading label, clear-all, expand.
    ChipPanel,
}

impl Preset {
    pub fn as_str(self) -> &'static str {
        match self {
            Preset::TagFilter => "tag-filter",
            Preset::ChipPanel => "chip-panel",
        }
    }

    pub fn max_rows(self) -> usize {
        2
    }

    pub fn item_gap(self) -> Width {
        1
    }

    pub fn shows_leading_label(self) -> bool {
        matches!(self, Preset::TagFilter)
    }

    pub fn default_label(self) -> Option<&'static str> {
        match self {
            Preset::TagFilter => Some("Filtered by"),
            Preset::ChipPanel => None,
        }
    }
}

impl std::str::FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "tag-filter" => Ok(Preset::TagFilter),
            "chip-panel" => Ok(Preset::ChipPanel),
            other => Err(format!(
                "unknown preset `{other}` (expected tag-filter or chip-panel)"
            )),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct LayoutSection {
    #[serde(default)]
    pub max_rows: Option<usize>,
    #[serde(default)]
    pub item_gap: Option<Width>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ReservedSection {
    #[serde(default)]
    pub leading: Width,
    #[serde(default)]
    pub trailing: Width,
    #[serde(default)]
    pub expand: Width,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct LocaleSection {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub clear_button_label: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FrameSection {
    #[serde(default = "FrameSection::default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for FrameSection {
    fn default() -> Self {
        Self {
            interval_ms: Self::default_interval_ms(),
        }
    }
}

impl FrameSection {
    // One frame at 60 Hz.
    const fn default_interval_ms() -> u64 {
        16
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub preset: Preset,
    #[serde(default)]
    pub layout: LayoutSection,
    #[serde(default)]
    pub reserved: ReservedSection,
    #[serde(default)]
    pub locale: LocaleSection,
    #[serde(default)]
    pub frame: FrameSection,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,     // original file string (optional)
    pub file: ConfigFile,        // parsed (or default) data
    pub source: Option<PathBuf>, // where `raw` came from
}

/// Best-effort config path: working directory first, then the platform
/// config dir (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("chipbar").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_absent_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), preset = file.preset.as_str(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                file,
                source: Some(path),
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Replace the file's preset, e.g. from a command line flag.
    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.file.preset = preset;
        self
    }

    pub fn preset(&self) -> Preset {
        self.file.preset
    }

    /// Effective layout configuration. A zero row cap is clamped to 1.
    pub fn layout_config(&self) -> LayoutConfig {
        let preset = self.file.preset;
        let layout = &self.file.layout;
        let reserved = &self.file.reserved;
        let mut cfg = LayoutConfig::new(
            layout.max_rows.unwrap_or_else(|| preset.max_rows()),
            layout.item_gap.unwrap_or_else(|| preset.item_gap()),
        )
        .with_reservations(reserved.leading, reserved.trailing, reserved.expand);
        if let Err(e) = cfg.validate() {
            warn!(target: "config", error = %e, "layout_max_rows_clamped");
            cfg.max_rows = 1;
        }
        cfg
    }

    /// Locale strings after preset rules; chip panels never draw a leading label.
    pub fn locale(&self) -> LocaleStrings {
        let preset = self.file.preset;
        let locale = &self.file.locale;
        let label = if preset.shows_leading_label() {
            locale
                .label
                .clone()
                .or_else(|| preset.default_label().map(str::to_string))
        } else {
            None
        };
        LocaleStrings::new(label, locale.clear_button_label.clone())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.file.frame.interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn capture_logs<F: FnOnce()>(f: F) -> String {
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();
        with_default(subscriber, f);
        String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
    }

    fn load_str(content: &str) -> Config {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), content).unwrap();
        load_from(Some(tmp.path().to_path_buf())).unwrap()
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert_eq!(cfg.preset(), Preset::TagFilter);
        assert_eq!(cfg.layout_config(), LayoutConfig::new(2, 1));
        assert_eq!(cfg.frame_interval(), Duration::from_millis(16));
        assert_eq!(cfg.locale().label.as_deref(), Some("Filtered by"));
        assert!(cfg.raw.is_none());
    }

    #[test]
    fn explicit_layout_overrides_preset() {
        let cfg = load_str(
            "preset = \"chip-panel\"\n[layout]\nmax_rows = 3\n[reserved]\nexpand = 9\n",
        );
        assert_eq!(cfg.preset(), Preset::ChipPanel);
        let layout = cfg.layout_config();
        assert_eq!(layout.max_rows, 3);
        assert_eq!(layout.item_gap, 1);
        assert_eq!(layout.expand_reserved_width, 9);
        assert_eq!(layout.leading_reserved_width, 0);
    }

    #[test]
    fn chip_panel_drops_leading_label() {
        let cfg = load_str(
            "preset = \"chip-panel\"\n[locale]\nlabel = \"Filtres\"\nclear_button_label = \"Effacer\"\n",
        );
        let locale = cfg.locale();
        assert_eq!(locale.label, None);
        assert_eq!(locale.clear_button_label.as_deref(), Some("Effacer"));

        let tag = cfg.clone().with_preset(Preset::TagFilter);
        assert_eq!(tag.locale().label.as_deref(), Some("Filtres"));
    }

    #[test]
    fn zero_rows_clamped_with_warning() {
        let cfg = load_str("[layout]\nmax_rows = 0\n");
        let out = capture_logs(|| {
            assert_eq!(cfg.layout_config().max_rows, 1);
        });
        assert!(out.contains("WARN config:"));
        assert!(out.contains("layout_max_rows_clamped"));
    }

    #[test]
    fn parse_error_falls_back_to_defaults_and_warns() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[layout\nmax_rows = ").unwrap();
        let path = tmp.path().to_path_buf();
        let mut loaded = None;
        let out = capture_logs(|| loaded = Some(load_from(Some(path)).unwrap()));
        let cfg = loaded.unwrap();
        assert_eq!(cfg.file, ConfigFile::default());
        assert!(out.contains("config_parse_failed_using_defaults"));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let cfg = load_str("future_flag = true\n[layout]\nitem_gap = 2\nwrap = \"never\"\n");
        assert_eq!(cfg.layout_config().item_gap, 2);
    }

    #[test]
    fn frame_interval_never_zero() {
        let cfg = load_str("[frame]\ninterval_ms = 0\n");
        assert_eq!(cfg.frame_interval(), Duration::from_millis(1));
    }

    #[test]
    fn preset_parses_from_flag_text() {
        assert_eq!("chip-panel".parse::<Preset>(), Ok(Preset::ChipPanel));
        assert!("grid".parse::<Preset>().is_err());
        assert_eq!(Preset::TagFilter.as_str(), "tag-filter");
    }
}
