//! Chip list sources: command line labels or a file with one label per line.

use anyhow::{Context, Result};
use chip_model::Item;
use std::path::Path;

const DEMO_LABELS: &[&str] = &[
    "Status: open",
    "Owner: me",
    "Priority: high",
    "Label: bug",
    "Milestone: 1.0",
    "Region: 東京",
    "Team: 🚀 launch",
    "Updated: this week",
];

/// Build items from labels, in order. Blank labels are skipped; ids are
/// assigned by position so they survive later deletions.
pub fn items_from_labels<I, S>(labels: I, source: &str) -> Vec<Item>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    labels
        .into_iter()
        .filter_map(|l| {
            let label = l.as_ref().trim();
            (!label.is_empty()).then(|| label.to_string())
        })
        .enumerate()
        .map(|(i, label)| Item::new(format!("chip-{i}"), label).with_metadata("source", source))
        .collect()
}

pub fn items_from_file(path: &Path) -> Result<Vec<Item>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading chip labels from {}", path.display()))?;
    Ok(items_from_labels(content.lines(), "file"))
}

/// Resolve the startup chip list: file wins over arguments, arguments over
/// the built-in demo set.
pub fn load_items(labels: &[String], file: Option<&Path>) -> Result<Vec<Item>> {
    if let Some(path) = file {
        return items_from_file(path);
    }
    if !labels.is_empty() {
        return Ok(items_from_labels(labels, "args"));
    }
    Ok(items_from_labels(DEMO_LABELS, "demo"))
}
