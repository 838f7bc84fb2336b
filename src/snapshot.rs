use crate::dataset::Dataset;
use crate::denylist::DenyList;
use crate::probe::{self, ProbeConfig};
use crate::selector;
use crate::types::{ProbeBatchResult, ProbeOutcome};
use ::time::{format_description::well_known, OffsetDateTime};
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Run one scheduled probe pass and overwrite the status artifact.
///
/// Selector → coordinator → keep connectable outcomes → stamp `dateChecked` →
/// full replace of the file at `output`. A dataset with no talkers is an
/// error, never a silent empty success; a write failure is fatal to the run
/// so a stale artifact is noticed rather than silently served.
///
/// `letter` restricts the run to one alphabetical slice of the endpoint set.
/// A sliced run still replaces the artifact wholesale.
pub async fn run_batch(
    dataset: &Dataset,
    deny: &DenyList,
    config: &ProbeConfig,
    output: &Path,
    letter: Option<char>,
) -> Result<ProbeBatchResult> {
    if dataset.talkers.is_empty() {
        bail!("dataset contains no talkers; refusing to write an empty snapshot");
    }

    let mut endpoints = selector::select(dataset, deny);
    if let Some(letter) = letter {
        if !letter.is_ascii_alphabetic() {
            bail!("letter filter must be an ASCII letter, got {letter:?}");
        }
        endpoints = selector::filter_by_initial(endpoints, letter);
    }
    info!(
        endpoints = endpoints.len(),
        timeout_ms = config.timeout.as_millis() as u64,
        letter = ?letter,
        "starting batch probe run"
    );

    let outcomes = probe::probe_endpoints(&endpoints, config).await;
    let connectable: Vec<ProbeOutcome> = outcomes
        .into_iter()
        .filter(|o| o.is_connectable)
        .collect();
    info!(connectable = connectable.len(), "batch probe run finished");

    let batch = ProbeBatchResult {
        date_checked: now_rfc3339(),
        talkers: connectable,
    };
    write_snapshot(output, &batch)?;
    Ok(batch)
}

/// Overwrite the snapshot artifact with pretty-printed JSON.
pub fn write_snapshot(path: &Path, batch: &ProbeBatchResult) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create snapshot file: {}", path.display()))?;
    serde_json::to_writer_pretty(file, batch)
        .with_context(|| format!("failed to write snapshot file: {}", path.display()))?;
    Ok(())
}

/// Read a previously written snapshot artifact.
pub fn read_snapshot(path: &Path) -> Result<ProbeBatchResult> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid snapshot file: {}", path.display()))
}

/// RFC3339 UTC timestamp for `dateChecked`.
pub fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
