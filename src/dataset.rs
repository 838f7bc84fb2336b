use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// The raw talker dataset as published by the directory.
///
/// Only the fields the probing subsystem reads are modeled; the directory's
/// many other per-talker fields (codebase, admins, resources, ...) are ignored
/// during deserialization. Schema validation and migration belong to the
/// directory, not here.
#[derive(Deserialize, Debug, Clone)]
pub struct Dataset {
    pub talkers: Vec<Talker>,
}

/// One talker record, reduced to its display name and host list.
#[derive(Deserialize, Debug, Clone)]
pub struct Talker {
    pub name: String,
    #[serde(default)]
    pub hosts: Vec<HostEntry>,
}

/// One host entry under a talker.
///
/// `port` is kept wide (`u32`) so an out-of-range value in the dataset is a
/// droppable entry rather than a parse failure of the whole file.
#[derive(Deserialize, Debug, Clone)]
pub struct HostEntry {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub port: Option<u32>,
    #[serde(default)]
    pub blocked: bool,
}

/// Parse a dataset from a JSON string.
///
/// A document without a `talkers` array is malformed and errors here; an empty
/// `talkers` array parses fine and is rejected later by the result sinks,
/// which must distinguish "nothing is up" from "the input was broken".
pub fn parse_dataset_str(s: &str) -> Result<Dataset> {
    serde_json::from_str(s).context("invalid talker dataset: expected a JSON object with a `talkers` array")
}

/// Load the dataset from a file path.
pub fn load_dataset_from_path(path: impl AsRef<Path>) -> Result<Dataset> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("failed to read dataset file: {}", path.as_ref().display()))?;
    parse_dataset_str(&content)
}
