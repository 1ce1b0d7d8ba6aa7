use crate::error::Result;
use crate::layout::Graph;
use crate::store::Vault;
use crate::validate::validate_value;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub const CANVAS_EXTENSION: &str = "canvas";
pub const MAX_FILE_NAME_CHARS: usize = 100;

static UNSAFE_CHARS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[\\/:*?"<>|]"#).unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedArtifact {
    pub path: String,
    pub outcome: WriteOutcome,
}

/// Makes a display name safe as a file stem: reserved characters become `-`,
/// whitespace runs become a single `-`, and the result is capped at 100 chars.
pub fn sanitize_file_name(name: &str) -> String {
    let replaced = UNSAFE_CHARS_RE.replace_all(name, "-");
    let collapsed = WHITESPACE_RE.replace_all(&replaced, "-");
    collapsed.chars().take(MAX_FILE_NAME_CHARS).collect()
}

pub fn artifact_path(folder: &str, name: &str, extension: &str) -> String {
    let mut stem = sanitize_file_name(name);
    if stem.is_empty() {
        stem = "Untitled".to_string();
    }
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        format!("{stem}.{extension}")
    } else {
        format!("{folder}/{stem}.{extension}")
    }
}

pub fn canvas_path(folder: &str, name: &str) -> String {
    artifact_path(folder, name, CANVAS_EXTENSION)
}

/// Canonical on-disk form: 2-space indented JSON, `nodes` before `edges`.
pub fn to_canvas_json(graph: &Graph) -> Result<String> {
    Ok(serde_json::to_string_pretty(graph)?)
}

/// Reads a canvas document leniently, repairing it the same way model output is.
pub fn parse_canvas(text: &str) -> Result<Graph> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    Ok(validate_value(&value))
}

/// Writes the graph to `<folder>/<name>.canvas`, replacing an existing file in place.
pub fn save_canvas<V: Vault + ?Sized>(vault: &V, folder: &str, name: &str, graph: &Graph) -> Result<SavedArtifact> {
    let path = canvas_path(folder, name);
    let contents = to_canvas_json(graph)?;
    let outcome = if vault.file_exists(&path)? {
        WriteOutcome::Updated
    } else {
        if !folder.trim_matches('/').is_empty() && !vault.folder_exists(folder)? {
            vault.create_folder(folder)?;
        }
        WriteOutcome::Created
    };
    vault.write_file(&path, &contents)?;
    info!(
        "{} canvas {path} ({} nodes, {} edges)",
        match outcome {
            WriteOutcome::Created => "created",
            WriteOutcome::Updated => "updated",
        },
        graph.nodes.len(),
        graph.edges.len()
    );
    Ok(SavedArtifact { path, outcome })
}
