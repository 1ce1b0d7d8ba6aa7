//! Task notes: markdown files with a flat frontmatter block.

use crate::canvas_file::{SavedArtifact, WriteOutcome, artifact_path};
use crate::error::{CanvasError, Result};
use crate::ir::{Column, Priority, TaskRecord};
use crate::store::Vault;
use chrono::NaiveDate;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").unwrap());
static FRONTMATTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\A---\r?\n(.*?)\r?\n---(?:\r?\n|\z)").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNote {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due: Option<String>,
}

impl TaskNote {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn column(&self) -> Column {
        Column::from_status(self.status.as_deref().unwrap_or_default())
    }

    pub fn priority(&self) -> Priority {
        self.priority
            .as_deref()
            .and_then(Priority::from_token)
            .unwrap_or(Priority::Medium)
    }

    pub fn to_record(&self) -> TaskRecord {
        TaskRecord {
            title: self.title.clone(),
            column: self.column(),
            priority: self.priority(),
        }
    }
}

/// Fills `{{key}}` placeholders. Unknown keys render empty.
pub fn render_note(template: &str, note: &TaskNote, date: NaiveDate) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &regex::Captures| match &caps[1] {
            "title" => note.title.clone(),
            "description" => note.description.clone(),
            "status" => note.status.clone().unwrap_or_else(|| "todo".to_string()),
            "priority" => note.priority().as_str().to_string(),
            "due" => note.due.clone().unwrap_or_default(),
            "date" => date.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        })
        .into_owned()
}

/// Writes `<folder>/<title>.md`. Unlike canvases, an existing note is an
/// error unless `overwrite` is set.
pub fn create_task_note<V: Vault + ?Sized>(
    vault: &V,
    folder: &str,
    template: &str,
    note: &TaskNote,
    overwrite: bool,
) -> Result<SavedArtifact> {
    if note.title.trim().is_empty() {
        return Err(CanvasError::InvalidRequest("task note needs a title".to_string()));
    }
    let path = artifact_path(folder, &note.title, "md");
    let exists = vault.file_exists(&path)?;
    if exists && !overwrite {
        return Err(CanvasError::ArtifactExists(path));
    }
    let contents = render_note(template, note, chrono::Local::now().date_naive());
    vault.write_file(&path, &contents)?;
    info!("wrote task note {path}");
    Ok(SavedArtifact {
        path,
        outcome: if exists {
            WriteOutcome::Updated
        } else {
            WriteOutcome::Created
        },
    })
}

/// Flat `key: value` pairs from a leading `---` block.
pub fn parse_frontmatter(text: &str) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    let Some(caps) = FRONTMATTER_RE.captures(text) else {
        return fields;
    };
    for line in caps[1].lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() || key.starts_with('#') {
            continue;
        }
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        fields.insert(key.to_string(), value.to_string());
    }
    fields
}

/// Reads a note back into a task. The file stem stands in for a missing title.
pub fn note_from_markdown(stem: &str, text: &str) -> TaskNote {
    let mut fields = parse_frontmatter(text);
    let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
    TaskNote {
        title: non_empty(fields.remove("title")).unwrap_or_else(|| stem.to_string()),
        description: String::new(),
        status: non_empty(fields.remove("status")),
        priority: non_empty(fields.remove("priority")),
        due: non_empty(fields.remove("due")),
    }
}

/// Every markdown note directly inside `folder`, as tasks.
pub fn collect_task_notes<V: Vault + ?Sized>(vault: &V, folder: &str) -> Result<Vec<TaskNote>> {
    let mut notes = Vec::new();
    for entry in vault.list_files(folder)? {
        if entry.extension.as_deref() != Some("md") {
            continue;
        }
        let text = vault.read_file(&entry.path)?;
        let stem = entry.name.trim_end_matches(".md");
        notes.push(note_from_markdown(stem, &text));
    }
    debug!("collected {} task notes from {folder}", notes.len());
    Ok(notes)
}

/// Accepts `[{...}]` or `{"tasks": [{...}]}`; entries without a title are skipped.
pub fn parse_task_list(value: &Value) -> Result<Vec<TaskNote>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get("tasks")
            .and_then(Value::as_array)
            .ok_or_else(|| CanvasError::UpstreamGeneration("reply has no task list".to_string()))?,
        _ => {
            return Err(CanvasError::UpstreamGeneration(
                "reply is not a task list".to_string(),
            ));
        }
    };
    Ok(items
        .iter()
        .filter_map(|item| serde_json::from_value::<TaskNote>(item.clone()).ok())
        .filter(|note| !note.title.trim().is_empty())
        .collect())
}
