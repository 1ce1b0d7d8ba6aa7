//! Request orchestration shared by the CLI and the tool server:
//! extract or generate, lay out, validate, persist.

use crate::canvas_file::{SavedArtifact, save_canvas};
use crate::config::{Config, TaskColoring};
use crate::error::{CanvasError, Result};
use crate::ir::{Archetype, LayoutInput, TaskRecord};
use crate::layout::{Graph, compute_layout};
use crate::llm::{CANVAS_SYSTEM_PROMPT, TASKS_SYSTEM_PROMPT, TextGenerator, canvas_prompt, parse_json_reply, tasks_prompt};
use crate::notes::{TaskNote, collect_task_notes, create_task_note, parse_task_list};
use crate::parser::extract;
use crate::store::{Vault, VaultEntry};
use crate::validate::{validate, validate_value};
use log::{info, warn};
use serde::{Deserialize, Serialize};

const NAME_CHARS: usize = 60;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasRequest {
    pub description: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Detected from the description when absent.
    #[serde(default)]
    pub archetype: Option<Archetype>,
    /// Overrides the configured canvas folder.
    #[serde(default)]
    pub folder: Option<String>,
}

impl CanvasRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn archetype(&self) -> Archetype {
        self.archetype.unwrap_or_else(|| Archetype::detect(&self.description))
    }

    /// Explicit name, else the first line of the description, else the archetype.
    pub fn name(&self) -> String {
        if let Some(name) = self.name.as_deref().map(str::trim)
            && !name.is_empty()
        {
            return name.to_string();
        }
        self.description
            .lines()
            .map(|line| line.trim().trim_start_matches(['#', '-', '*', '•']).trim())
            .find(|line| !line.is_empty())
            .map(|line| line.chars().take(NAME_CHARS).collect())
            .unwrap_or_else(|| self.archetype().as_str().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasOutcome {
    #[serde(flatten)]
    pub artifact: SavedArtifact,
    pub archetype: Archetype,
    pub node_count: usize,
    pub edge_count: usize,
}

pub struct CanvasService<V: Vault> {
    config: Config,
    vault: V,
}

impl<V: Vault> CanvasService<V> {
    pub fn new(config: Config, vault: V) -> Self {
        Self { config, vault }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn vault(&self) -> &V {
        &self.vault
    }

    /// Heuristic pipeline without persistence. Extracted tasks carry no status,
    /// so the board is colored by priority.
    pub fn layout_from_text(&self, archetype: Archetype, description: &str) -> Graph {
        let style = self.config.layout.with_task_coloring(TaskColoring::Priority);
        validate(compute_layout(&extract(archetype, description), &style))
    }

    /// Lays out task records that carry a status, colored by column.
    pub fn layout_tasks(&self, tasks: Vec<TaskRecord>) -> Graph {
        let style = self.config.layout.with_task_coloring(TaskColoring::Column);
        validate(compute_layout(&LayoutInput::Tasks(tasks), &style))
    }

    /// Builds a canvas from the description alone and saves it.
    pub fn create_canvas(&self, request: &CanvasRequest) -> Result<CanvasOutcome> {
        let archetype = request.archetype();
        let graph = self.layout_from_text(archetype, &request.description);
        self.persist(request, archetype, &graph)
    }

    /// Asks the model for content, then lays out and saves it. Task boards are
    /// requested as a task list and positioned locally; other shapes come back
    /// as canvas documents and are only repaired. Personnel charts have no
    /// dedicated prompt handling and degrade to a single text node.
    pub fn generate_canvas(&self, generator: &dyn TextGenerator, request: &CanvasRequest) -> Result<CanvasOutcome> {
        let archetype = request.archetype();
        let graph = match archetype {
            Archetype::Taskboard => {
                let reply = generator.generate(&tasks_prompt(&request.description), TASKS_SYSTEM_PROMPT)?;
                let tasks = parse_task_list(&parse_json_reply(&reply)?)?;
                if tasks.is_empty() {
                    warn!("model returned no tasks, falling back to text extraction");
                    self.layout_from_text(archetype, &request.description)
                } else {
                    self.layout_tasks(tasks.iter().map(TaskNote::to_record).collect())
                }
            }
            Archetype::Personnel => self.layout_from_text(archetype, &request.description),
            Archetype::RiskMatrix | Archetype::MindMap => {
                let reply = generator.generate(&canvas_prompt(archetype, &request.description), CANVAS_SYSTEM_PROMPT)?;
                let value = parse_json_reply(&reply)?;
                if !value.is_object() {
                    return Err(CanvasError::UpstreamGeneration("reply is not a canvas object".to_string()));
                }
                validate_value(&value)
            }
        };
        self.persist(request, archetype, &graph)
    }

    pub fn create_task_note(&self, note: &TaskNote, overwrite: bool) -> Result<SavedArtifact> {
        create_task_note(
            &self.vault,
            &self.config.vault.notes_folder,
            &self.config.notes.template,
            note,
            overwrite,
        )
    }

    /// Splits a description into tasks with the model and writes one note each.
    /// Stops at the first note that cannot be written.
    pub fn generate_task_notes(
        &self,
        generator: &dyn TextGenerator,
        description: &str,
        overwrite: bool,
    ) -> Result<Vec<SavedArtifact>> {
        let reply = generator.generate(&tasks_prompt(description), TASKS_SYSTEM_PROMPT)?;
        let tasks = parse_task_list(&parse_json_reply(&reply)?)?;
        info!("model proposed {} tasks", tasks.len());
        tasks.iter().map(|note| self.create_task_note(note, overwrite)).collect()
    }

    /// Lays out every note in the notes folder (or `folder`) as a task board.
    pub fn taskboard_from_notes(&self, folder: Option<&str>, name: &str) -> Result<CanvasOutcome> {
        let folder = folder.unwrap_or(&self.config.vault.notes_folder);
        let tasks: Vec<TaskRecord> = collect_task_notes(&self.vault, folder)?
            .iter()
            .map(TaskNote::to_record)
            .collect();
        let graph = if tasks.is_empty() {
            self.layout_from_text(Archetype::Taskboard, "")
        } else {
            self.layout_tasks(tasks)
        };
        let request = CanvasRequest {
            name: Some(name.to_string()),
            archetype: Some(Archetype::Taskboard),
            ..CanvasRequest::default()
        };
        self.persist(&request, Archetype::Taskboard, &graph)
    }

    pub fn list_notes(&self, folder: Option<&str>) -> Result<Vec<VaultEntry>> {
        let folder = folder.unwrap_or(&self.config.vault.notes_folder);
        Ok(self
            .vault
            .list_files(folder)?
            .into_iter()
            .filter(|entry| entry.extension.as_deref() == Some("md"))
            .collect())
    }

    pub fn read_note(&self, path: &str) -> Result<String> {
        self.vault.read_file(path)
    }

    fn persist(&self, request: &CanvasRequest, archetype: Archetype, graph: &Graph) -> Result<CanvasOutcome> {
        let folder = request.folder.as_deref().unwrap_or(&self.config.vault.canvas_folder);
        let artifact = save_canvas(&self.vault, folder, &request.name(), graph)?;
        Ok(CanvasOutcome {
            artifact,
            archetype,
            node_count: graph.nodes.len(),
            edge_count: graph.edges.len(),
        })
    }
}
