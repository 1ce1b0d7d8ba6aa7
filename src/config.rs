use crate::theme::{Palette, Theme};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_NOTE_TEMPLATE: &str = "---
title: {{title}}
status: {{status}}
priority: {{priority}}
due: {{due}}
created: {{date}}
tags: [task]
---

# {{title}}

{{description}}
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskColoring {
    /// Color cards by priority (high/medium/low).
    Priority,
    /// Color cards by the column they sit in.
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnHeight {
    Fixed(f32),
    /// header + (cards + 1) * (card height + row gap), per column.
    Computed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutStyle {
    pub task_coloring: TaskColoring,
    pub column_height: ColumnHeight,
    pub row_gap: f32,
    pub risk_row_step: f32,
    pub palette: Palette,
}

impl LayoutStyle {
    /// Editor-side defaults.
    pub fn interactive() -> Self {
        Self {
            task_coloring: TaskColoring::Priority,
            column_height: ColumnHeight::Fixed(800.0),
            row_gap: 10.0,
            risk_row_step: 50.0,
            palette: Palette::default(),
        }
    }

    /// Tool-server defaults.
    pub fn headless() -> Self {
        Self {
            task_coloring: TaskColoring::Column,
            column_height: ColumnHeight::Computed,
            row_gap: 20.0,
            risk_row_step: 60.0,
            palette: Palette::default(),
        }
    }

    pub fn with_task_coloring(&self, task_coloring: TaskColoring) -> Self {
        Self {
            task_coloring,
            ..self.clone()
        }
    }
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self::interactive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VaultConfig {
    pub root: PathBuf,
    pub canvas_folder: String,
    pub notes_folder: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            canvas_folder: "Canvases".to_string(),
            notes_folder: "Tasks".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotesConfig {
    pub template: String,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_NOTE_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key_env: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            model: "claude-sonnet-4-5".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            max_tokens: 4096,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub layout: LayoutStyle,
    pub vault: VaultConfig,
    pub notes: NotesConfig,
    pub llm: LlmConfig,
    pub theme: Theme,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutFile {
    preset: Option<String>,
    task_coloring: Option<TaskColoring>,
    fixed_column_height: Option<f32>,
    computed_column_height: Option<bool>,
    row_gap: Option<f32>,
    risk_row_step: Option<f32>,
    palette: Option<Palette>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VaultFile {
    root: Option<PathBuf>,
    canvas_folder: Option<String>,
    notes_folder: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmFile {
    endpoint: Option<String>,
    model: Option<String>,
    api_key_env: Option<String>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    layout: Option<LayoutFile>,
    vault: Option<VaultFile>,
    note_template: Option<String>,
    note_template_file: Option<PathBuf>,
    llm: Option<LlmFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    apply_config_file(config, parsed, base_dir)
}

fn apply_config_file(mut config: Config, parsed: ConfigFile, base_dir: &Path) -> anyhow::Result<Config> {
    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "dark" {
            config.theme = Theme::dark();
        } else if theme_name == "default" || theme_name == "light" {
            config.theme = Theme::canvas_default();
        }
    }

    if let Some(layout) = parsed.layout {
        match layout.preset.as_deref() {
            Some("headless") => config.layout = LayoutStyle::headless(),
            Some("interactive") => config.layout = LayoutStyle::interactive(),
            Some(other) => anyhow::bail!("unknown layout preset: {other}"),
            None => {}
        }
        if let Some(v) = layout.task_coloring {
            config.layout.task_coloring = v;
        }
        if let Some(v) = layout.fixed_column_height {
            config.layout.column_height = ColumnHeight::Fixed(v);
        }
        if layout.computed_column_height == Some(true) {
            config.layout.column_height = ColumnHeight::Computed;
        }
        if let Some(v) = layout.row_gap {
            config.layout.row_gap = v;
        }
        if let Some(v) = layout.risk_row_step {
            config.layout.risk_row_step = v;
        }
        if let Some(v) = layout.palette {
            config.layout.palette = v;
        }
    }

    if let Some(vault) = parsed.vault {
        if let Some(v) = vault.root {
            config.vault.root = if v.is_relative() { base_dir.join(v) } else { v };
        }
        if let Some(v) = vault.canvas_folder {
            config.vault.canvas_folder = v;
        }
        if let Some(v) = vault.notes_folder {
            config.vault.notes_folder = v;
        }
    }

    if let Some(v) = parsed.note_template {
        config.notes.template = v;
    }
    if let Some(file) = parsed.note_template_file {
        config.notes.template = std::fs::read_to_string(base_dir.join(file))?;
    }

    if let Some(llm) = parsed.llm {
        if let Some(v) = llm.endpoint {
            config.llm.endpoint = v;
        }
        if let Some(v) = llm.model {
            config.llm.model = v;
        }
        if let Some(v) = llm.api_key_env {
            config.llm.api_key_env = v;
        }
        if let Some(v) = llm.max_tokens {
            config.llm.max_tokens = v;
        }
        if let Some(v) = llm.timeout_secs {
            config.llm.timeout_secs = v;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> anyhow::Result<Config> {
        let parsed: ConfigFile = serde_json::from_str(json)?;
        apply_config_file(Config::default(), parsed, Path::new("/vaults"))
    }

    #[test]
    fn empty_file_keeps_defaults() {
        let config = parse("{}").unwrap();
        assert_eq!(config.layout, LayoutStyle::interactive());
        assert_eq!(config.vault.canvas_folder, "Canvases");
        assert_eq!(config.notes.template, DEFAULT_NOTE_TEMPLATE);
    }

    #[test]
    fn preset_then_overrides() {
        let config = parse(
            r#"{"layout": {"preset": "headless", "taskColoring": "priority", "rowGap": 15},
                "vault": {"root": "notes", "canvasFolder": "Boards"},
                "llm": {"model": "local-model", "maxTokens": 512}}"#,
        )
        .unwrap();
        assert_eq!(config.layout.column_height, ColumnHeight::Computed);
        assert_eq!(config.layout.task_coloring, TaskColoring::Priority);
        assert_eq!(config.layout.row_gap, 15.0);
        assert_eq!(config.layout.risk_row_step, 60.0);
        assert_eq!(config.vault.root, PathBuf::from("/vaults/notes"));
        assert_eq!(config.vault.canvas_folder, "Boards");
        assert_eq!(config.vault.notes_folder, "Tasks");
        assert_eq!(config.llm.model, "local-model");
        assert_eq!(config.llm.max_tokens, 512);
    }

    #[test]
    fn rejects_unknown_preset() {
        assert!(parse(r#"{"layout": {"preset": "fancy"}}"#).is_err());
    }

    #[test]
    fn fixed_height_override() {
        let config = parse(r#"{"layout": {"fixedColumnHeight": 640}}"#).unwrap();
        assert_eq!(config.layout.column_height, ColumnHeight::Fixed(640.0));
    }
}
