use serde::Deserialize;
use vault_canvas::layout::layout_text;
use vault_canvas::{Archetype, Config, LayoutStyle, TaskColoring};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CanvasLayoutOptions {
    preset: Option<String>,
    task_coloring: Option<TaskColoring>,
    row_gap: Option<f32>,
}

fn build_layout_style(options: CanvasLayoutOptions) -> Result<LayoutStyle, String> {
    let mut style = match options.preset.as_deref() {
        None | Some("interactive") => LayoutStyle::interactive(),
        Some("headless") => LayoutStyle::headless(),
        Some(other) => return Err(format!("unknown layout preset: {other}")),
    };
    if let Some(task_coloring) = options.task_coloring {
        style.task_coloring = task_coloring;
    }
    if let Some(row_gap) = options.row_gap {
        style.row_gap = row_gap;
    }
    Ok(style)
}

fn layout_json(archetype: &str, description: &str, options: CanvasLayoutOptions) -> Result<String, String> {
    let archetype = if archetype.trim().is_empty() {
        Archetype::detect(description)
    } else {
        archetype.parse::<Archetype>()?
    };
    let style = build_layout_style(options)?;
    let graph = vault_canvas::validate(layout_text(archetype, description, &style));
    vault_canvas::to_canvas_json(&graph).map_err(|error| error.to_string())
}

/// Lays out a description and returns the `.canvas` JSON. An empty archetype is
/// detected from the description.
#[wasm_bindgen]
pub fn layout_canvas(archetype: &str, description: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<CanvasLayoutOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        CanvasLayoutOptions::default()
    };
    layout_json(archetype, description, options).map_err(|error| JsValue::from_str(&error))
}

/// Repairs a canvas document produced elsewhere (e.g. by a model).
#[wasm_bindgen]
pub fn validate_canvas(canvas_json: &str) -> Result<String, JsValue> {
    let graph = vault_canvas::parse_canvas(canvas_json).map_err(|error| JsValue::from_str(&error.to_string()))?;
    vault_canvas::to_canvas_json(&graph).map_err(|error| JsValue::from_str(&error.to_string()))
}

#[wasm_bindgen]
pub fn canvas_file_name(name: &str) -> String {
    vault_canvas::canvas_file::canvas_path("", name)
}

/// Default note template, so the plugin and the CLI render notes alike.
#[wasm_bindgen]
pub fn default_note_template() -> String {
    Config::default().notes.template
}
