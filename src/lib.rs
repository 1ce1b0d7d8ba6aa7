pub mod canvas_file;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod llm;
pub mod notes;
pub mod parser;
pub mod render;
pub mod server;
pub mod service;
pub mod store;
pub mod theme;
pub mod validate;

pub use canvas_file::{parse_canvas, sanitize_file_name, save_canvas, to_canvas_json};
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutStyle, TaskColoring, load_config};
pub use error::{CanvasError, Result};
pub use ir::{Archetype, LayoutInput};
pub use layout::{Edge, Graph, Node, compute_layout, layout_text};
pub use parser::extract;
pub use service::{CanvasRequest, CanvasService};
pub use store::{FsVault, MemoryVault, Vault};
pub use validate::{validate, validate_value};
