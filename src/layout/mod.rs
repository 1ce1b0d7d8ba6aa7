mod kanban;
mod matrix;
mod mindmap;
mod passthrough;
pub mod routing;
pub(crate) mod types;
pub use types::*;
use kanban::*;
use matrix::*;
use mindmap::*;
use passthrough::*;

pub use kanban::{CARD_HEIGHT, COLUMN_PADDING, COLUMN_WIDTH, HEADER_HEIGHT};
pub use matrix::{CELL_HEIGHT, CELL_PADDING, CELL_WIDTH};
pub use mindmap::MAX_SUBTOPICS;

use crate::config::{ColumnHeight, LayoutStyle, TaskColoring};
use crate::ir::{Archetype, Column, Level, LayoutInput, RiskRecord, TaskRecord, TopicTree};
use crate::parser::extract;
use log::debug;

/// Positions structured records on the canvas. Pure apart from node ids.
pub fn compute_layout(input: &LayoutInput, style: &LayoutStyle) -> Graph {
    let graph = match input {
        LayoutInput::Tasks(tasks) => compute_kanban_layout(tasks, style),
        LayoutInput::Risks(risks) => compute_matrix_layout(risks, style),
        LayoutInput::Topics(tree) => compute_mindmap_layout(tree, style),
        LayoutInput::Text(text) => compute_passthrough_layout(text),
    };
    debug!(
        "{} layout: {} nodes, {} edges",
        input.archetype(),
        graph.nodes.len(),
        graph.edges.len()
    );
    graph
}

/// Extracts structure from free text and lays it out.
pub fn layout_text(archetype: Archetype, text: &str, style: &LayoutStyle) -> Graph {
    compute_layout(&extract(archetype, text), style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn geometry(graph: &Graph) -> Vec<(f32, f32, f32, f32, Option<String>)> {
        graph
            .nodes
            .iter()
            .map(|n| (n.x, n.y, n.width, n.height, n.color.clone()))
            .collect()
    }

    #[test]
    fn layout_is_deterministic_apart_from_ids() {
        let text = "Launch\nMarketing\n  Ads\n  Press\nEngineering\n  Backend";
        for archetype in Archetype::ALL {
            let first = layout_text(archetype, text, &LayoutStyle::interactive());
            let second = layout_text(archetype, text, &LayoutStyle::interactive());
            assert_eq!(geometry(&first), geometry(&second), "{archetype}");
            let sides = |g: &Graph| -> Vec<_> { g.edges.iter().map(|e| (e.from_side, e.to_side)).collect() };
            assert_eq!(sides(&first), sides(&second));
        }
    }

    #[test]
    fn ids_are_unique() {
        let sources = [
            (Archetype::Taskboard, "- write docs\ndoing:\n- review pull request\ndone:\n- ship beta"),
            (Archetype::RiskMatrix, "- vendor outage, likely and critical\n- scope creep\n- minor typo risk"),
            (Archetype::MindMap, "Root\nAlpha\n  Alpha one\n  Alpha two\nBeta\n  Beta one\nGamma"),
            (Archetype::Personnel, "Lead\nEngineer"),
        ];
        for (archetype, text) in sources {
            let graph = layout_text(archetype, text, &LayoutStyle::headless());
            let node_ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
            let edge_ids: HashSet<&str> = graph.edges.iter().map(|e| e.id.as_str()).collect();
            assert!(graph.nodes.len() > 1 || archetype == Archetype::Personnel, "{archetype}");
            assert_eq!(node_ids.len(), graph.nodes.len(), "{archetype}");
            assert_eq!(edge_ids.len(), graph.edges.len(), "{archetype}");
            assert!(graph
                .edges
                .iter()
                .all(|e| node_ids.contains(e.from_node.as_str()) && node_ids.contains(e.to_node.as_str())));
        }

        let mind_map = layout_text(Archetype::MindMap, sources[2].1, &LayoutStyle::headless());
        assert_eq!(mind_map.nodes.len(), 7);
        assert_eq!(mind_map.edges.len(), 6);
    }

    #[test]
    fn passthrough_keeps_description() {
        let graph = layout_text(Archetype::Personnel, "  CEO\n  CTO  ", &LayoutStyle::interactive());
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].text.as_deref(), Some("CEO\n  CTO"));
        let empty = layout_text(Archetype::Personnel, "", &LayoutStyle::interactive());
        assert_eq!(empty.nodes[0].text.as_deref(), Some("Empty canvas"));
    }

    #[test]
    fn empty_taskboard_still_has_a_card() {
        let graph = layout_text(Archetype::Taskboard, "", &LayoutStyle::interactive());
        assert!(graph.nodes.len() >= 5);
        assert_eq!(graph.content_nodes().count(), 1);
    }
}
