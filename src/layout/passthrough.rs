use super::*;

pub const TEXT_WIDTH: f32 = 400.0;
pub const TEXT_HEIGHT: f32 = 300.0;

/// Archetypes without a dedicated generator render as one text card.
pub(super) fn compute_passthrough_layout(text: &str) -> Graph {
    let body = if text.trim().is_empty() { "Empty canvas" } else { text.trim() };
    let mut graph = Graph::new();
    graph.nodes.push(Node::text(body, 0.0, 0.0, TEXT_WIDTH, TEXT_HEIGHT));
    graph
}
