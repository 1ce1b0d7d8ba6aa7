use crate::layout::{DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH, Edge, Graph, Node, NodeKind, Side, new_id};
use log::{debug, warn};
use serde_json::Value;
use std::collections::HashSet;

/// Normalizes an untyped canvas document (typically model output) into a
/// valid graph. Missing geometry gets defaults, missing ids are generated,
/// and edges pointing at unknown nodes are dropped.
pub fn validate_value(raw: &Value) -> Graph {
    let nodes = raw
        .get("nodes")
        .and_then(Value::as_array)
        .map(|nodes| nodes.iter().map(node_from_value).collect())
        .unwrap_or_default();
    let edges = raw
        .get("edges")
        .and_then(Value::as_array)
        .map(|edges| edges.iter().filter_map(edge_from_value).collect())
        .unwrap_or_default();
    validate(Graph { nodes, edges })
}

/// Normalizes a typed graph. Every node ends up with a unique id and positive
/// size; edges keep only references that resolve inside the graph.
pub fn validate(graph: Graph) -> Graph {
    let mut node_ids: HashSet<String> = HashSet::new();
    let mut nodes = Vec::with_capacity(graph.nodes.len());
    for mut node in graph.nodes {
        if node.id.is_empty() || node_ids.contains(&node.id) {
            if !node.id.is_empty() {
                warn!("duplicate node id {}, assigning a fresh one", node.id);
            }
            node.id = fresh_id(&node_ids);
        }
        if !node.x.is_finite() {
            node.x = 0.0;
        }
        if !node.y.is_finite() {
            node.y = 0.0;
        }
        if !(node.width.is_finite() && node.width > 0.0) {
            node.width = DEFAULT_NODE_WIDTH;
        }
        if !(node.height.is_finite() && node.height > 0.0) {
            node.height = DEFAULT_NODE_HEIGHT;
        }
        node.text = non_empty(node.text);
        node.file = non_empty(node.file);
        node.url = non_empty(node.url);
        node.label = non_empty(node.label);
        node.color = non_empty(node.color);
        node_ids.insert(node.id.clone());
        nodes.push(node);
    }

    let mut edge_ids: HashSet<String> = HashSet::new();
    let mut edges = Vec::with_capacity(graph.edges.len());
    let mut dropped = 0usize;
    for mut edge in graph.edges {
        if !node_ids.contains(&edge.from_node) || !node_ids.contains(&edge.to_node) {
            debug!("dropping edge {} -> {}: unknown node", edge.from_node, edge.to_node);
            dropped += 1;
            continue;
        }
        if edge.id.is_empty() || edge_ids.contains(&edge.id) {
            edge.id = fresh_id(&edge_ids);
        }
        edge.label = non_empty(edge.label);
        edge.color = non_empty(edge.color);
        edge_ids.insert(edge.id.clone());
        edges.push(edge);
    }
    if dropped > 0 {
        warn!("dropped {dropped} edge(s) referencing missing nodes");
    }

    Graph { nodes, edges }
}

fn node_from_value(value: &Value) -> Node {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .and_then(NodeKind::from_token)
        .unwrap_or_default();
    Node {
        id: truthy_string(value.get("id")).unwrap_or_default(),
        kind,
        x: number_or(value.get("x"), 0.0),
        y: number_or(value.get("y"), 0.0),
        width: number_or(value.get("width"), DEFAULT_NODE_WIDTH),
        height: number_or(value.get("height"), DEFAULT_NODE_HEIGHT),
        text: truthy_string(value.get("text")),
        file: truthy_string(value.get("file")),
        url: truthy_string(value.get("url")),
        label: truthy_string(value.get("label")),
        color: truthy_string(value.get("color")),
    }
}

fn edge_from_value(value: &Value) -> Option<Edge> {
    // Without both endpoints the edge can never resolve.
    let from_node = truthy_string(value.get("fromNode"))?;
    let to_node = truthy_string(value.get("toNode"))?;
    Some(Edge {
        id: truthy_string(value.get("id")).unwrap_or_default(),
        from_node,
        to_node,
        from_side: side(value.get("fromSide")),
        to_side: side(value.get("toSide")),
        label: truthy_string(value.get("label")),
        color: truthy_string(value.get("color")),
    })
}

fn side(value: Option<&Value>) -> Option<Side> {
    value.and_then(Value::as_str).and_then(Side::from_token)
}

fn number_or(value: Option<&Value>, default: f32) -> f32 {
    value
        .and_then(Value::as_f64)
        .map(|v| v as f32)
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn truthy_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn fresh_id(taken: &HashSet<String>) -> String {
    loop {
        let id = new_id();
        if !taken.contains(&id) {
            return id;
        }
    }
}
