use serde::{Deserialize, Serialize};

pub const DEFAULT_NODE_WIDTH: f32 = 200.0;
pub const DEFAULT_NODE_HEIGHT: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Text,
    File,
    Link,
    Group,
}

impl NodeKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "text" => Some(NodeKind::Text),
            "file" => Some(NodeKind::File),
            "link" => Some(NodeKind::Link),
            "group" => Some(NodeKind::Group),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "top" => Some(Side::Top),
            "right" => Some(Side::Right),
            "bottom" => Some(Side::Bottom),
            "left" => Some(Side::Left),
            _ => None,
        }
    }
}

/// A positioned canvas element. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Node {
    pub fn text(text: impl Into<String>, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id: new_id(),
            kind: NodeKind::Text,
            x,
            y,
            width,
            height,
            text: Some(text.into()),
            file: None,
            url: None,
            label: None,
            color: None,
        }
    }

    pub fn group(label: impl Into<String>, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id: new_id(),
            kind: NodeKind::Group,
            x,
            y,
            width,
            height,
            text: None,
            file: None,
            url: None,
            label: Some(label.into()),
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Display content: text for content nodes, label for groups.
    pub fn content(&self) -> Option<&str> {
        self.text
            .as_deref()
            .or(self.label.as_deref())
            .or(self.file.as_deref())
            .or(self.url.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub from_node: String,
    pub to_node: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_side: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_side: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Edge {
    /// Connects two nodes, attaching on the sides picked by the closest-side heuristic.
    pub fn between(from: &Node, to: &Node) -> Self {
        let (from_side, to_side) = super::routing::closest_sides(from.center(), to.center());
        Self {
            id: new_id(),
            from_node: from.id.clone(),
            to_node: to.id.clone(),
            from_side: Some(from_side),
            to_side: Some(to_side),
            label: None,
            color: None,
        }
    }
}

/// One diagram: the unit of serialization. Field order is the on-disk key order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|node| node.kind == NodeKind::Group)
    }

    pub fn content_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|node| node.kind != NodeKind::Group)
    }

    /// Node text containing `needle`; test and tool helper.
    pub fn find_text(&self, needle: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|node| node.text.as_deref().is_some_and(|text| text.contains(needle)))
    }
}

/// Canvas-style identifier: 16 lowercase hex characters.
pub fn new_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(16);
    id
}
