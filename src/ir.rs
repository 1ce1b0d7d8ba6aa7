use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Taskboard,
    RiskMatrix,
    MindMap,
    Personnel,
}

impl Archetype {
    pub const ALL: [Archetype; 4] = [
        Archetype::Taskboard,
        Archetype::RiskMatrix,
        Archetype::MindMap,
        Archetype::Personnel,
    ];

    /// Picks an archetype from the wording of a request. Falls back to a mind map.
    pub fn detect(message: &str) -> Self {
        let lower = message.to_lowercase();
        if ["task", "kanban", "todo"].iter().any(|k| lower.contains(k)) {
            Archetype::Taskboard
        } else if lower.contains("risk") {
            Archetype::RiskMatrix
        } else if ["org", "personnel"].iter().any(|k| lower.contains(k)) {
            Archetype::Personnel
        } else {
            Archetype::MindMap
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Taskboard => "taskboard",
            Archetype::RiskMatrix => "riskmatrix",
            Archetype::MindMap => "mindmap",
            Archetype::Personnel => "personnel",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Archetype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "taskboard" | "kanban" | "tasks" => Ok(Archetype::Taskboard),
            "riskmatrix" | "risk" | "risks" => Ok(Archetype::RiskMatrix),
            "mindmap" | "mind" => Ok(Archetype::MindMap),
            "personnel" | "org" | "orgchart" | "custom" => Ok(Archetype::Personnel),
            other => Err(format!("unknown archetype: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Lenient parse used for frontmatter and upstream JSON.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "high" | "urgent" | "critical" => Some(Priority::High),
            "medium" | "normal" | "med" => Some(Priority::Medium),
            "low" | "minor" => Some(Priority::Low),
            _ => None,
        }
    }
}

/// Kanban column, in left-to-right order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    ToDo,
    InProgress,
    Review,
    Done,
}

impl Column {
    pub const ALL: [Column; 4] = [Column::ToDo, Column::InProgress, Column::Review, Column::Done];

    pub fn index(&self) -> usize {
        match self {
            Column::ToDo => 0,
            Column::InProgress => 1,
            Column::Review => 2,
            Column::Done => 3,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Column::ToDo => "To Do",
            Column::InProgress => "In Progress",
            Column::Review => "Review",
            Column::Done => "Done",
        }
    }

    /// Keyword scan used by the extractor; `None` when the text names no column.
    pub fn from_keywords(lower: &str) -> Option<Self> {
        if ["todo", "to do", "pending"].iter().any(|k| lower.contains(k)) {
            Some(Column::ToDo)
        } else if ["in progress", "working"].iter().any(|k| lower.contains(k)) {
            Some(Column::InProgress)
        } else if ["review", "testing"].iter().any(|k| lower.contains(k)) {
            Some(Column::Review)
        } else if ["done", "complete"].iter().any(|k| lower.contains(k)) {
            Some(Column::Done)
        } else {
            None
        }
    }

    /// Maps a status field (frontmatter or upstream JSON) to a column.
    pub fn from_status(status: &str) -> Self {
        let lower = status.trim().to_lowercase().replace(['-', '_'], " ");
        Self::from_keywords(&lower).unwrap_or(Column::ToDo)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Low, Level::Medium, Level::High];

    pub fn index(&self) -> usize {
        match self {
            Level::Low => 0,
            Level::Medium => 1,
            Level::High => 2,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Level::Low => "Low",
            Level::Medium => "Medium",
            Level::High => "High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub title: String,
    pub column: Column,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRecord {
    pub title: String,
    pub likelihood: Level,
    pub impact: Level,
}

impl RiskRecord {
    /// (impact + 1) * (likelihood + 1), in 1..=9.
    pub fn score(&self) -> usize {
        (self.impact.index() + 1) * (self.likelihood.index() + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Branch {
    pub topic: String,
    pub subtopics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopicTree {
    pub central_theme: String,
    pub branches: Vec<Branch>,
}

/// Structured input to the layout engine, one variant per archetype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutInput {
    Tasks(Vec<TaskRecord>),
    Risks(Vec<RiskRecord>),
    Topics(TopicTree),
    Text(String),
}

impl LayoutInput {
    pub fn archetype(&self) -> Archetype {
        match self {
            LayoutInput::Tasks(_) => Archetype::Taskboard,
            LayoutInput::Risks(_) => Archetype::RiskMatrix,
            LayoutInput::Topics(_) => Archetype::MindMap,
            LayoutInput::Text(_) => Archetype::Personnel,
        }
    }
}
