use crate::ir::{Archetype, Branch, Column, LayoutInput, Level, Priority, RiskRecord, TaskRecord, TopicTree};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*•]\s*").unwrap());
static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#+\s*").unwrap());

const MIN_ITEM_CHARS: usize = 3;
const PLACEHOLDER_CHARS: usize = 100;

/// Converts free text into the structured input for `archetype`. Never fails:
/// unparseable input degrades to placeholder content.
pub fn extract(archetype: Archetype, text: &str) -> LayoutInput {
    match archetype {
        Archetype::Taskboard => LayoutInput::Tasks(extract_tasks(text)),
        Archetype::RiskMatrix => LayoutInput::Risks(extract_risks(text)),
        Archetype::MindMap => LayoutInput::Topics(extract_topics(text)),
        Archetype::Personnel => LayoutInput::Text(text.trim().to_string()),
    }
}

pub fn extract_tasks(text: &str) -> Vec<TaskRecord> {
    let mut column = Column::ToDo;
    let mut tasks = Vec::new();

    for line in non_blank_lines(text) {
        let lower = line.to_lowercase();
        if let Some(next) = Column::from_keywords(&lower) {
            column = next;
        }
        let title = strip_bullet(line.trim());
        if title.chars().count() < MIN_ITEM_CHARS {
            continue;
        }
        tasks.push(TaskRecord {
            title,
            column,
            priority: infer_priority(&lower),
        });
    }

    if tasks.is_empty() {
        debug!("no task lines found, emitting placeholder");
        tasks.push(TaskRecord {
            title: excerpt(text),
            column: Column::ToDo,
            priority: Priority::Medium,
        });
    }
    debug!("extracted {} tasks", tasks.len());
    tasks
}

pub fn extract_risks(text: &str) -> Vec<RiskRecord> {
    let risks: Vec<RiskRecord> = non_blank_lines(text)
        .filter_map(|line| {
            let title = strip_bullet(line.trim());
            if title.chars().count() < MIN_ITEM_CHARS {
                return None;
            }
            let lower = line.to_lowercase();
            Some(RiskRecord {
                title,
                likelihood: infer_likelihood(&lower),
                impact: infer_impact(&lower),
            })
        })
        .collect();
    debug!("extracted {} risks", risks.len());
    risks
}

pub fn extract_topics(text: &str) -> TopicTree {
    let mut lines = non_blank_lines(text);
    let central_theme = lines
        .next()
        .map(|line| strip_heading(line.trim()))
        .filter(|theme| !theme.is_empty())
        .unwrap_or_else(|| "Untitled".to_string());

    let mut branches = Vec::new();
    let mut open: Option<Branch> = None;
    for raw_line in lines {
        let content = strip_heading(raw_line.trim());
        if is_sub_item(raw_line) {
            // Sub-items seen before any branch have nowhere to go.
            if let Some(branch) = open.as_mut()
                && !content.is_empty()
            {
                branch.subtopics.push(content);
            }
            continue;
        }
        if content.chars().count() < MIN_ITEM_CHARS {
            continue;
        }
        if let Some(done) = open.take() {
            branches.push(done);
        }
        open = Some(Branch {
            topic: content,
            subtopics: Vec::new(),
        });
    }
    if let Some(done) = open {
        branches.push(done);
    }

    debug!("extracted mind map with {} branches", branches.len());
    TopicTree {
        central_theme,
        branches,
    }
}

pub fn infer_priority(lower: &str) -> Priority {
    if lower.contains("high") || lower.contains("urgent") || lower.contains('!') {
        Priority::High
    } else if lower.contains("low") {
        Priority::Low
    } else {
        Priority::Medium
    }
}

// "unlikely" contains "likely", so the low markers are checked first.
pub fn infer_likelihood(lower: &str) -> Level {
    if lower.contains("low likelihood") || lower.contains("unlikely") {
        Level::Low
    } else if lower.contains("high likelihood") || lower.contains("likely") {
        Level::High
    } else {
        Level::Medium
    }
}

pub fn infer_impact(lower: &str) -> Level {
    if lower.contains("high impact") || lower.contains("critical") {
        Level::High
    } else if lower.contains("low impact") || lower.contains("minor") {
        Level::Low
    } else {
        Level::Medium
    }
}

fn non_blank_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter(|line| !line.trim().is_empty())
}

fn is_sub_item(raw_line: &str) -> bool {
    raw_line.starts_with("  ")
        || raw_line.starts_with('\t')
        || BULLET_RE.is_match(raw_line.trim_start())
}

fn strip_bullet(line: &str) -> String {
    BULLET_RE.replace(line, "").trim().to_string()
}

fn strip_heading(line: &str) -> String {
    let without_heading = HEADING_RE.replace(line, "");
    strip_bullet(without_heading.trim())
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "New task".to_string();
    }
    trimmed.chars().take(PLACEHOLDER_CHARS).collect()
}
