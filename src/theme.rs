use crate::ir::{Column, Priority};
use serde::{Deserialize, Serialize};

/// Canvas color tokens. The host resolves "1".."6" to its own palette.
pub const RED: &str = "1";
pub const ORANGE: &str = "2";
pub const YELLOW: &str = "3";
pub const GREEN: &str = "4";
pub const CYAN: &str = "5";
pub const PURPLE: &str = "6";

/// Which color token each semantic role maps to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub priority_high: String,
    pub priority_medium: String,
    pub priority_low: String,
    pub columns: [String; 4],
    pub risk_high: String,
    pub risk_medium: String,
    pub risk_low: String,
    pub accent: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            priority_high: RED.to_string(),
            priority_medium: YELLOW.to_string(),
            priority_low: GREEN.to_string(),
            columns: [
                CYAN.to_string(),
                YELLOW.to_string(),
                ORANGE.to_string(),
                GREEN.to_string(),
            ],
            risk_high: RED.to_string(),
            risk_medium: ORANGE.to_string(),
            risk_low: GREEN.to_string(),
            accent: PURPLE.to_string(),
        }
    }
}

impl Palette {
    pub fn priority(&self, priority: Priority) -> &str {
        match priority {
            Priority::High => &self.priority_high,
            Priority::Medium => &self.priority_medium,
            Priority::Low => &self.priority_low,
        }
    }

    pub fn column(&self, column: Column) -> &str {
        &self.columns[column.index()]
    }

    /// Score is (impact + 1) * (likelihood + 1).
    pub fn risk(&self, score: usize) -> &str {
        if score >= 6 {
            &self.risk_high
        } else if score >= 3 {
            &self.risk_medium
        } else {
            &self.risk_low
        }
    }
}

/// Colors used by the SVG preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub node_fill: String,
    pub node_border: String,
    pub text_color: String,
    pub line_color: String,
    pub group_background: String,
    pub group_border: String,
    pub background: String,
    pub tokens: [String; 6],
}

impl Theme {
    pub fn canvas_default() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            node_fill: "#FFFFFF".to_string(),
            node_border: "#C7D2E5".to_string(),
            text_color: "#1C2430".to_string(),
            line_color: "#7A8AA6".to_string(),
            group_background: "#F7FAFF".to_string(),
            group_border: "#D7E0F0".to_string(),
            background: "#FFFFFF".to_string(),
            tokens: [
                "#FB464C".to_string(),
                "#E9973F".to_string(),
                "#E0DE71".to_string(),
                "#44CF6E".to_string(),
                "#53DFDD".to_string(),
                "#A882FF".to_string(),
            ],
        }
    }

    pub fn dark() -> Self {
        Self {
            node_fill: "#262626".to_string(),
            node_border: "#3F3F46".to_string(),
            text_color: "#DADADA".to_string(),
            line_color: "#8A8A8A".to_string(),
            group_background: "#1E1E1E".to_string(),
            group_border: "#3F3F46".to_string(),
            background: "#141414".to_string(),
            ..Self::canvas_default()
        }
    }

    /// Resolves a node color: a token "1".."6" or a literal hex value.
    pub fn resolve(&self, color: &str) -> Option<String> {
        if color.starts_with('#') {
            return Some(color.to_string());
        }
        let index: usize = color.parse().ok()?;
        self.tokens.get(index.checked_sub(1)?).cloned()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::canvas_default()
    }
}
