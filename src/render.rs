use crate::layout::routing::anchor_point;
use crate::layout::{Edge, Graph, Node};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const MARGIN: f32 = 40.0;
const LINE_HEIGHT: f32 = 1.35;
const CHAR_WIDTH: f32 = 0.58;
const NODE_PADDING: f32 = 10.0;

/// Static preview of a canvas: groups behind, then edges, then content nodes.
/// Edges are straight lines between the anchors of their attachment sides.
pub fn render_svg(graph: &Graph, theme: &Theme) -> String {
    let (min_x, min_y, max_x, max_y) = bounds(graph);
    let width = (max_x - min_x + MARGIN * 2.0).max(200.0);
    let height = (max_y - min_y + MARGIN * 2.0).max(200.0);
    let shift = (MARGIN - min_x, MARGIN - min_y);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" viewBox=\"0 0 {width:.0} {height:.0}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        theme.line_color
    ));
    svg.push_str("</defs>");

    for group in graph.groups() {
        let (x, y) = (group.x + shift.0, group.y + shift.1);
        let border = color_or(theme, group, &theme.group_border);
        svg.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"10\" ry=\"10\" fill=\"{}\" stroke=\"{border}\" stroke-dasharray=\"6 4\" stroke-width=\"1.2\"/>",
            group.width,
            group.height,
            theme.group_background,
        ));
        if let Some(label) = group.label.as_deref() {
            svg.push_str(&format!(
                "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\">{}</text>",
                x + 12.0,
                y + 20.0,
                theme.font_family,
                theme.font_size,
                theme.text_color,
                escape_xml(label)
            ));
        }
    }

    for edge in &graph.edges {
        if let Some(d) = edge_path(graph, edge, shift) {
            let stroke = edge
                .color
                .as_deref()
                .and_then(|color| theme.resolve(color))
                .unwrap_or_else(|| theme.line_color.clone());
            svg.push_str(&format!(
                "<path d=\"{d}\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"1.4\" marker-end=\"url(#arrow)\"/>",
            ));
        }
    }

    for node in graph.content_nodes() {
        let (x, y) = (node.x + shift.0, node.y + shift.1);
        let border = color_or(theme, node, &theme.node_border);
        svg.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"8\" ry=\"8\" fill=\"{}\" stroke=\"{border}\" stroke-width=\"2\"/>",
            node.width,
            node.height,
            theme.node_fill,
        ));
        if let Some(content) = node.content() {
            let lines = wrap_text(content, node.width - NODE_PADDING * 2.0, theme.font_size);
            svg.push_str(&text_block_svg(x + node.width / 2.0, y + node.height / 2.0, &lines, theme));
        }
    }

    svg.push_str("</svg>");
    svg
}

fn bounds(graph: &Graph) -> (f32, f32, f32, f32) {
    if graph.nodes.is_empty() {
        return (0.0, 0.0, 0.0, 0.0);
    }
    graph.nodes.iter().fold(
        (f32::MAX, f32::MAX, f32::MIN, f32::MIN),
        |(min_x, min_y, max_x, max_y), node| {
            (
                min_x.min(node.x),
                min_y.min(node.y),
                max_x.max(node.x + node.width),
                max_y.max(node.y + node.height),
            )
        },
    )
}

fn color_or(theme: &Theme, node: &Node, fallback: &str) -> String {
    node.color
        .as_deref()
        .and_then(|color| theme.resolve(color))
        .unwrap_or_else(|| fallback.to_string())
}

fn edge_path(graph: &Graph, edge: &Edge, shift: (f32, f32)) -> Option<String> {
    let from = graph.node(&edge.from_node)?;
    let to = graph.node(&edge.to_node)?;
    let start = edge.from_side.map_or_else(|| from.center(), |side| anchor_point(from, side));
    let end = edge.to_side.map_or_else(|| to.center(), |side| anchor_point(to, side));
    Some(format!(
        "M {:.2} {:.2} L {:.2} {:.2}",
        start.0 + shift.0,
        start.1 + shift.1,
        end.0 + shift.0,
        end.1 + shift.1
    ))
}

/// Greedy word wrap using an average glyph width; good enough for a preview.
fn wrap_text(content: &str, max_width: f32, font_size: f32) -> Vec<String> {
    let max_chars = ((max_width / (font_size * CHAR_WIDTH)).floor() as usize).max(1);
    let mut lines = Vec::new();
    for raw in content.lines() {
        let mut current = String::new();
        for word in raw.split_whitespace() {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    lines
}

fn text_block_svg(x: f32, y: f32, lines: &[String], theme: &Theme) -> String {
    let line_height = theme.font_size * LINE_HEIGHT;
    let total_height = lines.len() as f32 * line_height;
    let start_y = y - total_height / 2.0 + theme.font_size;
    let mut text = format!(
        "<text x=\"{x:.2}\" y=\"{start_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">",
        theme.font_family, theme.font_size, theme.text_color
    );
    for (idx, line) in lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_height };
        text.push_str(&format!("<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>", escape_xml(line)));
    }
    text.push_str("</text>");
    text
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(str::trim)
        .unwrap_or("Inter")
        .to_string();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutStyle;
    use crate::ir::Archetype;
    use crate::layout::layout_text;

    #[test]
    fn render_svg_basic() {
        let graph = layout_text(
            Archetype::MindMap,
            "Launch <beta>\nDocs\n  API & guides",
            &LayoutStyle::interactive(),
        );
        let svg = render_svg(&graph, &Theme::canvas_default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Launch &lt;beta&gt;"));
        assert!(svg.contains("API &amp; guides"));
        assert_eq!(svg.matches("marker-end=\"url(#arrow)\"").count(), 2);
        // Center node carries the accent token, resolved to hex.
        assert!(svg.contains("stroke=\"#A882FF\""));
    }

    #[test]
    fn groups_render_with_labels() {
        let graph = layout_text(Archetype::Taskboard, "- one", &LayoutStyle::headless());
        let svg = render_svg(&graph, &Theme::dark());
        assert_eq!(svg.matches("stroke-dasharray").count(), 4);
        assert!(svg.contains(">In Progress</text>"));
        assert!(svg.contains(&Theme::dark().background));
    }

    #[test]
    fn empty_graph_has_minimum_canvas() {
        let svg = render_svg(&Graph::new(), &Theme::default());
        assert!(svg.contains("width=\"200\""));
    }

    #[test]
    fn wraps_long_lines() {
        let lines = wrap_text("alpha beta gamma", 60.0, 10.0);
        assert_eq!(lines, vec!["alpha beta", "gamma"]);
        assert_eq!(wrap_text("a\n\nb", 100.0, 10.0), vec!["a", "", "b"]);
    }
}
